use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use synaptic_core::{RunnableConfig, Sample, SynapticError};

use crate::runnable::{BoxRunnable, Runnable};

/// Runs named components one after another over keyed samples.
///
/// The first component receives the pipeline input and every later component
/// receives the output of the one before it. The pipeline output maps
/// component names to that component's output: the last component is always
/// reported, earlier ones only when registered with `include_outputs_from`.
///
/// ```ignore
/// let mut pipeline = Pipeline::new();
/// pipeline.add_component("retriever", retriever)?;
/// pipeline.add_component("reader", reader)?;
/// let output = pipeline.invoke(input, &RunnableConfig::default()).await?;
/// let answers = &output["reader"]["answers"];
/// ```
#[derive(Default)]
pub struct Pipeline {
    components: Vec<(String, BoxRunnable<Sample, Sample>)>,
    include_outputs_from: HashSet<String>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component. Names must be unique within the pipeline.
    pub fn add_component<R>(&mut self, name: impl Into<String>, component: R) -> Result<(), SynapticError>
    where
        R: Runnable<Sample, Sample> + 'static,
    {
        let name = name.into();
        if self.components.iter().any(|(existing, _)| *existing == name) {
            return Err(SynapticError::Validation(format!(
                "pipeline already has a component named '{name}'"
            )));
        }
        self.components.push((name, component.boxed()));
        Ok(())
    }

    /// Also report the output of an intermediate component.
    pub fn include_outputs_from(mut self, name: impl Into<String>) -> Self {
        self.include_outputs_from.insert(name.into());
        self
    }

    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

fn to_object(sample: Sample) -> Value {
    Value::Object(sample.into_iter().collect())
}

#[async_trait]
impl Runnable<Sample, Sample> for Pipeline {
    async fn invoke(&self, input: Sample, config: &RunnableConfig) -> Result<Sample, SynapticError> {
        if self.components.is_empty() {
            return Err(SynapticError::Validation(
                "pipeline has no components".to_string(),
            ));
        }

        let last = self.components.len() - 1;
        let mut outputs = Sample::new();
        let mut current = input;

        for (index, (name, component)) in self.components.iter().enumerate() {
            tracing::debug!(component = %name, "running pipeline component");
            let output = component.invoke(current, config).await?;
            if index == last {
                outputs.insert(name.clone(), to_object(output));
                break;
            }
            if self.include_outputs_from.contains(name) {
                outputs.insert(name.clone(), to_object(output.clone()));
            }
            current = output;
        }

        Ok(outputs)
    }
}
