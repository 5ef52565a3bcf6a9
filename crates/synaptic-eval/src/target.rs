use async_trait::async_trait;
use synaptic_core::{RunnableConfig, Sample, SynapticError};
use synaptic_runnables::{Pipeline, Runnable};

use crate::extract::RunnableKind;

/// Something [`eval`](crate::eval) can run: a whole pipeline or a single component.
#[async_trait]
pub trait EvalTarget: Send + Sync {
    /// How this target lays out its outputs.
    fn kind(&self) -> RunnableKind;

    async fn run(&self, input: Sample, config: &RunnableConfig) -> Result<Sample, SynapticError>;
}

/// Evaluates a single runnable whose output holds the answers directly.
pub struct Component<R> {
    inner: R,
}

impl<R> Component<R>
where
    R: Runnable<Sample, Sample>,
{
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[async_trait]
impl<R> EvalTarget for Component<R>
where
    R: Runnable<Sample, Sample>,
{
    fn kind(&self) -> RunnableKind {
        RunnableKind::Component
    }

    async fn run(&self, input: Sample, config: &RunnableConfig) -> Result<Sample, SynapticError> {
        self.inner.invoke(input, config).await
    }
}

#[async_trait]
impl EvalTarget for Pipeline {
    fn kind(&self) -> RunnableKind {
        RunnableKind::Pipeline
    }

    async fn run(&self, input: Sample, config: &RunnableConfig) -> Result<Sample, SynapticError> {
        self.invoke(input, config).await
    }
}
