use serde::{Deserialize, Serialize};
use serde_json::Value;
use synaptic_core::{Sample, SynapticError};

/// How the outputs of an evaluated target are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnableKind {
    /// Each output maps component names to that component's output.
    Pipeline,
    /// Each output is the component's own output.
    Component,
}

/// Collect the answers stored under `output_key` in every sample, in order.
///
/// For pipeline outputs the key must live in exactly one component. Values
/// may be a string, a generated answer (`{"data": "..."}`), or an array of
/// those; empty answers are skipped.
pub fn extract_answers(
    outputs: &[Sample],
    output_key: &str,
    kind: RunnableKind,
) -> Result<Vec<String>, SynapticError> {
    Ok(extract_sample_answers(outputs, output_key, kind)?
        .into_iter()
        .flatten()
        .collect())
}

/// Like [`extract_answers`], but keeps the answers of each sample apart.
///
/// The outer vector is index-aligned with `outputs`.
pub fn extract_sample_answers(
    outputs: &[Sample],
    output_key: &str,
    kind: RunnableKind,
) -> Result<Vec<Vec<String>>, SynapticError> {
    outputs
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            let value = match kind {
                RunnableKind::Component => {
                    sample
                        .get(output_key)
                        .ok_or_else(|| SynapticError::MissingKey {
                            key: output_key.to_string(),
                            sample: index,
                        })?
                }
                RunnableKind::Pipeline => lookup_in_components(sample, output_key, index)?,
            };
            let mut answers = Vec::new();
            push_answers(value, output_key, index, &mut answers)?;
            Ok(answers)
        })
        .collect()
}

fn lookup_in_components<'a>(
    sample: &'a Sample,
    output_key: &str,
    index: usize,
) -> Result<&'a Value, SynapticError> {
    let mut names: Vec<&String> = sample.keys().collect();
    names.sort();

    let mut found: Vec<(&String, &Value)> = Vec::new();
    for name in names {
        let output = sample[name].as_object().ok_or_else(|| {
            SynapticError::Shape(format!(
                "output of component '{name}' in sample {index} is not a mapping"
            ))
        })?;
        if let Some(value) = output.get(output_key) {
            found.push((name, value));
        }
    }

    match found.as_slice() {
        [] => Err(SynapticError::MissingKey {
            key: output_key.to_string(),
            sample: index,
        }),
        [(_, value)] => Ok(*value),
        many => Err(SynapticError::AmbiguousKey {
            key: output_key.to_string(),
            sample: index,
            components: many.iter().map(|(name, _)| name.to_string()).collect(),
        }),
    }
}

fn push_answers(
    value: &Value,
    key: &str,
    index: usize,
    answers: &mut Vec<String>,
) -> Result<(), SynapticError> {
    match value {
        Value::Array(items) => {
            for item in items {
                if let Some(answer) = single_answer(item, key, index)? {
                    answers.push(answer);
                }
            }
        }
        other => {
            if let Some(answer) = single_answer(other, key, index)? {
                answers.push(answer);
            }
        }
    }
    Ok(())
}

fn single_answer(value: &Value, key: &str, index: usize) -> Result<Option<String>, SynapticError> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(text) => text,
        Value::Object(answer) => match answer.get("data") {
            Some(Value::String(text)) => text,
            Some(Value::Null) => return Ok(None),
            _ => {
                return Err(SynapticError::Shape(format!(
                    "answer object under `{key}` in sample {index} has no string `data`"
                )))
            }
        },
        other => {
            return Err(SynapticError::Shape(format!(
                "answer under `{key}` in sample {index} is not text: {other}"
            )))
        }
    };
    Ok((!text.is_empty()).then(|| text.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_arrays_are_rejected() {
        let mut answers = Vec::new();
        let err = push_answers(&json!([["Paris"]]), "answers", 0, &mut answers).unwrap_err();
        assert!(matches!(err, SynapticError::Shape(_)));
    }

    #[test]
    fn null_data_is_skipped() {
        assert_eq!(single_answer(&json!({"data": null}), "answers", 0).unwrap(), None);
    }
}
