use std::collections::HashMap;

use synaptic_core::SynapticError;

/// Per-sample scores together with their mean.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleScores {
    pub score: f64,
    pub scores: Vec<f64>,
}

pub(crate) fn check_lengths(predictions: &[String], labels: &[String]) -> Result<(), SynapticError> {
    if predictions.len() != labels.len() {
        return Err(SynapticError::length_mismatch(
            "predictions vs labels",
            predictions.len(),
            labels.len(),
        ));
    }
    Ok(())
}

pub(crate) fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Fraction of predictions that equal their label exactly.
pub fn exact_match(predictions: &[String], labels: &[String]) -> Result<SampleScores, SynapticError> {
    check_lengths(predictions, labels)?;
    let scores: Vec<f64> = predictions
        .iter()
        .zip(labels)
        .map(|(prediction, label)| if prediction == label { 1.0 } else { 0.0 })
        .collect();
    Ok(SampleScores {
        score: mean(&scores),
        scores,
    })
}

/// Token-level F1 between one prediction and one label.
///
/// Both sides are split on whitespace. Two empty answers agree (1.0); an
/// empty answer against a non-empty one scores 0.0.
pub fn f1_single(prediction: &str, label: &str) -> f64 {
    let prediction_tokens: Vec<&str> = prediction.split_whitespace().collect();
    let label_tokens: Vec<&str> = label.split_whitespace().collect();

    if prediction_tokens.is_empty() || label_tokens.is_empty() {
        return if prediction_tokens.is_empty() && label_tokens.is_empty() {
            1.0
        } else {
            0.0
        };
    }

    let mut label_counts: HashMap<&str, usize> = HashMap::new();
    for token in &label_tokens {
        *label_counts.entry(*token).or_default() += 1;
    }
    let mut num_same = 0usize;
    for token in &prediction_tokens {
        if let Some(count) = label_counts.get_mut(token) {
            if *count > 0 {
                *count -= 1;
                num_same += 1;
            }
        }
    }
    if num_same == 0 {
        return 0.0;
    }

    let precision = num_same as f64 / prediction_tokens.len() as f64;
    let recall = num_same as f64 / label_tokens.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

/// Mean token-level F1 over parallel predictions and labels.
pub fn f1(predictions: &[String], labels: &[String]) -> Result<SampleScores, SynapticError> {
    check_lengths(predictions, labels)?;
    let scores: Vec<f64> = predictions
        .iter()
        .zip(labels)
        .map(|(prediction, label)| f1_single(prediction, label))
        .collect();
    Ok(SampleScores {
        score: mean(&scores),
        scores,
    })
}
