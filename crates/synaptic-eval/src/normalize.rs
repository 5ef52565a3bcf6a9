use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use synaptic_core::SynapticError;

/// Options controlling how answers are cleaned up before they are compared.
///
/// Steps always run in the same order: regex removal, lowercasing,
/// punctuation stripping, digit stripping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNormalization {
    /// Patterns whose matches are removed. Matching ignores case.
    #[serde(default)]
    pub regexes_to_ignore: Option<Vec<String>>,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default)]
    pub ignore_punctuation: bool,
    #[serde(default)]
    pub ignore_numbers: bool,
}

impl TextNormalization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_regexes_to_ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regexes_to_ignore = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ignore_case(mut self, ignore: bool) -> Self {
        self.ignore_case = ignore;
        self
    }

    pub fn with_ignore_punctuation(mut self, ignore: bool) -> Self {
        self.ignore_punctuation = ignore;
        self
    }

    pub fn with_ignore_numbers(mut self, ignore: bool) -> Self {
        self.ignore_numbers = ignore;
        self
    }

    /// Compile the options into a reusable normalizer.
    pub fn build(&self) -> Result<TextNormalizer, SynapticError> {
        let regexes = self
            .regexes_to_ignore
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        SynapticError::Validation(format!("invalid regex '{pattern}': {e}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TextNormalizer {
            regexes,
            ignore_case: self.ignore_case,
            ignore_punctuation: self.ignore_punctuation,
            ignore_numbers: self.ignore_numbers,
        })
    }
}

/// Compiled form of [`TextNormalization`].
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    regexes: Vec<Regex>,
    ignore_case: bool,
    ignore_punctuation: bool,
    ignore_numbers: bool,
}

impl TextNormalizer {
    pub fn normalize(&self, text: &str) -> String {
        let mut text = text.to_string();
        for regex in &self.regexes {
            text = regex.replace_all(&text, "").into_owned();
        }
        if self.ignore_case {
            text = text.to_lowercase();
        }
        if self.ignore_punctuation {
            text.retain(|c| !c.is_ascii_punctuation());
        }
        if self.ignore_numbers {
            text.retain(|c| !c.is_ascii_digit());
        }
        text
    }

    pub fn normalize_all(&self, texts: &[String]) -> Vec<String> {
        texts.iter().map(|text| self.normalize(text)).collect()
    }
}

/// Normalize `texts` under `options`, returning a new sequence of the same length.
pub fn preprocess_text(
    texts: &[String],
    options: &TextNormalization,
) -> Result<Vec<String>, SynapticError> {
    Ok(options.build()?.normalize_all(texts))
}
