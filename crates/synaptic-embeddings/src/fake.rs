use async_trait::async_trait;
use synaptic_core::SynapticError;

use crate::Embeddings;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic bag-of-words embeddings for testing.
///
/// Every whitespace-separated token is hashed into one of `dimensions`
/// buckets and the resulting count vector is normalized to unit length, so
/// texts sharing tokens land close together and identical texts have cosine
/// similarity 1.0. Empty text embeds to the zero vector.
pub struct FakeEmbeddings {
    dimensions: usize,
}

impl FakeEmbeddings {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl Default for FakeEmbeddings {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embeddings for FakeEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SynapticError> {
        Ok(texts
            .iter()
            .map(|t| text_to_vector(t, self.dimensions))
            .collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, SynapticError> {
        Ok(text_to_vector(text, self.dimensions))
    }
}

fn fnv1a(token: &str) -> u64 {
    token
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME))
}

fn text_to_vector(text: &str, dimensions: usize) -> Vec<f32> {
    let mut vec = vec![0.0f32; dimensions];
    for token in text.split_whitespace() {
        vec[(fnv1a(token) % dimensions as u64) as usize] += 1.0;
    }
    let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in &mut vec {
            *x /= magnitude;
        }
    }
    vec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv_matches_reference_vector() {
        // FNV-1a 64 of "a"
        assert_eq!(fnv1a("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        assert!(text_to_vector("   ", 8).iter().all(|x| *x == 0.0));
    }
}
