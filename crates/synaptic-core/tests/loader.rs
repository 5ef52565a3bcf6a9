use async_trait::async_trait;
use futures::StreamExt;
use synaptic_core::{Document, Loader, SynapticError};

struct StaticLoader {
    docs: Vec<Document>,
}

#[async_trait]
impl Loader for StaticLoader {
    async fn load(&self) -> Result<Vec<Document>, SynapticError> {
        Ok(self.docs.clone())
    }
}

struct FailingLoader;

#[async_trait]
impl Loader for FailingLoader {
    async fn load(&self) -> Result<Vec<Document>, SynapticError> {
        Err(SynapticError::Loader("unreadable".into()))
    }
}

#[tokio::test]
async fn lazy_load_yields_documents_in_order() {
    let loader = StaticLoader {
        docs: vec![Document::new("a", "first"), Document::new("b", "second")],
    };
    let ids: Vec<String> = loader
        .lazy_load()
        .map(|doc| doc.unwrap().id)
        .collect()
        .await;
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn lazy_load_surfaces_the_error() {
    let results: Vec<_> = FailingLoader.lazy_load().collect().await;
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(SynapticError::Loader(_))));
}

#[test]
fn document_metadata_is_skipped_when_empty() {
    let json = serde_json::to_value(Document::new("id", "text")).unwrap();
    assert_eq!(json, serde_json::json!({"id": "id", "content": "text"}));
}
