use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use synaptic_core::{Document, Loader, SynapticError};

use crate::converter::{build_document, parse_in_background};
use crate::source::ByteStream;

/// Loads a single `.docx` file as one [`Document`].
///
/// Unlike [`DocxToDocument`](crate::DocxToDocument), failures are returned
/// instead of logged and skipped.
///
/// ```no_run
/// use synaptic_docx::{DocxLoader, Loader};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let docs = DocxLoader::new("report.docx").load().await?;
/// assert_eq!(docs.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct DocxLoader {
    path: PathBuf,
}

impl DocxLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Loader for DocxLoader {
    async fn load(&self) -> Result<Vec<Document>, SynapticError> {
        let stream = ByteStream::from_file_path(&self.path).await?;
        let content = parse_in_background(stream.data.clone())
            .await
            .map_err(|e| {
                SynapticError::Loader(format!(
                    "failed to convert {}: {e}",
                    self.path.display()
                ))
            })?;
        let id = self.path.to_string_lossy().to_string();
        Ok(vec![build_document(id, stream.meta, content, HashMap::new())])
    }
}
