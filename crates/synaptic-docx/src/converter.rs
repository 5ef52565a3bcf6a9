use std::collections::HashMap;

use serde_json::Value;
use synaptic_core::{Document, SynapticError};

use crate::parse::{parse_docx, DocxContent};
use crate::source::{ByteStream, Source, SourceMeta};

/// Converts `.docx` files into [`Document`]s.
///
/// Each document holds the body paragraphs joined by newlines. Its metadata
/// merges, in increasing precedence, the source's own metadata (`file_path`
/// for paths), the non-empty core properties as `docx_*` keys, and the
/// caller's metadata. Sources that cannot be read or parsed are logged and
/// skipped.
///
/// ```ignore
/// let converter = DocxToDocument::new();
/// let docs = converter
///     .run(vec!["report.docx".into()], Some(HashMap::from([("lang".into(), json!("en"))]).into()))
///     .await?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxToDocument;

impl DocxToDocument {
    pub fn new() -> Self {
        Self
    }

    /// Convert every readable source, in order.
    ///
    /// A `PerSource` meta list must have one entry per source.
    pub async fn run(
        &self,
        sources: Vec<Source>,
        meta: Option<SourceMeta>,
    ) -> Result<Vec<Document>, SynapticError> {
        let meta_list = SourceMeta::expand(meta, sources.len())?;
        let mut documents = Vec::with_capacity(sources.len());

        for (source, metadata) in sources.into_iter().zip(meta_list) {
            let label = source.to_string();
            let (id, stream) = match read_source(source).await {
                Ok(read) => read,
                Err(e) => {
                    tracing::warn!(source = %label, error = %e, "Could not read {label}. Skipping it.");
                    continue;
                }
            };

            let content = match parse_in_background(stream.data.clone()).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(
                        source = %label,
                        error = %e,
                        "Could not read {label} and convert it to a Docx Document, skipping."
                    );
                    continue;
                }
            };

            let document = build_document(id, stream.meta, content, metadata);
            tracing::debug!(
                source = %label,
                chars = document.content.len(),
                "converted docx"
            );
            documents.push(document);
        }

        Ok(documents)
    }
}

/// Turn a source into a document id and its bytes.
async fn read_source(source: Source) -> Result<(String, ByteStream), SynapticError> {
    match source {
        Source::Path(path) => {
            let stream = ByteStream::from_file_path(&path).await?;
            Ok((path.to_string_lossy().to_string(), stream))
        }
        Source::ByteStream(stream) => Ok((uuid::Uuid::new_v4().to_string(), stream)),
    }
}

/// Parse on a blocking thread; zip inflation and XML scanning are synchronous.
pub(crate) async fn parse_in_background(data: bytes::Bytes) -> Result<DocxContent, SynapticError> {
    tokio::task::spawn_blocking(move || parse_docx(&data))
        .await
        .map_err(|e| SynapticError::Loader(format!("task join error: {e}")))?
}

pub(crate) fn build_document(
    id: String,
    source_meta: HashMap<String, Value>,
    content: DocxContent,
    caller_meta: HashMap<String, Value>,
) -> Document {
    let text = content.text();
    let mut metadata = source_meta;
    metadata.extend(content.properties);
    metadata.extend(caller_meta);
    Document::with_metadata(id, text, metadata)
}
