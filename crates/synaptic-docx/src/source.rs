use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde_json::Value;
use synaptic_core::SynapticError;

/// Raw file contents together with metadata describing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ByteStream {
    pub data: Bytes,
    pub meta: HashMap<String, Value>,
    pub mime_type: Option<String>,
}

impl ByteStream {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            meta: HashMap::new(),
            mime_type: None,
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file, recording its path under `file_path`.
    pub async fn from_file_path(path: impl AsRef<Path>) -> Result<Self, SynapticError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| SynapticError::Loader(format!("failed to read {}: {e}", path.display())))?;
        Ok(Self::new(data).with_meta("file_path", path.to_string_lossy().to_string()))
    }
}

/// One input of [`DocxToDocument::run`](crate::DocxToDocument::run).
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Path(PathBuf),
    ByteStream(ByteStream),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::ByteStream(stream) => match stream.meta.get("file_path") {
                Some(Value::String(path)) => write!(f, "ByteStream({path})"),
                _ => write!(f, "ByteStream({} bytes)", stream.data.len()),
            },
        }
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<String> for Source {
    fn from(path: String) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<ByteStream> for Source {
    fn from(stream: ByteStream) -> Self {
        Source::ByteStream(stream)
    }
}

/// Caller metadata for a conversion: one map for every source, or one per source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceMeta {
    Shared(HashMap<String, Value>),
    PerSource(Vec<HashMap<String, Value>>),
}

impl SourceMeta {
    /// Expand into exactly one map per source.
    pub(crate) fn expand(
        meta: Option<SourceMeta>,
        sources: usize,
    ) -> Result<Vec<HashMap<String, Value>>, SynapticError> {
        match meta {
            None => Ok(vec![HashMap::new(); sources]),
            Some(SourceMeta::Shared(map)) => Ok(vec![map; sources]),
            Some(SourceMeta::PerSource(list)) => {
                if list.len() != sources {
                    return Err(SynapticError::length_mismatch(
                        "sources vs meta",
                        sources,
                        list.len(),
                    ));
                }
                Ok(list)
            }
        }
    }
}

impl From<HashMap<String, Value>> for SourceMeta {
    fn from(map: HashMap<String, Value>) -> Self {
        SourceMeta::Shared(map)
    }
}

impl From<Vec<HashMap<String, Value>>> for SourceMeta {
    fn from(list: Vec<HashMap<String, Value>>) -> Self {
        SourceMeta::PerSource(list)
    }
}
