mod converter;
mod loader;
mod parse;
mod source;

pub use converter::DocxToDocument;
pub use loader::DocxLoader;
pub use parse::{parse_docx, DocxContent, METADATA_PREFIX};
pub use source::{ByteStream, Source, SourceMeta};
pub use synaptic_core::{Document, Loader};
