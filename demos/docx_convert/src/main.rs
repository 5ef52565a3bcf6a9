use std::collections::HashMap;

use serde_json::json;
use synaptic::core::SynapticError;
use synaptic::docx::{DocxToDocument, Source};

#[tokio::main]
async fn main() -> Result<(), SynapticError> {
    tracing_subscriber::fmt::init();

    let sources: Vec<Source> = std::env::args().skip(1).map(Source::from).collect();
    if sources.is_empty() {
        eprintln!("usage: docx_convert <file.docx>...");
        return Ok(());
    }

    let meta = HashMap::from([("converted_by".to_string(), json!("docx_convert"))]);
    let docs = DocxToDocument::new().run(sources, Some(meta.into())).await?;

    for doc in &docs {
        println!("=== {} ===", doc.id);
        let mut keys: Vec<_> = doc.metadata.keys().collect();
        keys.sort();
        for key in keys {
            println!("  {key}: {}", doc.metadata[key]);
        }
        println!("{}\n", doc.content);
    }
    println!("Converted {} document(s)", docs.len());
    Ok(())
}
