pub mod md_loader;

pub use md_loader::{load_all_documents, load_paragraph_stream, SourceDocument};
