pub mod dedup;
pub mod image_resolver;
pub mod math_converter;
pub mod metadata_resolver;
pub mod text_normalizer;

pub use dedup::{dedup_key, DedupFilter};
pub use image_resolver::{ImageCounter, ImageNaming, ImagePathGenerator, ImageResolver};
pub use metadata_resolver::resolve_metadata;
pub use text_normalizer::normalize;
