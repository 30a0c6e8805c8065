pub mod document_ctx;
pub mod record_formatter;
pub mod section_tracker;

pub use document_ctx::{DocumentCtx, ExtractionStats, Group, GroupTracker};
pub use record_formatter::RecordFormatter;
pub use section_tracker::{SectionCursor, SectionKind, SectionLabel, SectionTransition};
