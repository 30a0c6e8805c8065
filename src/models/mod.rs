pub mod loaders;
pub mod metadata;
pub mod paragraph;
pub mod question;
pub mod subject;

pub use loaders::{load_all_documents, load_paragraph_stream, SourceDocument};
pub use metadata::DocumentMetadata;
pub use paragraph::ParagraphStream;
pub use question::{
    CanonicalQuestionRecord, DropReason, FormattedText, OptionLetter, OptionMap, QuestionCandidate,
    QuestionText, QuestionType,
};
pub use subject::{Subject, SubjectFamily};
