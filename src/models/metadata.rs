use serde::{Deserialize, Serialize};

/// 由文档路径推导出的元数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub scope: String,
    pub grade: String,
    pub subject: String,
    pub semester: String,
    pub publisher: String,
    pub chapter: String,
}
