//! # Question Extract
//!
//! 从试卷文档（已转为段落流）中抽取结构化题目的 Rust 库
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 段落流、候选题、最终记录、文档元数据、科目
//! - `models/loaders` - 把输入目录中的文档加载为段落流
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个模块只做一件事
//! - `text_normalizer` - 空白、配分说明、边界标点
//! - `math_converter` - 声明式符号替换表
//! - `image_resolver` - 图片引用检测与路径生成
//! - `dedup` - 题干去重键
//! - `metadata_resolver` - 从路径解析学期/年级/版本/科目/章节
//!
//! ### ③ 识别层（Recognizers）
//! - `recognizers/` - `QuestionRecognizer` trait 与五个学科实现
//!
//! ### ④ 流程层（Workflow）
//! - `DocumentCtx` - 单份文档的解析状态（区块、题组、图片计数、统计）
//! - `RecordFormatter` - 候选题 → 最终记录
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/document_processor` - 单个文档的驱动循环
//! - `orchestrator/batch_processor` - 批量文档处理器，管理并发与输出
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod recognizers;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{CanonicalQuestionRecord, ParagraphStream, QuestionText, QuestionType, SubjectFamily};
pub use orchestrator::{extract_document, App, DocumentExtraction, DocumentProcessor, ExtractOptions};
pub use recognizers::{recognizer_for, QuestionRecognizer};
pub use workflow::{DocumentCtx, ExtractionStats};
