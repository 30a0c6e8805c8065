//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责把一份文档从头到尾跑完，以及批量调度多份文档。
//!
//! ## 模块划分
//!
//! ### `document_processor` - 单个文档处理器
//! - 驱动循环：区块标题 → 题组引言 → 题目识别
//! - 去重、图片分配、记录格式化
//! - 输出单个文档的统计信息
//!
//! ### `batch_processor` - 批量文档处理器
//! - 递归加载输入目录（`Vec<SourceDocument>`）
//! - 按科目文件夹选择识别器
//! - 控制并发数量（Semaphore）
//! - 写出 JSON 并输出全局统计
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<SourceDocument>)
//!     ↓
//! document_processor (处理 ParagraphStream)
//!     ↓
//! recognizers (学科文法) + workflow (DocumentCtx / RecordFormatter)
//!     ↓
//! services (能力层：normalize / math / image / dedup / metadata)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量与 I/O，document_processor 管单个文档
//! 2. **状态隔离**：每份文档一个 `DocumentCtx`，并行处理无需加锁
//! 3. **向下依赖**：编排层 → recognizers / workflow → services

pub mod batch_processor;
pub mod document_processor;

// 重新导出主要类型
pub use batch_processor::{App, BatchStats};
pub use document_processor::{extract_document, DocumentExtraction, DocumentProcessor, ExtractOptions};
