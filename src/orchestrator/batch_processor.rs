//! 批量文档处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量文档的加载、调度和结果落盘。
//!
//! ## 核心功能
//!
//! 1. **批量加载**：递归扫描输入目录，加载所有文档
//! 2. **学科判定**：配置指定解析族，或按路径中的科目文件夹判断
//! 3. **并发控制**：使用 Semaphore 限制同时处理的文档数
//! 4. **结果输出**：每份文档一个 JSON 数组，目录结构与输入一致
//! 5. **全局统计**：汇总所有文档的处理结果
//!
//! 解析本身是纯 CPU 计算，放在 `spawn_blocking` 中执行

use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};
use crate::models::loaders::{load_all_documents, SourceDocument};
use crate::models::subject::{Subject, SubjectFamily};
use crate::orchestrator::document_processor::{DocumentExtraction, DocumentProcessor};
use crate::utils::logging::{log_document_complete, log_documents_loaded, log_startup, print_final_stats};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 路径中科目文件夹的位置（倒数第二段）
const SUBJECT_SEGMENT_FROM_END: usize = 2;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchStats> {
        log_startup(&self.config);

        let family_override = self.config.subject_family()?;

        info!("\n📁 正在扫描待处理的文档...");
        let documents = load_all_documents(&self.config.input_folder).await?;

        if documents.is_empty() {
            warn!("⚠️ 没有找到待处理的文档，程序结束");
            return Ok(BatchStats::default());
        }

        log_documents_loaded(documents.len(), self.config.max_concurrent_documents);

        let stats = self.process_all_documents(documents, family_override).await?;
        print_final_stats(&stats, &self.config.output_folder);

        Ok(stats)
    }

    /// 并发处理所有文档
    async fn process_all_documents(
        &self,
        documents: Vec<SourceDocument>,
        family_override: Option<SubjectFamily>,
    ) -> Result<BatchStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_documents.max(1)));
        let output_root = PathBuf::from(&self.config.output_folder);
        let mut stats = BatchStats {
            total: documents.len(),
            ..Default::default()
        };

        let mut handles = Vec::new();
        for (idx, document) in documents.into_iter().enumerate() {
            let document_index = idx + 1;

            let Some(family) = family_override.or_else(|| family_from_path(&document.path)) else {
                warn!(
                    "[文档 {}] ⚠️ 无法判断科目，跳过: {}",
                    document_index, document.path
                );
                stats.skipped += 1;
                continue;
            };

            let permit = semaphore.clone().acquire_owned().await?;
            let options = self.config.extract_options();
            let output_path = output_root.join(&document.relative_path).with_extension("json");

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let processor = DocumentProcessor::for_family(family, options);
                let extraction = processor.process(&document.path, &document.stream);
                write_records(&output_path, &extraction).map(|_| extraction)
            });
            handles.push((document_index, handle));
        }

        let results = futures::future::join_all(
            handles.into_iter().map(|(index, handle)| async move { (index, handle.await) }),
        )
        .await;

        for (document_index, result) in results {
            match result {
                Ok(Ok(extraction)) => {
                    log_document_complete(document_index, &extraction.stats);
                    stats.success += 1;
                    stats.questions += extraction.stats.emitted;
                    stats.dropped += extraction.stats.dropped_total();
                }
                Ok(Err(e)) => {
                    error!("[文档 {}] ❌ 写入结果失败: {}", document_index, e);
                    stats.failed += 1;
                }
                Err(e) => {
                    error!("[文档 {}] 任务执行失败: {}", document_index, e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// 无法判断科目而跳过的文档
    pub skipped: usize,
    pub questions: usize,
    pub dropped: usize,
}

/// 从 `.../学期/年级/版本/科目/文件` 中取科目文件夹判断解析族
pub fn family_from_path(path: &str) -> Option<SubjectFamily> {
    let segments: Vec<&str> = path
        .split(|c: char| c == '/' || c == '\\')
        .filter(|s| !s.is_empty())
        .collect();
    let index = segments.len().checked_sub(SUBJECT_SEGMENT_FROM_END)?;
    Subject::from_folder(segments[index]).map(Subject::family)
}

/// 把一份文档的记录写成格式化的 JSON 数组
fn write_records(output_path: &Path, extraction: &DocumentExtraction) -> AppResult<()> {
    let display = output_path.display().to_string();

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AppError::file_write_failed(&display, e))?;
    }

    let json = serde_json::to_string_pretty(&extraction.records).map_err(|source| {
        FileError::SerializeFailed {
            path: display.clone(),
            source,
        }
    })?;

    std::fs::write(output_path, json).map_err(|e| AppError::file_write_failed(&display, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_path() {
        assert_eq!(
            family_from_path("input_md/111A/7/Hanlin/Math/L1.md"),
            Some(SubjectFamily::Mathematics)
        );
        assert_eq!(
            family_from_path(r"input\111B\8\Knsh\Civics_and_Society\Ch1.md"),
            Some(SubjectFamily::SocialStudies)
        );
        assert_eq!(family_from_path("Music/L1.md"), None);
        assert_eq!(family_from_path("L1.md"), None);
    }

    #[test]
    fn test_run_writes_json() {
        let root = std::env::temp_dir().join(format!("question_extract_batch_{}", std::process::id()));
        let input = root.join("input");
        let output = root.join("output");
        let subject_dir = input.join("111A").join("7").join("Hanlin").join("Math");
        std::fs::create_dir_all(&subject_dir).unwrap();
        std::fs::write(subject_dir.join("Ch1-2.md"), "一、填充題\n1. 1/2 + 1/2 = <u>1</u>\n").unwrap();
        std::fs::create_dir_all(input.join("misc")).unwrap();
        std::fs::write(input.join("misc").join("notes.md"), "1. 無科目").unwrap();

        let config = Config {
            input_folder: input.to_string_lossy().to_string(),
            output_folder: output.to_string_lossy().to_string(),
            ..Config::default()
        };
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let stats = runtime.block_on(App::new(config).run()).unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.questions, 1);

        let written = output.join("111A").join("7").join("Hanlin").join("Math").join("Ch1-2.json");
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
        std::fs::remove_dir_all(&root).unwrap();

        let record = &value[0];
        assert_eq!(record["question"], "\\frac{1}{2} + \\frac{1}{2} = ____");
        assert_eq!(record["answer"], "1");
        assert_eq!(record["chapter"], "Ch1-2");
        assert_eq!(record["type"], "填充題");
    }
}
