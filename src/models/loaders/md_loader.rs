use crate::error::FileError;
use crate::models::paragraph::ParagraphStream;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 支持的文档扩展名
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "txt"];

/// 已加载的文档
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// 文档完整路径（统一为 `/` 分隔）
    pub path: String,
    /// 相对输入目录的路径，用于输出文件布局
    pub relative_path: PathBuf,
    pub stream: ParagraphStream,
}

/// 读取单个文档为段落流
pub async fn load_paragraph_stream(file_path: &Path) -> Result<ParagraphStream> {
    let content = fs::read_to_string(file_path)
        .await
        .with_context(|| format!("无法读取文档: {}", file_path.display()))?;

    Ok(ParagraphStream::from_text(&content))
}

/// 递归加载文件夹中所有文档，按路径排序
pub async fn load_all_documents(folder_path: &str) -> Result<Vec<SourceDocument>> {
    let root = PathBuf::from(folder_path);

    if !root.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut files = Vec::new();
    let mut pending = vec![root.clone()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("无法读取文件夹: {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
            } else if is_document(&path) {
                files.push(path);
            }
        }
    }
    files.sort();

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        match load_paragraph_stream(&path).await {
            Ok(stream) => {
                tracing::debug!("已加载 {} ({} 行)", path.display(), stream.len());
                let relative_path = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();
                documents.push(SourceDocument {
                    path: path.to_string_lossy().replace('\\', "/"),
                    relative_path,
                    stream,
                });
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(documents)
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nested_documents() {
        let root = std::env::temp_dir().join(format!("question_extract_loader_{}", std::process::id()));
        let nested = root.join("111A").join("7");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("L1.md"), "第一行\n\n第二行").unwrap();
        std::fs::write(root.join("notes.pdf"), "ignored").unwrap();

        let documents = tokio_test::block_on(load_all_documents(root.to_str().unwrap())).unwrap();
        std::fs::remove_dir_all(&root).unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].relative_path, Path::new("111A").join("7").join("L1.md"));
        assert_eq!(documents[0].stream.len(), 3);
        assert!(documents[0].path.ends_with("111A/7/L1.md"));
    }

    #[test]
    fn test_missing_folder() {
        let err = tokio_test::block_on(load_all_documents("/nonexistent/question_extract"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FileError>(),
            Some(FileError::DirectoryNotFound { path }) if path == "/nonexistent/question_extract"
        ));
    }
}
