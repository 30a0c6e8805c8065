//! 图片引用解析
//!
//! 检测题干中的图片关键词或内嵌图片标记，命中时为当前文档分配下一个图片序号

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;

static MARKDOWN_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("markdown image regex"));
static HTML_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("html image regex"));

/// 是否含有 `![alt](path)` 或 `<img ...>` 标记
pub fn has_image_markup(text: &str) -> bool {
    MARKDOWN_IMAGE_RE.is_match(text) || HTML_IMAGE_RE.is_match(text)
}

/// 删除图片标记
pub fn strip_image_markup(text: &str) -> String {
    let text = MARKDOWN_IMAGE_RE.replace_all(text, "");
    HTML_IMAGE_RE.replace_all(&text, "").trim().to_string()
}

/// 文档内的图片序号计数器，从 1 开始
#[derive(Debug, Default, Clone)]
pub struct ImageCounter {
    count: usize,
}

impl ImageCounter {
    pub fn next_slot(&mut self) -> usize {
        self.count += 1;
        self.count
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// 根据源文档路径和序号生成图片路径
///
/// 同样的输入必须得到同样的路径
pub trait ImagePathGenerator: Send + Sync {
    fn image_path(&self, source_path: &str, sequence: usize) -> String;
}

impl<F> ImagePathGenerator for F
where
    F: Fn(&str, usize) -> String + Send + Sync,
{
    fn image_path(&self, source_path: &str, sequence: usize) -> String {
        self(source_path, sequence)
    }
}

/// `img_001.png`
#[derive(Debug, Clone)]
pub struct FlatImageNaming {
    extension: String,
}

impl FlatImageNaming {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }
}

impl ImagePathGenerator for FlatImageNaming {
    fn image_path(&self, _source_path: &str, sequence: usize) -> String {
        format!("img_{:03}.{}", sequence, self.extension)
    }
}

/// `111A/7/Hanlin/Math/Ch1/img_001.png`，跨文档不冲突
#[derive(Debug, Clone)]
pub struct PerDocumentImageNaming {
    extension: String,
}

impl PerDocumentImageNaming {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }
}

impl ImagePathGenerator for PerDocumentImageNaming {
    fn image_path(&self, source_path: &str, sequence: usize) -> String {
        let normalized = source_path.replace('\\', "/");
        let trimmed = normalized.trim_start_matches("./").trim_start_matches('/');
        let stem = match trimmed.rsplit_once('.') {
            Some((stem, ext)) if !ext.contains('/') => stem,
            _ => trimmed,
        };
        format!("{}/img_{:03}.{}", stem, sequence, self.extension)
    }
}

/// 图片命名方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageNaming {
    #[default]
    Flat,
    PerDocument,
}

impl ImageNaming {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Some(ImageNaming::Flat),
            "per_document" | "per-document" => Some(ImageNaming::PerDocument),
            _ => None,
        }
    }

    pub fn generator(self, extension: &str) -> Arc<dyn ImagePathGenerator> {
        match self {
            ImageNaming::Flat => Arc::new(FlatImageNaming::new(extension)),
            ImageNaming::PerDocument => Arc::new(PerDocumentImageNaming::new(extension)),
        }
    }
}

/// 按学科关键词检测图片引用并分配路径
#[derive(Clone)]
pub struct ImageResolver {
    keywords: &'static [&'static str],
    generator: Arc<dyn ImagePathGenerator>,
}

impl ImageResolver {
    pub fn new(keywords: &'static [&'static str], generator: Arc<dyn ImagePathGenerator>) -> Self {
        Self {
            keywords,
            generator,
        }
    }

    /// 关键词匹配不区分大小写
    pub fn detect(&self, text: &str) -> bool {
        if has_image_markup(text) {
            return true;
        }
        let lowered = text.to_lowercase();
        self.keywords.iter().any(|keyword| lowered.contains(&keyword.to_lowercase()))
    }

    /// 命中时递增计数器并返回图片路径
    pub fn resolve(&self, text: &str, source_path: &str, counter: &mut ImageCounter) -> Option<String> {
        if !self.detect(text) {
            return None;
        }
        let sequence = counter.next_slot();
        Some(self.generator.image_path(source_path, sequence))
    }
}

impl fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResolver")
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}
