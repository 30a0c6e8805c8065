//! 去重键
//!
//! 去掉空白、标点和开头的题号并转小写后做 SHA-256

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

static NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{P}]+").expect("dedup noise regex"));

/// 计算题干的去重键
pub fn dedup_key(question_text: &str) -> String {
    let stripped = NOISE_RE.replace_all(question_text, "");
    let content = stripped
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 单文档内的去重过滤器
#[derive(Debug, Default)]
pub struct DedupFilter {
    seen: HashSet<String>,
}

impl DedupFilter {
    /// 首次出现返回 true
    pub fn admit(&mut self, question_text: &str) -> bool {
        self.seen.insert(dedup_key(question_text))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
