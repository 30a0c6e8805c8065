//! 段落流
//!
//! 外部抽取组件产出的有序文本行，解析期间只读、只向前推进

/// 文档的段落流，行号即为 `Vec` 下标
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphStream {
    lines: Vec<String>,
}

impl ParagraphStream {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// 从整段文本按行切分
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// 去掉首尾空白后的行内容，越界时返回空串
    pub fn trimmed(&self, index: usize) -> &str {
        self.line(index).map(str::trim).unwrap_or("")
    }
}

impl<S: Into<String>> FromIterator<S> for ParagraphStream {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_strips_crlf() {
        let stream = ParagraphStream::from_text("第一行\r\n  第二行  \n");
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.line(0), Some("第一行"));
        assert_eq!(stream.trimmed(1), "第二行");
        // 越界读取返回空串
        assert_eq!(stream.trimmed(9), "");
    }
}
