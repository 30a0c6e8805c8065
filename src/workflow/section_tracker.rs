//! 区块游标
//!
//! 文档开始时为空，遇到区块标题时原地更新，从不回退

use std::fmt;

/// 区块类别，决定识别器尝试哪种题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Vocabulary,
    Grammar,
    Reading,
    SingleChoice,
    FillBlank,
    Essay,
    /// 题组区块
    GroupSet,
    /// 只用作标签，不影响题型
    Other,
}

/// 当前区块：类别 + 标题原文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLabel {
    pub kind: SectionKind,
    pub title: String,
}

impl SectionLabel {
    /// 标题去掉 markdown 加粗符号
    pub fn new(kind: SectionKind, header_line: &str) -> Self {
        Self {
            kind,
            title: header_line.replace("**", "").trim().to_string(),
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// 区块标题行引起的状态转移
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionTransition {
    Enter(SectionLabel),
    Leave,
}

#[derive(Debug, Default, Clone)]
pub struct SectionCursor {
    current: Option<SectionLabel>,
}

impl SectionCursor {
    pub fn current(&self) -> Option<&SectionLabel> {
        self.current.as_ref()
    }

    pub fn kind(&self) -> Option<SectionKind> {
        self.current.as_ref().map(|label| label.kind)
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn title(&self) -> Option<String> {
        self.current.as_ref().map(|label| label.title.clone())
    }

    pub fn apply(&mut self, transition: SectionTransition) {
        self.current = match transition {
            SectionTransition::Enter(label) => Some(label),
            SectionTransition::Leave => None,
        };
    }
}
