//! 文档处理上下文
//!
//! 封装"当前这份文档解析到哪了"：区块游标、题组、图片计数、丢弃统计。
//! 每份文档一个实例，多份文档并行时互不共享

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::models::question::DropReason;
use crate::services::image_resolver::ImageCounter;
use crate::workflow::section_tracker::{SectionCursor, SectionTransition};

/// 共用一段引文的一组题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: u32,
    pub intro: String,
    pub image_path: Option<String>,
    /// 已输出的子题数
    pub members: usize,
}

/// 题组编号从 1 开始，文档内递增
#[derive(Debug, Default, Clone)]
pub struct GroupTracker {
    opened: u32,
    current: Option<Group>,
}

impl GroupTracker {
    /// 开启新题组并返回编号
    pub fn open(&mut self, intro: impl Into<String>) -> u32 {
        self.opened += 1;
        self.current = Some(Group {
            id: self.opened,
            intro: intro.into(),
            image_path: None,
            members: 0,
        });
        self.opened
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Group> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Group> {
        self.current.as_mut()
    }

    /// 追加引文行，没有题组时忽略
    pub fn append_intro(&mut self, line: &str) {
        if let Some(group) = self.current.as_mut() {
            if !group.intro.is_empty() {
                group.intro.push('\n');
            }
            group.intro.push_str(line);
        }
    }

    pub fn note_member(&mut self, group_id: u32) {
        if let Some(group) = self.current.as_mut().filter(|g| g.id == group_id) {
            group.members += 1;
        }
    }
}

/// 单份文档的抽取统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractionStats {
    pub lines: usize,
    pub emitted: usize,
    dropped: BTreeMap<DropReason, usize>,
}

impl ExtractionStats {
    pub fn record_drop(&mut self, reason: DropReason) {
        *self.dropped.entry(reason).or_default() += 1;
    }

    pub fn dropped(&self, reason: DropReason) -> usize {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }

    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    pub fn drops(&self) -> impl Iterator<Item = (DropReason, usize)> + '_ {
        self.dropped.iter().map(|(reason, count)| (*reason, *count))
    }
}

/// 文档处理上下文
#[derive(Debug, Clone)]
pub struct DocumentCtx {
    /// 源文档路径（用于元数据和图片路径）
    pub source_path: String,
    pub section: SectionCursor,
    pub groups: GroupTracker,
    /// 尚未归属题组的引文行
    pub passage: Vec<String>,
    pub images: ImageCounter,
    pub stats: ExtractionStats,
}

impl DocumentCtx {
    /// 创建新的文档上下文
    pub fn new(source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            section: SectionCursor::default(),
            groups: GroupTracker::default(),
            passage: Vec::new(),
            images: ImageCounter::default(),
            stats: ExtractionStats::default(),
        }
    }

    /// 切换区块，同时结束当前题组并清空引文缓冲
    pub fn apply_section(&mut self, transition: SectionTransition) {
        self.section.apply(transition);
        self.groups.close();
        self.passage.clear();
    }

    pub fn section_title(&self) -> Option<String> {
        self.section.title()
    }
}

impl Display for DocumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文档 {}]", self.source_path)
    }
}
