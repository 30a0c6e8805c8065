//! 题目识别器
//!
//! 五个学科各自实现 `QuestionRecognizer`，共用同一个驱动循环
//! （见 `orchestrator::document_processor`）。驱动循环按以下优先级处理每一行：
//! 区块标题 → 题组引言 → 题目起始。

mod common;
pub mod chinese;
pub mod english;
pub mod math;
pub mod science;
pub mod social;

pub use chinese::ChineseRecognizer;
pub use common::OptionRule;
pub use english::EnglishRecognizer;
pub use math::MathRecognizer;
pub use science::ScienceRecognizer;
pub use social::SocialRecognizer;

use crate::models::paragraph::ParagraphStream;
use crate::models::question::{DropReason, QuestionCandidate};
use crate::models::subject::SubjectFamily;
use crate::workflow::document_ctx::DocumentCtx;
use crate::workflow::section_tracker::{SectionLabel, SectionTransition};

/// 一次识别的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Candidate(QuestionCandidate),
    Dropped(DropReason),
    /// 非题目行（引文、杂讯等）
    Skipped,
}

/// 识别结果与下一个未消费的行号
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub outcome: Outcome,
    pub next: usize,
}

impl Recognition {
    pub fn candidate(candidate: QuestionCandidate, next: usize) -> Self {
        Self {
            outcome: Outcome::Candidate(candidate),
            next,
        }
    }

    pub fn dropped(reason: DropReason, next: usize) -> Self {
        Self {
            outcome: Outcome::Dropped(reason),
            next,
        }
    }

    pub fn skipped(next: usize) -> Self {
        Self {
            outcome: Outcome::Skipped,
            next,
        }
    }
}

/// 学科题目识别能力
pub trait QuestionRecognizer: Send + Sync {
    fn family(&self) -> SubjectFamily;

    /// 图片引用关键词
    fn image_keywords(&self) -> &'static [&'static str];

    /// 为 true 时，遇到第一个区块标题之前的行全部跳过
    fn requires_section(&self) -> bool {
        false
    }

    /// 输出时是否做数学符号转换
    fn formats_math(&self) -> bool {
        false
    }

    fn section_transition(&self, line: &str, current: Option<&SectionLabel>) -> Option<SectionTransition>;

    /// 进入新区块后的额外处理
    fn on_section_enter(&self, _label: &SectionLabel, _ctx: &mut DocumentCtx) {}

    /// 题组引言，返回引言正文
    fn group_intro(&self, _line: &str, _ctx: &DocumentCtx) -> Option<String> {
        None
    }

    /// 从 `cursor` 行开始识别一道题
    fn recognize(&self, stream: &ParagraphStream, cursor: usize, ctx: &mut DocumentCtx) -> Recognition;
}

/// 按解析族选择识别器
pub fn recognizer_for(family: SubjectFamily) -> Box<dyn QuestionRecognizer> {
    match family {
        SubjectFamily::LanguageArts => Box::new(ChineseRecognizer),
        SubjectFamily::ForeignLanguage => Box::new(EnglishRecognizer),
        SubjectFamily::Mathematics => Box::new(MathRecognizer),
        SubjectFamily::Science => Box::new(ScienceRecognizer),
        SubjectFamily::SocialStudies => Box::new(SocialRecognizer),
    }
}
