//! 英语试卷识别器
//!
//! 区块：字彙選擇、文法、閱讀測驗，第一个区块标题之前的内容全部跳过。
//! - `( B )1. stem` 单选题，答案取自括号
//! - `( )(1) stem` 阅读测验子题，只在閱讀測驗区块内有效，没有答案
//! - 閱讀測驗区块中的其他行是文章，累积到当前题组引言；
//!   题组已有子题输出后再出现文章行，视为下一篇文章

use std::sync::LazyLock;

use regex::Regex;

use super::common::{
    answer_letter, assemble_choice, keep_stem, plain_line, ChoiceGrammar, ChoiceOpening,
    OptionRule,
};
use super::{QuestionRecognizer, Recognition};
use crate::models::paragraph::ParagraphStream;
use crate::models::question::QuestionType;
use crate::models::subject::SubjectFamily;
use crate::workflow::document_ctx::DocumentCtx;
use crate::workflow::section_tracker::{SectionKind, SectionLabel, SectionTransition};

static QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[（(]\s*([Ａ-ＤA-D])\s*[）)]\s*(\d+)\s*[.．]\s*(.*)$").expect("english question regex")
});
static READING_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[（(]\s*[）)]\s*[（(](\d+)[）)]\s*(.*)$").expect("english reading item regex")
});
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*)?[一二三四五六七八九十]+、(.*)$").expect("english section regex")
});

const IMAGE_KEYWORDS: &[&str] = &["figure", "picture", "圖", "附圖", "如圖"];
const LOOKAHEAD_LINES: usize = 5;

#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishRecognizer;

impl EnglishRecognizer {
    fn is_question_start(line: &str) -> bool {
        QUESTION_RE.is_match(line) || READING_ITEM_RE.is_match(line)
    }

    fn section_kind(title: &str) -> Option<SectionKind> {
        if title.contains("字彙") {
            Some(SectionKind::Vocabulary)
        } else if title.contains("文法") {
            Some(SectionKind::Grammar)
        } else if title.contains("閱讀") {
            Some(SectionKind::Reading)
        } else {
            None
        }
    }

    fn is_boundary(line: &str) -> bool {
        Self::is_question_start(line) || SECTION_RE.is_match(line)
    }
}

impl QuestionRecognizer for EnglishRecognizer {
    fn family(&self) -> SubjectFamily {
        SubjectFamily::ForeignLanguage
    }

    fn image_keywords(&self) -> &'static [&'static str] {
        IMAGE_KEYWORDS
    }

    fn requires_section(&self) -> bool {
        true
    }

    fn section_transition(&self, line: &str, _current: Option<&SectionLabel>) -> Option<SectionTransition> {
        let caps = SECTION_RE.captures(line)?;
        let kind = Self::section_kind(caps.get(1)?.as_str())?;
        Some(SectionTransition::Enter(SectionLabel::new(kind, line)))
    }

    fn on_section_enter(&self, label: &SectionLabel, ctx: &mut DocumentCtx) {
        if label.kind == SectionKind::Reading {
            ctx.groups.open(String::new());
        }
    }

    fn recognize(&self, stream: &ParagraphStream, cursor: usize, ctx: &mut DocumentCtx) -> Recognition {
        let line = stream.trimmed(cursor);
        let in_reading = ctx.section.kind() == Some(SectionKind::Reading);
        let grammar = ChoiceGrammar {
            rule: OptionRule::EXACTLY_FOUR,
            lookahead: LOOKAHEAD_LINES,
            is_boundary: &Self::is_boundary,
            clean_stem: keep_stem,
            split_note: plain_line,
        };

        if let Some(caps) = QUESTION_RE.captures(line) {
            let opening = ChoiceOpening {
                cursor,
                body: caps.get(3).map_or("", |m| m.as_str()),
                answer: Some(answer_letter(&caps[1])),
                question_type: QuestionType::SingleChoice,
            };
            return assemble_choice(stream, opening, &grammar, ctx, in_reading);
        }

        if !in_reading {
            return Recognition::skipped(cursor + 1);
        }

        if let Some(caps) = READING_ITEM_RE.captures(line) {
            let opening = ChoiceOpening {
                cursor,
                body: caps.get(2).map_or("", |m| m.as_str()),
                answer: None,
                question_type: QuestionType::ReadingComprehension,
            };
            return assemble_choice(stream, opening, &grammar, ctx, true);
        }

        // 文章行
        let needs_new_group = ctx.groups.current().map_or(true, |group| group.members > 0);
        if needs_new_group {
            ctx.groups.open(String::new());
        }
        ctx.groups.append_intro(line);
        Recognition::skipped(cursor + 1)
    }
}
