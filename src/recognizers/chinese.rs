//! 国文试卷识别器
//!
//! 不要求区块标题。题目以 `(B)1.` 或 `1.` 开头，必须恰好四个选项。
//! 题目之间的非题目行是引文：引文够长时开启题组，后续题目都归入该题组，
//! 直到出现下一段引文

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::common::{
    answer_letter, assemble_choice, ChoiceGrammar, ChoiceOpening, NotedLine, OptionRule,
};
use super::{QuestionRecognizer, Recognition};
use crate::models::paragraph::ParagraphStream;
use crate::models::question::QuestionType;
use crate::models::subject::SubjectFamily;
use crate::workflow::document_ctx::DocumentCtx;
use crate::workflow::section_tracker::{SectionKind, SectionLabel, SectionTransition};

static ANSWERED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[（(]\s*([Ａ-ＤA-D])\s*[）)]\s*(\d+)\s*[.、．]\s*(.*)$").expect("chinese answered regex")
});
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*[.、．](\s*)(.*)$").expect("chinese numbered regex"));
static ANSWER_NOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"答：?[【(（]\s*([^】)）]+?)\s*[】)）]").expect("chinese answer note regex")
});
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*)?[一二三四五六七八九十]+、(.*)$").expect("chinese section regex")
});

const IMAGE_KEYWORDS: &[&str] = &["圖", "附圖", "如圖"];
const LOOKAHEAD_LINES: usize = 5;
/// 引文达到此长度（字符数）才开启题组
const LONG_PASSAGE_CHARS: usize = 60;

#[derive(Debug, Default, Clone, Copy)]
pub struct ChineseRecognizer;

impl ChineseRecognizer {
    /// 返回 (答案, 题号之后的内容)
    fn opening(line: &str) -> Option<(Option<String>, &str)> {
        if let Some(caps) = ANSWERED_RE.captures(line) {
            let body = caps.get(3).map_or("", |m| m.as_str());
            return Some((Some(answer_letter(&caps[1])), body));
        }
        let caps = NUMBERED_RE.captures(line)?;
        let gap = caps.get(2).map_or("", |m| m.as_str());
        let body = caps.get(3).map_or("", |m| m.as_str());
        // `1.5公分` 之类的小数不是题号
        if gap.is_empty() && body.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        Some((None, body))
    }

    fn is_boundary(line: &str) -> bool {
        Self::opening(line).is_some() || SECTION_RE.is_match(line)
    }

    /// 题干中 `答：(B)` 形式的答案
    fn noted_answer(body: &str) -> Option<String> {
        let caps = ANSWER_NOTE_RE.captures(body)?;
        let letter = answer_letter(caps.get(1)?.as_str());
        matches!(letter.as_str(), "A" | "B" | "C" | "D").then_some(letter)
    }

    /// 选项行末尾的 `答：(B)` 拆出来，避免被当成选项标记
    fn split_note(line: &str) -> NotedLine<'_> {
        NotedLine {
            answer: Self::noted_answer(line),
            text: ANSWER_NOTE_RE.replace_all(line, ""),
        }
    }

    fn clean_stem(stem: &str) -> String {
        ANSWER_NOTE_RE.replace_all(stem, "").trim().to_string()
    }

    /// 题目出现时结算之前累积的引文
    fn flush_passage(ctx: &mut DocumentCtx) {
        if ctx.passage.is_empty() {
            return;
        }
        let passage = ctx.passage.join("\n");
        ctx.passage.clear();
        if passage.chars().count() >= LONG_PASSAGE_CHARS {
            ctx.groups.open(passage);
        } else {
            ctx.groups.close();
        }
    }
}

impl QuestionRecognizer for ChineseRecognizer {
    fn family(&self) -> SubjectFamily {
        SubjectFamily::LanguageArts
    }

    fn image_keywords(&self) -> &'static [&'static str] {
        IMAGE_KEYWORDS
    }

    fn section_transition(&self, line: &str, _current: Option<&SectionLabel>) -> Option<SectionTransition> {
        let caps = SECTION_RE.captures(line)?;
        let title = caps.get(1)?.as_str();
        let kind = if title.contains("選擇") {
            SectionKind::SingleChoice
        } else {
            SectionKind::Other
        };
        Some(SectionTransition::Enter(SectionLabel::new(kind, line)))
    }

    fn recognize(&self, stream: &ParagraphStream, cursor: usize, ctx: &mut DocumentCtx) -> Recognition {
        let line = stream.trimmed(cursor);
        let Some((answer, body)) = Self::opening(line) else {
            ctx.passage.push(line.to_string());
            return Recognition::skipped(cursor + 1);
        };

        Self::flush_passage(ctx);

        let answer = answer.or_else(|| Self::noted_answer(body));
        let body: Cow<'_, str> = ANSWER_NOTE_RE.replace_all(body, "");
        let opening = ChoiceOpening {
            cursor,
            body: &*body,
            answer,
            question_type: QuestionType::SingleChoice,
        };
        let grammar = ChoiceGrammar {
            rule: OptionRule::EXACTLY_FOUR,
            lookahead: LOOKAHEAD_LINES,
            is_boundary: &Self::is_boundary,
            clean_stem: Self::clean_stem,
            split_note: Self::split_note,
        };
        assemble_choice(stream, opening, &grammar, ctx, true)
    }
}
