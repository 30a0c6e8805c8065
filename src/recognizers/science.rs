//! 自然科试卷识别器
//!
//! 区块标题只作标签，不限制题型。`◎` 开头的行是题组引言，
//! 区块切换时题组结束。选择题答案可为 A–F，选项在题目行或其后两行内

use std::sync::LazyLock;

use regex::Regex;

use super::common::{
    answer_letter, answered_marker, assemble_choice, blank_out_underlines, plain_line,
    stem_before_options, underline_answer, validate, ChoiceGrammar, ChoiceOpening, OptionRule,
};
use super::{QuestionRecognizer, Recognition};
use crate::models::paragraph::ParagraphStream;
use crate::models::question::{QuestionCandidate, QuestionType};
use crate::models::subject::SubjectFamily;
use crate::workflow::document_ctx::DocumentCtx;
use crate::workflow::section_tracker::{SectionKind, SectionLabel, SectionTransition};

static CHOICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[（(]\s*([Ａ-ＦA-F])\s*[）)]\s*(\d+)\s*[．.]").expect("science choice regex")
});
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*[．.](\s*)(.*)$").expect("science numbered regex"));
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*)?(?:[AB]部分[/／]?(?:實力養成題|概念延伸題)|[一二三四五六七八九十]+、.*題)")
        .expect("science section regex")
});

const GROUP_MARK: char = '◎';
const IMAGE_KEYWORDS: &[&str] = &["圖", "附圖", "如圖", "下圖", "上圖", "圖表", "附表"];
const OPTION_LOOKAHEAD: usize = 2;

#[derive(Debug, Default, Clone, Copy)]
pub struct ScienceRecognizer;

fn numbered_body(line: &str) -> Option<&str> {
    let caps = NUMBERED_RE.captures(line)?;
    let gap = caps.get(2).map_or("", |m| m.as_str());
    let body = caps.get(3).map_or("", |m| m.as_str());
    if gap.is_empty() && body.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(body)
}

fn is_boundary(line: &str) -> bool {
    answered_marker(&CHOICE_RE, line).is_some()
        || numbered_body(line).is_some()
        || line.starts_with(GROUP_MARK)
        || SECTION_RE.is_match(line)
}

fn clean_science_stem(stem: &str) -> String {
    stem.trim().to_string()
}

impl ScienceRecognizer {
    fn choice(&self, stream: &ParagraphStream, cursor: usize, ctx: &DocumentCtx) -> Option<Recognition> {
        let line = stream.trimmed(cursor);
        let caps = answered_marker(&CHOICE_RE, line)?;
        let marker = caps.get(0)?;
        let body = format!("{}{}", &line[..marker.start()], &line[marker.end()..]);

        let opening = ChoiceOpening {
            cursor,
            body: &body,
            answer: Some(answer_letter(&caps[1])),
            question_type: QuestionType::SingleChoice,
        };
        let grammar = ChoiceGrammar {
            rule: OptionRule::TWO_TO_FOUR,
            lookahead: OPTION_LOOKAHEAD,
            is_boundary: &is_boundary,
            clean_stem: clean_science_stem,
            split_note: plain_line,
        };
        Some(assemble_choice(stream, opening, &grammar, ctx, true))
    }

    /// 单行填充题
    fn fill_blank(&self, stream: &ParagraphStream, cursor: usize, ctx: &DocumentCtx) -> Option<Recognition> {
        let line = stream.trimmed(cursor);
        let body = numbered_body(line)?;

        let answer = underline_answer(body);
        let stem = blank_out_underlines(stem_before_options(body));
        let mut candidate = QuestionCandidate::new(QuestionType::FillBlank, stem.trim(), cursor)
            .with_answer(answer)
            .with_section(ctx.section_title());
        if let Some(group) = ctx.groups.current() {
            candidate = candidate.with_group(group.id, &group.intro);
        }

        Some(match validate(&candidate, OptionRule::TWO_TO_FOUR) {
            Ok(()) => Recognition::candidate(candidate, cursor + 1),
            Err(reason) => Recognition::dropped(reason, cursor + 1),
        })
    }
}

impl QuestionRecognizer for ScienceRecognizer {
    fn family(&self) -> SubjectFamily {
        SubjectFamily::Science
    }

    fn image_keywords(&self) -> &'static [&'static str] {
        IMAGE_KEYWORDS
    }

    fn formats_math(&self) -> bool {
        true
    }

    fn section_transition(&self, line: &str, _current: Option<&SectionLabel>) -> Option<SectionTransition> {
        if !SECTION_RE.is_match(line) {
            return None;
        }
        let kind = if line.contains("選擇") {
            SectionKind::SingleChoice
        } else if line.contains("填充") {
            SectionKind::FillBlank
        } else if line.contains("題組") {
            SectionKind::GroupSet
        } else {
            SectionKind::Other
        };
        Some(SectionTransition::Enter(SectionLabel::new(kind, line)))
    }

    fn group_intro(&self, line: &str, _ctx: &DocumentCtx) -> Option<String> {
        line.strip_prefix(GROUP_MARK).map(|rest| rest.trim().to_string())
    }

    fn recognize(&self, stream: &ParagraphStream, cursor: usize, ctx: &mut DocumentCtx) -> Recognition {
        let ctx: &DocumentCtx = ctx;
        self.choice(stream, cursor, ctx)
            .or_else(|| self.fill_blank(stream, cursor, ctx))
            .unwrap_or_else(|| Recognition::skipped(cursor + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_option_line_is_not_boundary() {
        assert!(!is_boundary("(A) 0.5 公克 (B) 1.5 公克"));
        assert!(is_boundary("(C)2. 下列何者為化合物？"));
    }

    #[test]
    fn test_section_kinds() {
        let recognizer = ScienceRecognizer;
        let part = recognizer.section_transition("**A部分/實力養成題**", None);
        assert!(matches!(
            part,
            Some(SectionTransition::Enter(SectionLabel { kind: SectionKind::Other, .. }))
        ));
        let group = recognizer.section_transition("三、題組題", None);
        assert!(matches!(
            group,
            Some(SectionTransition::Enter(SectionLabel { kind: SectionKind::GroupSet, .. }))
        ));
        assert!(recognizer.section_transition("(B)1. 題目", None).is_none());
    }

    #[test]
    fn test_group_intro() {
        let ctx = DocumentCtx::new("x.md");
        let recognizer = ScienceRecognizer;
        assert_eq!(
            recognizer.group_intro("◎ 右圖為某生物的細胞", &ctx).as_deref(),
            Some("右圖為某生物的細胞")
        );
        assert!(recognizer.group_intro("1. 細胞", &ctx).is_none());
    }

    #[test]
    fn test_boundary_lines() {
        assert!(is_boundary("（Ｅ）5．下列何者"));
        assert!(is_boundary("6. 填充"));
        assert!(is_boundary("◎ 題組"));
        assert!(!is_boundary("(A)甲 (B)乙"));
    }
}
