//! 社会科试卷识别器
//!
//! 只处理选择题区块和题组区块，其他编号区块标题会结束当前区块。
//! 提到图或表的题目不收录，选项必须恰好四个

use std::sync::LazyLock;

use regex::Regex;

use super::common::{
    answer_letter, assemble_choice, first_option_offset, keep_stem, plain_line,
    stem_before_options, ChoiceGrammar, ChoiceOpening, OptionRule,
};
use super::{QuestionRecognizer, Recognition};
use crate::models::paragraph::ParagraphStream;
use crate::models::question::{DropReason, QuestionType};
use crate::models::subject::SubjectFamily;
use crate::workflow::document_ctx::DocumentCtx;
use crate::workflow::section_tracker::{SectionKind, SectionLabel, SectionTransition};

static QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[（(]\s*([Ａ-ＤA-D])\s*[）)]\s*(\d+)(\s*[.．]|\s)(\s*)(.*)$")
        .expect("social question regex")
});
static GROUP_QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[（(]\s*([Ａ-ＤA-D])\s*[）)]\s*[（(]([０-９\d]+)[）)]\s*(.*)$")
        .expect("social group question regex")
});
static GROUP_INTRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[⊙○●]\s*(.*?)\s*請問[:：]?\s*$").expect("social group intro regex")
});
static SECTION_CHOICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*)?[一二三四五六七八九十]+、.*[單选選擇]題").expect("social choice section regex")
});
static SECTION_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*)?[一二三四五六七八九十]+、.*題組").expect("social group section regex")
});
static SECTION_ANY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*)?[一二三四五六七八九十]+、").expect("social section regex")
});

const IMAGE_KEYWORDS: &[&str] = &["圖", "附圖", "如圖"];
/// 出现这些字的题目不收录
const SKIP_KEYWORDS: &[&str] = &["圖", "表", "附圖", "附表"];
const LOOKAHEAD_LINES: usize = 5;

#[derive(Debug, Default, Clone, Copy)]
pub struct SocialRecognizer;

/// 返回 (答案, 正文)
///
/// 题号后只有空白时，正文不能以数字或选项标记开头，
/// 否则是 `(A) 4 (B) 5` 这样的数字选项行；`(A)1.5` 是小数
fn question_opening(line: &str) -> Option<(&str, &str)> {
    let caps = QUESTION_RE.captures(line)?;
    let answer = caps.get(1)?.as_str();
    let separator = caps.get(3).map_or("", |m| m.as_str());
    let gap = caps.get(4).map_or("", |m| m.as_str());
    let body = caps.get(5).map_or("", |m| m.as_str());

    let starts_with_digit = body.starts_with(|c: char| c.is_ascii_digit());
    if separator.ends_with(['.', '．']) {
        if gap.is_empty() && starts_with_digit {
            return None;
        }
    } else if body.is_empty() || starts_with_digit || first_option_offset(body) == Some(0) {
        return None;
    }
    Some((answer, body))
}

fn is_boundary(line: &str) -> bool {
    question_opening(line).is_some()
        || GROUP_QUESTION_RE.is_match(line)
        || GROUP_INTRO_RE.is_match(line)
        || SECTION_ANY_RE.is_match(line)
}

impl SocialRecognizer {
    fn choice(
        &self,
        stream: &ParagraphStream,
        cursor: usize,
        ctx: &DocumentCtx,
        answer: &str,
        body: &str,
    ) -> Recognition {
        let stem = stem_before_options(body);
        if SKIP_KEYWORDS.iter().any(|keyword| stem.contains(keyword)) {
            return Recognition::dropped(DropReason::ImageReference, cursor + 1);
        }

        let opening = ChoiceOpening {
            cursor,
            body,
            answer: Some(answer_letter(answer)),
            question_type: QuestionType::SingleChoice,
        };
        let grammar = ChoiceGrammar {
            rule: OptionRule::EXACTLY_FOUR,
            lookahead: LOOKAHEAD_LINES,
            is_boundary: &is_boundary,
            clean_stem: keep_stem,
            split_note: plain_line,
        };
        let in_group = ctx.section.kind() == Some(SectionKind::GroupSet);
        assemble_choice(stream, opening, &grammar, ctx, in_group)
    }
}

impl QuestionRecognizer for SocialRecognizer {
    fn family(&self) -> SubjectFamily {
        SubjectFamily::SocialStudies
    }

    fn image_keywords(&self) -> &'static [&'static str] {
        IMAGE_KEYWORDS
    }

    fn requires_section(&self) -> bool {
        true
    }

    fn section_transition(&self, line: &str, current: Option<&SectionLabel>) -> Option<SectionTransition> {
        if SECTION_CHOICE_RE.is_match(line) {
            return Some(SectionTransition::Enter(SectionLabel::new(SectionKind::SingleChoice, line)));
        }
        if SECTION_GROUP_RE.is_match(line) {
            return Some(SectionTransition::Enter(SectionLabel::new(SectionKind::GroupSet, line)));
        }
        if current.is_some() && SECTION_ANY_RE.is_match(line) {
            return Some(SectionTransition::Leave);
        }
        None
    }

    fn group_intro(&self, line: &str, ctx: &DocumentCtx) -> Option<String> {
        if ctx.section.kind() != Some(SectionKind::GroupSet) {
            return None;
        }
        let caps = GROUP_INTRO_RE.captures(line)?;
        Some(caps.get(1).map_or("", |m| m.as_str()).to_string())
    }

    fn recognize(&self, stream: &ParagraphStream, cursor: usize, ctx: &mut DocumentCtx) -> Recognition {
        let line = stream.trimmed(cursor);

        if let Some((answer, body)) = question_opening(line) {
            return self.choice(stream, cursor, ctx, answer, body);
        }
        if ctx.section.kind() == Some(SectionKind::GroupSet) {
            if let Some(caps) = GROUP_QUESTION_RE.captures(line) {
                let body = caps.get(3).map_or("", |m| m.as_str());
                return self.choice(stream, cursor, ctx, &caps[1], body);
            }
        }
        Recognition::skipped(cursor + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizers::Outcome;

    #[test]
    fn test_section_transitions() {
        let recognizer = SocialRecognizer;
        assert!(matches!(
            recognizer.section_transition("**一、單一選擇題**", None),
            Some(SectionTransition::Enter(SectionLabel { kind: SectionKind::SingleChoice, .. }))
        ));
        assert!(matches!(
            recognizer.section_transition("**二、題組題**", None),
            Some(SectionTransition::Enter(SectionLabel { kind: SectionKind::GroupSet, .. }))
        ));

        let active = SectionLabel::new(SectionKind::SingleChoice, "一、選擇題");
        assert_eq!(
            recognizer.section_transition("三、問答題", Some(&active)),
            Some(SectionTransition::Leave)
        );
        // 没有当前区块时其他标题不产生转移
        assert_eq!(recognizer.section_transition("三、問答題", None), None);
    }

    #[test]
    fn test_group_intro_only_in_group_section() {
        let recognizer = SocialRecognizer;
        let mut ctx = DocumentCtx::new("x.md");
        let line = "⊙ 閱讀下列資料後，請問：";
        assert_eq!(recognizer.group_intro(line, &ctx), None);

        ctx.apply_section(SectionTransition::Enter(SectionLabel::new(SectionKind::GroupSet, "二、題組題")));
        assert_eq!(recognizer.group_intro(line, &ctx).as_deref(), Some("閱讀下列資料後，"));
    }

    #[test]
    fn test_full_width_group_number() {
        assert!(GROUP_QUESTION_RE.is_match("（Ｃ）（１）根據資料判斷"));
        assert!(question_opening("(A)清朝 (B)明朝").is_none());
        assert!(question_opening("(A)1616年 (B)1644年").is_none());
        assert_eq!(
            question_opening("(B)12 清朝建立於哪一年？"),
            Some(("B", "清朝建立於哪一年？"))
        );
    }

    #[test]
    fn test_numeric_option_lines() {
        assert!(question_opening("(A) 4 (B) 5 (C) 6 (D) 7").is_none());
        assert!(question_opening("(A)1.5 (B)2.5").is_none());
        assert_eq!(question_opening("(C)3. 下列何者正確？"), Some(("C", "下列何者正確？")));

        let stream = ParagraphStream::from_iter([
            "(C)3. 臺灣共有幾個直轄市？",
            "(A) 4 (B) 5 (C) 6 (D) 7",
        ]);
        let mut ctx = DocumentCtx::new("social.md");
        ctx.apply_section(SectionTransition::Enter(SectionLabel::new(
            SectionKind::SingleChoice,
            "一、選擇題",
        )));
        let recognition = SocialRecognizer.recognize(&stream, 0, &mut ctx);
        assert_eq!(recognition.next, 2);

        let Outcome::Candidate(candidate) = recognition.outcome else {
            panic!("expected a candidate, got {:?}", recognition.outcome);
        };
        assert_eq!(candidate.answer.as_deref(), Some("C"));
        let values: Vec<_> = candidate.options.values().map(String::as_str).collect();
        assert_eq!(values, vec!["4", "5", "6", "7"]);
    }
}
