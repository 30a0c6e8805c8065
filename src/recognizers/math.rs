//! 数学试卷识别器
//!
//! 区块：單選題 / 填充題 / 非選題（計算題、應用題按非選題处理）。
//! 没有区块标题时自动判别题型，第一道选择题会隐式进入單選題区块。
//! 表格、HTML 与加粗行直接跳过

use std::sync::LazyLock;

use regex::Regex;

use super::common::{
    answer_letter, answered_marker, assemble_choice, blank_out_underlines, plain_line,
    underline_answer, validate, ChoiceGrammar, ChoiceOpening, OptionRule,
};
use super::{QuestionRecognizer, Recognition};
use crate::models::paragraph::ParagraphStream;
use crate::models::question::{QuestionCandidate, QuestionType};
use crate::models::subject::SubjectFamily;
use crate::workflow::document_ctx::DocumentCtx;
use crate::workflow::section_tracker::{SectionKind, SectionLabel, SectionTransition};

static CHOICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[（(]\s*([Ａ-ＤA-D])\s*[）)]\s*(\d+)\s*\\?[.．]").expect("math choice regex")
});
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*\\?[.．](\s*)(.*)$").expect("math numbered regex"));
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[一二三四五六七八九十]+、\s*(單選題|選擇題|填充題|非選題|計算題|應用題)")
        .expect("math header regex")
});
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]*)\*\*").expect("math bold regex"));
static ANSWER_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^答案?\s*[：:]\s*").expect("math answer label regex"));
static CHOICE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[（(]\s*[Ａ-ＤA-D]\s*[）)]").expect("math choice marker regex"));
static OPTION_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[（(][Ａ-ＤA-D][）)].*$").expect("math option tail regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("math whitespace regex"));

const IMAGE_KEYWORDS: &[&str] = &["圖", "附圖", "如圖", "如附圖", "見圖", "media/image"];
const CHOICE_LOOKAHEAD: usize = 6;
const TEXT_LOOKAHEAD: usize = 8;

#[derive(Debug, Default, Clone, Copy)]
pub struct MathRecognizer;

/// 区块标题 → (类别, 去掉加粗后的标题)
fn header(line: &str) -> Option<(SectionKind, String)> {
    let plain = BOLD_RE.replace_all(line, "${1}");
    let plain = plain.trim();
    let caps = HEADER_RE.captures(plain)?;
    let kind = match caps.get(1)?.as_str() {
        "單選題" | "選擇題" => SectionKind::SingleChoice,
        "填充題" => SectionKind::FillBlank,
        _ => SectionKind::Essay,
    };
    Some((kind, plain.to_string()))
}

/// 数学题干把连续空白压成一个空格
fn clean_math_stem(stem: &str) -> String {
    WHITESPACE_RE.replace_all(stem.trim(), " ").into_owned()
}

fn numbered_body(line: &str) -> Option<&str> {
    let caps = NUMBERED_RE.captures(line)?;
    let gap = caps.get(2).map_or("", |m| m.as_str());
    let body = caps.get(3).map_or("", |m| m.as_str());
    // `3.14` 是小数，不是题号
    if gap.is_empty() && body.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(body)
}

fn is_choice(line: &str) -> bool {
    answered_marker(&CHOICE_RE, line).is_some()
}

fn is_boundary(line: &str) -> bool {
    is_choice(line) || numbered_body(line).is_some() || header(line).is_some()
}

/// 题号题的正文与答案部分
struct TextBlock {
    question: Vec<String>,
    answer: Vec<String>,
    has_answer_label: bool,
    next: usize,
}

impl MathRecognizer {
    fn choice(&self, stream: &ParagraphStream, cursor: usize, ctx: &DocumentCtx) -> Recognition {
        let line = stream.trimmed(cursor);
        let Some(caps) = answered_marker(&CHOICE_RE, line) else {
            return Recognition::skipped(cursor + 1);
        };
        let Some(marker) = caps.get(0) else {
            return Recognition::skipped(cursor + 1);
        };
        // 标记可能不在行首，标记前的文字保留在题干中
        let body = format!("{}{}", &line[..marker.start()], &line[marker.end()..]);

        let opening = ChoiceOpening {
            cursor,
            body: &body,
            answer: Some(answer_letter(&caps[1])),
            question_type: QuestionType::SingleChoice,
        };
        let grammar = ChoiceGrammar {
            rule: OptionRule::TWO_TO_FOUR,
            lookahead: CHOICE_LOOKAHEAD,
            is_boundary: &is_boundary,
            clean_stem: clean_math_stem,
            split_note: plain_line,
        };
        assemble_choice(stream, opening, &grammar, ctx, false)
    }

    fn collect_block(stream: &ParagraphStream, cursor: usize, body: &str) -> TextBlock {
        let mut block = TextBlock {
            question: vec![body.to_string()],
            answer: Vec::new(),
            has_answer_label: false,
            next: cursor + 1,
        };
        let mut j = cursor + 1;
        let mut examined = 0;

        while j < stream.len() && examined < TEXT_LOOKAHEAD {
            let line = stream.trimmed(j);
            if line.is_empty() {
                j += 1;
                continue;
            }
            if let Some(label) = ANSWER_LABEL_RE.find(line) {
                block.has_answer_label = true;
                block.answer.push(line[label.end()..].to_string());
            } else if is_boundary(line) {
                break;
            } else if block.has_answer_label {
                block.answer.push(line.to_string());
            } else {
                block.question.push(line.to_string());
            }
            examined += 1;
            j += 1;
        }
        block.next = j;
        block
    }

    /// 题号开头的填充题或非选题，`forced` 为空时自动判别
    fn numbered(
        &self,
        stream: &ParagraphStream,
        cursor: usize,
        ctx: &DocumentCtx,
        forced: Option<QuestionType>,
    ) -> Recognition {
        let line = stream.trimmed(cursor);
        let Some(body) = numbered_body(line) else {
            return Recognition::skipped(cursor + 1);
        };
        // 带选项标记的题号行不是填充/非选题
        if CHOICE_MARKER_RE.is_match(line) {
            return Recognition::skipped(cursor + 1);
        }

        let block = Self::collect_block(stream, cursor, body);
        let full = block.question.join(" ");
        let question_type = forced.unwrap_or(if block.has_answer_label {
            QuestionType::Essay
        } else {
            QuestionType::FillBlank
        });

        let (stem, answer) = match question_type {
            QuestionType::FillBlank => (blank_out_underlines(&full), underline_answer(&full)),
            _ => {
                let answer = block.answer.join(" ");
                (full, Some(answer))
            }
        };
        let stem = clean_math_stem(&OPTION_TAIL_RE.replace(&stem, ""));

        let candidate = QuestionCandidate::new(question_type, stem, cursor)
            .with_answer(answer)
            .with_section(ctx.section_title());
        match validate(&candidate, OptionRule::TWO_TO_FOUR) {
            Ok(()) => Recognition::candidate(candidate, block.next),
            Err(reason) => Recognition::dropped(reason, block.next),
        }
    }
}

impl QuestionRecognizer for MathRecognizer {
    fn family(&self) -> SubjectFamily {
        SubjectFamily::Mathematics
    }

    fn image_keywords(&self) -> &'static [&'static str] {
        IMAGE_KEYWORDS
    }

    fn formats_math(&self) -> bool {
        true
    }

    fn section_transition(&self, line: &str, _current: Option<&SectionLabel>) -> Option<SectionTransition> {
        let (kind, title) = header(line)?;
        Some(SectionTransition::Enter(SectionLabel::new(kind, &title)))
    }

    fn recognize(&self, stream: &ParagraphStream, cursor: usize, ctx: &mut DocumentCtx) -> Recognition {
        let line = stream.trimmed(cursor);
        if line.starts_with('<') || line.starts_with('|') || line.starts_with("**") {
            return Recognition::skipped(cursor + 1);
        }

        match ctx.section.kind() {
            Some(SectionKind::SingleChoice) => self.choice(stream, cursor, ctx),
            Some(SectionKind::FillBlank) => {
                self.numbered(stream, cursor, ctx, Some(QuestionType::FillBlank))
            }
            Some(SectionKind::Essay) => self.numbered(stream, cursor, ctx, Some(QuestionType::Essay)),
            _ => {
                if is_choice(line) {
                    if !ctx.section.is_active() {
                        ctx.apply_section(SectionTransition::Enter(SectionLabel::new(
                            SectionKind::SingleChoice,
                            "單選題",
                        )));
                    }
                    self.choice(stream, cursor, ctx)
                } else {
                    self.numbered(stream, cursor, ctx, None)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizers::Outcome;

    #[test]
    fn test_headers() {
        assert_eq!(header("**一、單選題**").map(|h| h.0), Some(SectionKind::SingleChoice));
        assert_eq!(header("二、 填充題（每格3分）").map(|h| h.0), Some(SectionKind::FillBlank));
        assert_eq!(header("四、計算題").map(|h| h.0), Some(SectionKind::Essay));
        assert_eq!(header("三、非選題").map(|h| h.1), Some("三、非選題".to_string()));
        assert!(header("1. 計算題").is_none());
    }

    #[test]
    fn test_numbered_body() {
        assert_eq!(numbered_body(r"3\. 求 x 的值"), Some("求 x 的值"));
        assert_eq!(numbered_body("3.14 是圓周率"), None);
        assert_eq!(numbered_body("(A)3. 選擇"), None);
        assert_eq!(numbered_body("2. 1/2 + 1/3 = ?"), Some("1/2 + 1/3 = ?"));
    }

    #[test]
    fn test_decimal_options_are_not_questions() {
        assert!(!is_boundary("(A) 0.5 (B) 1.5 (C) 2.5 (D) 3.5"));
        assert!(is_choice("(B)1. 下列哪一個數最接近 1.4？"));

        let stream = ParagraphStream::from_iter([
            "(B)1. 下列哪一個數最接近 1.4？",
            "(A) 0.5 (B) 1.5 (C) 2.5 (D) 3.5",
        ]);
        let mut ctx = DocumentCtx::new("math.md");
        ctx.apply_section(SectionTransition::Enter(SectionLabel::new(
            SectionKind::SingleChoice,
            "一、單選題",
        )));
        let recognition = MathRecognizer.recognize(&stream, 0, &mut ctx);
        assert_eq!(recognition.next, 2);

        let Outcome::Candidate(candidate) = recognition.outcome else {
            panic!("expected a candidate, got {:?}", recognition.outcome);
        };
        assert_eq!(candidate.question_text, "下列哪一個數最接近 1.4？");
        assert_eq!(candidate.answer.as_deref(), Some("B"));
        let values: Vec<_> = candidate.options.values().map(String::as_str).collect();
        assert_eq!(values, vec!["0.5", "1.5", "2.5", "3.5"]);
    }

    #[test]
    fn test_clean_math_stem() {
        assert_eq!(clean_math_stem("  x  +\t1 "), "x + 1");
    }
}
