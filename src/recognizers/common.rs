//! 识别器共用工具：选项扫描、前瞻收集、候选题校验

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Recognition;
use crate::models::paragraph::ParagraphStream;
use crate::models::question::{DropReason, OptionLetter, OptionMap, QuestionCandidate, QuestionType};
use crate::services::image_resolver::strip_image_markup;
use crate::services::text_normalizer::{normalize, to_half_width, BLANK_MARKER};
use crate::workflow::document_ctx::DocumentCtx;

static OPTION_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[（(]([Ａ-ＤA-D])[）)]").expect("option marker regex"));
static UNDERLINE_ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<u>\s*([^<>]+?)\s*</u>").expect("underline answer regex"));
static UNDERLINE_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<u>.*?</u>").expect("underline span regex"));

/// 行内第一个 `(X)n.` 题目标记
///
/// 点号后紧跟数字时是选项里的小数（`(A) 0.5`），不算题号
pub(crate) fn answered_marker<'h>(re: &Regex, line: &'h str) -> Option<Captures<'h>> {
    re.captures_iter(line).find(|caps| {
        caps.get(0)
            .is_some_and(|m| !line[m.end()..].starts_with(|c: char| c.is_ascii_digit()))
    })
}

/// 选项数量要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRule {
    pub min: usize,
    pub max: usize,
}

impl OptionRule {
    pub const EXACTLY_FOUR: Self = Self { min: 4, max: 4 };
    pub const TWO_TO_FOUR: Self = Self { min: 2, max: 4 };

    pub fn accepts(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// 答案字母统一为半角大写
pub(crate) fn answer_letter(raw: &str) -> String {
    to_half_width(raw.trim()).to_uppercase()
}

/// 行内第一个选项标记的位置
pub(crate) fn first_option_offset(text: &str) -> Option<usize> {
    OPTION_MARKER_RE.find(text).map(|m| m.start())
}

/// 选项标记之前的部分
pub(crate) fn stem_before_options(text: &str) -> &str {
    match first_option_offset(text) {
        Some(offset) => &text[..offset],
        None => text,
    }
}

/// 按选项标记切分一行，每个标记到下一个标记之间为选项内容
pub(crate) fn scan_options(text: &str) -> Vec<(OptionLetter, String)> {
    let markers: Vec<(usize, usize, OptionLetter)> = OPTION_MARKER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let letter = caps.get(1)?.as_str().chars().next().and_then(OptionLetter::from_char)?;
            Some((whole.start(), whole.end(), letter))
        })
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, &(_, end, letter))| {
            let stop = markers.get(i + 1).map_or(text.len(), |next| next.0);
            (letter, clean_option_value(&text[end..stop]))
        })
        .collect()
}

fn clean_option_value(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, ';' | '；' | '>' | '＞')
    });
    normalize(trimmed)
}

/// 同一字母以第一次出现为准，空选项不收录
pub(crate) fn insert_options(target: &mut OptionMap, found: Vec<(OptionLetter, String)>) {
    for (letter, value) in found {
        if !value.is_empty() {
            target.entry(letter).or_insert(value);
        }
    }
}

/// 去掉行内答案注记后的行
pub(crate) struct NotedLine<'a> {
    pub text: Cow<'a, str>,
    pub answer: Option<String>,
}

/// 没有答案注记的学科
pub(crate) fn plain_line(line: &str) -> NotedLine<'_> {
    NotedLine {
        text: Cow::Borrowed(line),
        answer: None,
    }
}

/// 前瞻收集的结果
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub options: OptionMap,
    /// 选项出现之前的非空行，视为题干续行
    pub continuation: Vec<String>,
    /// 前瞻行中第一个答案注记
    pub noted_answer: Option<String>,
    /// 第一个未消费的行号
    pub next: usize,
}

/// 从起始行之后做有界前瞻
///
/// 空行不计入 `limit`；遇到边界行（新题目、区块标题等）时停止且不消费该行。
/// 每行先经 `split_note` 拆出答案注记，再扫描选项
pub(crate) fn collect_options(
    stream: &ParagraphStream,
    opening: usize,
    limit: usize,
    is_boundary: &dyn Fn(&str) -> bool,
    split_note: fn(&str) -> NotedLine<'_>,
    initial: OptionMap,
) -> Collected {
    let mut options = initial;
    let mut continuation = Vec::new();
    let mut noted_answer = None;
    let mut j = opening + 1;
    let mut examined = 0;

    while j < stream.len() && examined < limit && options.len() < 4 {
        let raw = stream.trimmed(j);
        if raw.is_empty() {
            j += 1;
            continue;
        }
        if is_boundary(raw) {
            break;
        }

        let noted = split_note(raw);
        if noted_answer.is_none() {
            noted_answer = noted.answer;
        }
        let line = noted.text.trim();
        if line.is_empty() {
            examined += 1;
            j += 1;
            continue;
        }

        let found = scan_options(line);
        if found.is_empty() {
            // 选项之后的普通行不属于本题
            if !options.is_empty() {
                break;
            }
            continuation.push(line.to_string());
        } else {
            let prefix = stem_before_options(line).trim();
            if options.is_empty() && !prefix.is_empty() {
                continuation.push(prefix.to_string());
            }
            insert_options(&mut options, found);
        }
        examined += 1;
        j += 1;
    }

    Collected {
        options,
        continuation,
        noted_answer,
        next: j,
    }
}

/// 拼接题干首行与续行
pub(crate) fn join_stem(head: &str, continuation: &[String]) -> String {
    std::iter::once(head.trim())
        .chain(continuation.iter().map(|line| line.trim()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `<u>答案</u>` 中的答案
pub(crate) fn underline_answer(text: &str) -> Option<String> {
    UNDERLINE_ANSWER_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|answer| !answer.is_empty())
}

/// 把 `<u>..</u>` 替换为空格标记
pub(crate) fn blank_out_underlines(text: &str) -> String {
    UNDERLINE_SPAN_RE.replace_all(text, BLANK_MARKER).into_owned()
}

/// 题干去掉图片标记并规范化后是否为空
pub(crate) fn stem_is_blank(text: &str) -> bool {
    normalize(&strip_image_markup(text)).is_empty()
}

/// 校验候选题，失败时给出丢弃原因
pub(crate) fn validate(candidate: &QuestionCandidate, rule: OptionRule) -> Result<(), DropReason> {
    if stem_is_blank(&candidate.question_text) {
        return Err(DropReason::EmptyStem);
    }
    match candidate.question_type {
        QuestionType::SingleChoice | QuestionType::ReadingComprehension => {
            if candidate.options.values().any(|value| normalize(value).is_empty()) {
                return Err(DropReason::EmptyOption);
            }
            if !rule.accepts(candidate.options.len()) {
                return Err(DropReason::InvalidOptionCount);
            }
            if candidate.question_type == QuestionType::ReadingComprehension
                && candidate.group_id.is_none()
            {
                return Err(DropReason::NoActiveGroup);
            }
        }
        QuestionType::FillBlank | QuestionType::Essay => {
            if !candidate.options.is_empty() {
                return Err(DropReason::UnexpectedOptions);
            }
        }
    }
    Ok(())
}

/// 选择题起始行的解析结果
pub(crate) struct ChoiceOpening<'a> {
    pub cursor: usize,
    /// 去掉答案/题号前缀之后的内容
    pub body: &'a str,
    pub answer: Option<String>,
    pub question_type: QuestionType,
}

/// 学科的选择题文法
pub(crate) struct ChoiceGrammar<'a> {
    pub rule: OptionRule,
    pub lookahead: usize,
    pub is_boundary: &'a dyn Fn(&str) -> bool,
    /// 学科特有的题干清理
    pub clean_stem: fn(&str) -> String,
    /// 前瞻行的答案注记拆分
    pub split_note: fn(&str) -> NotedLine<'_>,
}

/// 组装选择题：起始行内联选项 + 前瞻选项 + 题干续行，然后校验
pub(crate) fn assemble_choice(
    stream: &ParagraphStream,
    opening: ChoiceOpening<'_>,
    grammar: &ChoiceGrammar<'_>,
    ctx: &DocumentCtx,
    attach_group: bool,
) -> Recognition {
    let mut initial = OptionMap::new();
    insert_options(&mut initial, scan_options(opening.body));

    let collected = collect_options(
        stream,
        opening.cursor,
        grammar.lookahead,
        grammar.is_boundary,
        grammar.split_note,
        initial,
    );
    let stem = join_stem(stem_before_options(opening.body), &collected.continuation);

    let mut candidate = QuestionCandidate::new(
        opening.question_type,
        (grammar.clean_stem)(&stem),
        opening.cursor,
    )
    .with_options(collected.options)
    .with_answer(opening.answer.or(collected.noted_answer))
    .with_section(ctx.section_title());

    if attach_group {
        if let Some(group) = ctx.groups.current() {
            candidate = candidate.with_group(group.id, &group.intro);
        }
    }

    match validate(&candidate, grammar.rule) {
        Ok(()) => Recognition::candidate(candidate, collected.next),
        Err(reason) => Recognition::dropped(reason, collected.next),
    }
}

/// 不做额外清理
pub(crate) fn keep_stem(stem: &str) -> String {
    stem.to_string()
}
