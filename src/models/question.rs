//! 题目相关数据模型
//!
//! - `QuestionCandidate`：识别器产出的待校验题目
//! - `CanonicalQuestionRecord`：格式化后的最终记录，构造后不可变
//! - `QuestionText`：题干/答案的标记联合（原文或数学格式化文本）

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::metadata::DocumentMetadata;

/// 选项字母
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    /// 同时接受全角与半角字母
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' | 'Ａ' => Some(OptionLetter::A),
            'B' | 'Ｂ' => Some(OptionLetter::B),
            'C' | 'Ｃ' => Some(OptionLetter::C),
            'D' | 'Ｄ' => Some(OptionLetter::D),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OptionLetter::A => "A",
            OptionLetter::B => "B",
            OptionLetter::C => "C",
            OptionLetter::D => "D",
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 选项映射，每个字母最多一项
pub type OptionMap = BTreeMap<OptionLetter, String>;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "單選題")]
    SingleChoice,
    #[serde(rename = "填充題")]
    FillBlank,
    #[serde(rename = "非選題")]
    Essay,
    #[serde(rename = "題組題")]
    ReadingComprehension,
}

impl QuestionType {
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "單選題",
            QuestionType::FillBlank => "填充題",
            QuestionType::Essay => "非選題",
            QuestionType::ReadingComprehension => "題組題",
        }
    }

    /// 是否带选项
    pub fn has_options(self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice | QuestionType::ReadingComprehension
        )
    }

    /// 答案是否为自由文本（需要数学格式化）
    pub fn has_free_text_answer(self) -> bool {
        matches!(self, QuestionType::FillBlank | QuestionType::Essay)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 候选题被丢弃的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DropReason {
    /// 清理后题干为空
    EmptyStem,
    /// 选项数量不符合该学科的要求
    InvalidOptionCount,
    /// 存在空选项
    EmptyOption,
    /// 填充/问答题不应带选项
    UnexpectedOptions,
    /// 题组子题但当前没有题组
    NoActiveGroup,
    /// 该学科不收录带图表的题目
    ImageReference,
    /// 与本文档已输出的题目重复
    Duplicate,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DropReason::EmptyStem => "题干为空",
            DropReason::InvalidOptionCount => "选项数量不符",
            DropReason::EmptyOption => "存在空选项",
            DropReason::UnexpectedOptions => "非选择题带有选项",
            DropReason::NoActiveGroup => "没有所属题组",
            DropReason::ImageReference => "含图表题目",
            DropReason::Duplicate => "重复题目",
        };
        f.write_str(text)
    }
}

/// 识别器产出的候选题
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionCandidate {
    /// 题干原文（可能仍含图片标记）
    pub question_text: String,
    pub options: OptionMap,
    pub answer: Option<String>,
    pub question_type: QuestionType,
    pub image_path: Option<String>,
    pub section: Option<String>,
    pub group_id: Option<u32>,
    pub group_intro: Option<String>,
    /// 题目起始行号
    pub line_index: usize,
}

impl QuestionCandidate {
    pub fn new(question_type: QuestionType, question_text: impl Into<String>, line_index: usize) -> Self {
        Self {
            question_text: question_text.into(),
            options: OptionMap::new(),
            answer: None,
            question_type,
            image_path: None,
            section: None,
            group_id: None,
            group_intro: None,
            line_index,
        }
    }

    pub fn with_options(mut self, options: OptionMap) -> Self {
        self.options = options;
        self
    }

    pub fn with_answer(mut self, answer: Option<String>) -> Self {
        self.answer = answer.filter(|a| !a.trim().is_empty());
        self
    }

    pub fn with_section(mut self, section: Option<String>) -> Self {
        self.section = section;
        self
    }

    pub fn with_group(mut self, group_id: u32, intro: &str) -> Self {
        self.group_id = Some(group_id);
        self.group_intro = Some(intro.trim().to_string()).filter(|i| !i.is_empty());
        self
    }
}

/// 数学格式化后的文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedText {
    pub original: String,
    pub converted: String,
    pub math_expressions: Vec<String>,
    pub needs_rendering: bool,
}

/// 题干/答案文本
///
/// 下游按变体匹配，不再猜测字段是字符串还是映射
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionText {
    Raw(String),
    Formatted(FormattedText),
}

impl QuestionText {
    /// 展示用文本：原文或转换后的文本
    pub fn display_text(&self) -> &str {
        match self {
            QuestionText::Raw(text) => text,
            QuestionText::Formatted(formatted) => &formatted.converted,
        }
    }

    pub fn needs_rendering(&self) -> bool {
        match self {
            QuestionText::Raw(_) => false,
            QuestionText::Formatted(formatted) => formatted.needs_rendering,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display_text().is_empty()
    }
}

impl fmt::Display for QuestionText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_text())
    }
}

impl Serialize for QuestionText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_text())
    }
}

/// 最终输出的题目记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalQuestionRecord {
    question: QuestionText,
    options: Option<OptionMap>,
    image_path: Option<String>,
    #[serde(flatten)]
    metadata: DocumentMetadata,
    answer: Option<QuestionText>,
    #[serde(rename = "type")]
    question_type: QuestionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_intro: Option<String>,
}

/// 组装记录所需的各字段
pub(crate) struct RecordParts {
    pub question: QuestionText,
    pub options: Option<OptionMap>,
    pub image_path: Option<String>,
    pub metadata: DocumentMetadata,
    pub answer: Option<QuestionText>,
    pub question_type: QuestionType,
    pub section: Option<String>,
    pub group_id: Option<u32>,
    pub group_intro: Option<String>,
}

impl CanonicalQuestionRecord {
    pub(crate) fn from_parts(parts: RecordParts) -> Self {
        Self {
            question: parts.question,
            options: parts.options,
            image_path: parts.image_path,
            metadata: parts.metadata,
            answer: parts.answer,
            question_type: parts.question_type,
            section: parts.section,
            group_id: parts.group_id,
            group_intro: parts.group_intro,
        }
    }

    pub fn question(&self) -> &QuestionText {
        &self.question
    }

    pub fn options(&self) -> Option<&OptionMap> {
        self.options.as_ref()
    }

    pub fn option(&self, letter: OptionLetter) -> Option<&str> {
        self.options.as_ref()?.get(&letter).map(String::as_str)
    }

    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn answer(&self) -> Option<&QuestionText> {
        self.answer.as_ref()
    }

    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn group_id(&self) -> Option<u32> {
        self.group_id
    }

    pub fn group_intro(&self) -> Option<&str> {
        self.group_intro.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_letter_accepts_full_width() {
        assert_eq!(OptionLetter::from_char('Ｃ'), Some(OptionLetter::C));
        assert_eq!(OptionLetter::from_char('b'), None);
        assert_eq!(OptionLetter::from_char('E'), None);
    }

    #[test]
    fn test_with_answer_filters_blank() {
        let candidate = QuestionCandidate::new(QuestionType::FillBlank, "x", 0)
            .with_answer(Some("  ".to_string()));
        assert_eq!(candidate.answer, None);
    }

    #[test]
    fn test_record_serializes_expected_shape() {
        let mut options = OptionMap::new();
        options.insert(OptionLetter::B, "b".to_string());
        options.insert(OptionLetter::A, "a".to_string());

        let record = CanonicalQuestionRecord::from_parts(RecordParts {
            question: QuestionText::Raw("題目".to_string()),
            options: Some(options),
            image_path: None,
            metadata: DocumentMetadata::default(),
            answer: Some(QuestionText::Raw("A".to_string())),
            question_type: QuestionType::SingleChoice,
            section: None,
            group_id: None,
            group_intro: None,
        });

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["question"], "題目");
        assert_eq!(value["options"]["A"], "a");
        assert_eq!(value["answer"], "A");
        assert_eq!(value["type"], "單選題");
        assert!(value["image_path"].is_null());
        assert_eq!(value["scope"], "");
        // 可选字段缺省时不输出
        assert!(value.get("group_id").is_none());
    }

    #[test]
    fn test_formatted_text_serializes_converted() {
        let text = QuestionText::Formatted(FormattedText {
            original: "1/2".to_string(),
            converted: r"\frac{1}{2}".to_string(),
            math_expressions: Vec::new(),
            needs_rendering: true,
        });
        assert_eq!(serde_json::to_string(&text).unwrap(), r#""\\frac{1}{2}""#);
        assert!(text.needs_rendering());
    }
}
