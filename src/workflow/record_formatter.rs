//! 记录格式化
//!
//! 候选题 + 文档元数据 → 最终记录：去图片标记、规范化题干与选项、数学学科做符号转换

use crate::models::metadata::DocumentMetadata;
use crate::models::question::{
    CanonicalQuestionRecord, QuestionCandidate, QuestionText, RecordParts,
};
use crate::services::image_resolver::strip_image_markup;
use crate::services::math_converter;
use crate::services::text_normalizer::normalize;

#[derive(Debug, Clone)]
pub struct RecordFormatter {
    metadata: DocumentMetadata,
    formats_math: bool,
}

impl RecordFormatter {
    pub fn new(metadata: DocumentMetadata, formats_math: bool) -> Self {
        Self {
            metadata,
            formats_math,
        }
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn format(&self, candidate: QuestionCandidate) -> CanonicalQuestionRecord {
        let question_type = candidate.question_type;
        let stem = normalize(&strip_image_markup(&candidate.question_text));

        let options = question_type.has_options().then(|| {
            candidate
                .options
                .into_iter()
                .map(|(letter, value)| (letter, normalize(&value)))
                .collect()
        });

        let answer = candidate
            .answer
            .map(|answer| answer.trim().to_string())
            .filter(|answer| !answer.is_empty())
            .map(|answer| {
                if question_type.has_free_text_answer() {
                    self.render(answer)
                } else {
                    QuestionText::Raw(answer)
                }
            });

        CanonicalQuestionRecord::from_parts(RecordParts {
            question: self.render(stem),
            options,
            image_path: candidate.image_path,
            metadata: self.metadata.clone(),
            answer,
            question_type,
            section: candidate.section,
            group_id: candidate.group_id,
            group_intro: candidate.group_intro.map(|intro| strip_image_markup(&intro)),
        })
    }

    fn render(&self, text: String) -> QuestionText {
        if self.formats_math {
            QuestionText::Formatted(math_converter::convert(&text))
        } else {
            QuestionText::Raw(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{OptionLetter, OptionMap, QuestionType};

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            scope: "國中".to_string(),
            subject: "數學".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_choice_record() {
        let mut options = OptionMap::new();
        options.insert(OptionLetter::A, " pretty ".to_string());
        options.insert(OptionLetter::B, "tall；".to_string());
        let candidate = QuestionCandidate::new(QuestionType::SingleChoice, "Leo is   tall。", 0)
            .with_options(options)
            .with_answer(Some("B".to_string()));

        let record = RecordFormatter::new(metadata(), false).format(candidate);
        assert_eq!(record.question(), &QuestionText::Raw("Leo is____tall".to_string()));
        assert_eq!(record.option(OptionLetter::A), Some("pretty"));
        assert_eq!(record.option(OptionLetter::B), Some("tall"));
        assert_eq!(record.answer().map(|a| a.display_text()), Some("B"));
        assert_eq!(record.metadata().subject, "數學");
    }

    #[test]
    fn test_math_fill_blank_is_formatted() {
        let candidate = QuestionCandidate::new(
            QuestionType::FillBlank,
            "如圖，1/2 + 1/3 = ____ ![](media/image1.png)",
            3,
        )
        .with_answer(Some("5/6".to_string()));

        let record = RecordFormatter::new(metadata(), true).format(candidate);
        assert!(record.options().is_none());
        match record.question() {
            QuestionText::Formatted(text) => {
                assert!(text.converted.contains(r"\frac{1}{2}"));
                assert!(!text.converted.contains("media/image1"));
                assert!(text.needs_rendering);
            }
            other => panic!("expected formatted text, got {:?}", other),
        }
        assert_eq!(record.answer().map(|a| a.display_text()), Some(r"\frac{5}{6}"));
    }
}
