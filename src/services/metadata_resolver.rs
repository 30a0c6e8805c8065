//! 文档元数据解析
//!
//! 路径约定：`.../<学期>/<年级>/<出版社>/<科目>/<文件名>`，
//! 路径过短时各字段为空字符串，未知代码原样保留

use std::sync::LazyLock;

use phf::phf_map;
use regex::Regex;

use crate::models::metadata::DocumentMetadata;
use crate::models::subject::Subject;

pub const DEFAULT_SCOPE: &str = "國中";

static GRADE_LABELS: phf::Map<&'static str, &'static str> = phf_map! {
    "1" => "一年級",
    "2" => "二年級",
    "3" => "三年級",
    "4" => "四年級",
    "5" => "五年級",
    "6" => "六年級",
    "7" => "七年級",
    "8" => "八年級",
    "9" => "九年級",
};

static PUBLISHER_LABELS: phf::Map<&'static str, &'static str> = phf_map! {
    "Hanlin" => "翰林",
    "Knsh" => "康軒",
    "Nani" => "南一",
};

static CHAPTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Ch\d+(?:-\d+)*|L\d+|第\d+章|第\d+課").expect("chapter regex")
});

/// 从文件路径解析元数据，不会失败
pub fn resolve_metadata(file_path: &str) -> DocumentMetadata {
    let segments: Vec<&str> = file_path
        .split(|c: char| c == '/' || c == '\\')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    let mut metadata = DocumentMetadata {
        scope: DEFAULT_SCOPE.to_string(),
        ..Default::default()
    };

    let n = segments.len();
    if n >= 5 {
        metadata.semester = parse_semester(segments[n - 5]);
        metadata.grade = resolve_grade(segments[n - 4]);
        metadata.publisher = resolve_publisher(segments[n - 3]);
        metadata.subject = resolve_subject(segments[n - 2]);
    }
    if let Some(file_name) = segments.last() {
        metadata.chapter = extract_chapter(file_stem(file_name));
    }
    metadata
}

/// `111A` → `111上`，`110B` → `110下`
pub fn parse_semester(code: &str) -> String {
    let year: String = code.chars().filter(char::is_ascii_digit).collect();
    let term: String = code.chars().filter(|c| !c.is_ascii_digit()).collect();
    let suffix = match term.trim() {
        "A" => "上",
        "B" => "下",
        _ => "",
    };
    format!("{year}{suffix}")
}

pub fn resolve_grade(code: &str) -> String {
    GRADE_LABELS.get(code).copied().unwrap_or(code).to_string()
}

pub fn resolve_publisher(code: &str) -> String {
    PUBLISHER_LABELS.get(code).copied().unwrap_or(code).to_string()
}

pub fn resolve_subject(code: &str) -> String {
    Subject::from_folder(code)
        .map(Subject::name)
        .unwrap_or(code)
        .to_string()
}

/// 从文件名中提取章节
pub fn extract_chapter(file_stem: &str) -> String {
    CHAPTER_RE
        .find(file_stem)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn file_stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path() {
        let meta = resolve_metadata("input_md/111A/7/Hanlin/Math/foo.md");
        assert_eq!(meta.semester, "111上");
        assert_eq!(meta.grade, "七年級");
        assert_eq!(meta.publisher, "翰林");
        assert_eq!(meta.subject, "數學");
        assert_eq!(meta.scope, "國中");
        assert_eq!(meta.chapter, "");
    }

    #[test]
    fn test_windows_separators_and_chapter() {
        let meta = resolve_metadata(r"D:\exams\112B\8\Knsh\Civics_and_Society\公民_Ch2-1_題本.md");
        assert_eq!(meta.semester, "112下");
        assert_eq!(meta.grade, "八年級");
        assert_eq!(meta.publisher, "康軒");
        assert_eq!(meta.subject, "公民");
        assert_eq!(meta.chapter, "Ch2-1");
    }

    #[test]
    fn test_unknown_codes_pass_through() {
        let meta = resolve_metadata("113C/10/Pearson/Music/第3課.md");
        assert_eq!(meta.semester, "113");
        assert_eq!(meta.grade, "10");
        assert_eq!(meta.publisher, "Pearson");
        assert_eq!(meta.subject, "Music");
        assert_eq!(meta.chapter, "第3課");
    }

    #[test]
    fn test_short_path_defaults_to_empty() {
        let meta = resolve_metadata("Math/L5.md");
        assert_eq!(meta.semester, "");
        assert_eq!(meta.grade, "");
        assert_eq!(meta.subject, "");
        assert_eq!(meta.chapter, "L5");
        assert_eq!(meta.scope, "國中");
    }
}
