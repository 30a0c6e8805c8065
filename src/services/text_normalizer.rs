//! 文本规范化
//!
//! 依次执行：
//! 1. 连续两个及以上的全角/半角空白 → `____` 空格标记
//! 2. 删除配分说明（每題 N 分 / 共 N 分 及合并写法）
//! 3. 去除首尾空白与全角标点（，。、：；）
//!
//! 三步会反复执行直到文本不再变化，因此结果幂等

use std::sync::LazyLock;

use regex::Regex;

/// 填空空格标记
pub const BLANK_MARKER: &str = "____";

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t　]{2,}").expect("blank run regex"));

// 合并写法必须先于单项删除，否则会残留中间的逗号
static SCORE_COMBINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"每題\s*\d+\s*分\s*[，,]\s*共\s*\d+\s*分[ \t　]?").expect("combined score regex")
});
static SCORE_EACH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"每題\s*\d+\s*分[ \t　]?").expect("score each regex"));
static SCORE_TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"共\s*\d+\s*分[ \t　]?").expect("score total regex"));

const BOUNDARY_PUNCTUATION: &[char] = &['，', '。', '、', '：', '；'];

/// 规范化题干/选项/答案文本
pub fn normalize(text: &str) -> String {
    let mut current = normalize_once(text);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(text: &str) -> String {
    let blanked = BLANK_RUN_RE.replace_all(text, BLANK_MARKER);
    let stripped = strip_score_annotations(&blanked);
    trim_boundary(&stripped).to_string()
}

/// 删除配分说明
pub fn strip_score_annotations(text: &str) -> String {
    let text = SCORE_COMBINED_RE.replace_all(text, "");
    let text = SCORE_EACH_RE.replace_all(&text, "");
    SCORE_TOTAL_RE.replace_all(&text, "").into_owned()
}

/// 去除首尾空白和全角标点
pub fn trim_boundary(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || BOUNDARY_PUNCTUATION.contains(&c))
}

/// 全角大写字母转半角
pub fn to_half_width(text: &str) -> String {
    text.chars().map(half_width_letter).collect()
}

pub fn half_width_letter(c: char) -> char {
    if ('Ａ'..='Ｚ').contains(&c) {
        char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_runs_become_marker() {
        assert_eq!(normalize("Leo is   taller"), "Leo is____taller");
        assert_eq!(normalize("答案是　　。"), "答案是____");
        // 单个空格保留
        assert_eq!(normalize("a b"), "a b");
    }

    #[test]
    fn test_score_annotations_removed() {
        assert_eq!(normalize("一、選擇題 每題2分，共40分"), "一、選擇題");
        assert_eq!(normalize("填充題（每題 3 分）"), "填充題（）");
        assert_eq!(normalize("共 20 分 計算題"), "計算題");
    }

    #[test]
    fn test_boundary_punctuation() {
        assert_eq!(normalize("，下列何者正確？。"), "下列何者正確？");
        // 半角句号不属于边界标点
        assert_eq!(normalize("Leo is more ____ than his brother."), "Leo is more ____ than his brother.");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "  a  每題2分  b  ",
            "共 每題2分 40分",
            "x 每題 2 分 共 3 分 y",
            "，，  ；",
            "\t\tHello\t world 。",
            "每題2分，共20分每題1分",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample: {:?}", sample);
        }
    }

    #[test]
    fn test_half_width() {
        assert_eq!(to_half_width("（Ｂ）"), "（B）");
        assert_eq!(half_width_letter('Ｆ'), 'F');
        assert_eq!(half_width_letter('甲'), '甲');
    }
}
