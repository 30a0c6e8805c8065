//! 数学符号转换
//!
//! 一张有序的 (模式, 替换, 类别) 表，按顺序逐条全局替换，
//! 后面的规则看到的是前面规则的输出

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::question::FormattedText;

/// 规则类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathCategory {
    AbsoluteValue,
    /// 全角运算符折叠为半角
    FullWidthOperator,
    Operator,
    Fraction,
    Exponent,
    Root,
    Greek,
    Calculus,
    Set,
    Logic,
    Geometry,
    Relation,
    Ellipsis,
    Temperature,
    /// `*x*` → `$x$`
    Italic,
    /// 比较符号两侧补空格
    Spacing,
}

impl MathCategory {
    /// 该类规则生效时是否需要下游渲染
    pub fn requires_rendering(self) -> bool {
        !matches!(self, MathCategory::FullWidthOperator | MathCategory::Spacing)
    }
}

use MathCategory::*;

const RULE_TABLE: &[(&str, &str, MathCategory)] = &[
    (r"∣([^∣]+)∣", "|${1}|", AbsoluteValue),
    (r"｜([^｜]+)｜", "|${1}|", AbsoluteValue),
    (r"\\\|\s*([^|]+)\s*\\\|", "|${1}|", AbsoluteValue),
    ("＋", "+", FullWidthOperator),
    ("－", "-", FullWidthOperator),
    ("＜", "<", FullWidthOperator),
    ("＞", ">", FullWidthOperator),
    ("＝", "=", FullWidthOperator),
    ("×", r"\times", Operator),
    ("÷", r"\div", Operator),
    ("±", r"\pm", Operator),
    ("∓", r"\mp", Operator),
    (r"(\d+)/(\d+)", r"\frac{${1}}{${2}}", Fraction),
    (r"(\w+)\^(\w+)", "${1}^{${2}}", Exponent),
    (r"(\w+)²", "${1}^2", Exponent),
    (r"(\w+)³", "${1}^3", Exponent),
    (r"√(\w+)", r"\sqrt{${1}}", Root),
    (r"∛(\w+)", r"\sqrt[3]{${1}}", Root),
    ("α", r"\alpha", Greek),
    ("β", r"\beta", Greek),
    ("γ", r"\gamma", Greek),
    ("δ", r"\delta", Greek),
    ("θ", r"\theta", Greek),
    ("λ", r"\lambda", Greek),
    ("μ", r"\mu", Greek),
    ("π", r"\pi", Greek),
    ("σ", r"\sigma", Greek),
    ("φ", r"\phi", Greek),
    ("ω", r"\omega", Greek),
    ("∞", r"\infty", Calculus),
    ("∑", r"\sum", Calculus),
    ("∏", r"\prod", Calculus),
    ("∫", r"\int", Calculus),
    ("∂", r"\partial", Calculus),
    ("∇", r"\nabla", Calculus),
    ("∆", r"\Delta", Calculus),
    ("∈", r"\in", Set),
    ("∉", r"\notin", Set),
    ("⊂", r"\subset", Set),
    ("⊃", r"\supset", Set),
    ("∩", r"\cap", Set),
    ("∪", r"\cup", Set),
    ("∅", r"\emptyset", Set),
    ("∧", r"\land", Logic),
    ("∨", r"\lor", Logic),
    ("¬", r"\lnot", Logic),
    ("→", r"\rightarrow", Logic),
    ("↔", r"\leftrightarrow", Logic),
    ("∀", r"\forall", Logic),
    ("∃", r"\exists", Logic),
    ("∠", r"\angle", Geometry),
    ("△", r"\triangle", Geometry),
    ("□", r"\square", Geometry),
    ("○", r"\circ", Geometry),
    ("⊥", r"\perp", Geometry),
    ("∥", r"\parallel", Geometry),
    ("≅", r"\cong", Geometry),
    ("∼", r"\sim", Geometry),
    ("≤", r"\leq", Relation),
    ("≥", r"\geq", Relation),
    ("≠", r"\neq", Relation),
    ("≈", r"\approx", Relation),
    ("≡", r"\equiv", Relation),
    ("…", r"\ldots", Ellipsis),
    ("⋯", r"\cdots", Ellipsis),
    ("℃", r"^{\circ}\text{C}", Temperature),
    ("℉", r"^{\circ}\text{F}", Temperature),
    (r"\*([a-zA-Z])\*", "$$${1}$$", Italic),
    (r"\s*([<>=])\s*", " ${1} ", Spacing),
];

/// 单条替换规则
#[derive(Debug)]
pub struct MathRule {
    pattern: Regex,
    replacement: &'static str,
    category: MathCategory,
}

impl MathRule {
    pub fn category(&self) -> MathCategory {
        self.category
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// 全局替换
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.replacement)
    }
}

static RULES: LazyLock<Vec<MathRule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(pattern, replacement, category)| MathRule {
            pattern: Regex::new(pattern).expect("math rule regex"),
            replacement,
            category,
        })
        .collect()
});

static BLOCK_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").expect("block math regex"));
static INLINE_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(.+?)\$").expect("inline math regex"));

/// 按顺序排列的全部规则
pub fn rules() -> &'static [MathRule] {
    &RULES
}

/// 转换文本并给出是否需要渲染
pub fn convert(text: &str) -> FormattedText {
    let mut converted = text.to_string();
    let mut rendering = false;

    for rule in rules() {
        if let Cow::Owned(next) = rule.apply(&converted) {
            if next != converted {
                rendering |= rule.category.requires_rendering();
                converted = next;
            }
        }
    }

    let converted = converted.trim().to_string();
    let math_expressions = extract_math_expressions(text);
    let needs_rendering = rendering || !math_expressions.is_empty() || converted.contains('$');

    FormattedText {
        original: text.to_string(),
        converted,
        math_expressions,
        needs_rendering,
    }
}

/// 扫描 `$$..$$` 与 `$..$` 中的表达式
///
/// 先收集全部块级表达式，再在去掉块级片段的文本上收集行内表达式
pub fn extract_math_expressions(text: &str) -> Vec<String> {
    let mut expressions: Vec<String> = BLOCK_MATH_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect();

    let without_blocks = BLOCK_MATH_RE.replace_all(text, " ");
    expressions.extend(
        INLINE_MATH_RE
            .captures_iter(&without_blocks)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string()),
    );
    expressions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_for(category: MathCategory, pattern: &str) -> &'static MathRule {
        rules()
            .iter()
            .find(|r| r.category() == category && r.pattern() == pattern)
            .unwrap()
    }

    #[test]
    fn test_fraction() {
        assert!(convert("1/2").converted.contains(r"\frac{1}{2}"));
    }

    #[test]
    fn test_exponent() {
        assert!(convert("x^2").converted.contains("x^{2}"));
        assert_eq!(convert("x²").converted, "x^2");
    }

    #[test]
    fn test_greek() {
        let out = convert("α");
        assert!(out.converted.contains(r"\alpha"));
        assert!(out.needs_rendering);
    }

    #[test]
    fn test_root_and_temperature() {
        assert_eq!(convert("√2").converted, r"\sqrt{2}");
        assert_eq!(convert("∛8").converted, r"\sqrt[3]{8}");
        assert_eq!(convert("25℃").converted, r"25^{\circ}\text{C}");
    }

    #[test]
    fn test_italic_becomes_inline_math() {
        let out = convert("設 *x* 為整數");
        assert_eq!(out.converted, "設 $x$ 為整數");
        assert!(out.needs_rendering);
    }

    #[test]
    fn test_plain_text_needs_no_rendering() {
        let out = convert("小明有幾顆蘋果");
        assert_eq!(out.converted, "小明有幾顆蘋果");
        assert!(!out.needs_rendering);
        // 全角运算符折叠与补空格不触发渲染
        let out = convert("a＝b");
        assert_eq!(out.converted, "a = b");
        assert!(!out.needs_rendering);
    }

    #[test]
    fn test_rules_apply_in_order() {
        // 分数规则先于指数规则
        let out = convert("2/3 + y^3");
        assert_eq!(out.converted, r"\frac{2}{3} + y^{3}");
        // 单条规则可独立测试
        let rule = rule_for(MathCategory::Set, "∩");
        assert_eq!(rule.apply("A∩B"), r"A\capB");
    }

    #[test]
    fn test_extract_math_expressions() {
        let found = extract_math_expressions("$$a+b$$ 與 $c$ 以及 $c$");
        assert_eq!(found, vec!["a+b", "c", "c"]);
        let out = convert("求 $x+1$ 的值");
        assert_eq!(out.math_expressions, vec!["x+1"]);
        assert!(out.needs_rendering);
    }
}
