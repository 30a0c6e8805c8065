use std::fmt;

use phf::phf_map;

/// 科目枚举，对应文档路径中的科目文件夹
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Subject {
    /// 國文
    Chinese,
    /// 數學
    Math,
    /// 英語
    English,
    /// 理化
    PhysicsAndChemistry,
    /// 生物
    Biology,
    /// 自然
    Science,
    /// 歷史
    History,
    /// 地理
    Geography,
    /// 公民
    Civics,
}

/// 科目文件夹代码 → 科目
static SUBJECT_FOLDERS: phf::Map<&'static str, Subject> = phf_map! {
    "Chinese" => Subject::Chinese,
    "Math" => Subject::Math,
    "English" => Subject::English,
    "Physics_and_Chemistry" => Subject::PhysicsAndChemistry,
    "Biology" => Subject::Biology,
    "Science" => Subject::Science,
    "History" => Subject::History,
    "Geography" => Subject::Geography,
    "Civics_and_Society" => Subject::Civics,
};

impl Subject {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Subject::Chinese => "國文",
            Subject::Math => "數學",
            Subject::English => "英語",
            Subject::PhysicsAndChemistry => "理化",
            Subject::Biology => "生物",
            Subject::Science => "自然",
            Subject::History => "歷史",
            Subject::Geography => "地理",
            Subject::Civics => "公民",
        }
    }

    /// 所属的解析族
    pub fn family(self) -> SubjectFamily {
        match self {
            Subject::Chinese => SubjectFamily::LanguageArts,
            Subject::English => SubjectFamily::ForeignLanguage,
            Subject::Math => SubjectFamily::Mathematics,
            Subject::PhysicsAndChemistry | Subject::Biology | Subject::Science => {
                SubjectFamily::Science
            }
            Subject::History | Subject::Geography | Subject::Civics => {
                SubjectFamily::SocialStudies
            }
        }
    }

    /// 从文件夹代码解析科目（精确匹配）
    pub fn from_folder(code: &str) -> Option<Self> {
        SUBJECT_FOLDERS.get(code).copied()
    }

    /// 模糊查找：文件夹代码（忽略大小写）或标准名称
    pub fn find(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(subject) = Self::from_folder(s) {
            return Some(subject);
        }
        SUBJECT_FOLDERS
            .entries()
            .find(|(code, subject)| code.eq_ignore_ascii_case(s) || subject.name() == s)
            .map(|(_, subject)| *subject)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 解析族：每个族对应一个题目识别器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectFamily {
    /// 國文
    LanguageArts,
    /// 英語
    ForeignLanguage,
    /// 數學
    Mathematics,
    /// 自然科
    Science,
    /// 社會科
    SocialStudies,
}

impl SubjectFamily {
    pub fn name(self) -> &'static str {
        match self {
            SubjectFamily::LanguageArts => "chinese",
            SubjectFamily::ForeignLanguage => "english",
            SubjectFamily::Mathematics => "math",
            SubjectFamily::Science => "science",
            SubjectFamily::SocialStudies => "social",
        }
    }

    /// 接受族名，或任意科目的文件夹代码/名称
    pub fn find(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chinese" | "language_arts" => Some(SubjectFamily::LanguageArts),
            "english" | "foreign_language" => Some(SubjectFamily::ForeignLanguage),
            "math" | "mathematics" => Some(SubjectFamily::Mathematics),
            "science" => Some(SubjectFamily::Science),
            "social" | "social_studies" => Some(SubjectFamily::SocialStudies),
            _ => Subject::find(s).map(Subject::family),
        }
    }
}

impl fmt::Display for SubjectFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_codes() {
        assert_eq!(Subject::from_folder("Civics_and_Society"), Some(Subject::Civics));
        assert_eq!(Subject::from_folder("math"), None);
        assert_eq!(Subject::find("math"), Some(Subject::Math));
        assert_eq!(Subject::find("地理"), Some(Subject::Geography));
    }

    #[test]
    fn test_family_lookup() {
        assert_eq!(SubjectFamily::find("Biology"), Some(SubjectFamily::Science));
        assert_eq!(SubjectFamily::find("social"), Some(SubjectFamily::SocialStudies));
        assert_eq!(SubjectFamily::find("English"), Some(SubjectFamily::ForeignLanguage));
        assert_eq!(SubjectFamily::find("音樂"), None);
    }
}
