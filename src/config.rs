use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::subject::SubjectFamily;
use crate::orchestrator::document_processor::ExtractOptions;
use crate::services::image_resolver::ImageNaming;

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "EXTRACT_CONFIG";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 待处理文档目录（按 学期/年级/版本/科目 分层）
    pub input_folder: String,
    /// 结果输出目录
    pub output_folder: String,
    /// 指定解析族或科目，为空时按科目文件夹判断
    pub subject: Option<String>,
    /// 图片扩展名
    pub image_extension: String,
    /// 图片命名方式
    pub image_naming: ImageNaming,
    /// 是否在文档内去重
    pub deduplicate: bool,
    /// 同时处理的文档数量
    pub max_concurrent_documents: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: "input_md".to_string(),
            output_folder: "output_json".to_string(),
            subject: None,
            image_extension: "png".to_string(),
            image_naming: ImageNaming::Flat,
            deduplicate: true,
            max_concurrent_documents: 8,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 用环境变量覆盖已有配置，无法解析的值保持原样
    pub fn with_env_overrides(self) -> Self {
        Self {
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(self.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(self.output_folder),
            subject: std::env::var("SUBJECT").ok().filter(|v| !v.trim().is_empty()).or(self.subject),
            image_extension: std::env::var("IMAGE_EXTENSION").unwrap_or(self.image_extension),
            image_naming: std::env::var("IMAGE_NAMING").ok().and_then(|v| ImageNaming::parse(&v)).unwrap_or(self.image_naming),
            deduplicate: std::env::var("DEDUPLICATE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.deduplicate),
            max_concurrent_documents: std::env::var("MAX_CONCURRENT_DOCUMENTS").ok().and_then(|v| v.parse().ok()).filter(|n: &usize| *n > 0).unwrap_or(self.max_concurrent_documents),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    /// 从 TOML 文件读取，缺省字段取默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: origin.to_string(),
            source,
        })?;
        Ok(config)
    }

    /// 设置了 `EXTRACT_CONFIG` 时先读配置文件，再叠加环境变量
    pub fn load() -> AppResult<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                Ok(Self::from_toml_file(Path::new(&path))?.with_env_overrides())
            }
            _ => Ok(Self::from_env()),
        }
    }

    /// 指定的解析族，接受族名或科目代码/名称
    pub fn subject_family(&self) -> AppResult<Option<SubjectFamily>> {
        let Some(subject) = self.subject.as_deref() else {
            return Ok(None);
        };
        SubjectFamily::find(subject)
            .map(Some)
            .ok_or_else(|| {
                ConfigError::UnknownSubject {
                    subject: subject.to_string(),
                }
                .into()
            })
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            deduplicate: self.deduplicate,
            image_generator: self.image_naming.generator(&self.image_extension),
        }
    }
}
