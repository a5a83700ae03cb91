//! 配置包加载器
//!
//! 从配置包中读取与逻辑名匹配的参数节和 `<逻辑名>.json` 文件，
//! 生成两个候选快照，是否变更由存储判断。

use crate::fingerprint::Fingerprint;
use config_common::{ConfigError, ConfigResult, ConfigSections, ParameterSection};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 候选参数节
#[derive(Debug, Clone)]
pub struct SectionCandidate {
    /// 参数节
    pub section: ParameterSection,
    /// 指纹
    pub fingerprint: Fingerprint,
}

/// 候选文档的原始内容
///
/// 指纹基于文件原始字节，而不是反序列化后的值。
#[derive(Debug, Clone)]
pub struct DocumentCandidate {
    /// 文件路径
    pub path: PathBuf,
    /// 原始字节
    pub content: Vec<u8>,
    /// 指纹
    pub fingerprint: Fingerprint,
}

impl DocumentCandidate {
    /// 反序列化文档
    ///
    /// 时间字段按 ISO-8601（RFC 3339）解析，与 chrono 的 serde 实现一致。
    ///
    /// # Errors
    ///
    /// 内容不是合法 JSON 或不符合文档类型时返回 `ConfigError::ParseError`。
    pub fn deserialize<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        serde_json::from_slice(&self.content).map_err(|source| ConfigError::ParseError {
            path: self.path.clone(),
            source,
        })
    }
}

/// 配置包加载器
#[derive(Debug, Clone)]
pub struct ConfigPackageLoader {
    logical_name: String,
    document_extension: String,
}

impl ConfigPackageLoader {
    /// 创建新的加载器
    pub fn new(logical_name: impl Into<String>, document_extension: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            document_extension: document_extension.into(),
        }
    }

    /// 校验加载参数
    ///
    /// # Errors
    ///
    /// 路径为空或不是已存在的目录时返回 `ConfigError::ArgumentInvalid`。
    pub fn validate_path(path: &Path) -> ConfigResult<()> {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::argument_invalid("path", "配置包路径不能为空"));
        }
        if !path.is_dir() {
            return Err(ConfigError::argument_invalid(
                "path",
                format!("配置包路径不是已存在的目录: {}", path.display()),
            ));
        }
        Ok(())
    }

    /// 读取与逻辑名匹配的参数节
    pub fn read_section(&self, sections: &ConfigSections) -> Option<SectionCandidate> {
        let section = sections.get(&self.logical_name)?;
        Some(SectionCandidate {
            fingerprint: Fingerprint::of_section(section),
            section: section.clone(),
        })
    }

    /// 文档文件路径
    pub fn document_path(&self, path: &Path) -> PathBuf {
        path.join(format!("{}.{}", self.logical_name, self.document_extension))
    }

    /// 读取配置文档原始内容
    ///
    /// 文件不存在时返回 `Ok(None)`，不视为错误。
    ///
    /// # Errors
    ///
    /// 其余 IO 失败返回 `ConfigError::FileReadError`。
    pub fn read_document(&self, path: &Path) -> ConfigResult<Option<DocumentCandidate>> {
        let document_path = self.document_path(path);
        match std::fs::read(&document_path) {
            Ok(content) => {
                debug!(
                    "读取配置文档: {} ({} 字节)",
                    document_path.display(),
                    content.len()
                );
                Ok(Some(DocumentCandidate {
                    fingerprint: Fingerprint::of(&content),
                    path: document_path,
                    content,
                }))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::FileReadError {
                path: document_path,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        port: u16,
        started_at: chrono::DateTime<chrono::Utc>,
    }

    #[test]
    fn test_validate_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigPackageLoader::validate_path(dir.path()).is_ok());
        assert!(ConfigPackageLoader::validate_path(Path::new(""))
            .unwrap_err()
            .is_argument_error());
        assert!(ConfigPackageLoader::validate_path(&dir.path().join("missing"))
            .unwrap_err()
            .is_argument_error());
    }

    #[test]
    fn test_read_section_by_logical_name() {
        let loader = ConfigPackageLoader::new("Service", "json");
        let sections = ConfigSections::new()
            .with_section("Service", ParameterSection::new().with_plain("Port", "8080"))
            .with_section("Other", ParameterSection::new().with_plain("Port", "1"));

        let candidate = loader.read_section(&sections).unwrap();
        assert_eq!(candidate.section.get("Port").unwrap().value, "8080");
        assert!(loader.read_section(&ConfigSections::new()).is_none());
    }

    #[test]
    fn test_missing_document_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigPackageLoader::new("Service", "json");
        assert!(loader.read_document(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_unreadable_document_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // 同名目录无法按文件读取
        std::fs::create_dir(dir.path().join("Service.json")).unwrap();
        let loader = ConfigPackageLoader::new("Service", "json");
        let error = loader.read_document(dir.path()).unwrap_err();
        assert!(error.is_io_error());
    }

    #[test]
    fn test_document_deserializes_iso8601_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Service.json"),
            r#"{"port": 8080, "started_at": "2024-05-01T08:30:00Z"}"#,
        )
        .unwrap();
        let loader = ConfigPackageLoader::new("Service", "json");
        let candidate = loader.read_document(dir.path()).unwrap().unwrap();
        let sample: Sample = candidate.deserialize().unwrap();
        assert_eq!(sample.port, 8080);
        assert_eq!(sample.started_at.to_rfc3339(), "2024-05-01T08:30:00+00:00");
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Service.json"), "{ not json").unwrap();
        let loader = ConfigPackageLoader::new("Service", "json");
        let candidate = loader.read_document(dir.path()).unwrap().unwrap();
        let error = candidate.deserialize::<Sample>().unwrap_err();
        assert!(matches!(error, ConfigError::ParseError { .. }));
    }
}
