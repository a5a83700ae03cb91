//! 错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 监听器返回的错误类型
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("参数无效: {argument}, 原因: {reason}")]
    ArgumentInvalid { argument: String, reason: String },

    #[error("配置文件读取失败: {}, 原因: {source}", .path.display())]
    FileReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("配置解析失败: {}, 原因: {source}", .path.display())]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("配置变更监听器执行失败: {listener}, 原因: {source}")]
    ListenerFailed {
        listener: String,
        source: ListenerError,
    },

    #[error("未配置解密器，无法读取加密配置: {key}")]
    DecryptorMissing { key: String },

    #[error("加密配置解密失败: {key}, 原因: {source}")]
    DecryptionFailed { key: String, source: ListenerError },

    #[error("配置选项加载失败: {source}")]
    OptionsError {
        #[from]
        source: config::ConfigError,
    },

    #[error("配置加载任务失败: {message}")]
    TaskFailed { message: String },
}

impl ConfigError {
    /// 创建参数无效错误
    pub fn argument_invalid(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArgumentInvalid {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// 是否为参数错误
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::ArgumentInvalid { .. })
    }

    /// 是否为 IO 错误
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::FileReadError { .. })
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_predicates() {
        let argument = ConfigError::argument_invalid("path", "不能为空");
        assert!(argument.is_argument_error());
        assert!(!argument.is_io_error());

        let io = ConfigError::FileReadError {
            path: PathBuf::from("/tmp/Service.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(io.is_io_error());
        assert!(io.to_string().contains("Service.json"));
    }
}
