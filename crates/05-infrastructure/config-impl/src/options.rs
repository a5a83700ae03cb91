//! 配置快照存储选项

use config_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "CONFIG_SNAPSHOT";

/// 配置包删除时的处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// 与添加、修改一样走一次加载，缓存只增不减
    #[default]
    Reload,
    /// 清空两个快照并重置指纹
    Clear,
}

/// 配置快照存储选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotStoreOptions {
    /// 逻辑名，用于定位参数节和配置文档
    pub logical_name: String,
    /// 配置文档扩展名
    pub document_extension: String,
    /// 删除策略
    pub removal_policy: RemovalPolicy,
}

impl Default for SnapshotStoreOptions {
    fn default() -> Self {
        Self {
            logical_name: String::new(),
            document_extension: "json".to_string(),
            removal_policy: RemovalPolicy::Reload,
        }
    }
}

impl SnapshotStoreOptions {
    /// 使用逻辑名创建选项
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            ..Self::default()
        }
    }

    /// 从服务地址创建选项
    ///
    /// 逻辑名取地址的最后一段，例如 `fabric:/App/Service` 对应 `Service`。
    ///
    /// # Errors
    ///
    /// 地址中没有可用的路径段时返回 `ConfigError::ArgumentInvalid`。
    pub fn from_service_address(address: &str) -> ConfigResult<Self> {
        Ok(Self::new(logical_name_from_address(address)?))
    }

    /// 从配置文件和环境变量加载选项
    ///
    /// 文件可选，`CONFIG_SNAPSHOT_*` 环境变量覆盖文件中的值。
    ///
    /// # Errors
    ///
    /// 配置源无法解析或选项无效时返回错误。
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_from(config::Config::builder(), path)
    }

    /// 加载选项，未配置逻辑名时取服务地址的最后一段
    ///
    /// # Errors
    ///
    /// 服务地址无法解析、配置源无法解析或选项无效时返回错误。
    pub fn load_for_address(path: Option<&Path>, address: &str) -> ConfigResult<Self> {
        let builder = config::Config::builder()
            .set_default("logical_name", logical_name_from_address(address)?)?;
        Self::load_from(builder, path)
    }

    fn load_from(
        mut builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> ConfigResult<Self> {
        if let Some(path) = path {
            debug!("加载存储选项文件: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let options: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        options.validate()?;
        Ok(options)
    }

    /// 设置文档扩展名
    pub fn with_document_extension(mut self, extension: impl Into<String>) -> Self {
        self.document_extension = extension.into();
        self
    }

    /// 设置删除策略
    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    /// 校验选项
    ///
    /// # Errors
    ///
    /// 逻辑名或扩展名为空白时返回 `ConfigError::ArgumentInvalid`。
    pub fn validate(&self) -> ConfigResult<()> {
        if self.logical_name.trim().is_empty() {
            return Err(ConfigError::argument_invalid("logical_name", "逻辑名不能为空"));
        }
        if self.document_extension.trim().is_empty() {
            return Err(ConfigError::argument_invalid(
                "document_extension",
                "文档扩展名不能为空",
            ));
        }
        Ok(())
    }
}

/// 从服务地址中提取逻辑名
///
/// # Errors
///
/// 地址中没有可用的路径段时返回 `ConfigError::ArgumentInvalid`。
pub fn logical_name_from_address(address: &str) -> ConfigResult<String> {
    address
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && !segment.ends_with(':'))
        .map(str::to_string)
        .ok_or_else(|| {
            ConfigError::argument_invalid("address", format!("无法从服务地址解析逻辑名: {address}"))
        })
}
