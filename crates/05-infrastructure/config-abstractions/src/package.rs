//! 配置包生命周期抽象接口
//!
//! 宿主的编排运行时负责投递配置包的添加、修改和删除事件，
//! 这里只定义投递的入口。

use async_trait::async_trait;
use config_common::{ConfigResult, ConfigSections};
use std::path::PathBuf;

/// 配置包
///
/// 一个配置包由所在目录和宿主解析好的参数节组成。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPackage {
    /// 包名称
    pub name: String,
    /// 包版本
    pub version: String,
    /// 包目录
    pub path: PathBuf,
    /// 参数节集合
    pub sections: ConfigSections,
}

impl ConfigPackage {
    /// 创建新的配置包
    pub fn new(path: impl Into<PathBuf>, sections: ConfigSections) -> Self {
        Self {
            name: "Config".to_string(),
            version: "1.0.0".to_string(),
            path: path.into(),
            sections,
        }
    }

    /// 设置包名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置包版本
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// 配置包生命周期监听器 trait
#[async_trait]
pub trait ConfigPackageListener: Send + Sync {
    /// 配置包已添加
    async fn on_package_added(&self, package: ConfigPackage) -> ConfigResult<()>;

    /// 配置包已修改
    async fn on_package_modified(
        &self,
        old_package: ConfigPackage,
        new_package: ConfigPackage,
    ) -> ConfigResult<()>;

    /// 配置包已删除
    async fn on_package_removed(&self, package: ConfigPackage) -> ConfigResult<()>;
}
