//! 配置包生命周期事件路由
//!
//! 添加、修改、删除三类事件都归一为一次 `load`，旧包内容不参与比较。

use crate::options::RemovalPolicy;
use crate::store::{ConfigSnapshotStore, LoadOutcome};
use async_trait::async_trait;
use config_abstractions::{ConfigDocument, ConfigPackage, ConfigPackageListener};
use config_common::{ConfigError, ConfigResult};
use std::sync::Arc;
use tracing::{debug, info};

/// 配置包事件路由器
pub struct PackageEventRouter<T> {
    store: Arc<ConfigSnapshotStore<T>>,
}

impl<T> std::fmt::Debug for PackageEventRouter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageEventRouter")
            .field("store", &self.store)
            .finish()
    }
}

impl<T: ConfigDocument> PackageEventRouter<T> {
    /// 创建新的路由器
    pub fn new(store: Arc<ConfigSnapshotStore<T>>) -> Self {
        Self { store }
    }

    /// 目标存储
    pub fn store(&self) -> &Arc<ConfigSnapshotStore<T>> {
        &self.store
    }

    /// 在阻塞线程池中加载配置包
    ///
    /// # Errors
    ///
    /// 返回存储加载的错误；任务本身失败时返回 `ConfigError::TaskFailed`。
    pub async fn load_package(&self, package: ConfigPackage) -> ConfigResult<LoadOutcome> {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || {
            store.load(&package.path, &package.sections)
        })
        .await
        .map_err(|e| ConfigError::TaskFailed {
            message: e.to_string(),
        })??;

        debug!(
            "配置包加载完成: {} (参数节变更: {}, 文档变更: {})",
            self.store.logical_name(),
            outcome.section_changed,
            outcome.document_changed
        );
        Ok(outcome)
    }

    async fn clear_store(&self) -> ConfigResult<LoadOutcome> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.clear())
            .await
            .map_err(|e| ConfigError::TaskFailed {
                message: e.to_string(),
            })?
    }
}

#[async_trait]
impl<T: ConfigDocument> ConfigPackageListener for PackageEventRouter<T> {
    async fn on_package_added(&self, package: ConfigPackage) -> ConfigResult<()> {
        info!("配置包已添加: {} {}", package.name, package.version);
        self.load_package(package).await.map(|_| ())
    }

    async fn on_package_modified(
        &self,
        old_package: ConfigPackage,
        new_package: ConfigPackage,
    ) -> ConfigResult<()> {
        info!(
            "配置包已修改: {} {} -> {}",
            new_package.name, old_package.version, new_package.version
        );
        self.load_package(new_package).await.map(|_| ())
    }

    async fn on_package_removed(&self, package: ConfigPackage) -> ConfigResult<()> {
        info!("配置包已删除: {} {}", package.name, package.version);
        match self.store.options().removal_policy {
            RemovalPolicy::Reload => self.load_package(package).await.map(|_| ()),
            RemovalPolicy::Clear => self.clear_store().await.map(|_| ()),
        }
    }
}
