//! 配置快照存储实现

use crate::loader::{ConfigPackageLoader, DocumentCandidate, SectionCandidate};
use crate::notifier::ChangeNotifier;
use crate::options::SnapshotStoreOptions;
use crate::snapshot::{ConfigSnapshot, SnapshotCell, SnapshotHalf, StoreState};
use config_abstractions::{
    ConfigDocument, ConfigValueReader, DocumentChangeListener, DocumentChangedEvent,
    SecretDecryptor, SectionChangeListener, SectionChangedEvent,
};
use config_common::{ConfigError, ConfigResult, ConfigSections, ParameterSection, ParameterValue};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 一次加载的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// 参数节是否变更
    pub section_changed: bool,
    /// 配置文档是否变更
    pub document_changed: bool,
}

impl LoadOutcome {
    /// 是否有任何变更
    pub fn is_changed(&self) -> bool {
        self.section_changed || self.document_changed
    }
}

/// 配置快照存储
///
/// 缓存参数节与配置文档两份快照，只有内容指纹变化时才替换缓存并通知监听器。
/// 监听器在新值可见之后、`load` 返回之前同步执行。
pub struct ConfigSnapshotStore<T> {
    options: SnapshotStoreOptions,
    loader: ConfigPackageLoader,
    section: SnapshotCell<ParameterSection>,
    document: SnapshotCell<T>,
    notifier: ChangeNotifier<T>,
    decryptor: Option<Arc<dyn SecretDecryptor>>,
}

impl<T> std::fmt::Debug for ConfigSnapshotStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSnapshotStore")
            .field("options", &self.options)
            .field("section_loaded", &self.section.load().is_some())
            .field("document_loaded", &self.document.load().is_some())
            .field("section_listeners", &self.notifier.section_listener_count())
            .field("document_listeners", &self.notifier.document_listener_count())
            .field("has_decryptor", &self.decryptor.is_some())
            .finish()
    }
}

impl<T: ConfigDocument> ConfigSnapshotStore<T> {
    /// 创建新的空存储
    ///
    /// # Errors
    ///
    /// 选项无效时返回 `ConfigError::ArgumentInvalid`。
    pub fn new(options: SnapshotStoreOptions) -> ConfigResult<Self> {
        options.validate()?;
        info!("创建配置快照存储: {}", options.logical_name);

        Ok(Self {
            loader: ConfigPackageLoader::new(
                options.logical_name.clone(),
                options.document_extension.clone(),
            ),
            options,
            section: SnapshotCell::new(),
            document: SnapshotCell::new(),
            notifier: ChangeNotifier::new(),
            decryptor: None,
        })
    }

    /// 使用逻辑名创建存储
    ///
    /// # Errors
    ///
    /// 逻辑名为空白时返回 `ConfigError::ArgumentInvalid`。
    pub fn with_logical_name(logical_name: impl Into<String>) -> ConfigResult<Self> {
        Self::new(SnapshotStoreOptions::new(logical_name))
    }

    /// 设置加密参数解密器
    pub fn with_decryptor(mut self, decryptor: Arc<dyn SecretDecryptor>) -> Self {
        info!("设置加密参数解密器: {}", decryptor.name());
        self.decryptor = Some(decryptor);
        self
    }

    /// 逻辑名
    pub fn logical_name(&self) -> &str {
        &self.options.logical_name
    }

    /// 存储选项
    pub fn options(&self) -> &SnapshotStoreOptions {
        &self.options
    }

    /// 加载配置包
    ///
    /// 参数节缺失或文档文件不存在时对应的一半保持不变。
    ///
    /// # Errors
    ///
    /// - 路径无效时返回 `ConfigError::ArgumentInvalid`，此时不做任何读取；
    /// - 文档读取失败返回 `ConfigError::FileReadError`；
    /// - 文档解析失败返回 `ConfigError::ParseError`，缓存保持不变；
    /// - 监听器失败返回 `ConfigError::ListenerFailed`，新值已经生效。
    pub fn load(
        &self,
        path: impl AsRef<Path>,
        sections: &ConfigSections,
    ) -> ConfigResult<LoadOutcome> {
        let path = path.as_ref();
        ConfigPackageLoader::validate_path(path)?;
        debug!("加载配置包: {} -> {}", self.logical_name(), path.display());

        let mut outcome = LoadOutcome::default();

        match self.loader.read_section(sections) {
            Some(candidate) => outcome.section_changed = self.apply_section(candidate)?,
            None => debug!("配置包中没有参数节: {}", self.logical_name()),
        }

        match self.loader.read_document(path)? {
            Some(candidate) => outcome.document_changed = self.apply_document(&candidate)?,
            None => debug!(
                "配置文档不存在: {}",
                self.loader.document_path(path).display()
            ),
        }

        Ok(outcome)
    }

    fn apply_section(&self, candidate: SectionCandidate) -> ConfigResult<bool> {
        let _writer = self.section.lock_writer();
        if self.section.matches(&candidate.fingerprint) {
            debug!("参数节内容未变化: {}", self.logical_name());
            return Ok(false);
        }

        info!(
            "参数节已变更: {} (指纹 {})",
            self.logical_name(),
            candidate.fingerprint
        );
        self.section
            .replace(SnapshotHalf::new(candidate.section, candidate.fingerprint));
        self.notifier
            .notify_section_changed(&SectionChangedEvent::new(self.logical_name()))?;
        Ok(true)
    }

    fn apply_document(&self, candidate: &DocumentCandidate) -> ConfigResult<bool> {
        // 内容未变化时不重复解析
        if self.document.matches(&candidate.fingerprint) {
            debug!("配置文档内容未变化: {}", candidate.path.display());
            return Ok(false);
        }

        let value: T = candidate.deserialize()?;

        let _writer = self.document.lock_writer();
        if self.document.matches(&candidate.fingerprint) {
            debug!("配置文档已被并发加载: {}", candidate.path.display());
            return Ok(false);
        }

        info!(
            "配置文档已变更: {} (指纹 {})",
            candidate.path.display(),
            candidate.fingerprint
        );
        let half = SnapshotHalf::new(value, candidate.fingerprint);
        let current = Arc::clone(half.value());
        let previous = self
            .document
            .replace(half)
            .map(|previous| Arc::clone(previous.value()));

        self.notifier
            .notify_document_changed(&DocumentChangedEvent::replaced(
                self.logical_name(),
                previous,
                current,
            ))?;
        Ok(true)
    }

    /// 清空两份快照
    ///
    /// 每个原本存在的一半都会触发一次对应的变更事件，指纹一并清除，
    /// 之后重新加载相同内容会被视为变更。两半都清空之后才分发事件，
    /// 监听器失败不会留下只清了一半的存储。
    ///
    /// # Errors
    ///
    /// 监听器失败时返回第一个 `ConfigError::ListenerFailed`，两类事件都会尝试分发。
    pub fn clear(&self) -> ConfigResult<LoadOutcome> {
        let section_writer = self.section.lock_writer();
        let document_writer = self.document.lock_writer();
        let previous_section = self.section.take();
        let previous_document = self.document.take();

        let outcome = LoadOutcome {
            section_changed: previous_section.is_some(),
            document_changed: previous_document.is_some(),
        };

        let section_result = if outcome.section_changed {
            warn!("参数节已清除: {}", self.logical_name());
            self.notifier
                .notify_section_changed(&SectionChangedEvent::new(self.logical_name()))
        } else {
            Ok(())
        };
        drop(section_writer);

        let document_result = match previous_document {
            Some(previous) => {
                warn!("配置文档已清除: {}", self.logical_name());
                self.notifier
                    .notify_document_changed(&DocumentChangedEvent::cleared(
                        self.logical_name(),
                        Arc::clone(previous.value()),
                    ))
            }
            None => Ok(()),
        };
        drop(document_writer);

        section_result.and(document_result).map(|()| outcome)
    }

    /// 当前快照
    pub fn snapshot(&self) -> ConfigSnapshot<T> {
        ConfigSnapshot::new(self.section.load(), self.document.load())
    }

    /// 当前参数节
    pub fn section(&self) -> Option<Arc<ParameterSection>> {
        self.section.load().map(|half| Arc::clone(half.value()))
    }

    /// 当前配置文档
    pub fn document(&self) -> Option<Arc<T>> {
        self.document.load().map(|half| Arc::clone(half.value()))
    }

    /// 存储状态
    pub fn state(&self) -> StoreState {
        self.snapshot().state()
    }

    /// 读取并解密参数
    ///
    /// 明文参数原样返回，加密参数交给解密器处理。
    ///
    /// # Errors
    ///
    /// - 键为空白时返回 `ConfigError::ArgumentInvalid`；
    /// - 参数已加密但未配置解密器时返回 `ConfigError::DecryptorMissing`；
    /// - 解密失败时返回 `ConfigError::DecryptionFailed`。
    pub fn get_secret_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let Some(parameter) = self.lookup(key)? else {
            return Ok(None);
        };
        if !parameter.is_encrypted {
            return Ok(Some(parameter.value));
        }

        let decryptor = self
            .decryptor
            .as_ref()
            .ok_or_else(|| ConfigError::DecryptorMissing {
                key: key.to_string(),
            })?;
        decryptor
            .decrypt(&parameter.value)
            .map(Some)
            .map_err(|source| ConfigError::DecryptionFailed {
                key: key.to_string(),
                source,
            })
    }

    /// 注册参数节监听器
    pub fn register_section_listener(&self, listener: Arc<dyn SectionChangeListener>) {
        self.notifier.register_section_listener(listener);
    }

    /// 注册文档监听器
    pub fn register_document_listener(&self, listener: Arc<dyn DocumentChangeListener<T>>) {
        self.notifier.register_document_listener(listener);
    }

    /// 按名称移除参数节监听器
    pub fn unregister_section_listener(&self, listener_name: &str) -> bool {
        self.notifier.unregister_section_listener(listener_name)
    }

    /// 按名称移除文档监听器
    pub fn unregister_document_listener(&self, listener_name: &str) -> bool {
        self.notifier.unregister_document_listener(listener_name)
    }

    /// 参数节监听器数量
    pub fn section_listener_count(&self) -> usize {
        self.notifier.section_listener_count()
    }

    /// 文档监听器数量
    pub fn document_listener_count(&self) -> usize {
        self.notifier.document_listener_count()
    }
}

impl<T: ConfigDocument> ConfigValueReader for ConfigSnapshotStore<T> {
    fn lookup(&self, key: &str) -> ConfigResult<Option<ParameterValue>> {
        if key.trim().is_empty() {
            return Err(ConfigError::argument_invalid("key", "配置键不能为空"));
        }
        Ok(self
            .section
            .load()
            .and_then(|half| half.value().get(key).cloned()))
    }

    fn get_value(&self, key: &str, default_value: &str) -> String {
        match self.lookup(key) {
            Ok(Some(parameter)) => parameter.value,
            Ok(None) => default_value.to_string(),
            Err(e) => {
                warn!("读取配置值失败，使用默认值: {}", e);
                default_value.to_string()
            }
        }
    }
}
