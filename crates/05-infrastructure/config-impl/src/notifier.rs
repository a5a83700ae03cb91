//! 配置变更通知器实现

use config_abstractions::{
    DocumentChangeListener, DocumentChangedEvent, SectionChangeListener, SectionChangedEvent,
};
use config_common::{ConfigError, ConfigResult, ListenerError};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 监听器列表
///
/// 按注册顺序同步分发事件。分发前先复制列表，监听器回调中可以继续注册监听器。
pub struct ListenerRegistry<L: ?Sized> {
    listeners: RwLock<Vec<Arc<L>>>,
}

impl<L: ?Sized> ListenerRegistry<L> {
    /// 创建空的监听器列表
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// 注册监听器
    pub fn register(&self, listener: Arc<L>) {
        self.listeners.write().push(listener);
    }

    /// 获取监听器数量
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// 是否没有监听器
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    fn snapshot(&self) -> Vec<Arc<L>> {
        self.listeners.read().clone()
    }

    /// 按注册顺序分发，遇到第一个错误即停止
    fn dispatch<F>(&self, name_of: impl Fn(&L) -> String, mut deliver: F) -> ConfigResult<()>
    where
        F: FnMut(&L) -> Result<(), ListenerError>,
    {
        for listener in self.snapshot() {
            if let Err(source) = deliver(&*listener) {
                let listener = name_of(&*listener);
                warn!("配置变更监听器执行失败: {} - {}", listener, source);
                return Err(ConfigError::ListenerFailed { listener, source });
            }
        }
        Ok(())
    }

    fn remove_where(&self, predicate: impl Fn(&L) -> bool) -> bool {
        let mut listeners = self.listeners.write();
        let initial_count = listeners.len();
        listeners.retain(|listener| !predicate(listener.as_ref()));
        listeners.len() < initial_count
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// 配置变更通知器
///
/// 参数节与配置文档各自维护独立的监听器列表。
pub struct ChangeNotifier<T> {
    section_listeners: ListenerRegistry<dyn SectionChangeListener>,
    document_listeners: ListenerRegistry<dyn DocumentChangeListener<T>>,
}

impl<T> ChangeNotifier<T> {
    /// 创建新的通知器
    pub fn new() -> Self {
        Self {
            section_listeners: ListenerRegistry::new(),
            document_listeners: ListenerRegistry::new(),
        }
    }

    /// 注册参数节监听器
    pub fn register_section_listener(&self, listener: Arc<dyn SectionChangeListener>) {
        info!("注册参数节变更监听器: {}", listener.name());
        self.section_listeners.register(listener);
    }

    /// 注册文档监听器
    pub fn register_document_listener(&self, listener: Arc<dyn DocumentChangeListener<T>>) {
        info!("注册配置文档变更监听器: {}", listener.name());
        self.document_listeners.register(listener);
    }

    /// 按名称移除参数节监听器
    pub fn unregister_section_listener(&self, listener_name: &str) -> bool {
        let removed = self
            .section_listeners
            .remove_where(|listener| listener.name() == listener_name);
        if removed {
            info!("移除参数节变更监听器: {}", listener_name);
        }
        removed
    }

    /// 按名称移除文档监听器
    pub fn unregister_document_listener(&self, listener_name: &str) -> bool {
        let removed = self
            .document_listeners
            .remove_where(|listener| listener.name() == listener_name);
        if removed {
            info!("移除配置文档变更监听器: {}", listener_name);
        }
        removed
    }

    /// 参数节监听器数量
    pub fn section_listener_count(&self) -> usize {
        self.section_listeners.len()
    }

    /// 文档监听器数量
    pub fn document_listener_count(&self) -> usize {
        self.document_listeners.len()
    }

    /// 分发参数节变更信号
    ///
    /// # Errors
    ///
    /// 任一监听器失败时返回 `ConfigError::ListenerFailed`，后续监听器不再执行。
    pub fn notify_section_changed(&self, event: &SectionChangedEvent) -> ConfigResult<()> {
        debug!(
            "分发参数节变更信号: {} -> {} 个监听器",
            event.name,
            self.section_listeners.len()
        );
        self.section_listeners.dispatch(
            |listener| listener.name().to_string(),
            |listener| listener.on_section_changed(event),
        )
    }

    /// 分发文档变更事件
    ///
    /// # Errors
    ///
    /// 任一监听器失败时返回 `ConfigError::ListenerFailed`，后续监听器不再执行。
    pub fn notify_document_changed(&self, event: &DocumentChangedEvent<T>) -> ConfigResult<()> {
        debug!(
            "分发配置文档变更事件: {} -> {} 个监听器",
            event.name,
            self.document_listeners.len()
        );
        self.document_listeners.dispatch(
            |listener| listener.name().to_string(),
            |listener| listener.on_document_changed(event),
        )
    }
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志记录监听器
///
/// 将两类配置变更事件记录到日志中
#[derive(Debug, Clone)]
pub struct LoggingChangeListener {
    name: String,
}

impl LoggingChangeListener {
    /// 创建新的日志记录监听器
    pub fn new() -> Self {
        Self {
            name: "LoggingChangeListener".to_string(),
        }
    }
}

impl Default for LoggingChangeListener {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionChangeListener for LoggingChangeListener {
    fn on_section_changed(&self, event: &SectionChangedEvent) -> Result<(), ListenerError> {
        info!("参数节变更: {} at {}", event.name, event.timestamp);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T> DocumentChangeListener<T> for LoggingChangeListener {
    fn on_document_changed(&self, event: &DocumentChangedEvent<T>) -> Result<(), ListenerError> {
        if event.is_cleared() {
            warn!("配置文档清除: {} at {}", event.name, event.timestamp);
        } else if event.is_initial() {
            info!("配置文档加载: {} at {}", event.name, event.timestamp);
        } else {
            info!("配置文档更新: {} at {}", event.name, event.timestamp);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
