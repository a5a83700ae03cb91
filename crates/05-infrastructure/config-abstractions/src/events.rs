//! 配置变更事件定义

use config_common::ListenerError;
use std::sync::Arc;

/// 配置文档约束
///
/// 文档类型对存储而言是不透明的，只需要能从 JSON 反序列化并跨线程共享。
pub trait ConfigDocument: serde::de::DeserializeOwned + Send + Sync + 'static {}

impl<T> ConfigDocument for T where T: serde::de::DeserializeOwned + Send + Sync + 'static {}

/// 参数节变更信号
///
/// 除了发生变更的逻辑名外不携带负载，监听器需要时自行回读存储。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionChangedEvent {
    /// 逻辑名
    pub name: String,
    /// 事件时间
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl SectionChangedEvent {
    /// 创建参数节变更信号
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 配置文档变更事件
#[derive(Debug)]
pub struct DocumentChangedEvent<T> {
    /// 逻辑名
    pub name: String,
    /// 变更前的文档
    pub previous: Option<Arc<T>>,
    /// 变更后的文档，仅在清除策略下为空
    pub current: Option<Arc<T>>,
    /// 事件时间
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> DocumentChangedEvent<T> {
    /// 创建文档替换事件
    pub fn replaced(name: impl Into<String>, previous: Option<Arc<T>>, current: Arc<T>) -> Self {
        Self {
            name: name.into(),
            previous,
            current: Some(current),
            timestamp: chrono::Utc::now(),
        }
    }

    /// 创建文档清除事件
    pub fn cleared(name: impl Into<String>, previous: Arc<T>) -> Self {
        Self {
            name: name.into(),
            previous: Some(previous),
            current: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// 是否为首次加载
    pub fn is_initial(&self) -> bool {
        self.previous.is_none()
    }

    /// 是否为清除事件
    pub fn is_cleared(&self) -> bool {
        self.current.is_none()
    }
}

impl<T> Clone for DocumentChangedEvent<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            previous: self.previous.clone(),
            current: self.current.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// 参数节变更监听器 trait
pub trait SectionChangeListener: Send + Sync {
    /// 处理参数节变更
    ///
    /// # Errors
    ///
    /// 返回的错误会中止后续监听器并传递给 `load` 的调用方。
    fn on_section_changed(&self, event: &SectionChangedEvent) -> Result<(), ListenerError>;

    /// 获取监听器名称
    fn name(&self) -> &str;
}

/// 配置文档变更监听器 trait
pub trait DocumentChangeListener<T>: Send + Sync {
    /// 处理文档变更
    ///
    /// # Errors
    ///
    /// 返回的错误会中止后续监听器并传递给 `load` 的调用方。
    fn on_document_changed(&self, event: &DocumentChangedEvent<T>) -> Result<(), ListenerError>;

    /// 获取监听器名称
    fn name(&self) -> &str;
}

/// 基于闭包的参数节监听器
pub struct FnSectionListener<F> {
    name: String,
    callback: F,
}

impl<F> FnSectionListener<F>
where
    F: Fn(&SectionChangedEvent) -> Result<(), ListenerError> + Send + Sync,
{
    /// 创建闭包监听器
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> SectionChangeListener for FnSectionListener<F>
where
    F: Fn(&SectionChangedEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_section_changed(&self, event: &SectionChangedEvent) -> Result<(), ListenerError> {
        (self.callback)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 基于闭包的文档监听器
pub struct FnDocumentListener<F> {
    name: String,
    callback: F,
}

impl<F> FnDocumentListener<F> {
    /// 创建闭包监听器
    pub fn new<T>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&DocumentChangedEvent<T>) -> Result<(), ListenerError> + Send + Sync,
    {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<T, F> DocumentChangeListener<T> for FnDocumentListener<F>
where
    F: Fn(&DocumentChangedEvent<T>) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_document_changed(&self, event: &DocumentChangedEvent<T>) -> Result<(), ListenerError> {
        (self.callback)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
