//! 配置快照
//!
//! 值与指纹封装在同一个不可变的 [`SnapshotHalf`] 中整体替换，
//! 读取方拿到的要么是变更前的一对，要么是变更后的一对。

use crate::fingerprint::{fingerprints_equal, Fingerprint};
use arc_swap::ArcSwapOption;
use config_common::ParameterSection;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// 快照的一半：值及其指纹
#[derive(Debug)]
pub struct SnapshotHalf<V> {
    value: Arc<V>,
    fingerprint: Fingerprint,
}

impl<V> SnapshotHalf<V> {
    /// 创建快照
    pub fn new(value: V, fingerprint: Fingerprint) -> Self {
        Self {
            value: Arc::new(value),
            fingerprint,
        }
    }

    /// 缓存的值
    pub fn value(&self) -> &Arc<V> {
        &self.value
    }

    /// 值的指纹
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// 存储状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// 两半都未加载
    Empty,
    /// 只加载了其中一半
    PartiallyLoaded,
    /// 两半都已加载
    Loaded,
}

/// 配置快照的只读视图
#[derive(Debug)]
pub struct ConfigSnapshot<T> {
    section: Option<Arc<SnapshotHalf<ParameterSection>>>,
    document: Option<Arc<SnapshotHalf<T>>>,
}

impl<T> ConfigSnapshot<T> {
    pub(crate) fn new(
        section: Option<Arc<SnapshotHalf<ParameterSection>>>,
        document: Option<Arc<SnapshotHalf<T>>>,
    ) -> Self {
        Self { section, document }
    }

    /// 参数节
    pub fn section(&self) -> Option<&Arc<ParameterSection>> {
        self.section.as_ref().map(|half| half.value())
    }

    /// 参数节指纹
    pub fn section_fingerprint(&self) -> Option<&Fingerprint> {
        self.section.as_ref().map(|half| half.fingerprint())
    }

    /// 配置文档
    pub fn document(&self) -> Option<&Arc<T>> {
        self.document.as_ref().map(|half| half.value())
    }

    /// 配置文档指纹
    pub fn document_fingerprint(&self) -> Option<&Fingerprint> {
        self.document.as_ref().map(|half| half.fingerprint())
    }

    /// 存储状态
    pub fn state(&self) -> StoreState {
        match (self.section.is_some(), self.document.is_some()) {
            (false, false) => StoreState::Empty,
            (true, true) => StoreState::Loaded,
            _ => StoreState::PartiallyLoaded,
        }
    }
}

impl<T> Clone for ConfigSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            section: self.section.clone(),
            document: self.document.clone(),
        }
    }
}

/// 快照单元
///
/// 读取无锁；写入方先持有 `writer` 再比较并替换，同一半的变更串行化。
pub(crate) struct SnapshotCell<V> {
    current: ArcSwapOption<SnapshotHalf<V>>,
    writer: Mutex<()>,
}

impl<V> SnapshotCell<V> {
    pub(crate) fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            writer: Mutex::new(()),
        }
    }

    pub(crate) fn load(&self) -> Option<Arc<SnapshotHalf<V>>> {
        self.current.load_full()
    }

    /// 缓存指纹是否与给定指纹相同
    pub(crate) fn matches(&self, fingerprint: &Fingerprint) -> bool {
        let guard = self.current.load();
        let cached = guard.as_deref().map(|half| &half.fingerprint);
        fingerprints_equal(cached, Some(fingerprint))
    }

    pub(crate) fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock()
    }

    /// 替换快照并返回旧值，调用方需持有写锁
    pub(crate) fn replace(&self, half: SnapshotHalf<V>) -> Option<Arc<SnapshotHalf<V>>> {
        self.current.swap(Some(Arc::new(half)))
    }

    /// 清空快照并返回旧值，调用方需持有写锁
    pub(crate) fn take(&self) -> Option<Arc<SnapshotHalf<V>>> {
        self.current.swap(None)
    }
}
