//! # Configuration Implementation
//!
//! 配置快照存储的具体实现：加载配置包、按内容指纹检测变更、同步通知监听器。
//!
//! ## 主要组件
//!
//! - [`ConfigSnapshotStore`] - 配置快照存储
//! - [`ConfigPackageLoader`] - 配置包加载器
//! - [`Fingerprint`] - 内容指纹
//! - [`ChangeNotifier`] - 变更通知器
//! - [`TypedValueAccessor`] - 类型化配置访问器
//! - [`PackageEventRouter`] - 配置包生命周期事件路由

pub mod accessors;
pub mod fingerprint;
pub mod loader;
pub mod notifier;
pub mod options;
pub mod package_events;
pub mod snapshot;
pub mod store;

pub use accessors::*;
pub use fingerprint::*;
pub use loader::*;
pub use notifier::*;
pub use options::*;
pub use package_events::*;
pub use snapshot::*;
pub use store::*;
