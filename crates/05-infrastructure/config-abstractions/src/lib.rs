//! # Configuration Abstractions
//!
//! 配置快照存储抽象层，定义变更事件、监听器和宿主交互的核心接口。
//!
//! ## 核心接口
//!
//! - [`SectionChangeListener`] - 参数节变更监听器
//! - [`DocumentChangeListener`] - 配置文档变更监听器
//! - [`ConfigPackageListener`] - 配置包生命周期入口
//! - [`ConfigValueReader`] - 配置值读取接口
//! - [`SecretDecryptor`] - 加密参数解密接口

pub mod events;
pub mod package;
pub mod reader;

pub use events::*;
pub use package::*;
pub use reader::*;
