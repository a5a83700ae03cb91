//! # Configuration Common
//!
//! 配置快照存储的公共数据模型和错误类型。
//!
//! ## 核心类型
//!
//! - [`ParameterSection`] - 有序参数节
//! - [`ConfigSections`] - 按名称索引的参数节集合
//! - [`ConfigError`] - 配置错误类型

pub mod configuration;
pub mod errors;

pub use configuration::*;
pub use errors::*;
