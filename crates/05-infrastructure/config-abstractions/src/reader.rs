//! 配置值读取抽象接口

use config_common::{ConfigResult, ParameterValue};

/// 配置值读取器 trait
///
/// 类型化访问器建立在 [`ConfigValueReader::get_value`] 之上。
pub trait ConfigValueReader: Send + Sync {
    /// 严格查找参数
    ///
    /// # Errors
    ///
    /// 键为空白时返回 `ConfigError::ArgumentInvalid`。
    fn lookup(&self, key: &str) -> ConfigResult<Option<ParameterValue>>;

    /// 获取参数字符串值
    ///
    /// 未加载参数节、键不存在或键为空白时返回 `default_value`。
    /// 加密参数按密文原样返回。
    fn get_value(&self, key: &str, default_value: &str) -> String;

    /// 是否包含参数
    fn contains_key(&self, key: &str) -> bool {
        matches!(self.lookup(key), Ok(Some(_)))
    }
}

/// 加密参数解密器 trait
///
/// 解密本身由宿主提供，存储只负责在读取时调用。
pub trait SecretDecryptor: Send + Sync {
    /// 解密密文
    ///
    /// # Errors
    ///
    /// 解密失败时返回错误。
    fn decrypt(&self, cipher_text: &str) -> Result<String, config_common::ListenerError>;

    /// 获取解密器名称
    fn name(&self) -> &str;
}
