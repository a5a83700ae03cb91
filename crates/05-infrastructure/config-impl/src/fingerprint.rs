//! 配置内容指纹
//!
//! 指纹只用于判断内容是否变化，不承担任何安全职责。

use config_common::ParameterSection;
use sha2::{Digest, Sha256};
use std::fmt;

/// 参数名与值之间的分隔符
const PAIR_SEPARATOR: char = '~';
/// 参数之间的分隔符
const ENTRY_SEPARATOR: char = '|';

/// 内容指纹（SHA-256）
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// 计算字节内容的指纹
    pub fn of(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hasher.finalize().into())
    }

    /// 计算参数节的指纹
    ///
    /// 按迭代顺序拼接 `name~value`，以 `|` 分隔。不做排序，
    /// 参数顺序变化同样视为内容变化。
    pub fn of_section(section: &ParameterSection) -> Self {
        Self::of(canonical_section(section).as_bytes())
    }

    /// 十六进制表示
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// 比较两个可能缺失的指纹
///
/// 任一方缺失即视为不相等，因此“无配置 → 有配置”总是一次变更。
pub fn fingerprints_equal(left: Option<&Fingerprint>, right: Option<&Fingerprint>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

fn canonical_section(section: &ParameterSection) -> String {
    let mut canonical = String::new();
    for (index, parameter) in section.iter().enumerate() {
        if index > 0 {
            canonical.push(ENTRY_SEPARATOR);
        }
        canonical.push_str(&parameter.name);
        canonical.push(PAIR_SEPARATOR);
        canonical.push_str(&parameter.value.value);
    }
    canonical
}
