//! 配置参数节数据模型
//!
//! 宿主环境已经将清单解析为 `(name, value, is_encrypted)` 三元组，
//! 这里只负责承载这些数据，不解析任何清单语法。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 参数值描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterValue {
    /// 原始字符串值（加密参数为密文）
    pub value: String,
    /// 是否为加密值
    #[serde(default)]
    pub is_encrypted: bool,
}

impl ParameterValue {
    /// 创建明文参数值
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_encrypted: false,
        }
    }

    /// 创建加密参数值
    pub fn encrypted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_encrypted: true,
        }
    }
}

/// 命名参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// 参数名（区分大小写）
    pub name: String,
    /// 参数值
    #[serde(flatten)]
    pub value: ParameterValue,
}

/// 参数节
///
/// 保持宿主给出的迭代顺序，指纹计算依赖这个顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSection {
    parameters: Vec<Parameter>,
}

impl ParameterSection {
    /// 创建空参数节
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加参数，同名参数会被原位替换
    pub fn insert(&mut self, name: impl Into<String>, value: ParameterValue) {
        let name = name.into();
        match self.parameters.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.parameters.push(Parameter { name, value }),
        }
    }

    /// 链式追加明文参数
    pub fn with_plain(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, ParameterValue::plain(value));
        self
    }

    /// 链式追加加密参数
    pub fn with_encrypted(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, ParameterValue::encrypted(value));
        self
    }

    /// 获取参数
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// 是否包含参数
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 按顺序迭代参数
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// 参数数量
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// 参数节集合，按节名索引
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSections {
    sections: HashMap<String, ParameterSection>,
}

impl ConfigSections {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入参数节
    pub fn insert(&mut self, name: impl Into<String>, section: ParameterSection) {
        self.sections.insert(name.into(), section);
    }

    /// 链式插入参数节
    pub fn with_section(mut self, name: impl Into<String>, section: ParameterSection) -> Self {
        self.insert(name, section);
        self
    }

    /// 获取参数节
    pub fn get(&self, name: &str) -> Option<&ParameterSection> {
        self.sections.get(name)
    }

    /// 节数量
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_preserves_insertion_order() {
        let section = ParameterSection::new()
            .with_plain("b", "2")
            .with_plain("a", "1")
            .with_encrypted("secret", "cipher");

        let names: Vec<&str> = section.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "secret"]);
        assert!(section.get("secret").unwrap().is_encrypted);
    }

    #[test]
    fn test_section_replaces_in_place() {
        let mut section = ParameterSection::new().with_plain("Port", "8080").with_plain("Host", "a");
        section.insert("Port", ParameterValue::plain("9090"));

        assert_eq!(section.len(), 2);
        assert_eq!(section.iter().next().unwrap().value.value, "9090");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let section = ParameterSection::new().with_plain("Port", "8080");
        assert!(section.contains("Port"));
        assert!(!section.contains("port"));
    }

    #[test]
    fn test_sections_deserialize_from_json() {
        let json = r#"{
            "Service": [
                { "name": "Port", "value": "8080" },
                { "name": "Key", "value": "abc", "is_encrypted": true }
            ]
        }"#;
        let sections: ConfigSections = serde_json::from_str(json).unwrap();
        let section = sections.get("Service").unwrap();
        assert_eq!(section.get("Port"), Some(&ParameterValue::plain("8080")));
        assert_eq!(section.get("Key"), Some(&ParameterValue::encrypted("abc")));
    }
}
