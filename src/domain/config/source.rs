// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Key-value configuration sources

use crate::shared::error::{Result, StackError};
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use std::collections::{BTreeMap, HashMap};
use std::fs::read_to_string;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Plain(String),
    /// Ciphertext only the engine can decrypt.
    Secure(String),
}

impl ConfigValue {
    pub fn is_secure(&self) -> bool {
        matches!(self, ConfigValue::Secure(_))
    }
}

pub trait ConfigSource: Send + Sync {
    fn lookup(&self, key: &str) -> Option<ConfigValue>;
}

impl ConfigSource for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<ConfigValue> {
        self.get(key).cloned().map(ConfigValue::Plain)
    }
}

#[derive(Debug, Deserialize)]
struct RawStackFile {
    #[serde(default)]
    config: BTreeMap<String, YamlValue>,
}

/// Values of a `Pulumi.<stack>.yaml` file.
///
/// Keys in the project namespace (`<project>:key`) or without a namespace are
/// stored bare; keys of other namespaces (`aws:region`) keep their prefix.
#[derive(Debug, Clone, Default)]
pub struct StackFile {
    values: BTreeMap<String, ConfigValue>,
}

impl StackFile {
    pub fn load<P: AsRef<Path>>(path: P, project: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            StackError::config_error(format!(
                "Failed to read stack file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content, project)
    }

    pub fn from_yaml_str(content: &str, project: &str) -> Result<Self> {
        let raw: RawStackFile = serde_yaml::from_str(content)?;
        let mut values = BTreeMap::new();

        for (key, value) in raw.config {
            let key = match key.split_once(':') {
                Some((namespace, bare)) if namespace == project => bare.to_string(),
                _ => key,
            };
            let value = convert_value(&key, value)?;
            values.insert(key, value);
        }

        Ok(Self { values })
    }

    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for StackFile {
    fn lookup(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }
}

fn convert_value(key: &str, value: YamlValue) -> Result<ConfigValue> {
    match value {
        YamlValue::String(s) => Ok(ConfigValue::Plain(s)),
        YamlValue::Bool(b) => Ok(ConfigValue::Plain(b.to_string())),
        YamlValue::Number(n) => Ok(ConfigValue::Plain(n.to_string())),
        YamlValue::Mapping(ref map) => {
            if let Some(YamlValue::String(cipher)) = map.get("secure") {
                return Ok(ConfigValue::Secure(cipher.clone()));
            }
            Ok(ConfigValue::Plain(serde_json::to_string(&value)?))
        }
        YamlValue::Sequence(_) => Ok(ConfigValue::Plain(serde_json::to_string(&value)?)),
        YamlValue::Null | YamlValue::Tagged(_) => Err(StackError::invalid_config(
            key,
            "expected a string, bool, number or secure value",
        )),
    }
}
