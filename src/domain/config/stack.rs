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

//! Typed reads of stack configuration

use super::source::{ConfigSource, ConfigValue};
use crate::domain::graph::Value;
use crate::infrastructure::constants::*;
use crate::shared::error::{Result, StackError};

/// Typed accessor over a configuration source.
///
/// Values are read on demand so that keys of disabled blocks are never
/// touched.
pub struct StackConfig {
    source: Box<dyn ConfigSource>,
}

impl StackConfig {
    pub fn new(source: impl ConfigSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Plain string value; secure values are not readable here.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match self.source.lookup(key) {
            None => Ok(None),
            Some(ConfigValue::Plain(v)) => Ok(Some(v)),
            Some(ConfigValue::Secure(_)) => Err(StackError::invalid_config(
                key,
                "value is encrypted; only secrets may be stored securely",
            )),
        }
    }

    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key)?
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| StackError::missing_config(key))
    }

    /// Missing keys read as `false`.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.get(key)? {
            None => Ok(false),
            Some(v) => parse_bool(&v)
                .ok_or_else(|| StackError::invalid_config(key, format!("'{}' is not a boolean", v))),
        }
    }

    pub fn require_secret(&self, key: &str) -> Result<SecretRef> {
        match self.source.lookup(key) {
            None => Err(StackError::missing_config(key)),
            Some(ConfigValue::Secure(_)) => Ok(SecretRef::new(key)),
            Some(ConfigValue::Plain(v)) if v.trim().is_empty() => {
                Err(StackError::missing_config(key))
            }
            Some(ConfigValue::Plain(_)) => {
                tracing::warn!(key, "secret is stored in plaintext; use `pulumi config set --secret`");
                Ok(SecretRef::new(key))
            }
        }
    }
}

/// Accepts the same spellings as Go's `strconv.ParseBool`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Secret held by the engine; only its key ever enters the program.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretRef {
    key: String,
}

impl SecretRef {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn to_value(&self) -> Value {
        Value::Config(self.key.clone())
    }
}

impl std::fmt::Debug for SecretRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretRef({}: [secret])", self.key)
    }
}

// ============================================================================
// Inputs per declaration block
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackFlags {
    pub install_downstream_cluster: bool,
    pub install_fleet_clusters: bool,
}

impl StackFlags {
    pub fn read(config: &StackConfig) -> Result<Self> {
        Ok(Self {
            install_downstream_cluster: config.get_bool(KEY_INSTALL_DOWNSTREAM_CLUSTER)?,
            install_fleet_clusters: config.get_bool(KEY_INSTALL_FLEET_CLUSTERS)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamInputs {
    pub access_key: SecretRef,
    pub secret_key: SecretRef,
    pub instance_size: String,
}

impl DownstreamInputs {
    pub fn read(config: &StackConfig) -> Result<Self> {
        Ok(Self {
            access_key: config.require_secret(KEY_ACCESS_KEY)?,
            secret_key: config.require_secret(KEY_SECRET_KEY)?,
            instance_size: config.require(KEY_DOWNSTREAM_CLUSTER_SIZE)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetInputs {
    pub instance_size: String,
}

impl FleetInputs {
    pub fn read(config: &StackConfig) -> Result<Self> {
        Ok(Self {
            instance_size: config.require(KEY_FLEET_CLUSTERS_SIZE)?,
        })
    }
}
