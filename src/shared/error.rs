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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, StackError>;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing required configuration value '{key}'")]
    MissingConfig { key: String },

    #[error("Invalid value for configuration key '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("Declaration of '{resource}' failed: {reason}")]
    Declaration { resource: String, reason: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Engine binary '{0}' not found in PATH")]
    EngineNotFound(String),

    #[error("Engine command '{command}' failed: {stderr}")]
    EngineCommandFailed { command: String, stderr: String },

    #[error("Stack output '{0}' not found")]
    OutputNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl StackError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn declaration(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Declaration {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    pub fn engine_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::EngineCommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}
