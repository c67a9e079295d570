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

use super::settings::StackSettings;
use super::source::{ConfigValue, StackFile};
use crate::shared::error::{Result, StackError};
use std::collections::HashMap;

const SETTINGS_PREFIX: &str = "settings.";

/// Applies `-D key=value` overrides. `settings.*` keys change the settings,
/// every other key replaces a stack config value.
pub fn apply_overrides(
    configs: &HashMap<String, String>,
    stack_file: &mut StackFile,
    settings: &mut StackSettings,
) -> Result<()> {
    for (key, value) in configs {
        match key.strip_prefix(SETTINGS_PREFIX) {
            Some(field) => apply_to_settings(field, value, settings)?,
            None => stack_file.set(key.clone(), ConfigValue::Plain(value.clone())),
        }
    }
    Ok(())
}

pub fn apply_to_settings(field: &str, value: &str, settings: &mut StackSettings) -> Result<()> {
    match field {
        "project" => settings.project = value.to_string(),
        "name-prefix" => settings.name_prefix = value.to_string(),
        "region" => settings.region = value.to_string(),
        "vpc-cidr" => settings.vpc_cidr = value.to_string(),
        "zones" => settings.zones = parse_list(value),
        "ami" => settings.ami = value.to_string(),
        "key-pair" => settings.key_pair = value.to_string(),
        "cluster.description" => settings.cluster.description = value.to_string(),
        "cluster.network-plugin" => settings.cluster.network_plugin = value.to_string(),
        "cluster.kubernetes-version" => {
            settings.cluster.kubernetes_version =
                Some(value.to_string()).filter(|v| !v.is_empty())
        }
        "cluster.engine-install-url" => settings.cluster.engine_install_url = value.to_string(),
        "cluster.root-size" => settings.cluster.root_size = value.to_string(),
        "cluster.hostname-prefix" => {
            settings.cluster.hostname_prefix = Some(value.to_string()).filter(|v| !v.is_empty())
        }
        "cluster.nodes-per-pool" => {
            settings.cluster.nodes_per_pool = parse_number(field, value)?;
        }
        "cluster.state-confirm" => {
            settings.cluster.state_confirm = parse_number(field, value)?;
        }
        "fleet.size" => settings.fleet.size = parse_number(field, value)?,
        "fleet.k3s-version" => settings.fleet.k3s_version = value.to_string(),
        "addons.repo-name" => settings.addons.repo_name = value.to_string(),
        _ => {
            return Err(StackError::invalid_config(
                format!("{}{}", SETTINGS_PREFIX, field),
                "unknown setting",
            ))
        }
    }
    Ok(())
}

/// Parse dynamic configuration properties from -D key=value format
pub fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();

    for config in configs {
        let (key, value) = config.split_once('=').ok_or_else(|| {
            StackError::config_error(format!(
                "Invalid config format: '{}'. Expected 'key=value'",
                config
            ))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(StackError::config_error(format!(
                "Empty key in config: '{}'",
                config
            )));
        }

        map.insert(key.to_string(), value.trim().to_string());
    }

    Ok(map)
}

fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        StackError::invalid_config(
            format!("{}{}", SETTINGS_PREFIX, field),
            format!("'{}' is not a number", value),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::source::ConfigSource;

    #[test]
    fn test_parse_dynamic_configs() {
        let map = parse_dynamic_configs(&[
            "installIstio=true".to_string(),
            "settings.region = us-west-2".to_string(),
            "settings.cluster.description=a=b".to_string(),
        ])
        .unwrap();
        assert_eq!(map["installIstio"], "true");
        assert_eq!(map["settings.region"], "us-west-2");
        assert_eq!(map["settings.cluster.description"], "a=b");

        assert!(parse_dynamic_configs(&["novalue".to_string()]).is_err());
        assert!(parse_dynamic_configs(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_overrides_reach_stack_file_and_settings() {
        let mut file = StackFile::default();
        let mut settings = StackSettings::default();
        let configs = parse_dynamic_configs(&[
            "installMonitoring=true".to_string(),
            "settings.zones=a, b".to_string(),
            "settings.fleet.size=2".to_string(),
            "settings.cluster.kubernetes-version=v1.20.4-rancher1-1".to_string(),
        ])
        .unwrap();

        apply_overrides(&configs, &mut file, &mut settings).unwrap();

        assert_eq!(
            file.lookup("installMonitoring"),
            Some(ConfigValue::Plain("true".to_string()))
        );
        assert_eq!(settings.zones, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(settings.fleet.size, 2);
        assert_eq!(
            settings.cluster.kubernetes_version.as_deref(),
            Some("v1.20.4-rancher1-1")
        );
    }

    #[test]
    fn test_unknown_setting_is_rejected() {
        let mut settings = StackSettings::default();
        assert!(apply_to_settings("nope", "x", &mut settings).is_err());
        assert!(apply_to_settings("fleet.size", "three", &mut settings).is_err());
    }
}
