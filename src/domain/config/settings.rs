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

//! Non-secret settings of a stack, loaded from TOML

use crate::shared::error::{Result, StackError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::net::Ipv4Addr;
use std::path::Path;

// ============================================================================
// Stack settings
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StackSettings {
    /// Project name used for the program and the stack config namespace.
    pub project: String,
    /// Prefix of every declared resource name.
    pub name_prefix: String,
    pub region: String,
    pub vpc_cidr: String,
    /// Availability-zone suffixes, one subnet each.
    pub zones: Vec<String>,
    pub ami: String,
    pub key_pair: String,
    pub cluster: ClusterSettings,
    pub fleet: FleetSettings,
    pub addons: AddOnSettings,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            project: "rancher-infra".to_string(),
            name_prefix: "rancher-infra".to_string(),
            region: "eu-west-2".to_string(),
            vpc_cidr: "10.0.0.0/16".to_string(),
            zones: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ami: "ami-0ff4c8fb495a5a50d".to_string(),
            key_pair: "rancher-infra-keypair".to_string(),
            cluster: ClusterSettings::default(),
            fleet: FleetSettings::default(),
            addons: AddOnSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterSettings {
    pub description: String,
    pub network_plugin: String,
    /// RKE Kubernetes version; the platform default when unset.
    pub kubernetes_version: Option<String>,
    pub engine_install_url: String,
    pub root_size: String,
    /// Node hostname prefix; `<name_prefix>-node-` when unset.
    pub hostname_prefix: Option<String>,
    pub nodes_per_pool: u32,
    /// Seconds the sync barrier waits for a stable cluster state.
    pub state_confirm: u32,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            description: "Cluster created by Pulumi".to_string(),
            network_plugin: "canal".to_string(),
            kubernetes_version: None,
            engine_install_url: "https://releases.rancher.com/install-docker/19.03.sh"
                .to_string(),
            root_size: "50".to_string(),
            hostname_prefix: None,
            nodes_per_pool: 1,
            state_confirm: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FleetSettings {
    pub size: usize,
    pub k3s_version: String,
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self {
            size: 3,
            k3s_version: "v1.19.5+k3s2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AddOnSettings {
    pub repo_name: String,
}

impl Default for AddOnSettings {
    fn default() -> Self {
        Self {
            repo_name: "rancher-charts".to_string(),
        }
    }
}

impl StackSettings {
    /// Load settings from a TOML file
    pub fn from<T: AsRef<str>>(path: T) -> Result<Self> {
        let content = read_to_string(path.as_ref()).map_err(|e| {
            StackError::config_error(format!(
                "Failed to read settings file {}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let settings: Self = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Settings file from `path`, or defaults when none is given.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) if Path::new(p).exists() => Self::from(p),
            Some(p) => Err(StackError::config_error(format!(
                "Settings file not found: {}",
                p
            ))),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let name = Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$")
            .map_err(|e| StackError::config_error(e.to_string()))?;

        if !name.is_match(&self.project) {
            return Err(StackError::invalid_config(
                "project",
                format!("'{}' is not a valid project name", self.project),
            ));
        }

        if !name.is_match(&self.name_prefix) {
            return Err(StackError::invalid_config(
                "name_prefix",
                format!("'{}' is not a valid resource name prefix", self.name_prefix),
            ));
        }

        vpc_octets(&self.vpc_cidr)?;

        if self.zones.is_empty() || self.zones.len() > 256 {
            return Err(StackError::invalid_config(
                "zones",
                "between 1 and 256 availability zones are required",
            ));
        }

        let zone = Regex::new(r"^[a-z]$").map_err(|e| StackError::config_error(e.to_string()))?;
        if let Some(bad) = self.zones.iter().find(|z| !zone.is_match(z)) {
            return Err(StackError::invalid_config(
                "zones",
                format!("'{}' is not an availability-zone suffix", bad),
            ));
        }

        if self.cluster.nodes_per_pool == 0 {
            return Err(StackError::invalid_config(
                "cluster.nodes_per_pool",
                "must be > 0",
            ));
        }

        Ok(())
    }

    pub fn resource_name(&self, suffix: &str) -> String {
        format!("{}-{}", self.name_prefix, suffix)
    }

    pub fn hostname_prefix(&self) -> String {
        self.cluster
            .hostname_prefix
            .clone()
            .unwrap_or_else(|| self.resource_name("node-"))
    }
}

/// First two octets of a `/16` block.
pub fn vpc_octets(cidr: &str) -> Result<(u8, u8)> {
    let (addr, prefix) = cidr
        .split_once('/')
        .ok_or_else(|| StackError::invalid_config("vpc_cidr", "expected <address>/16"))?;

    if prefix != "16" {
        return Err(StackError::invalid_config(
            "vpc_cidr",
            format!("only /16 blocks are supported, got /{}", prefix),
        ));
    }

    let addr: Ipv4Addr = addr
        .parse()
        .map_err(|e| StackError::invalid_config("vpc_cidr", format!("{}", e)))?;
    let [a, b, c, d] = addr.octets();
    if c != 0 || d != 0 {
        return Err(StackError::invalid_config(
            "vpc_cidr",
            format!("{} has host bits set", cidr),
        ));
    }
    Ok((a, b))
}
