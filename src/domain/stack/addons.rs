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

//! Chart installations into the downstream cluster

use super::cluster::DownstreamCluster;
use crate::domain::config::{StackConfig, StackSettings};
use crate::domain::graph::{Declaration, DeclarationGraph, ResourceHandle, ResourceKind};
use crate::infrastructure::constants::*;
use crate::shared::error::Result;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddOn {
    Istio,
    Opa,
    Cis,
    Logging,
    Longhorn,
    Monitoring,
}

impl AddOn {
    /// Declaration order: monitoring first so the add-ons probing for it can
    /// depend on it.
    pub const ALL: [AddOn; 6] = [
        AddOn::Monitoring,
        AddOn::Istio,
        AddOn::Opa,
        AddOn::Cis,
        AddOn::Logging,
        AddOn::Longhorn,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            AddOn::Istio => "istio",
            AddOn::Opa => "opa",
            AddOn::Cis => "cis",
            AddOn::Logging => "logging",
            AddOn::Longhorn => "longhorn",
            AddOn::Monitoring => "monitoring",
        }
    }

    pub fn config_key(&self) -> &'static str {
        match self {
            AddOn::Istio => KEY_INSTALL_ISTIO,
            AddOn::Opa => KEY_INSTALL_OPA,
            AddOn::Cis => KEY_INSTALL_CIS,
            AddOn::Logging => KEY_INSTALL_LOGGING,
            AddOn::Longhorn => KEY_INSTALL_LONGHORN,
            AddOn::Monitoring => KEY_INSTALL_MONITORING,
        }
    }

    pub fn chart(&self) -> &'static str {
        match self {
            AddOn::Istio => "rancher-istio",
            AddOn::Opa => "rancher-gatekeeper",
            AddOn::Cis => "rancher-cis-benchmark",
            AddOn::Logging => "rancher-logging",
            AddOn::Longhorn => "longhorn",
            AddOn::Monitoring => "rancher-monitoring",
        }
    }

    pub fn chart_version(&self) -> &'static str {
        match self {
            AddOn::Istio => "1.8.300",
            AddOn::Opa => "3.3.000",
            AddOn::Cis => "1.0.301",
            AddOn::Logging => "3.9.000",
            AddOn::Longhorn => "1.1.001",
            AddOn::Monitoring => "9.4.203",
        }
    }

    pub fn namespace(&self) -> &'static str {
        match self {
            AddOn::Istio => "istio-system",
            AddOn::Opa => "opa-system",
            AddOn::Cis => "cis-system",
            AddOn::Logging => "cattle-logging-system",
            AddOn::Longhorn => "longhorn-system",
            AddOn::Monitoring => "cattle-monitoring-system",
        }
    }

    /// Charts that detect a monitoring stack at install time.
    pub fn probes_monitoring(&self) -> bool {
        matches!(self, AddOn::Istio | AddOn::Logging)
    }
}

impl fmt::Display for AddOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Add-ons switched on in the stack configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOnSelection {
    selected: Vec<AddOn>,
}

impl AddOnSelection {
    pub fn read(config: &StackConfig) -> Result<Self> {
        let mut selected = Vec::new();
        for addon in AddOn::ALL {
            if config.get_bool(addon.config_key())? {
                selected.push(addon);
            }
        }
        Ok(Self { selected })
    }

    pub fn of(addons: impl IntoIterator<Item = AddOn>) -> Self {
        let mut selected: Vec<AddOn> = addons.into_iter().collect();
        selected.sort_by_key(|a| AddOn::ALL.iter().position(|x| x == a));
        selected.dedup();
        Self { selected }
    }

    pub fn contains(&self, addon: AddOn) -> bool {
        self.selected.contains(&addon)
    }

    pub fn iter(&self) -> impl Iterator<Item = AddOn> + '_ {
        self.selected.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct InstalledAddOn {
    pub addon: AddOn,
    pub handle: ResourceHandle,
}

pub struct AddOnInstaller<'a> {
    settings: &'a StackSettings,
}

impl<'a> AddOnInstaller<'a> {
    pub fn new(settings: &'a StackSettings) -> Self {
        Self { settings }
    }

    pub fn install(
        &self,
        graph: &mut DeclarationGraph,
        downstream: &DownstreamCluster,
        selection: &AddOnSelection,
    ) -> Result<Vec<InstalledAddOn>> {
        let mut installed: Vec<InstalledAddOn> = Vec::new();
        let mut monitoring: Option<ResourceHandle> = None;

        for addon in selection.iter() {
            let mut declaration = Declaration::new(
                self.settings.resource_name(addon.slug()),
                ResourceKind::App,
            )
            .property("chartName", addon.chart())
            .property("chartVersion", addon.chart_version())
            .property("clusterId", downstream.cluster.id())
            .property("namespace", addon.namespace())
            .property("repoName", self.settings.addons.repo_name.as_str())
            .depends_on(downstream.sync.handle());

            if addon.probes_monitoring() {
                if let Some(monitoring) = &monitoring {
                    declaration = declaration.depends_on(monitoring);
                }
            }

            let handle = graph.declare(declaration)?;
            tracing::debug!(addon = %addon, resource = handle.name(), "declared add-on");

            if addon == AddOn::Monitoring {
                monitoring = Some(handle.clone());
            }
            installed.push(InstalledAddOn { addon, handle });
        }

        if !installed.is_empty() {
            tracing::info!(
                addons = ?installed.iter().map(|a| a.addon.slug()).collect::<Vec<_>>(),
                "declared add-ons"
            );
        }
        Ok(installed)
    }
}
