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

use super::addons::{AddOnInstaller, AddOnSelection, InstalledAddOn};
use super::cluster::{ClusterBuilder, DownstreamCluster};
use super::fleet::{FleetBuilder, FleetMember};
use super::network::{NetworkBuilder, NetworkStack};
use crate::domain::config::{DownstreamInputs, FleetInputs, StackConfig, StackFlags, StackSettings};
use crate::domain::graph::{DeclarationGraph, Value};
use crate::infrastructure::constants::*;
use crate::shared::error::Result;

/// Everything declared by one composition pass.
#[derive(Debug, Clone)]
pub struct ComposedStack {
    pub graph: DeclarationGraph,
    pub flags: StackFlags,
    pub network: NetworkStack,
    pub downstream: Option<DownstreamCluster>,
    pub addons: Vec<InstalledAddOn>,
    pub fleet: Vec<FleetMember>,
}

impl ComposedStack {
    pub fn fleet_member(&self, index: usize) -> Option<&FleetMember> {
        self.fleet.get(index)
    }
}

/// Decides which blocks to declare from the stack flags and wires them
/// together. Config keys of a disabled block are never read.
pub struct StackComposer<'a> {
    settings: &'a StackSettings,
    config: &'a StackConfig,
}

impl<'a> StackComposer<'a> {
    pub fn new(settings: &'a StackSettings, config: &'a StackConfig) -> Self {
        Self { settings, config }
    }

    pub fn compose(&self) -> Result<ComposedStack> {
        self.settings.validate()?;
        let flags = StackFlags::read(self.config)?;
        tracing::info!(
            downstream_cluster = flags.install_downstream_cluster,
            fleet_clusters = flags.install_fleet_clusters,
            "composing stack"
        );

        let mut graph = DeclarationGraph::new();
        let network = NetworkBuilder::new(self.settings).build(&mut graph)?;

        let mut downstream = None;
        let mut addons = Vec::new();
        if flags.install_downstream_cluster {
            let inputs = DownstreamInputs::read(self.config)?;
            let cluster = ClusterBuilder::new(self.settings, &inputs).build(&mut graph, &network)?;
            let selection = AddOnSelection::read(self.config)?;
            addons = AddOnInstaller::new(self.settings).install(&mut graph, &cluster, &selection)?;
            downstream = Some(cluster);
        }

        let mut fleet = Vec::new();
        if flags.install_fleet_clusters {
            let inputs = FleetInputs::read(self.config)?;
            fleet = FleetBuilder::new(self.settings, &inputs).build(&mut graph, &network)?;
        }

        graph.export(OUTPUT_VPC_ID, network.vpc.id())?;
        graph.export(
            OUTPUT_SUBNET_IDS,
            Value::list(network.subnets.iter().map(|s| s.handle.id())),
        )?;
        if let Some(cluster) = &downstream {
            graph.export(OUTPUT_CLUSTER_ID, cluster.cluster.id())?;
        }
        if !fleet.is_empty() {
            graph.export(
                OUTPUT_FLEET_CLUSTER_IDS,
                Value::list(fleet.iter().map(|m| m.cluster.id())),
            )?;
            graph.export(
                OUTPUT_FLEET_COMMANDS,
                Value::list(fleet.iter().map(|m| m.cluster.attr(CLUSTER_TOKEN_COMMAND))),
            )?;
        }

        tracing::info!(
            resources = graph.len(),
            addons = addons.len(),
            fleet = fleet.len(),
            "stack composed"
        );

        Ok(ComposedStack {
            graph,
            flags,
            network,
            downstream,
            addons,
            fleet,
        })
    }
}
