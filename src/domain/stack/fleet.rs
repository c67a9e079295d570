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

//! Single-node K3s clusters imported into Rancher

use super::bootstrap::BootstrapScript;
use super::network::{name_tag, NetworkStack};
use crate::domain::config::{FleetInputs, StackSettings};
use crate::domain::graph::{Declaration, DeclarationGraph, Output, ResourceHandle, ResourceKind, Value};
use crate::infrastructure::constants::CLUSTER_TOKEN_COMMAND;
use crate::shared::error::{Result, StackError};

/// One imported cluster and the instance that registers into it.
#[derive(Debug, Clone)]
pub struct FleetMember {
    pub index: usize,
    pub cluster: ResourceHandle,
    pub instance: ResourceHandle,
    /// User data of the instance, derived from the registration command.
    pub bootstrap: Output,
}

pub struct FleetBuilder<'a> {
    settings: &'a StackSettings,
    inputs: &'a FleetInputs,
}

impl<'a> FleetBuilder<'a> {
    pub fn new(settings: &'a StackSettings, inputs: &'a FleetInputs) -> Self {
        Self { settings, inputs }
    }

    pub fn build(
        &self,
        graph: &mut DeclarationGraph,
        network: &NetworkStack,
    ) -> Result<Vec<FleetMember>> {
        let size = self.settings.fleet.size;
        if size == 0 || size > network.subnets.len() {
            return Err(StackError::invalid_config(
                "fleet.size",
                format!(
                    "must be between 1 and the number of zones ({})",
                    network.subnets.len()
                ),
            ));
        }

        let script = BootstrapScript::new(&self.settings.fleet.k3s_version);
        let mut members = Vec::with_capacity(self.settings.fleet.size);

        for index in 0..self.settings.fleet.size {
            let subnet = network.subnet(index).ok_or_else(|| {
                StackError::invalid_config(
                    "fleet.size",
                    format!("no subnet for fleet member {}", index),
                )
            })?;

            let cluster_name = self.settings.resource_name(&format!("fleet-{}", index));
            let cluster = graph.declare(
                Declaration::new(&cluster_name, ResourceKind::Cluster)
                    .property("name", cluster_name.as_str()),
            )?;

            let bootstrap = script.attach(cluster.output(CLUSTER_TOKEN_COMMAND));

            let instance_name = self
                .settings
                .resource_name(&format!("fleet-node-{}", index));
            let instance = graph.declare(
                Declaration::new(&instance_name, ResourceKind::Instance)
                    .property("ami", self.settings.ami.as_str())
                    .property("instanceType", self.inputs.instance_size.as_str())
                    .property("keyName", self.settings.key_pair.as_str())
                    .property(
                        "vpcSecurityGroupIds",
                        Value::list([network.security_group.id()]),
                    )
                    .property("userData", bootstrap.clone())
                    .property("subnetId", subnet.handle.id())
                    .property("tags", name_tag(&instance_name)),
            )?;

            tracing::debug!(
                cluster = cluster.name(),
                instance = instance.name(),
                zone = %subnet.zone.name(),
                "declared fleet member"
            );

            members.push(FleetMember {
                index,
                cluster,
                instance,
                bootstrap,
            });
        }

        tracing::info!(members = members.len(), "declared fleet clusters");
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stack::network::NetworkBuilder;

    fn build(settings: &StackSettings) -> (DeclarationGraph, Vec<FleetMember>) {
        let inputs = FleetInputs {
            instance_size: "t3a.medium".to_string(),
        };
        let mut graph = DeclarationGraph::new();
        let network = NetworkBuilder::new(settings).build(&mut graph).unwrap();
        let members = FleetBuilder::new(settings, &inputs)
            .build(&mut graph, &network)
            .unwrap();
        (graph, members)
    }

    #[test]
    fn test_three_independent_members() {
        let (graph, members) = build(&StackSettings::default());
        assert_eq!(members.len(), 3);

        for member in &members {
            let deps = graph.dependencies(member.instance.name());
            assert!(deps.contains(member.cluster.name()));
            for other in members.iter().filter(|m| m.index != member.index) {
                assert!(!deps.contains(other.cluster.name()));
                assert!(!deps.contains(other.instance.name()));
            }
        }
    }

    #[test]
    fn test_user_data_is_derived_from_token() {
        let (graph, members) = build(&StackSettings::default());
        let instance = graph.get(members[1].instance.name()).unwrap();
        let user_data = instance.get("userData").and_then(Value::as_output).unwrap();

        assert_eq!(user_data.source().target(), "rancher-infra-fleet-1");
        assert_eq!(user_data.source().path(), Some(CLUSTER_TOKEN_COMMAND));
        assert!(user_data.resolve("register-me").ends_with("register-me\n"));
    }

    #[test]
    fn test_members_spread_over_subnets() {
        let (graph, members) = build(&StackSettings::default());
        for member in &members {
            let instance = graph.get(member.instance.name()).unwrap();
            let subnet = instance.get("subnetId").and_then(Value::as_reference).unwrap();
            assert_eq!(
                subnet.target(),
                format!("rancher-infra-subnet-{}", member.index)
            );
        }
    }

    #[test]
    fn test_fleet_larger_than_zones_fails() {
        let mut settings = StackSettings::default();
        settings.fleet.size = 4;
        let inputs = FleetInputs {
            instance_size: "t3a.medium".to_string(),
        };
        let mut graph = DeclarationGraph::new();
        let network = NetworkBuilder::new(&settings).build(&mut graph).unwrap();
        let err = FleetBuilder::new(&settings, &inputs)
            .build(&mut graph, &network)
            .unwrap_err();
        assert!(matches!(err, StackError::InvalidConfig { ref key, .. } if key == "fleet.size"));
        assert!(!graph.contains("rancher-infra-fleet-0"));
    }

    #[test]
    fn test_empty_fleet_fails() {
        let mut settings = StackSettings::default();
        settings.fleet.size = 0;
        let inputs = FleetInputs {
            instance_size: "t3a.medium".to_string(),
        };
        let mut graph = DeclarationGraph::new();
        let network = NetworkBuilder::new(&settings).build(&mut graph).unwrap();
        assert!(FleetBuilder::new(&settings, &inputs)
            .build(&mut graph, &network)
            .is_err());
    }
}
