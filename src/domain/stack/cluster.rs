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

//! RKE downstream cluster provisioned through Rancher

use super::network::NetworkStack;
use crate::domain::config::{DownstreamInputs, StackSettings};
use crate::domain::graph::{Declaration, DeclarationGraph, ResourceHandle, ResourceKind, Value};
use crate::infrastructure::constants::CLUSTER_DRIVER_RKE;
use crate::shared::error::Result;

/// Role flags of the nodes in a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRoles {
    pub control_plane: bool,
    pub etcd: bool,
    pub worker: bool,
}

impl NodeRoles {
    /// Every node runs every role.
    pub fn all() -> Self {
        Self {
            control_plane: true,
            etcd: true,
            worker: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodePoolSpec {
    pub name: String,
    pub hostname_prefix: String,
    pub quantity: u32,
    pub roles: NodeRoles,
    pub node_template: ResourceHandle,
}

#[derive(Debug, Clone)]
pub struct NodePool {
    pub spec: NodePoolSpec,
    pub handle: ResourceHandle,
}

/// Resource that completes only once the cluster and all its pools report
/// ready. Everything installed into the cluster orders after it.
#[derive(Debug, Clone)]
pub struct SyncBarrier {
    handle: ResourceHandle,
}

impl SyncBarrier {
    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }
}

#[derive(Debug, Clone)]
pub struct DownstreamCluster {
    pub credential: ResourceHandle,
    pub node_templates: Vec<ResourceHandle>,
    pub cluster: ResourceHandle,
    pub pools: Vec<NodePool>,
    pub sync: SyncBarrier,
}

pub struct ClusterBuilder<'a> {
    settings: &'a StackSettings,
    inputs: &'a DownstreamInputs,
}

impl<'a> ClusterBuilder<'a> {
    pub fn new(settings: &'a StackSettings, inputs: &'a DownstreamInputs) -> Self {
        Self { settings, inputs }
    }

    pub fn build(
        &self,
        graph: &mut DeclarationGraph,
        network: &NetworkStack,
    ) -> Result<DownstreamCluster> {
        let credential = graph.declare(self.credential())?;

        let mut node_templates = Vec::with_capacity(network.subnets.len());
        for subnet in &network.subnets {
            let suffix = subnet.zone.suffix();
            let amazonec2 = Value::map([
                ("ami", Value::from(&self.settings.ami)),
                ("instanceType", Value::from(&self.inputs.instance_size)),
                ("vpcId", network.vpc.id()),
                ("subnetId", subnet.handle.id()),
                ("rootSize", Value::from(&self.settings.cluster.root_size)),
                (
                    "securityGroups",
                    Value::list([network.security_group.attr("name")]),
                ),
                ("region", Value::from(&self.settings.region)),
                ("zone", Value::from(suffix)),
            ]);
            let template = graph.declare(
                Declaration::new(
                    self.settings
                        .resource_name(&format!("nodetemplate-{}", subnet.zone.name())),
                    ResourceKind::NodeTemplate,
                )
                .property("cloudCredentialId", credential.id())
                .property("description", "node template for ec2")
                .property(
                    "name",
                    self.settings
                        .resource_name(&format!("nodetemplate-{}", suffix)),
                )
                .property(
                    "engineInstallUrl",
                    self.settings.cluster.engine_install_url.as_str(),
                )
                .property("amazonec2Config", amazonec2),
            )?;
            node_templates.push(template);
        }

        let cluster = graph.declare(self.cluster(&node_templates))?;

        let mut pools = Vec::with_capacity(node_templates.len());
        for (i, template) in node_templates.iter().enumerate() {
            let spec = NodePoolSpec {
                name: self.settings.resource_name(&format!("pool-{}", i)),
                hostname_prefix: self.settings.hostname_prefix(),
                quantity: self.settings.cluster.nodes_per_pool,
                roles: NodeRoles::all(),
                node_template: template.clone(),
            };
            let handle = graph.declare(
                Declaration::new(
                    self.settings.resource_name(&format!("nodepool-{}", i)),
                    ResourceKind::NodePool,
                )
                .property("clusterId", cluster.id())
                .property("controlPlane", spec.roles.control_plane)
                .property("etcd", spec.roles.etcd)
                .property("worker", spec.roles.worker)
                .property("hostnamePrefix", spec.hostname_prefix.as_str())
                .property("name", spec.name.as_str())
                .property("quantity", spec.quantity)
                .property("nodeTemplateId", template.id()),
            )?;
            pools.push(NodePool { spec, handle });
        }

        let sync = graph.declare(
            Declaration::new(
                self.settings.resource_name("clustersync"),
                ResourceKind::ClusterSync,
            )
            .property("clusterId", cluster.id())
            .property(
                "nodePoolIds",
                Value::list(pools.iter().map(|p| p.handle.id())),
            )
            .property("stateConfirm", self.settings.cluster.state_confirm),
        )?;

        tracing::info!(
            cluster = cluster.name(),
            pools = pools.len(),
            "declared downstream cluster"
        );

        Ok(DownstreamCluster {
            credential,
            node_templates,
            cluster,
            pools,
            sync: SyncBarrier { handle: sync },
        })
    }

    fn credential(&self) -> Declaration {
        Declaration::new(
            self.settings.resource_name("cloudcredential"),
            ResourceKind::CloudCredential,
        )
        .property("name", self.settings.resource_name("aws"))
        .property("description", "AWS credentials")
        .property(
            "amazonec2CredentialConfig",
            Value::map([
                ("accessKey", self.inputs.access_key.to_value()),
                ("secretKey", self.inputs.secret_key.to_value()),
            ]),
        )
    }

    fn cluster(&self, node_templates: &[ResourceHandle]) -> Declaration {
        let settings = &self.settings.cluster;
        let mut rke = vec![(
            "network",
            Value::map([("plugin", Value::from(&settings.network_plugin))]),
        )];
        if let Some(version) = &settings.kubernetes_version {
            rke.push(("kubernetesVersion", Value::from(version)));
        }

        // No property references the templates, so order explicitly.
        Declaration::new(self.settings.resource_name("cluster"), ResourceKind::Cluster)
            .property("description", settings.description.as_str())
            .property("driver", CLUSTER_DRIVER_RKE)
            .property("name", self.settings.resource_name("cluster"))
            .property("rkeConfig", Value::map(rke))
            .depends_on_all(node_templates)
    }
}
