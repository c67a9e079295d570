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

use super::zone::Zone;
use crate::domain::config::StackSettings;
use crate::domain::graph::{
    Declaration, DeclarationGraph, Invoke, ResourceHandle, ResourceKind, Value, VariableHandle,
};
use crate::infrastructure::constants::*;
use crate::shared::error::Result;

#[derive(Debug, Clone)]
pub struct Subnet {
    pub zone: Zone,
    pub cidr_block: String,
    pub handle: ResourceHandle,
}

/// VPC, gateway, security group, route table and one subnet per zone.
#[derive(Debug, Clone)]
pub struct NetworkStack {
    pub vpc: ResourceHandle,
    pub gateway: ResourceHandle,
    pub security_group: ResourceHandle,
    pub zone_list: VariableHandle,
    pub subnets: Vec<Subnet>,
    pub route_table: ResourceHandle,
}

impl NetworkStack {
    pub fn subnet(&self, index: usize) -> Option<&Subnet> {
        self.subnets.get(index)
    }
}

pub struct NetworkBuilder<'a> {
    settings: &'a StackSettings,
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(settings: &'a StackSettings) -> Self {
        Self { settings }
    }

    pub fn build(&self, graph: &mut DeclarationGraph) -> Result<NetworkStack> {
        let vpc = graph.declare(self.vpc())?;
        let gateway = graph.declare(
            Declaration::new(self.settings.resource_name("gw"), ResourceKind::InternetGateway)
                .property("vpcId", vpc.id()),
        )?;
        let security_group = graph.declare(self.security_group(&vpc))?;

        let zone_list = graph.invoke(
            Invoke::new(VARIABLE_ZONE_LIST, FN_AVAILABILITY_ZONES)
                .argument("state", ZONE_STATE_AVAILABLE),
        )?;

        let mut subnets = Vec::with_capacity(self.settings.zones.len());
        for zone in Zone::from_settings(self.settings) {
            let cidr_block = zone.subnet_cidr(&self.settings.vpc_cidr)?;
            let name = self
                .settings
                .resource_name(&format!("subnet-{}", zone.index()));
            let handle = graph.declare(
                Declaration::new(&name, ResourceKind::Subnet)
                    .property(
                        "availabilityZone",
                        zone_list.attr(&format!("names[{}]", zone.index())),
                    )
                    .property("tags", name_tag(&name))
                    .property("vpcId", vpc.id())
                    .property("cidrBlock", cidr_block.as_str())
                    .property("mapPublicIpOnLaunch", true),
            )?;
            subnets.push(Subnet {
                zone,
                cidr_block,
                handle,
            });
        }

        let route_table = graph.declare(
            Declaration::new(
                self.settings.resource_name("routetable"),
                ResourceKind::DefaultRouteTable,
            )
            .property("defaultRouteTableId", vpc.attr("defaultRouteTableId"))
            .property(
                "routes",
                Value::list([Value::map([
                    ("cidrBlock", Value::from(OPEN_CIDR)),
                    ("gatewayId", gateway.id()),
                ])]),
            ),
        )?;

        tracing::info!(
            vpc = vpc.name(),
            subnets = subnets.len(),
            "declared network topology"
        );

        Ok(NetworkStack {
            vpc,
            gateway,
            security_group,
            zone_list,
            subnets,
            route_table,
        })
    }

    fn vpc(&self) -> Declaration {
        let name = self.settings.resource_name("vpc");
        Declaration::new(&name, ResourceKind::Vpc)
            .property("cidrBlock", self.settings.vpc_cidr.as_str())
            .property("tags", name_tag(&name))
            .property("enableDnsHostnames", true)
            .property("enableDnsSupport", true)
    }

    fn security_group(&self, vpc: &ResourceHandle) -> Declaration {
        let name = self.settings.resource_name("sg");
        Declaration::new(&name, ResourceKind::SecurityGroup)
            .property("description", "Security group for ec2 Nodes")
            .property("name", name.as_str())
            .property("vpcId", vpc.id())
            .property("ingress", Value::list([open_rule()]))
            .property("egress", Value::list([open_rule()]))
    }
}

/// All protocols, all ports, from anywhere.
fn open_rule() -> Value {
    Value::map([
        ("protocol", Value::from(ALL_PROTOCOLS)),
        ("fromPort", Value::Int(0)),
        ("toPort", Value::Int(0)),
        ("cidrBlocks", Value::list([Value::from(OPEN_CIDR)])),
    ])
}

pub(crate) fn name_tag(name: &str) -> Value {
    Value::map([("Name", Value::from(name))])
}
