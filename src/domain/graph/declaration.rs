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

use super::output::Output;
use super::value::{Reference, Value};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Vpc,
    InternetGateway,
    SecurityGroup,
    Subnet,
    DefaultRouteTable,
    Instance,
    CloudCredential,
    NodeTemplate,
    Cluster,
    NodePool,
    ClusterSync,
    App,
}

impl ResourceKind {
    pub fn type_token(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "aws:ec2:Vpc",
            ResourceKind::InternetGateway => "aws:ec2:InternetGateway",
            ResourceKind::SecurityGroup => "aws:ec2:SecurityGroup",
            ResourceKind::Subnet => "aws:ec2:Subnet",
            ResourceKind::DefaultRouteTable => "aws:ec2:DefaultRouteTable",
            ResourceKind::Instance => "aws:ec2:Instance",
            ResourceKind::CloudCredential => "rancher2:CloudCredential",
            ResourceKind::NodeTemplate => "rancher2:NodeTemplate",
            ResourceKind::Cluster => "rancher2:Cluster",
            ResourceKind::NodePool => "rancher2:NodePool",
            ResourceKind::ClusterSync => "rancher2:ClusterSync",
            ResourceKind::App => "rancher2:AppV2",
        }
    }

    /// Provider plugin that realizes this kind.
    pub fn provider(&self) -> &'static str {
        self.type_token()
            .split(':')
            .next()
            .unwrap_or_default()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_token())
    }
}

/// One resource handed to the engine: its arguments plus explicit ordering
/// edges. Edges implied by references inside `properties` are tracked by the
/// graph, not stored here.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub kind: ResourceKind,
    pub properties: BTreeMap<String, Value>,
    pub depends_on: Vec<String>,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            properties: BTreeMap::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn depends_on(mut self, handle: &ResourceHandle) -> Self {
        if !self.depends_on.iter().any(|d| d == handle.name()) {
            self.depends_on.push(handle.name().to_string());
        }
        self
    }

    pub fn depends_on_all<'a, I>(self, handles: I) -> Self
    where
        I: IntoIterator<Item = &'a ResourceHandle>,
    {
        handles.into_iter().fold(self, |decl, h| decl.depends_on(h))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Returned by the graph for every accepted declaration; the only way to
/// reference a resource from later declarations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    name: String,
    kind: ResourceKind,
}

impl ResourceHandle {
    pub(crate) fn new(name: String, kind: ResourceKind) -> Self {
        Self { name, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn id(&self) -> Value {
        self.attr("id")
    }

    pub fn attr(&self, path: &str) -> Value {
        Value::Ref(Reference::new(&self.name, path))
    }

    pub fn output(&self, path: &str) -> Output {
        Output::new(Reference::new(&self.name, path))
    }
}

/// A data-source lookup bound to a variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoke {
    pub name: String,
    pub function: String,
    pub arguments: BTreeMap<String, Value>,
}

impl Invoke {
    pub fn new(name: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: function.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableHandle {
    name: String,
}

impl VariableHandle {
    pub(crate) fn new(name: String) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, path: &str) -> Value {
        Value::Ref(Reference::new(&self.name, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tokens_and_providers() {
        assert_eq!(ResourceKind::Vpc.type_token(), "aws:ec2:Vpc");
        assert_eq!(ResourceKind::Vpc.provider(), "aws");
        assert_eq!(ResourceKind::App.type_token(), "rancher2:AppV2");
        assert_eq!(ResourceKind::ClusterSync.provider(), "rancher2");
    }

    #[test]
    fn test_depends_on_is_deduplicated() {
        let sync = ResourceHandle::new("sync".to_string(), ResourceKind::ClusterSync);
        let decl = Declaration::new("istio", ResourceKind::App)
            .depends_on(&sync)
            .depends_on(&sync);
        assert_eq!(decl.depends_on, vec!["sync".to_string()]);
    }
}
