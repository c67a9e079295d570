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

use super::declaration::{Declaration, Invoke, ResourceHandle, ResourceKind, VariableHandle};
use super::value::Value;
use crate::shared::error::{Result, StackError};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

/// `.` is reserved for attribute paths in `${name.path}`.
static NAME_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$"));

/// Ordered set of declarations handed to the engine.
///
/// Declarations can only reference what was declared before them, so the
/// graph is acyclic by construction.
#[derive(Debug, Default, Clone)]
pub struct DeclarationGraph {
    declarations: Vec<Declaration>,
    index: HashMap<String, usize>,
    variables: Vec<Invoke>,
    outputs: BTreeMap<String, Value>,
}

impl DeclarationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, declaration: Declaration) -> Result<ResourceHandle> {
        let name = declaration.name.clone();
        self.check_new_name(&name)?;

        for dep in &declaration.depends_on {
            if !self.index.contains_key(dep) {
                return Err(StackError::declaration(
                    &name,
                    format!("depends on undeclared resource '{}'", dep),
                ));
            }
        }

        for value in declaration.properties.values() {
            self.check_references(&name, value)?;
        }

        tracing::debug!(
            resource = %name,
            kind = %declaration.kind,
            depends_on = ?declaration.depends_on,
            "declared resource"
        );

        let handle = ResourceHandle::new(name.clone(), declaration.kind);
        self.index.insert(name, self.declarations.len());
        self.declarations.push(declaration);
        Ok(handle)
    }

    pub fn invoke(&mut self, invoke: Invoke) -> Result<VariableHandle> {
        let name = invoke.name.clone();
        self.check_new_name(&name)?;
        for value in invoke.arguments.values() {
            self.check_references(&name, value)?;
        }

        tracing::debug!(variable = %name, function = %invoke.function, "declared lookup");
        self.variables.push(invoke);
        Ok(VariableHandle::new(name))
    }

    pub fn export(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let name = name.into();
        let value = value.into();
        if self.outputs.contains_key(&name) {
            return Err(StackError::declaration(&name, "output already exported"));
        }
        self.check_references(&name, &value)?;
        self.outputs.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations in the order they were made.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn of_kind(&self, kind: ResourceKind) -> Vec<&Declaration> {
        self.declarations.iter().filter(|d| d.kind == kind).collect()
    }

    pub fn variables(&self) -> &[Invoke] {
        &self.variables
    }

    pub fn outputs(&self) -> &BTreeMap<String, Value> {
        &self.outputs
    }

    pub fn explicit_dependencies(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|d| d.depends_on.as_slice())
    }

    /// Explicit edges plus resources referenced from the properties.
    /// Variables are not resources and are left out.
    pub fn dependencies(&self, name: &str) -> BTreeSet<String> {
        let Some(decl) = self.get(name) else {
            return BTreeSet::new();
        };

        let mut deps: BTreeSet<String> = decl.depends_on.iter().cloned().collect();
        for value in decl.properties.values() {
            for reference in value.references() {
                if self.contains(reference.target()) {
                    deps.insert(reference.target().to_string());
                }
            }
        }
        deps
    }

    pub fn dependents(&self, name: &str) -> Vec<&str> {
        self.declarations
            .iter()
            .filter(|d| self.dependencies(&d.name).contains(name))
            .map(|d| d.name.as_str())
            .collect()
    }

    /// Groups declarations into levels: every member of a level only depends
    /// on earlier levels, so the engine may run a level in parallel.
    pub fn waves(&self) -> Vec<Vec<&str>> {
        let mut level: HashMap<&str, usize> = HashMap::new();
        let mut waves: Vec<Vec<&str>> = Vec::new();

        // Declaration order is already a topological order.
        for decl in &self.declarations {
            let depth = self
                .dependencies(&decl.name)
                .iter()
                .filter_map(|dep| level.get(dep.as_str()))
                .map(|l| l + 1)
                .max()
                .unwrap_or(0);
            level.insert(decl.name.as_str(), depth);
            if waves.len() <= depth {
                waves.resize_with(depth + 1, Vec::new);
            }
            waves[depth].push(decl.name.as_str());
        }
        waves
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        let pattern = NAME_PATTERN
            .as_ref()
            .map_err(|e| StackError::ValidationError(e.to_string()))?;
        if !pattern.is_match(name) {
            return Err(StackError::declaration(name, "invalid resource name"));
        }
        if self.index.contains_key(name) || self.variables.iter().any(|v| v.name == name) {
            return Err(StackError::declaration(name, "name already declared"));
        }
        Ok(())
    }

    fn check_references(&self, owner: &str, value: &Value) -> Result<()> {
        for reference in value.references() {
            let target = reference.target();
            let known =
                self.index.contains_key(target) || self.variables.iter().any(|v| v.name == target);
            if !known {
                return Err(StackError::declaration(
                    owner,
                    format!("references undeclared '{}'", reference),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vpc(graph: &mut DeclarationGraph) -> ResourceHandle {
        graph
            .declare(Declaration::new("vpc", ResourceKind::Vpc).property("cidrBlock", "10.0.0.0/16"))
            .unwrap()
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut graph = DeclarationGraph::new();
        vpc(&mut graph);
        let err = graph
            .declare(Declaration::new("vpc", ResourceKind::Vpc))
            .unwrap_err();
        assert!(err.to_string().contains("already declared"));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_unknown_dependency_is_rejected() {
        let mut graph = DeclarationGraph::new();
        let ghost = ResourceHandle::new("ghost".to_string(), ResourceKind::ClusterSync);
        let err = graph
            .declare(Declaration::new("app", ResourceKind::App).depends_on(&ghost))
            .unwrap_err();
        assert!(matches!(err, StackError::Declaration { .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_dangling_reference_is_rejected() {
        let mut graph = DeclarationGraph::new();
        let ghost = ResourceHandle::new("ghost".to_string(), ResourceKind::Vpc);
        let result = graph.declare(
            Declaration::new("igw", ResourceKind::InternetGateway).property("vpcId", ghost.id()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let mut graph = DeclarationGraph::new();
        assert!(graph
            .declare(Declaration::new("bad name", ResourceKind::Vpc))
            .is_err());
        assert!(graph.declare(Declaration::new("", ResourceKind::Vpc)).is_err());
    }

    #[test]
    fn test_dotted_name_is_rejected() {
        let mut graph = DeclarationGraph::new();
        let err = graph
            .declare(Declaration::new("net.vpc", ResourceKind::Vpc))
            .unwrap_err();
        assert!(matches!(err, StackError::Declaration { ref resource, .. } if resource == "net.vpc"));
        assert!(graph
            .declare(Declaration::new("net-vpc_1", ResourceKind::Vpc))
            .is_ok());
    }

    #[test]
    fn test_implicit_and_explicit_dependencies() {
        let mut graph = DeclarationGraph::new();
        let vpc = vpc(&mut graph);
        let igw = graph
            .declare(
                Declaration::new("igw", ResourceKind::InternetGateway).property("vpcId", vpc.id()),
            )
            .unwrap();
        graph
            .declare(
                Declaration::new("sg", ResourceKind::SecurityGroup)
                    .property("vpcId", vpc.id())
                    .depends_on(&igw),
            )
            .unwrap();

        let deps = graph.dependencies("sg");
        assert!(deps.contains("vpc"));
        assert!(deps.contains("igw"));
        assert_eq!(graph.explicit_dependencies("sg").unwrap(), ["igw".to_string()]);
        assert_eq!(graph.dependents("vpc"), vec!["igw", "sg"]);
    }

    #[test]
    fn test_waves_group_independent_resources() {
        let mut graph = DeclarationGraph::new();
        let vpc = vpc(&mut graph);
        for i in 0..3 {
            graph
                .declare(
                    Declaration::new(format!("subnet-{}", i), ResourceKind::Subnet)
                        .property("vpcId", vpc.id()),
                )
                .unwrap();
        }

        let waves = graph.waves();
        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0], vec!["vpc"]);
        assert_eq!(waves[1], vec!["subnet-0", "subnet-1", "subnet-2"]);
    }

    #[test]
    fn test_variables_resolve_references_but_are_not_dependencies() {
        let mut graph = DeclarationGraph::new();
        let zones = graph
            .invoke(Invoke::new("zones", "aws:getAvailabilityZones").argument("state", "available"))
            .unwrap();
        graph
            .declare(
                Declaration::new("subnet", ResourceKind::Subnet)
                    .property("availabilityZone", zones.attr("names[0]")),
            )
            .unwrap();
        assert!(graph.dependencies("subnet").is_empty());
        assert_eq!(graph.variables().len(), 1);
    }

    #[test]
    fn test_export_rejects_duplicates() {
        let mut graph = DeclarationGraph::new();
        let vpc = vpc(&mut graph);
        graph.export("vpcId", vpc.id()).unwrap();
        assert!(graph.export("vpcId", vpc.id()).is_err());
        assert_eq!(graph.outputs().len(), 1);
    }
}
