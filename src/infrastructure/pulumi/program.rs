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

//! Renders a declaration graph as a Pulumi YAML program

use crate::domain::graph::value::escape_literal;
use crate::domain::graph::{Declaration, DeclarationGraph, Invoke, Value};
use crate::infrastructure::constants::PROGRAM_RUNTIME;
use crate::shared::error::Result;
use serde_yaml::{Mapping, Value as Yaml};
use std::collections::BTreeSet;

pub struct ProgramRenderer {
    project: String,
    description: String,
}

impl ProgramRenderer {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            description: "Rancher downstream and fleet clusters on AWS".to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn render(&self, graph: &DeclarationGraph) -> Result<String> {
        let program = self.to_yaml(graph);
        Ok(serde_yaml::to_string(&program)?)
    }

    pub fn to_yaml(&self, graph: &DeclarationGraph) -> Yaml {
        let mut program = Mapping::new();
        program.insert(key("name"), Yaml::String(self.project.clone()));
        program.insert(key("runtime"), Yaml::String(PROGRAM_RUNTIME.to_string()));
        program.insert(key("description"), Yaml::String(self.description.clone()));

        let secrets = config_keys(graph);
        if !secrets.is_empty() {
            let mut config = Mapping::new();
            for name in secrets {
                let mut entry = Mapping::new();
                entry.insert(key("type"), Yaml::String("string".to_string()));
                entry.insert(key("secret"), Yaml::Bool(true));
                config.insert(key(&name), Yaml::Mapping(entry));
            }
            program.insert(key("config"), Yaml::Mapping(config));
        }

        if !graph.variables().is_empty() {
            let mut variables = Mapping::new();
            for invoke in graph.variables() {
                variables.insert(key(&invoke.name), render_invoke(invoke));
            }
            program.insert(key("variables"), Yaml::Mapping(variables));
        }

        let mut resources = Mapping::new();
        for declaration in graph.iter() {
            resources.insert(key(&declaration.name), render_declaration(declaration));
        }
        program.insert(key("resources"), Yaml::Mapping(resources));

        if !graph.outputs().is_empty() {
            let mut outputs = Mapping::new();
            for (name, value) in graph.outputs() {
                outputs.insert(key(name), to_yaml(value));
            }
            program.insert(key("outputs"), Yaml::Mapping(outputs));
        }

        Yaml::Mapping(program)
    }
}

fn key(name: &str) -> Yaml {
    Yaml::String(name.to_string())
}

fn render_invoke(invoke: &Invoke) -> Yaml {
    let mut call = Mapping::new();
    call.insert(key("function"), Yaml::String(invoke.function.clone()));
    if !invoke.arguments.is_empty() {
        let arguments = invoke
            .arguments
            .iter()
            .map(|(k, v)| (key(k), to_yaml(v)))
            .collect();
        call.insert(key("arguments"), Yaml::Mapping(arguments));
    }

    let mut entry = Mapping::new();
    entry.insert(key("fn::invoke"), Yaml::Mapping(call));
    Yaml::Mapping(entry)
}

fn render_declaration(declaration: &Declaration) -> Yaml {
    let mut resource = Mapping::new();
    resource.insert(
        key("type"),
        Yaml::String(declaration.kind.type_token().to_string()),
    );

    if !declaration.properties.is_empty() {
        let properties = declaration
            .properties
            .iter()
            .map(|(k, v)| (key(k), to_yaml(v)))
            .collect();
        resource.insert(key("properties"), Yaml::Mapping(properties));
    }

    if !declaration.depends_on.is_empty() {
        let depends_on = declaration
            .depends_on
            .iter()
            .map(|d| Yaml::String(format!("${{{}}}", d)))
            .collect();
        let mut options = Mapping::new();
        options.insert(key("dependsOn"), Yaml::Sequence(depends_on));
        resource.insert(key("options"), Yaml::Mapping(options));
    }

    Yaml::Mapping(resource)
}

/// Converts a property value; plain text is escaped so it is never read as
/// an interpolation.
pub fn to_yaml(value: &Value) -> Yaml {
    match value {
        Value::String(s) => Yaml::String(escape_literal(s)),
        Value::Bool(b) => Yaml::Bool(*b),
        Value::Int(i) => Yaml::Number((*i).into()),
        Value::List(items) => Yaml::Sequence(items.iter().map(to_yaml).collect()),
        Value::Map(entries) => Yaml::Mapping(
            entries
                .iter()
                .map(|(k, v)| (key(k), to_yaml(v)))
                .collect(),
        ),
        Value::Ref(reference) => Yaml::String(reference.expression()),
        Value::Config(name) => Yaml::String(format!("${{{}}}", name)),
        Value::Computed(output) => Yaml::String(output.interpolation()),
    }
}

fn config_keys(graph: &DeclarationGraph) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for declaration in graph.iter() {
        for value in declaration.properties.values() {
            collect_config_keys(value, &mut keys);
        }
    }
    keys
}

fn collect_config_keys(value: &Value, keys: &mut BTreeSet<String>) {
    match value {
        Value::Config(name) => {
            keys.insert(name.clone());
        }
        Value::List(items) => items.iter().for_each(|v| collect_config_keys(v, keys)),
        Value::Map(entries) => entries.values().for_each(|v| collect_config_keys(v, keys)),
        _ => {}
    }
}
