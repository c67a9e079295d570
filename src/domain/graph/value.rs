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

//! Property values of declared resources

use super::output::Output;
use std::collections::BTreeMap;
use std::fmt;

/// Points at an attribute of a declared resource or variable.
///
/// The attribute stays opaque to this crate: the engine resolves it once
/// the target exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    target: String,
    path: Option<String>,
}

impl Reference {
    pub fn new(target: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            path: Some(path.into()),
        }
    }

    /// Reference to the target itself (used for `dependsOn` entries).
    pub fn whole(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            path: None,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Interpolation expression understood by the engine, e.g. `${vpc.id}`.
    pub fn expression(&self) -> String {
        match &self.path {
            Some(path) => format!("${{{}.{}}}", self.target, path),
            None => format!("${{{}}}", self.target),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}.{}", self.target, path),
            None => write!(f, "{}", self.target),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Ref(Reference),
    /// Stack configuration key, resolved (and decrypted) by the engine.
    Config(String),
    Computed(Output),
}

impl Value {
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Value::List(items.into_iter().collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_output(&self) -> Option<&Output> {
        match self {
            Value::Computed(o) => Some(o),
            _ => None,
        }
    }

    /// Looks up a nested map entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            _ => None,
        }
    }

    /// Every reference reachable from this value, in traversal order.
    pub fn references(&self) -> Vec<&Reference> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a Reference>) {
        match self {
            Value::Ref(r) => refs.push(r),
            Value::Computed(o) => refs.push(o.source()),
            Value::List(items) => items.iter().for_each(|v| v.collect_references(refs)),
            Value::Map(m) => m.values().for_each(|v| v.collect_references(refs)),
            Value::String(_) | Value::Bool(_) | Value::Int(_) | Value::Config(_) => {}
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Value::Ref(r)
    }
}

impl From<Output> for Value {
    fn from(o: Output) -> Self {
        Value::Computed(o)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Escapes literal text so the engine does not treat `${` as interpolation.
pub fn escape_literal(text: &str) -> String {
    text.replace("${", "$${")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_expression() {
        assert_eq!(Reference::new("vpc", "id").expression(), "${vpc.id}");
        assert_eq!(Reference::whole("sync").expression(), "${sync}");
        assert_eq!(
            Reference::new("zones", "names[2]").to_string(),
            "zones.names[2]"
        );
    }

    #[test]
    fn test_nested_references_are_collected() {
        let value = Value::map([
            ("vpcId", Value::Ref(Reference::new("vpc", "id"))),
            (
                "routes",
                Value::list([Value::map([(
                    "gatewayId",
                    Value::Ref(Reference::new("gw", "id")),
                )])]),
            ),
            ("name", Value::from("plain")),
            ("secret", Value::Config("accessKey".to_string())),
        ]);

        let targets: Vec<&str> = value.references().iter().map(|r| r.target()).collect();
        assert_eq!(targets, vec!["gw", "vpc"]);
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("echo ${HOME}"), "echo $${HOME}");
        assert_eq!(escape_literal("IP=$(curl x) $IP"), "IP=$(curl x) $IP");
    }
}
