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

//! Deferred values derived from engine-resolved attributes

use super::value::{escape_literal, Reference};
use crate::shared::error::Result;
use futures::future::{Future, FutureExt};
use std::fmt;
use std::sync::Arc;

type Transform = Arc<dyn Fn(&str) -> String + Send + Sync>;

// Stand-in fed through the transform when rendering the interpolation form.
const PLACEHOLDER: &str = "\u{1}resolved\u{1}";

/// A value that only exists once the engine has resolved `source`, plus a
/// pure transformation applied to it.
///
/// Transforms must embed their input as text; they hold no state, so the
/// same `Output` can be resolved any number of times.
#[derive(Clone)]
pub struct Output {
    source: Reference,
    transform: Transform,
}

impl Output {
    pub fn new(source: Reference) -> Self {
        Self {
            source,
            transform: Arc::new(|value| value.to_string()),
        }
    }

    pub fn source(&self) -> &Reference {
        &self.source
    }

    /// Chains `f` after the current transformation.
    pub fn apply<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let inner = self.transform;
        Self {
            source: self.source,
            transform: Arc::new(move |value| f(&inner(value))),
        }
    }

    /// Runs the transformation against the resolved source value.
    pub fn resolve(&self, resolved: &str) -> String {
        (self.transform)(resolved)
    }

    /// Resolves once `pending` yields the source value.
    pub fn when_ready<F>(self, pending: F) -> impl Future<Output = Result<String>>
    where
        F: Future<Output = Result<String>>,
    {
        pending.map(move |value| value.map(|v| self.resolve(&v)))
    }

    /// Renders the engine-side interpolation: literal text escaped, the
    /// source spliced in as `${target.path}`.
    pub fn interpolation(&self) -> String {
        self.resolve(PLACEHOLDER)
            .split(PLACEHOLDER)
            .map(escape_literal)
            .collect::<Vec<_>>()
            .join(&self.source.expression())
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("source", &self.source)
            .field("template", &self.interpolation())
            .finish()
    }
}

impl PartialEq for Output {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.interpolation() == other.interpolation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::StackError;

    fn token() -> Output {
        Output::new(Reference::new("fleet-0", "clusterRegistrationToken.command"))
    }

    #[test]
    fn test_identity_output() {
        let out = token();
        assert_eq!(out.resolve("kubectl apply -f x"), "kubectl apply -f x");
        assert_eq!(
            out.interpolation(),
            "${fleet-0.clusterRegistrationToken.command}"
        );
    }

    #[test]
    fn test_apply_composes_in_order() {
        let out = token()
            .apply(|cmd| format!("run {}", cmd))
            .apply(|text| format!("#!/bin/sh\n{}", text));
        assert_eq!(out.resolve("join"), "#!/bin/sh\nrun join");
    }

    #[test]
    fn test_interpolation_escapes_literal_text() {
        let out = token().apply(|cmd| format!("echo ${{HOME}}\n{}\n", cmd));
        assert_eq!(
            out.interpolation(),
            "echo $${HOME}\n${fleet-0.clusterRegistrationToken.command}\n"
        );
    }

    #[tokio::test]
    async fn test_when_ready_resolves_after_value_arrives() {
        let out = token().apply(|cmd| format!("exec {}", cmd));
        let script = out
            .when_ready(async { Ok("join-now".to_string()) })
            .await
            .unwrap();
        assert_eq!(script, "exec join-now");
    }

    #[tokio::test]
    async fn test_when_ready_propagates_errors() {
        let result = token()
            .when_ready(async { Err(StackError::OutputNotFound("x".to_string())) })
            .await;
        assert!(matches!(result, Err(StackError::OutputNotFound(_))));
    }
}
