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

//! Pulumi CLI wrapper

use crate::infrastructure::constants::{ENGINE_BINARY, ENV_ENGINE_BINARY};
use crate::shared::error::{Result, StackError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Stack outputs as reported by the engine.
pub type StackOutputs = BTreeMap<String, serde_json::Value>;

/// Operations the orchestration engine performs on a rendered program.
#[async_trait]
pub trait StackEngine: Send + Sync {
    async fn preview(&self) -> Result<()>;
    async fn up(&self) -> Result<()>;
    async fn destroy(&self) -> Result<()>;
    /// Outputs with secrets masked.
    async fn outputs(&self) -> Result<StackOutputs>;
    /// Outputs with secret values revealed.
    async fn secret_outputs(&self) -> Result<StackOutputs>;
}

/// Runs the `pulumi` binary against one stack of a project directory.
pub struct PulumiCli {
    binary: String,
    stack: String,
    project_dir: PathBuf,
}

impl PulumiCli {
    pub fn new(stack: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        let binary = std::env::var(ENV_ENGINE_BINARY).unwrap_or_else(|_| ENGINE_BINARY.to_string());
        Self {
            binary,
            stack: stack.into(),
            project_dir: project_dir.into(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Selects the stack, creating it on first use.
    async fn select_stack(&self) -> Result<()> {
        self.run(&["stack", "select", "--create"], Capture::Stdout)
            .await
            .map(|_| ())
    }

    async fn read_outputs(&self, show_secrets: bool) -> Result<StackOutputs> {
        let mut args = vec!["stack", "output", "--json"];
        if show_secrets {
            args.push("--show-secrets");
        }
        let output = self.run(&args, Capture::Stdout).await?;
        if output.trim().is_empty() {
            return Ok(StackOutputs::new());
        }
        let outputs: StackOutputs = serde_json::from_str(&output)?;
        Ok(outputs)
    }

    async fn run(&self, args: &[&str], capture: Capture) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .arg("--stack")
            .arg(&self.stack)
            .arg("--cwd")
            .arg(&self.project_dir)
            .arg("--non-interactive");
        cmd.stdout(match capture {
            Capture::Stdout => Stdio::piped(),
            Capture::Stream => Stdio::inherit(),
        });
        cmd.stderr(Stdio::piped());

        let command_line = format!("{} {}", self.binary, args.join(" "));
        tracing::debug!(
            "Running: {} --stack {} --cwd {}",
            command_line,
            self.stack,
            self.project_dir.display()
        );

        let output = cmd.output().await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StackError::EngineNotFound(self.binary.clone()),
            _ => StackError::Io(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StackError::engine_failed(command_line, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[derive(Debug, Clone, Copy)]
enum Capture {
    Stdout,
    Stream,
}

#[async_trait]
impl StackEngine for PulumiCli {
    async fn preview(&self) -> Result<()> {
        self.select_stack().await?;
        self.run(&["preview"], Capture::Stream).await?;
        Ok(())
    }

    async fn up(&self) -> Result<()> {
        self.select_stack().await?;
        tracing::info!(stack = %self.stack, "applying stack");
        self.run(&["up", "--yes"], Capture::Stream).await?;
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        tracing::info!(stack = %self.stack, "destroying stack");
        self.run(&["destroy", "--yes"], Capture::Stream).await?;
        Ok(())
    }

    async fn outputs(&self) -> Result<StackOutputs> {
        self.read_outputs(false).await
    }

    async fn secret_outputs(&self) -> Result<StackOutputs> {
        tracing::debug!(stack = %self.stack, "reading outputs with secrets revealed");
        self.read_outputs(true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary() {
        let cli = PulumiCli::new("dev", std::env::temp_dir())
            .with_binary("rancher-infra-no-such-engine");
        let err = cli.outputs().await.unwrap_err();
        assert!(matches!(err, StackError::EngineNotFound(ref b) if b == "rancher-infra-no-such-engine"));
    }

    #[tokio::test]
    async fn test_failing_command_reports_stderr() {
        // `false` ignores its arguments and exits non-zero.
        let cli = PulumiCli::new("dev", std::env::temp_dir()).with_binary("false");
        let err = cli.destroy().await.unwrap_err();
        assert!(matches!(err, StackError::EngineCommandFailed { .. }));
    }

    /// Engine stand-in that echoes its arguments as a JSON output.
    fn echo_engine(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("engine.sh");
        std::fs::write(&path, "#!/bin/sh\necho \"{\\\"args\\\": \\\"$*\\\"}\"\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_secret_outputs_reveal_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let engine = echo_engine(dir.path());
        let cli = PulumiCli::new("dev", dir.path()).with_binary(engine.to_string_lossy());

        let revealed = cli.secret_outputs().await.unwrap();
        let args = revealed["args"].as_str().unwrap();
        assert!(args.starts_with("stack output --json --show-secrets"));

        let masked = cli.outputs().await.unwrap();
        assert!(!masked["args"].as_str().unwrap().contains("--show-secrets"));
    }

    #[tokio::test]
    #[ignore] // Requires a pulumi binary and a logged-in backend
    async fn test_outputs_of_real_stack() {
        let dir = tempfile::tempdir().unwrap();
        let cli = PulumiCli::new("dev", dir.path());
        assert!(cli.outputs().await.is_err());
    }
}
