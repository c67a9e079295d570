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

use super::composer::ComposedStack;
use crate::infrastructure::constants::{MASKED_SECRET, OUTPUT_FLEET_COMMANDS, PROGRAM_FILE_NAME};
use crate::infrastructure::pulumi::{ProgramRenderer, PulumiCli, StackEngine, StackOutputs};
use crate::shared::error::{Result, StackError};
use std::path::{Path, PathBuf};

/// Drives one stack: writes the rendered program into the project directory
/// and hands it to the engine.
pub struct StackDescriptor {
    engine: Box<dyn StackEngine>,
    renderer: ProgramRenderer,
    project_dir: PathBuf,
}

impl StackDescriptor {
    pub fn new(project: &str, stack: &str, project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let engine = PulumiCli::new(stack, project_dir.clone());
        Self::with_engine(Box::new(engine), ProgramRenderer::new(project), project_dir)
    }

    pub fn with_engine(
        engine: Box<dyn StackEngine>,
        renderer: ProgramRenderer,
        project_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            renderer,
            project_dir: project_dir.into(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn program_path(&self) -> PathBuf {
        self.project_dir.join(PROGRAM_FILE_NAME)
    }

    pub fn render(&self, stack: &ComposedStack) -> Result<String> {
        self.renderer.render(&stack.graph)
    }

    pub async fn write_program(&self, stack: &ComposedStack) -> Result<PathBuf> {
        let program = self.render(stack)?;
        tokio::fs::create_dir_all(&self.project_dir).await?;
        let path = self.program_path();
        tokio::fs::write(&path, program).await?;
        tracing::info!(path = %path.display(), resources = stack.graph.len(), "wrote program");
        Ok(path)
    }

    pub async fn preview(&self, stack: &ComposedStack) -> Result<()> {
        self.write_program(stack).await?;
        self.engine.preview().await
    }

    pub async fn up(&self, stack: &ComposedStack) -> Result<StackOutputs> {
        self.write_program(stack).await?;
        println!("Applying {} declarations...", stack.graph.len());
        self.engine.up().await?;
        self.engine.outputs().await
    }

    /// Destroys every resource of the stack. The program must still be on
    /// disk, so it is rewritten first.
    pub async fn destroy(&self, stack: &ComposedStack) -> Result<()> {
        self.write_program(stack).await?;
        self.engine.destroy().await
    }

    pub async fn outputs(&self) -> Result<StackOutputs> {
        self.engine.outputs().await
    }

    /// User data of fleet member `index`, built from the registration
    /// command the engine reports once the stack is up.
    pub async fn bootstrap_script(&self, stack: &ComposedStack, index: usize) -> Result<String> {
        let member = stack.fleet_member(index).ok_or_else(|| {
            StackError::ValidationError(format!(
                "fleet member {} is not declared ({} members)",
                index,
                stack.fleet.len()
            ))
        })?;

        member
            .bootstrap
            .clone()
            .when_ready(self.registration_command(index))
            .await
    }

    async fn registration_command(&self, index: usize) -> Result<String> {
        let output = format!("{}[{}]", OUTPUT_FLEET_COMMANDS, index);
        let outputs = self.engine.secret_outputs().await?;
        let commands = outputs
            .get(OUTPUT_FLEET_COMMANDS)
            .ok_or_else(|| StackError::OutputNotFound(output.clone()))?;
        let command = if commands.as_str() == Some(MASKED_SECRET) {
            MASKED_SECRET
        } else {
            commands
                .get(index)
                .and_then(|v| v.as_str())
                .ok_or_else(|| StackError::OutputNotFound(output.clone()))?
        };

        if command == MASKED_SECRET {
            return Err(StackError::ValidationError(format!(
                "output {} is still masked by the engine",
                output
            )));
        }
        Ok(command.to_string())
    }
}
