//! Stack commands

use crate::cli::display::TableRenderer;
use crate::domain::config::{apply_overrides, parse_dynamic_configs, StackConfig, StackFile, StackSettings};
use crate::domain::stack::{ComposedStack, StackComposer, StackDescriptor};
use crate::infrastructure::constants::ENV_SETTINGS_FILE;
use clap::{Args, Parser};
use std::path::PathBuf;

/// Options shared by every stack command.
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// Pulumi stack name
    #[arg(long, short = 's', default_value = "dev")]
    pub stack: String,

    /// Directory the Pulumi project (Pulumi.yaml) is written to
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub project_dir: PathBuf,

    /// Stack configuration file
    /// If not provided, uses Pulumi.<stack>.yaml in the project directory when present
    #[arg(long, value_name = "PATH")]
    pub stack_file: Option<PathBuf>,

    /// Settings file (TOML) for names, region, zones and versions
    #[arg(long, env = ENV_SETTINGS_FILE, value_name = "PATH")]
    pub settings: Option<String>,

    /// Dynamic configuration properties (-D key=value)
    ///
    /// Stack config: installDownstreamCluster, installFleetClusters, installIstio, installOPA,
    /// installCIS, installLogging, installLonghorn, installMonitoring,
    /// downstreamClusterEC2Size, fleetClustersEC2Size
    /// Settings: settings.name-prefix, settings.region, settings.vpc-cidr, settings.zones (comma-separated),
    /// settings.ami, settings.key-pair, settings.cluster.network-plugin, settings.cluster.kubernetes-version,
    /// settings.cluster.hostname-prefix, settings.cluster.nodes-per-pool, settings.cluster.state-confirm,
    /// settings.fleet.size, settings.fleet.k3s-version, settings.addons.repo-name
    ///
    /// Example: -DinstallFleetClusters=true -DfleetClustersEC2Size=t3a.medium -Dsettings.region=eu-west-1
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

impl StackArgs {
    /// Settings and stack configuration with `-D` overrides applied.
    pub fn load(&self) -> anyhow::Result<(StackSettings, StackConfig)> {
        let mut settings = StackSettings::load_or_default(self.settings.as_deref())?;

        let stack_file_path = self.stack_file.clone().unwrap_or_else(|| {
            self.project_dir
                .join(format!("Pulumi.{}.yaml", self.stack))
        });
        let mut stack_file = if stack_file_path.exists() {
            StackFile::load(&stack_file_path, &settings.project)?
        } else if self.stack_file.is_some() {
            anyhow::bail!("Stack file not found: {}", stack_file_path.display());
        } else {
            tracing::warn!(
                path = %stack_file_path.display(),
                "no stack file, using -D values only"
            );
            StackFile::default()
        };

        let dynamic_configs = parse_dynamic_configs(&self.properties)
            .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
        apply_overrides(&dynamic_configs, &mut stack_file, &mut settings)?;

        tracing::debug!(
            stack = %self.stack,
            keys = stack_file.len(),
            "loaded stack configuration"
        );
        Ok((settings, StackConfig::new(stack_file)))
    }

    pub fn compose(&self) -> anyhow::Result<(StackSettings, ComposedStack)> {
        let (settings, config) = self.load()?;
        let stack = StackComposer::new(&settings, &config)
            .compose()
            .map_err(|e| anyhow::anyhow!("Failed to compose stack: {}", e))?;
        Ok((settings, stack))
    }

    pub fn descriptor(&self, settings: &StackSettings) -> StackDescriptor {
        StackDescriptor::new(&settings.project, &self.stack, self.project_dir.clone())
    }
}

#[derive(Parser, Debug)]
pub struct RenderCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    /// Write the program into the project directory instead of printing it
    #[arg(long)]
    pub write: bool,
}

#[derive(Parser, Debug)]
pub struct GraphCommand {
    #[command(flatten)]
    pub stack: StackArgs,
}

#[derive(Parser, Debug)]
pub struct PreviewCommand {
    #[command(flatten)]
    pub stack: StackArgs,
}

#[derive(Parser, Debug)]
pub struct UpCommand {
    #[command(flatten)]
    pub stack: StackArgs,
}

#[derive(Parser, Debug)]
pub struct DestroyCommand {
    #[command(flatten)]
    pub stack: StackArgs,
}

#[derive(Parser, Debug)]
pub struct OutputsCommand {
    #[command(flatten)]
    pub stack: StackArgs,
}

#[derive(Parser, Debug)]
pub struct BootstrapCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    /// Fleet member index
    #[arg(long, short = 'i', default_value = "0")]
    pub index: usize,
}

impl RenderCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (settings, stack) = self.stack.compose()?;
        let descriptor = self.stack.descriptor(&settings);

        if self.write {
            let path = descriptor
                .write_program(&stack)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to write program: {}", e))?;
            println!("Program written to {}", path.display());
        } else {
            print!("{}", descriptor.render(&stack)?);
        }
        Ok(())
    }
}

impl GraphCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (_, stack) = self.stack.compose()?;
        let renderer = TableRenderer::new();
        println!("{}", renderer.render_summary(&stack));
        println!("{}", renderer.render_declarations(&stack.graph));
        Ok(())
    }
}

impl PreviewCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (settings, stack) = self.stack.compose()?;
        self.stack
            .descriptor(&settings)
            .preview(&stack)
            .await
            .map_err(|e| anyhow::anyhow!("Preview failed: {}", e))?;
        Ok(())
    }
}

impl UpCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (settings, stack) = self.stack.compose()?;
        let outputs = self
            .stack
            .descriptor(&settings)
            .up(&stack)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to apply stack: {}", e))?;

        println!("Stack {} is up to date!", self.stack.stack);
        println!(
            "{}",
            TableRenderer::new().render_outputs(&self.stack.stack, &outputs)
        );
        Ok(())
    }
}

impl DestroyCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (settings, stack) = self.stack.compose()?;
        self.stack
            .descriptor(&settings)
            .destroy(&stack)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to destroy stack: {}", e))?;

        println!("Stack {} destroyed successfully!", self.stack.stack);
        Ok(())
    }
}

impl OutputsCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let settings = StackSettings::load_or_default(self.stack.settings.as_deref())?;
        let outputs = self
            .stack
            .descriptor(&settings)
            .outputs()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read stack outputs: {}", e))?;

        println!(
            "{}",
            TableRenderer::new().render_outputs(&self.stack.stack, &outputs)
        );
        Ok(())
    }
}

impl BootstrapCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (settings, stack) = self.stack.compose()?;
        if stack.fleet.is_empty() {
            anyhow::bail!("Fleet clusters are disabled (set installFleetClusters=true)");
        }

        let script = self
            .stack
            .descriptor(&settings)
            .bootstrap_script(&stack, self.index)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to build bootstrap script: {}", e))?;
        print!("{}", script);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::constants::*;
    use std::io::Write;

    fn args(dir: &std::path::Path, properties: &[&str]) -> StackArgs {
        StackArgs {
            stack: "dev".to_string(),
            project_dir: dir.to_path_buf(),
            stack_file: None,
            settings: None,
            properties: properties.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_load_without_stack_file() {
        let dir = tempfile::tempdir().unwrap();
        let (settings, config) = args(dir.path(), &["installFleetClusters=true", "settings.fleet.size=2"])
            .load()
            .unwrap();
        assert_eq!(settings.fleet.size, 2);
        assert!(config.get_bool(KEY_INSTALL_FLEET_CLUSTERS).unwrap());
    }

    #[test]
    fn test_load_stack_file_with_override() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("Pulumi.dev.yaml")).unwrap();
        writeln!(
            file,
            "config:\n  rancher-infra:installIstio: \"true\"\n  rancher-infra:fleetClustersEC2Size: t3a.small"
        )
        .unwrap();

        let (_, config) = args(dir.path(), &["fleetClustersEC2Size=t3a.large"])
            .load()
            .unwrap();
        assert!(config.get_bool(KEY_INSTALL_ISTIO).unwrap());
        assert_eq!(
            config.require(KEY_FLEET_CLUSTERS_SIZE).unwrap(),
            "t3a.large"
        );
    }

    #[test]
    fn test_explicit_missing_stack_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), &[]);
        args.stack_file = Some(dir.path().join("missing.yaml"));
        assert!(args.load().is_err());
    }
}
