// CLI command definitions

use super::stack::{
    BootstrapCommand, DestroyCommand, GraphCommand, OutputsCommand, PreviewCommand,
    RenderCommand, UpCommand,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "rancher-infra",
    version,
    about = "Rancher cluster infrastructure on AWS, declared as a Pulumi program",
    long_about = "Declares an AWS network, an optional Rancher-managed RKE cluster with add-ons \
                  and an optional K3s fleet, then hands the program to Pulumi"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print the Pulumi YAML program for the stack configuration
    Render(RenderCommand),

    /// Show declarations, their dependencies and apply waves
    Graph(GraphCommand),

    /// Write the program and run `pulumi preview`
    Preview(PreviewCommand),

    /// Write the program and run `pulumi up`
    Up(UpCommand),

    /// Destroy every resource of the stack
    Destroy(DestroyCommand),

    /// Show the stack outputs
    Outputs(OutputsCommand),

    /// Print the user data of a fleet node
    Bootstrap(BootstrapCommand),
}
