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

use clap::Parser;
use rancher_infra::cli::{commands::Commands, CliArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();

    match args.command {
        Commands::Render(cmd) => cmd.execute().await,
        Commands::Graph(cmd) => cmd.execute().await,
        Commands::Preview(cmd) => cmd.execute().await,
        Commands::Up(cmd) => cmd.execute().await,
        Commands::Destroy(cmd) => cmd.execute().await,
        Commands::Outputs(cmd) => cmd.execute().await,
        Commands::Bootstrap(cmd) => cmd.execute().await,
    }
}
