//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::graph::DeclarationGraph;
use crate::domain::stack::{AddOn, ComposedStack};
use crate::infrastructure::constants::{MASKED_SECRET, SECRET_OUTPUTS};
use crate::infrastructure::pulumi::StackOutputs;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Declarations grouped by wave, one row each
    pub fn render_declarations(&self, graph: &DeclarationGraph) -> String {
        if graph.is_empty() {
            return "No resources declared".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("WAVE").set_alignment(CellAlignment::Center),
                Cell::new("RESOURCE").set_alignment(CellAlignment::Left),
                Cell::new("TYPE").set_alignment(CellAlignment::Left),
                Cell::new("DEPENDS ON").set_alignment(CellAlignment::Left),
            ]);

        let waves = graph.waves();
        for (level, members) in waves.iter().enumerate() {
            for name in members {
                let Some(declaration) = graph.get(name) else {
                    continue;
                };
                let deps: Vec<String> = graph.dependencies(name).into_iter().collect();
                table.add_row(vec![
                    Cell::new(level).set_alignment(CellAlignment::Center),
                    Cell::new(format!(
                        "{} {}",
                        StatusIcon::kind_icon(declaration.kind),
                        declaration.name
                    ))
                    .fg(self.theme.kind_color(declaration.kind)),
                    Cell::new(declaration.kind.type_token()),
                    Cell::new(deps.join("\n")).fg(self.theme.muted),
                ]);
            }
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Declarations {} ─╮\n",
            format!("[{} resources, {} waves]", graph.len(), waves.len())
                .bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    /// Which optional blocks were declared
    pub fn render_summary(&self, stack: &ComposedStack) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("BLOCK").set_alignment(CellAlignment::Left),
                Cell::new("STATUS").set_alignment(CellAlignment::Center),
                Cell::new("DETAILS").set_alignment(CellAlignment::Left),
            ]);

        table.add_row(vec![
            Cell::new("Network"),
            Cell::new(format!("{} {}", StatusIcon::ENABLED, StatusIcon::gate_text(true)))
                .fg(self.theme.gate_color(true)),
            Cell::new(format!(
                "{} ({} subnets)",
                stack.network.vpc.name(),
                stack.network.subnets.len()
            )),
        ]);

        let cluster_enabled = stack.flags.install_downstream_cluster;
        let cluster_details = stack
            .downstream
            .as_ref()
            .map(|c| format!("{} ({} node pools)", c.cluster.name(), c.pools.len()))
            .unwrap_or_default();
        table.add_row(self.gate_row("Downstream cluster", cluster_enabled, cluster_details));

        for addon in AddOn::ALL {
            let installed = stack.addons.iter().find(|a| a.addon == addon);
            let details = installed
                .map(|a| {
                    format!(
                        "{} {} in {}",
                        a.addon.chart(),
                        a.addon.chart_version(),
                        a.addon.namespace()
                    )
                })
                .unwrap_or_default();
            table.add_row(self.gate_row(&format!("  {}", addon), installed.is_some(), details));
        }

        let fleet_enabled = stack.flags.install_fleet_clusters;
        let fleet_details = if stack.fleet.is_empty() {
            String::new()
        } else {
            format!("{} single-node K3s clusters", stack.fleet.len())
        };
        table.add_row(self.gate_row("Fleet clusters", fleet_enabled, fleet_details));

        table.to_string()
    }

    /// Stack outputs reported by the engine
    pub fn render_outputs(&self, stack: &str, outputs: &StackOutputs) -> String {
        if outputs.is_empty() {
            return format!("No outputs for stack {}", stack);
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("OUTPUT").set_alignment(CellAlignment::Left),
                Cell::new("VALUE").set_alignment(CellAlignment::Left),
            ]);

        for (name, value) in outputs {
            if SECRET_OUTPUTS.contains(&name.as_str()) {
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new(MASKED_SECRET).fg(self.theme.muted),
                ]);
                continue;
            }
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join("\n"),
                serde_json::Value::Null => StatusIcon::PENDING.to_string(),
                other => other.to_string(),
            };
            table.add_row(vec![Cell::new(name), Cell::new(text)]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Stack {} {} ─╮\n",
            stack,
            chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    fn gate_row(&self, label: &str, enabled: bool, details: String) -> Vec<Cell> {
        vec![
            Cell::new(label),
            Cell::new(format!(
                "{} {}",
                StatusIcon::gate_icon(enabled),
                StatusIcon::gate_text(enabled)
            ))
            .fg(self.theme.gate_color(enabled)),
            Cell::new(details),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{Declaration, ResourceKind};
    use crate::domain::config::{StackConfig, StackSettings};
    use crate::domain::stack::StackComposer;
    use crate::infrastructure::constants::*;
    use std::collections::HashMap;

    #[test]
    fn test_render_empty_graph() {
        let renderer = TableRenderer::new();
        let output = renderer.render_declarations(&DeclarationGraph::new());
        assert!(output.contains("No resources declared"));
    }

    #[test]
    fn test_render_declarations() {
        let mut graph = DeclarationGraph::new();
        let vpc = graph
            .declare(Declaration::new("main-vpc", ResourceKind::Vpc))
            .unwrap();
        graph
            .declare(
                Declaration::new("main-gw", ResourceKind::InternetGateway)
                    .property("vpcId", vpc.id()),
            )
            .unwrap();

        let output = TableRenderer::new().render_declarations(&graph);
        assert!(output.contains("main-vpc"));
        assert!(output.contains("aws:ec2:InternetGateway"));
        assert!(output.contains("2 waves"));
    }

    #[test]
    fn test_render_outputs() {
        let mut outputs = StackOutputs::new();
        outputs.insert("vpcId".to_string(), serde_json::json!("vpc-123"));
        outputs.insert("subnetIds".to_string(), serde_json::json!(["subnet-a", "subnet-b"]));

        let output = TableRenderer::new().render_outputs("dev", &outputs);
        assert!(output.contains("vpc-123"));
        assert!(output.contains("subnet-b"));
        assert!(TableRenderer::new()
            .render_outputs("dev", &StackOutputs::new())
            .contains("No outputs"));
    }

    #[test]
    fn test_render_summary_lists_installed_charts() {
        let values: HashMap<String, String> = [
            (KEY_INSTALL_DOWNSTREAM_CLUSTER, "true"),
            (KEY_ACCESS_KEY, "AKIAEXAMPLE"),
            (KEY_SECRET_KEY, "example-secret"),
            (KEY_DOWNSTREAM_CLUSTER_SIZE, "t3a.xlarge"),
            (KEY_INSTALL_MONITORING, "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let settings = StackSettings::default();
        let config = StackConfig::new(values);
        let stack = StackComposer::new(&settings, &config).compose().unwrap();

        let output = TableRenderer::new().render_summary(&stack);
        assert!(output.contains("rancher-monitoring"));
        assert!(!output.contains("rancher-istio"));
    }

    #[test]
    fn test_render_outputs_masks_registration_commands() {
        let mut outputs = StackOutputs::new();
        outputs.insert(
            OUTPUT_FLEET_COMMANDS.to_string(),
            serde_json::json!(["kubectl apply -f https://rancher.example.com/v3/import/a.yaml"]),
        );

        let output = TableRenderer::new().render_outputs("dev", &outputs);
        assert!(output.contains(MASKED_SECRET));
        assert!(!output.contains("import/a.yaml"));
    }
}
