//! Icons for CLI output

use crate::domain::graph::ResourceKind;

pub struct StatusIcon;

impl StatusIcon {
    /// Block declared
    pub const ENABLED: &'static str = "✓";

    /// Block skipped
    pub const DISABLED: &'static str = "✗";

    /// Value known only after apply
    pub const PENDING: &'static str = "⏳";

    pub fn gate_icon(enabled: bool) -> &'static str {
        if enabled {
            Self::ENABLED
        } else {
            Self::DISABLED
        }
    }

    pub fn gate_text(enabled: bool) -> &'static str {
        if enabled {
            "Enabled"
        } else {
            "Disabled"
        }
    }

    pub fn kind_icon(kind: ResourceKind) -> &'static str {
        match kind {
            ResourceKind::Vpc
            | ResourceKind::InternetGateway
            | ResourceKind::SecurityGroup
            | ResourceKind::Subnet
            | ResourceKind::DefaultRouteTable => "🌐",
            ResourceKind::Instance => "🖥",
            ResourceKind::CloudCredential => "🔑",
            ResourceKind::NodeTemplate | ResourceKind::NodePool => "🔶",
            ResourceKind::Cluster | ResourceKind::ClusterSync => "🔷",
            ResourceKind::App => "📦",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_icon() {
        assert_eq!(StatusIcon::gate_icon(true), StatusIcon::ENABLED);
        assert_eq!(StatusIcon::gate_icon(false), StatusIcon::DISABLED);
        assert_eq!(StatusIcon::gate_text(true), "Enabled");
        assert_eq!(StatusIcon::gate_text(false), "Disabled");
    }

    #[test]
    fn test_kind_icon() {
        assert_eq!(StatusIcon::kind_icon(ResourceKind::Subnet), "🌐");
        assert_eq!(StatusIcon::kind_icon(ResourceKind::App), "📦");
    }
}
