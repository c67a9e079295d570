//! Color theme for CLI output

use crate::domain::graph::ResourceKind;
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub enabled: TableColor,
    pub disabled: TableColor,
    pub aws: TableColor,
    pub rancher: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            enabled: TableColor::Green,
            disabled: TableColor::DarkGrey,
            aws: TableColor::Yellow,
            rancher: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Color of a declaration row, by provider
    pub fn kind_color(&self, kind: ResourceKind) -> TableColor {
        match kind.provider() {
            "aws" => self.aws,
            "rancher2" => self.rancher,
            _ => self.muted,
        }
    }

    pub fn gate_color(&self, enabled: bool) -> TableColor {
        if enabled {
            self.enabled
        } else {
            self.disabled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.enabled, TableColor::Green);
        assert_eq!(theme.disabled, TableColor::DarkGrey);
    }

    #[test]
    fn test_kind_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.kind_color(ResourceKind::Subnet), TableColor::Yellow);
        assert_eq!(theme.kind_color(ResourceKind::App), TableColor::Cyan);
        assert_eq!(theme.gate_color(false), TableColor::DarkGrey);
    }
}
