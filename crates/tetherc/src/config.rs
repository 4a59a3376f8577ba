use serde::Deserialize;
use std::path::Path;

use tether_snippet::DEFAULT_GLOBAL_ALIAS;

/// Represents a parsed tether.toml file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TetherConfig {
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// The [translate] section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslateConfig {
    /// Identifier bound once to the ambient global object.
    #[serde(default = "default_global_alias")]
    pub global_alias: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            global_alias: default_global_alias(),
        }
    }
}

fn default_global_alias() -> String {
    DEFAULT_GLOBAL_ALIAS.to_string()
}

/// The [diagnostics] section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub warnings_as_errors: bool,
    /// Error codes reported as warnings.
    #[serde(default)]
    pub demote: Vec<String>,
}

impl TetherConfig {
    /// Read and parse a tether.toml file.
    pub fn from_file(path: &Path) -> Result<TetherConfig, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_str(&content)
    }

    /// Parse a tether.toml from a string.
    pub fn from_str(content: &str) -> Result<TetherConfig, String> {
        let config: TetherConfig =
            toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))?;
        if !is_identifier(&config.translate.global_alias) {
            return Err(format!(
                "Failed to parse config: `{}` is not a valid global alias",
                config.translate.global_alias
            ));
        }
        Ok(config)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
[translate]
global_alias = "__g"

[diagnostics]
warnings_as_errors = true
demote = ["E0201"]
"#;
        let config = TetherConfig::from_str(toml).unwrap();
        assert_eq!(config.translate.global_alias, "__g");
        assert!(config.diagnostics.warnings_as_errors);
        assert_eq!(config.diagnostics.demote, vec!["E0201"]);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = TetherConfig::from_str("").unwrap();
        assert_eq!(config, TetherConfig::default());
        assert_eq!(config.translate.global_alias, "$global");
        assert!(!config.diagnostics.warnings_as_errors);
        assert!(config.diagnostics.demote.is_empty());
    }

    #[test]
    fn invalid_alias_is_rejected() {
        let err = TetherConfig::from_str("[translate]\nglobal_alias = \"1x\"\n").unwrap_err();
        assert!(err.contains("not a valid global alias"), "{err}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TetherConfig::from_str("[translate]\nalias = \"g\"\n").unwrap_err();
        assert!(err.starts_with("Failed to parse config"), "{err}");
    }
}
