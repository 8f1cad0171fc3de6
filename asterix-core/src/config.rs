//! Configuration file management for asterix-decode.
//!
//! Reads/writes `~/.asterix-decode/config.yaml` with decode behaviour
//! (enabled categories, skip-and-continue) and the default output format.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::warn;

use crate::types::AsterixError;
use crate::uap::ProfileSet;

/// Full configuration structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub decode: DecodeConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeConfig {
    /// Step over a failing data block by its declared length instead of
    /// aborting the rest of the capture.
    pub skip_errors: bool,
    /// Built-in categories to enable. Empty means all of them.
    pub categories: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// How decoded captures are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Summary,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Summary => "summary",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = AsterixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "summary" => Ok(OutputFormat::Summary),
            other => Err(AsterixError::Config(format!("unknown output format: {other}"))),
        }
    }
}

impl Config {
    /// Profile set for decoding: the built-in tables, narrowed to
    /// `decode.categories` when that list is not empty.
    pub fn profile_set(&self) -> ProfileSet {
        let builtin = ProfileSet::builtin();
        if self.decode.categories.is_empty() {
            builtin
        } else {
            builtin.retain(&self.decode.categories)
        }
    }

    /// The config as it would be written to disk.
    pub fn to_text(&self) -> String {
        serialize_config(self)
    }
}

/// Get the config directory path (`~/.asterix-decode/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".asterix-decode")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.asterix-decode/config.yaml`.
///
/// Returns default config if file doesn't exist.
pub fn load_config() -> Config {
    load_config_from(&config_file())
}

/// Load config from an explicit path, falling back to defaults.
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!("cannot read {}: {e}", path.display());
            return Config::default();
        }
    };

    parse_config(&text).unwrap_or_default()
}

/// Save config to `~/.asterix-decode/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf, AsterixError> {
    save_config_to(config, &config_file())
}

/// Save config to an explicit path, creating its directory.
pub fn save_config_to(config: &Config, path: &Path) -> Result<PathBuf, AsterixError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| AsterixError::Config(e.to_string()))?;
    }

    let text = serialize_config(config);
    std::fs::write(path, text).map_err(|e| AsterixError::Config(e.to_string()))?;

    Ok(path.to_path_buf())
}

/// Parse simple YAML-like config text.
fn parse_config(text: &str) -> Option<Config> {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = val.is_empty().then(|| key.to_string());
            continue;
        }

        match (current_section.as_deref(), key) {
            (Some("decode"), "skip_errors") => {
                if let Some(v) = parse_bool_value(val) {
                    config.decode.skip_errors = v;
                }
            }
            (Some("decode"), "categories") => {
                config.decode.categories = parse_category_list(val);
            }
            (Some("output"), "format") => {
                if let Some(v) = parse_string_value(val) {
                    match v.parse() {
                        Ok(format) => config.output.format = format,
                        Err(e) => warn!("{e}"),
                    }
                }
            }
            _ => {}
        }
    }

    Some(config)
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_bool_value(val: &str) -> Option<bool> {
    match val {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse `[48, 34]`, `48, 34` or `48 34`. Entries that are not a category
/// number are dropped.
fn parse_category_list(val: &str) -> Vec<u8> {
    val.trim_start_matches('[')
        .trim_end_matches(']')
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<u8>() {
            Ok(cat) => Some(cat),
            Err(_) => {
                warn!("ignoring category {s:?} in config");
                None
            }
        })
        .collect()
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# asterix-decode configuration".to_string(), String::new()];

    lines.push("decode:".into());
    lines.push(format!("  skip_errors: {}", config.decode.skip_errors));
    let categories: Vec<String> = config
        .decode
        .categories
        .iter()
        .map(|c| c.to_string())
        .collect();
    lines.push(format!("  categories: [{}]", categories.join(", ")));
    lines.push(String::new());

    lines.push("output:".into());
    lines.push(format!("  format: \"{}\"", config.output.format));

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.decode.skip_errors);
        assert!(config.decode.categories.is_empty());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.profile_set().len(), ProfileSet::builtin().len());
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
# capture replay settings
decode:
  skip_errors: true
  categories: [48]

output:
  format: "json"
"#;
        let config = parse_config(text).unwrap();
        assert!(config.decode.skip_errors);
        assert_eq!(config.decode.categories, vec![48]);
        assert_eq!(config.output.format, OutputFormat::Json);

        let profiles = config.profile_set();
        assert!(profiles.contains(48));
        assert!(!profiles.contains(34));
    }

    #[test]
    fn test_parse_config_bad_values() {
        let text = r#"
decode:
  skip_errors: maybe
  categories: 48, x, 300, 34

output:
  format: xml
"#;
        let config = parse_config(text).unwrap();
        assert!(!config.decode.skip_errors);
        assert_eq!(config.decode.categories, vec![48, 34]);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_config_ignores_unknown_sections() {
        let text = "receiver:\n  name: test\nformat: json\n";
        assert_eq!(parse_config(text).unwrap(), Config::default());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("SUMMARY".parse::<OutputFormat>().unwrap(), OutputFormat::Summary);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_roundtrip() {
        let config = Config {
            decode: DecodeConfig {
                skip_errors: true,
                categories: vec![34, 48],
            },
            output: OutputConfig {
                format: OutputFormat::Summary,
            },
        };
        let text = serialize_config(&config);
        let parsed = parse_config(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let path = std::env::temp_dir().join("asterix-decode-missing/config.yaml");
        assert_eq!(load_config_from(&path), Config::default());
    }
}
