//! Configuration loading and parsing
//!
//! Two files feed the application:
//! - the signal configurations (JSON, `configurations.json`)
//! - optional application settings (TOML)

use anyhow::{Context, Result};
use can_signal_matcher::{validate_rules, RuleSetError, SessionConfig, SignalRule, ValidationError};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Application settings (loaded from settings.toml)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub trace: TraceSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceSettings {
    /// Frames buffered between the reception thread and the session
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    1024
}

/// Load application settings from a TOML file
pub fn load_settings(path: &Path) -> Result<AppSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {:?}", path))?;

    let settings: AppSettings = toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file: {:?}", path))?;

    Ok(settings)
}

/// Top-level layout of the signal configuration file
#[derive(Debug, Deserialize)]
struct ConfigurationFile {
    #[serde(default)]
    configurations: Vec<RawConfiguration>,
}

#[derive(Debug, Deserialize)]
struct RawConfiguration {
    name: Option<String>,
    signals: Option<Vec<Value>>,
}

/// A named, validated set of signal rules
#[derive(Debug, Clone)]
pub struct SignalConfiguration {
    pub name: String,
    pub rules: Vec<SignalRule>,
}

/// Load signal configurations from a JSON file
///
/// Each configuration is validated on its own. A configuration with a
/// malformed signal is reported and skipped; the remaining ones stay
/// available.
pub fn load_configurations(path: &Path) -> Result<Vec<SignalConfiguration>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {:?}", path))?;

    parse_configurations(&content)
        .with_context(|| format!("Failed to parse configuration file: {:?}", path))
}

/// Parse the contents of a signal configuration file
pub fn parse_configurations(content: &str) -> Result<Vec<SignalConfiguration>> {
    let file: ConfigurationFile = serde_json::from_str(content)?;

    let mut configurations = Vec::new();
    for (index, raw) in file.configurations.into_iter().enumerate() {
        let name = raw.name.unwrap_or_else(|| format!("Unnamed #{}", index));

        let Some(signals) = raw.signals else {
            log::error!("Configuration '{}' has no signal list, skipping", name);
            continue;
        };

        match validate_rules(&signals) {
            Ok(rules) => {
                log::debug!("Configuration '{}': {} signal(s)", name, rules.len());
                configurations.push(SignalConfiguration { name, rules });
            }
            Err(e) => {
                log::error!("Configuration '{}' rejected: {}", name, e);
                if let Some(hint) = rejection_hint(&e) {
                    log::warn!("Configuration '{}' dropped: {}", name, hint);
                }
            }
        }
    }

    log::info!("Loaded {} configuration(s)", configurations.len());
    Ok(configurations)
}

/// Extra guidance for rejections users are likely to hit by accident
fn rejection_hint(error: &RuleSetError) -> Option<String> {
    match &error.source {
        ValidationError::OutOfRange { field, value, max } => Some(format!(
            "'{}' = {} does not fit in {} (signal #{})",
            field, value, max, error.index
        )),
        _ => None,
    }
}

/// Names of all loaded configurations, in file order
pub fn configuration_names(configurations: &[SignalConfiguration]) -> Vec<&str> {
    configurations.iter().map(|c| c.name.as_str()).collect()
}

/// Find a configuration by name
pub fn find_configuration<'a>(
    configurations: &'a [SignalConfiguration],
    name: &str,
) -> Option<&'a SignalConfiguration> {
    configurations.iter().find(|c| c.name == name)
}
