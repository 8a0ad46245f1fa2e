//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, VALID_THEMES};
use crate::domain::device::QualityTier;
use crate::domain::error::ConfigError;
use crate::domain::library::SortKey;
use crate::domain::recording::{LimitMode, OutputFormat};

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;
    check_limit_consistency(&config)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    let value = config_value(&config, key).unwrap_or_else(|| NOT_SET.to_string());
    presenter.output(&value);

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = config_value(&config, key).unwrap_or_else(|| NOT_SET.to_string());
        presenter.key_value(key, &value);
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Current value of `key` rendered for display
fn config_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "output_format" => config.output_format.clone(),
        "quality" => config.quality.clone(),
        "channels" => config.channels.map(|c| c.to_string()),
        "limit_mode" => config.limit_mode.clone(),
        "limit_value" => config.limit_value.map(|v| v.to_string()),
        "input_device" => config.input_device.clone(),
        "sort_mode" => config.sort_mode.clone(),
        "sort_reverse" => config.sort_reverse.map(|b| b.to_string()),
        "theme" => config.theme.clone(),
        "language" => config.language.clone(),
        "recordings_dir" => config
            .recordings_dir
            .as_ref()
            .map(|p| p.display().to_string()),
        _ => None,
    }
}

/// Store an already-validated value, normalizing it to its canonical form
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "output_format" => {
            let format: OutputFormat = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            config.output_format = Some(format.to_string());
        }
        "quality" => {
            let tier: QualityTier = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            config.quality = Some(tier.to_string());
        }
        "channels" => config.channels = Some(parse_channels(value).map_err(invalid)?),
        "limit_mode" => {
            let mode: LimitMode = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            config.limit_mode = Some(mode.to_string());
        }
        "limit_value" => config.limit_value = Some(parse_limit_value(value).map_err(invalid)?),
        "input_device" => config.input_device = Some(value.to_string()),
        "sort_mode" => {
            let sort: SortKey = value.parse()?;
            config.sort_mode = Some(sort.to_string());
        }
        "sort_reverse" => {
            config.sort_reverse = Some(
                parse_bool(value).map_err(|_| invalid("Value must be 'true' or 'false'".into()))?,
            )
        }
        "theme" => config.theme = Some(value.to_lowercase()),
        "language" => config.language = Some(value.to_string()),
        "recordings_dir" => config.recordings_dir = Some(value.into()),
        _ => return Err(invalid("Unknown key".to_string())),
    }
    Ok(())
}

/// A remembered limit value must fit the remembered mode
fn check_limit_consistency(config: &AppConfig) -> Result<(), ConfigError> {
    let value = config.limit_value.unwrap_or(0);
    let mode = config.limit_mode_or_default();
    if value > mode.max_value() {
        return Err(ConfigError::ValidationError {
            key: "limit_value".to_string(),
            message: format!(
                "{} exceeds the {} limit maximum of {}",
                value,
                mode,
                mode.max_value()
            ),
        });
    }
    Ok(())
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "output_format" => {
            value
                .parse::<OutputFormat>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        "quality" => {
            value
                .parse::<QualityTier>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        "channels" => {
            parse_channels(value).map_err(invalid)?;
        }
        "limit_mode" => {
            value
                .parse::<LimitMode>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        "limit_value" => {
            parse_limit_value(value).map_err(invalid)?;
        }
        "sort_mode" => {
            value.parse::<SortKey>()?;
        }
        "sort_reverse" => {
            parse_bool(value).map_err(|_| invalid("Value must be 'true' or 'false'".into()))?;
        }
        "theme" => {
            let lower = value.to_lowercase();
            if !VALID_THEMES.contains(&lower.as_str()) {
                return Err(invalid(format!(
                    "Invalid value '{}'. Valid options: {}",
                    value,
                    VALID_THEMES.join(", ")
                )));
            }
        }
        "language" => {
            if !is_language_tag(value) {
                return Err(invalid(format!(
                    "Invalid language tag '{}'. Expected e.g. en, de, pt-BR",
                    value
                )));
            }
        }
        "input_device" | "recordings_dir" => {
            if value.trim().is_empty() {
                return Err(invalid("Value must not be empty".to_string()));
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_channels(value: &str) -> Result<u16, String> {
    match value.trim().parse::<u16>() {
        Ok(c @ 1..=2) => Ok(c),
        _ => Err(format!("Invalid channel count '{}': must be 1 or 2", value)),
    }
}

/// Limit values are seconds or kilobytes; 0 means unlimited
fn parse_limit_value(value: &str) -> Result<u64, String> {
    let max = LimitMode::Size.max_value().max(LimitMode::Time.max_value());
    match value.trim().parse::<u64>() {
        Ok(v) if v <= max => Ok(v),
        _ => Err(format!(
            "Invalid limit '{}': expected 0 (unlimited) up to {}",
            value, max
        )),
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

/// BCP 47-ish tag: a 2-3 letter language with optional alphanumeric subtags
fn is_language_tag(value: &str) -> bool {
    let mut parts = value.split(['-', '_']);
    let primary_ok = parts
        .next()
        .map(|p| (2..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);
    primary_ok && parts.all(|p| (2..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}
