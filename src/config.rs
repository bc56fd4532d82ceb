use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{action::ExecutorConfig, planning::PlannerConfig, runner::RunnerConfig};

const DEFAULT_SCHEMA_FILE: &str = "planwright.schema.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs/planwright")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_retention_days() -> usize {
    14
}

fn default_enabled_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    #[default]
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default)]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
    #[serde(default = "default_enabled_true")]
    pub stderr_warn_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: LoggingRotation::default(),
            retention_days: default_logging_retention_days(),
            stderr_warn_enabled: true,
        }
    }
}

impl Config {
    /// Reads a JSON5 file, validates it against its schema, and resolves
    /// relative paths against the file's directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let text = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let value: Value = json5::from_str(&text)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema_path = resolve_schema_path(config_base, &value)?;
        validate_against_schema(&value, &schema_path)?;

        let mut config: Config =
            serde_json::from_value(value).context("failed to deserialize planwright config")?;
        if config.logging.dir.is_relative() {
            config.logging.dir = config_base.join(&config.logging.dir);
        }
        Ok(config)
    }
}

fn resolve_schema_path(config_base: &Path, value: &Value) -> Result<PathBuf> {
    if let Some(declared) = value.get("$schema").and_then(Value::as_str) {
        let declared = PathBuf::from(declared);
        return Ok(if declared.is_absolute() {
            declared
        } else {
            config_base.join(declared)
        });
    }

    let sibling = config_base.join(DEFAULT_SCHEMA_FILE);
    if sibling.exists() {
        return Ok(sibling);
    }

    Err(anyhow!(
        "unable to resolve schema path: expected $schema in config or {} beside it",
        DEFAULT_SCHEMA_FILE
    ))
}

fn validate_against_schema(value: &Value, schema_path: &Path) -> Result<()> {
    let schema_text = fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read schema {}", schema_path.display()))?;
    let schema: Value = serde_json::from_str(&schema_text)
        .with_context(|| format!("failed to parse schema {}", schema_path.display()))?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| anyhow!("failed to compile schema: {err}"))?;

    if let Err(errors) = compiled.validate(value) {
        let messages: Vec<String> = errors.map(|error| error.to_string()).collect();
        return Err(anyhow!("config validation failed: {}", messages.join("; ")));
    }
    Ok(())
}
