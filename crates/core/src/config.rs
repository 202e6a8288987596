use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::comparer::{FloatComparer, DEFAULT_EPSILON};
use crate::domain::phase::Phase;
use crate::planner::SearchLimits;
use crate::scenario::BeliefThresholds;

pub const DEFAULT_MAX_NODES: usize = 100_000;

#[derive(Clone, Debug, Serialize)]
pub struct AppConfig {
    pub planner: PlannerConfig,
    pub beliefs: BeliefsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlannerConfig {
    pub epsilon: f32,
    pub target_phase: u8,
    pub max_nodes: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BeliefsConfig {
    pub one_step: f32,
    pub two_steps: f32,
    pub min_threshold: f32,
    pub mid_threshold: f32,
    pub max_threshold: f32,
    pub min_value: f32,
    pub max_value: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub epsilon: Option<f32>,
    pub target_phase: Option<u8>,
    pub max_nodes: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let thresholds = BeliefThresholds::default();
        Self {
            planner: PlannerConfig {
                epsilon: DEFAULT_EPSILON,
                target_phase: Phase::terminal().ordinal(),
                max_nodes: Some(DEFAULT_MAX_NODES),
            },
            beliefs: BeliefsConfig {
                one_step: thresholds.one_step,
                two_steps: thresholds.two_steps,
                min_threshold: thresholds.min_threshold,
                mid_threshold: thresholds.mid_threshold,
                max_threshold: thresholds.max_threshold,
                min_value: thresholds.min_value,
                max_value: thresholds.max_value,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("config/lilo.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn comparer(&self) -> FloatComparer {
        FloatComparer::new(self.planner.epsilon)
    }

    pub fn thresholds(&self) -> BeliefThresholds {
        let beliefs = &self.beliefs;
        BeliefThresholds {
            one_step: beliefs.one_step,
            two_steps: beliefs.two_steps,
            min_threshold: beliefs.min_threshold,
            mid_threshold: beliefs.mid_threshold,
            max_threshold: beliefs.max_threshold,
            min_value: beliefs.min_value,
            max_value: beliefs.max_value,
        }
    }

    pub fn target_phase(&self) -> Result<Phase, ConfigError> {
        Phase::from_ordinal(self.planner.target_phase).ok_or_else(|| {
            ConfigError::Validation("planner.target_phase must be in range 1..=5".to_string())
        })
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits { max_nodes: self.planner.max_nodes }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(planner) = patch.planner {
            if let Some(epsilon) = planner.epsilon {
                self.planner.epsilon = epsilon;
            }
            if let Some(target_phase) = planner.target_phase {
                self.planner.target_phase = target_phase;
            }
            if let Some(max_nodes) = planner.max_nodes {
                self.planner.max_nodes = Some(max_nodes);
            }
        }

        if let Some(beliefs) = patch.beliefs {
            let target = &mut self.beliefs;
            for (slot, value) in [
                (&mut target.one_step, beliefs.one_step),
                (&mut target.two_steps, beliefs.two_steps),
                (&mut target.min_threshold, beliefs.min_threshold),
                (&mut target.mid_threshold, beliefs.mid_threshold),
                (&mut target.max_threshold, beliefs.max_threshold),
                (&mut target.min_value, beliefs.min_value),
                (&mut target.max_value, beliefs.max_value),
            ] {
                if let Some(value) = value {
                    *slot = value;
                }
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LILO_EPSILON") {
            self.planner.epsilon = parse_f32("LILO_EPSILON", &value)?;
        }
        if let Some(value) = read_env("LILO_TARGET_PHASE") {
            self.planner.target_phase = parse_u8("LILO_TARGET_PHASE", &value)?;
        }
        if let Some(value) = read_env("LILO_MAX_NODES") {
            self.planner.max_nodes = Some(parse_usize("LILO_MAX_NODES", &value)?);
        }

        if let Some(value) = read_env("LILO_ONE_STEP") {
            self.beliefs.one_step = parse_f32("LILO_ONE_STEP", &value)?;
        }
        if let Some(value) = read_env("LILO_TWO_STEPS") {
            self.beliefs.two_steps = parse_f32("LILO_TWO_STEPS", &value)?;
        }

        let log_level = read_env("LILO_LOGGING_LEVEL").or_else(|| read_env("LILO_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("LILO_LOGGING_FORMAT").or_else(|| read_env("LILO_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(epsilon) = overrides.epsilon {
            self.planner.epsilon = epsilon;
        }
        if let Some(target_phase) = overrides.target_phase {
            self.planner.target_phase = target_phase;
        }
        if let Some(max_nodes) = overrides.max_nodes {
            self.planner.max_nodes = Some(max_nodes);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_planner(&self.planner)?;
        validate_beliefs(&self.beliefs)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("lilo.toml"), PathBuf::from("config/lilo.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_planner(planner: &PlannerConfig) -> Result<(), ConfigError> {
    if !planner.epsilon.is_finite() || planner.epsilon <= 0.0 {
        return Err(ConfigError::Validation(
            "planner.epsilon must be a finite value greater than zero".to_string(),
        ));
    }

    if Phase::from_ordinal(planner.target_phase).is_none() {
        return Err(ConfigError::Validation(
            "planner.target_phase must be in range 1..=5".to_string(),
        ));
    }

    if planner.max_nodes == Some(0) {
        return Err(ConfigError::Validation(
            "planner.max_nodes must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_beliefs(beliefs: &BeliefsConfig) -> Result<(), ConfigError> {
    if beliefs.one_step <= 0.0 || beliefs.two_steps <= 0.0 {
        return Err(ConfigError::Validation(
            "beliefs.one_step and beliefs.two_steps must be greater than zero".to_string(),
        ));
    }

    if beliefs.min_value >= beliefs.max_value {
        return Err(ConfigError::Validation(
            "beliefs.min_value must be lower than beliefs.max_value".to_string(),
        ));
    }

    let ordered = [
        beliefs.min_value,
        beliefs.min_threshold,
        beliefs.mid_threshold,
        beliefs.max_threshold,
        beliefs.max_value,
    ];
    if ordered.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(ConfigError::Validation(
            "beliefs must satisfy min_value <= min_threshold <= mid_threshold <= max_threshold <= max_value"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u8(key: &str, value: &str) -> Result<u8, ConfigError> {
    value.trim().parse::<u8>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.trim().parse::<f32>().map_err(|_| invalid_override(key, value))
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    planner: Option<PlannerPatch>,
    beliefs: Option<BeliefsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PlannerPatch {
    epsilon: Option<f32>,
    target_phase: Option<u8>,
    max_nodes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct BeliefsPatch {
    one_step: Option<f32>,
    two_steps: Option<f32>,
    min_threshold: Option<f32>,
    mid_threshold: Option<f32>,
    max_threshold: Option<f32>,
    min_value: Option<f32>,
    max_value: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
