use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use lilo_core::config::{AppConfig, LoadOptions};
use serde::Serialize;
use toml::Value;

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "config";

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    effective: &'a AppConfig,
    entries: Vec<ConfigEntry>,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = options.config_path.clone().or_else(detect_config_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let max_nodes = config
        .planner
        .max_nodes
        .map(|limit| limit.to_string())
        .unwrap_or_else(|| "unlimited".to_string());
    let beliefs = &config.beliefs;

    let entries = vec![
        entry("planner.epsilon", config.planner.epsilon, source("planner.epsilon", &["LILO_EPSILON"])),
        entry(
            "planner.target_phase",
            config.planner.target_phase,
            source("planner.target_phase", &["LILO_TARGET_PHASE"]),
        ),
        entry("planner.max_nodes", max_nodes, source("planner.max_nodes", &["LILO_MAX_NODES"])),
        entry("beliefs.one_step", beliefs.one_step, source("beliefs.one_step", &["LILO_ONE_STEP"])),
        entry(
            "beliefs.two_steps",
            beliefs.two_steps,
            source("beliefs.two_steps", &["LILO_TWO_STEPS"]),
        ),
        entry("beliefs.min_threshold", beliefs.min_threshold, source("beliefs.min_threshold", &[])),
        entry("beliefs.mid_threshold", beliefs.mid_threshold, source("beliefs.mid_threshold", &[])),
        entry("beliefs.max_threshold", beliefs.max_threshold, source("beliefs.max_threshold", &[])),
        entry("beliefs.min_value", beliefs.min_value, source("beliefs.min_value", &[])),
        entry("beliefs.max_value", beliefs.max_value, source("beliefs.max_value", &[])),
        entry(
            "logging.level",
            &config.logging.level,
            source("logging.level", &["LILO_LOGGING_LEVEL", "LILO_LOG_LEVEL"]),
        ),
        entry(
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source("logging.format", &["LILO_LOGGING_FORMAT", "LILO_LOG_FORMAT"]),
        ),
    ];

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.iter().map(render_line));

    CommandResult::success_with_data(
        COMMAND,
        lines.join("\n"),
        &ConfigReport { effective: &config, entries },
    )
}

fn entry(key: &'static str, value: impl ToString, source: String) -> ConfigEntry {
    ConfigEntry { key, value: value.to_string(), source }
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("lilo.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/lilo.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(entry: &ConfigEntry) -> String {
    format!("- {} = {} (source: {})", entry.key, entry.value, entry.source)
}
