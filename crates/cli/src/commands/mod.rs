pub mod agents;
pub mod config;
pub mod jump;
pub mod plan;

use lilo_core::config::{AppConfig, LoadOptions};
use lilo_core::errors::{ApplicationError, InterfaceError};
use lilo_core::scenario::Scenario;
use lilo_store::{seeded_store, InMemoryAgentStore};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

const CLI_CORRELATION_ID: &str = "cli";

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: &impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => return Self::failure(command, "serialization", error.to_string(), 1),
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Maps an application failure onto its interface class; configuration
    /// problems exit with 2, everything else with 1.
    pub fn application_failure(command: &str, error: ApplicationError) -> Self {
        let interface = error.into_interface(CLI_CORRELATION_ID);
        let (error_class, exit_code) = match &interface {
            InterfaceError::BadRequest { .. } => ("bad_request", 1),
            InterfaceError::NotFound { .. } => ("not_found", 1),
            InterfaceError::ServiceUnavailable { .. } => ("service_unavailable", 1),
            InterfaceError::Internal { .. } => ("config_validation", 2),
        };
        Self::failure(command, error_class, interface.to_string(), exit_code)
    }
}

/// Everything a command needs: validated config, scenario tables, a seeded
/// store and a current-thread runtime to drive it.
pub(crate) struct Session {
    pub config: AppConfig,
    pub scenario: Scenario,
    pub store: InMemoryAgentStore,
    pub runtime: Runtime,
}

impl Session {
    pub(crate) fn open(command: &str, options: &LoadOptions) -> Result<Self, CommandResult> {
        let config = load_config(command, options)?;

        let scenario = Scenario::lilobot(config.thresholds()).map_err(|error| {
            CommandResult::application_failure(
                command,
                ApplicationError::Configuration(error.to_string()),
            )
        })?;

        let store = seeded_store(&scenario).map_err(|error| {
            CommandResult::application_failure(command, ApplicationError::from(error))
        })?;

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(
            |error| {
                CommandResult::failure(
                    command,
                    "runtime_init",
                    format!("failed to initialize async runtime: {error}"),
                    1,
                )
            },
        )?;

        Ok(Self { config, scenario, store, runtime })
    }
}

pub(crate) fn load_config(command: &str, options: &LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\",\"data\":null}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
