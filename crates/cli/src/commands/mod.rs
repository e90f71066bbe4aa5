pub mod doctor;
pub mod migrate;
pub mod seed;

use std::future::Future;

use serde::Serialize;

use bayline_core::config::{AppConfig, LoadOptions};
use bayline_db::{connect, DbPool};

/// Terminal output plus the process exit code a command resolved to.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<'a> {
    command: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<&'a str>,
    message: &'a str,
}

impl CommandResult {
    pub fn success(command: &str, message: &str) -> Self {
        let payload =
            CommandOutcome { command, status: "ok", error_class: None, message };
        Self { exit_code: 0, output: serialize_payload(&payload) }
    }

    pub fn failure(command: &str, error_class: &str, message: &str, exit_code: u8) -> Self {
        let payload =
            CommandOutcome { command, status: "error", error_class: Some(error_class), message };
        Self { exit_code, output: serialize_payload(&payload) }
    }
}

/// How database-touching commands report failure: an error class for the
/// JSON payload, a message, and the exit code.
pub(crate) type CommandFailure = (&'static str, String, u8);

/// Shared scaffolding for `migrate` and `seed`: load configuration, stand up
/// a current-thread runtime, open the pool from `DatabaseConfig`, and run
/// the command body against it. The body returns its success message.
pub(crate) fn with_pool<F, Fut>(command: &'static str, body: F) -> CommandResult
where
    F: FnOnce(DbPool) -> Fut,
    Fut: Future<Output = Result<String, CommandFailure>>,
{
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                &format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                &format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let outcome = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let message = body(pool.clone()).await?;
        pool.close().await;
        Ok::<String, CommandFailure>(message)
    });

    match outcome {
        Ok(message) => CommandResult::success(command, &message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(command, error_class, &message, exit_code)
        }
    }
}

fn serialize_payload(payload: &CommandOutcome<'_>) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
