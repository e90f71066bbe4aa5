use std::env;
use std::sync::{Mutex, OnceLock};

use bayline_cli::commands::{doctor, migrate, seed};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(
        &[("BAYLINE_DATABASE_URL", "sqlite::memory:"), ("BAYLINE_DATABASE_MAX_CONNECTIONS", "1")],
        || {
            let result = migrate::run();
            assert_eq!(result.exit_code, 0, "expected successful migrate run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "migrate");
            assert_eq!(payload["status"], "ok");
        },
    );
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("BAYLINE_DATABASE_URL", "postgres://nope/bayline")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_loads_and_verifies_fixtures() {
    with_env(
        &[("BAYLINE_DATABASE_URL", "sqlite::memory:"), ("BAYLINE_DATABASE_MAX_CONNECTIONS", "1")],
        || {
            let result = seed::run();
            assert_eq!(result.exit_code, 0, "expected successful seed run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "seed");
            assert_eq!(payload["status"], "ok");
        },
    );
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_env(
        &[("BAYLINE_DATABASE_URL", "sqlite::memory:"), ("BAYLINE_DATABASE_MAX_CONNECTIONS", "1")],
        || {
            let first = seed::run();
            assert_eq!(first.exit_code, 0, "expected first seed invocation success");

            let second = seed::run();
            assert_eq!(second.exit_code, 0, "expected second seed invocation success");

            let first_payload = parse_payload(&first.output);
            let second_payload = parse_payload(&second.output);
            assert_eq!(first_payload["message"], second_payload["message"]);
        },
    );
}

#[test]
fn doctor_passes_with_valid_env() {
    with_env(
        &[("BAYLINE_DATABASE_URL", "sqlite::memory:"), ("BAYLINE_DATABASE_MAX_CONNECTIONS", "1")],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 0, "expected all doctor checks to pass");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["overall_status"], "pass");
            let checks = payload["checks"].as_array().expect("checks array");
            assert_eq!(checks.len(), 3);
            assert!(checks.iter().all(|check| check["status"] == "pass"));
        },
    );
}

#[test]
fn doctor_fails_and_skips_when_config_invalid() {
    with_env(&[("BAYLINE_DATABASE_URL", "postgres://nope/bayline")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1, "expected doctor failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        let checks = payload["checks"].as_array().expect("checks array");
        assert_eq!(checks[0]["name"], "config_validation");
        assert_eq!(checks[0]["status"], "fail");
        assert_eq!(checks[1]["status"], "skipped");
        assert_eq!(checks[2]["status"], "skipped");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "BAYLINE_DATABASE_URL",
        "BAYLINE_DATABASE_MAX_CONNECTIONS",
        "BAYLINE_DATABASE_TIMEOUT_SECS",
        "BAYLINE_PRICING_TAX_RATE",
        "BAYLINE_TAX_RATE",
        "BAYLINE_PRICING_DEFAULT_LABOR_RATE",
        "BAYLINE_PRICING_DEFAULT_PARTS_MULTIPLIER",
        "BAYLINE_LOGGING_LEVEL",
        "BAYLINE_LOGGING_FORMAT",
        "BAYLINE_LOG_LEVEL",
        "BAYLINE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
