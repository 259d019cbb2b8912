use std::env;
use std::sync::{Mutex, OnceLock};

use compass_cli::commands::{config, doctor, migrate, start};
use serde_json::Value;

#[test]
fn start_returns_success_with_an_in_memory_database() {
    with_env(&[("COMPASS_DATABASE_URL", "sqlite::memory:")], || {
        let result = start::run();
        assert_eq!(result.exit_code, 0, "expected successful start preflight");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "start");
        assert_eq!(payload["status"], "ok");
        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("playbook fallback"), "no key configured means playbook mode");
    });
}

#[test]
fn start_reports_oracle_backed_mode_when_a_key_is_configured() {
    with_env(
        &[
            ("COMPASS_DATABASE_URL", "sqlite::memory:"),
            ("COMPASS_ORACLE_API_KEY", "gsk-test"),
        ],
        || {
            let result = start::run();
            assert_eq!(result.exit_code, 0);

            let payload = parse_payload(&result.output);
            assert!(payload["message"].as_str().unwrap_or("").contains("oracle-backed"));
        },
    );
}

#[test]
fn start_returns_config_failure_for_a_non_sqlite_url() {
    with_env(&[("COMPASS_DATABASE_URL", "postgres://elsewhere/app")], || {
        let result = start::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "start");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn migrate_returns_success_with_an_in_memory_database() {
    with_env(&[("COMPASS_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn doctor_json_reports_every_check() {
    with_env(&[("COMPASS_DATABASE_URL", "sqlite::memory:")], || {
        let output = doctor::run(true);
        let payload = parse_payload(&output);

        assert_eq!(payload["overall_status"], "pass");
        let names: Vec<&str> = payload["checks"]
            .as_array()
            .expect("checks array")
            .iter()
            .filter_map(|check| check["name"].as_str())
            .collect();
        assert_eq!(names, vec!["config_validation", "oracle_readiness", "database_connectivity"]);
    });
}

#[test]
fn doctor_skips_oracle_readiness_without_a_key() {
    with_env(&[("COMPASS_DATABASE_URL", "sqlite::memory:")], || {
        let output = doctor::run(true);
        let payload = parse_payload(&output);

        let oracle_check = payload["checks"]
            .as_array()
            .expect("checks array")
            .iter()
            .find(|check| check["name"] == "oracle_readiness")
            .cloned()
            .expect("oracle check present");
        assert_eq!(oracle_check["status"], "skipped");
    });
}

#[test]
fn doctor_human_output_leads_with_the_summary() {
    with_env(&[("COMPASS_DATABASE_URL", "sqlite::memory:")], || {
        let output = doctor::run(false);

        assert!(output.starts_with("doctor: all readiness checks passed"));
        assert!(output.contains("- [ok] config_validation"));
    });
}

#[test]
fn config_redacts_the_oracle_api_key() {
    with_env(
        &[
            ("COMPASS_DATABASE_URL", "sqlite::memory:"),
            ("COMPASS_ORACLE_API_KEY", "gsk-very-secret"),
        ],
        || {
            let output = config::run();

            assert!(output.contains("oracle.api_key = <redacted>"));
            assert!(!output.contains("gsk-very-secret"));
            assert!(output.contains("env (COMPASS_ORACLE_API_KEY)"));
        },
    );
}

#[test]
fn config_marks_defaulted_fields_as_defaults() {
    with_env(&[], || {
        let output = config::run();

        assert!(output.contains("oracle.model = llama3-8b-8192"));
        assert!(output.contains("server.port = 3000 (source: default)"));
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
        "COMPASS_DATABASE_URL",
        "COMPASS_DATABASE_MAX_CONNECTIONS",
        "COMPASS_DATABASE_TIMEOUT_SECS",
        "COMPASS_ORACLE_API_KEY",
        "COMPASS_ORACLE_BASE_URL",
        "COMPASS_ORACLE_MODEL",
        "COMPASS_ORACLE_TEMPERATURE",
        "COMPASS_ORACLE_MAX_TOKENS",
        "COMPASS_ORACLE_TIMEOUT_SECS",
        "COMPASS_SERVER_BIND_ADDRESS",
        "COMPASS_SERVER_PORT",
        "COMPASS_SERVER_STATIC_DIR",
        "COMPASS_LOGGING_LEVEL",
        "COMPASS_LOGGING_FORMAT",
        "COMPASS_LOG_LEVEL",
        "COMPASS_LOG_FORMAT",
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
