//! `check-config` command tests

use assert_cmd::Command;
use predicates::prelude::*;

mod common;

use common::temp_config_dir;

const ENV_KEYS: [&str; 15] = [
    "CONFDIR",
    "AMQP_URI",
    "AMQP_SUB_EXCH",
    "AMQP_PUB_EXCH",
    "AMQP_EXCH_TYPE",
    "AMQP_SUB_ROUTING_KEY",
    "AMQP_PUB_ROUTING_KEY",
    "AMQP_WORKERS",
    "LOG_FILE",
    "LOG_LEVEL",
    "LOG_JSON",
    "PUB_MSG_FILE",
    "FLT_EVT_CAT",
    "FLT_EVT_NAME",
    "FLT_EVT_APPNAME",
];

fn rabbithunter() -> Command {
    let mut cmd = Command::cargo_bin("rabbithunter").unwrap();
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn test_check_config_prints_resolved_values() {
    let dir = temp_config_dir(
        r#"{
    // only watch billing
    "filter_event_category": "billing",
    "amqp_workers": 4
}"#,
    );

    let mut cmd = rabbithunter();
    cmd.arg("--config-dir").arg(dir.path()).arg("check-config");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"amqp_workers\": 4"))
        .stdout(predicate::str::contains(
            r#"Filtering event categories matching: ["billing"]"#,
        ))
        .stdout(predicate::str::contains("Configuration OK"));
}

#[test]
fn test_check_config_env_dir_and_override() {
    let dir = temp_config_dir("{}");

    let mut cmd = rabbithunter();
    cmd.env("CONFDIR", dir.path())
        .env("AMQP_SUB_EXCH", "from_env")
        .arg("check-config");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"amqp_sub_exchange\": \"from_env\""));
}

#[test]
fn test_check_config_fails_with_aggregated_report() {
    let dir = temp_config_dir("{}");

    let mut cmd = rabbithunter();
    cmd.env("AMQP_WORKERS", "lots")
        .env("LOG_LEVEL", "verbose")
        .arg("--config-dir")
        .arg(dir.path())
        .arg("check-config");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("ERRORS IN 'rabbithunter_config.json' CONFIG FILE"))
        .stderr(predicate::str::contains("AMQP_WORKERS"))
        .stderr(predicate::str::contains("LOG_LEVEL"));
}

#[test]
fn test_check_config_rejects_malformed_file() {
    let dir = temp_config_dir("[1, 2");

    let mut cmd = rabbithunter();
    cmd.arg("--config-dir").arg(dir.path()).arg("check-config");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse config file:"));
}
