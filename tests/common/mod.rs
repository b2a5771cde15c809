use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;

use async_trait::async_trait;
use rabbithunter::amqp::{BrokerError, PublishOptions, Publisher};
use tempfile::TempDir;

#[allow(dead_code)]
pub const CONFIG_FILE: &str = "rabbithunter_config.json";

#[allow(dead_code)]
pub fn temp_config_dir(contents: &str) -> TempDir {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    fs::write(temp_dir.path().join(CONFIG_FILE), contents).expect("failed to write config file");
    temp_dir
}

#[allow(dead_code)]
pub fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Published {
    pub payload: String,
    pub routing_keys: Vec<String>,
    pub options: PublishOptions,
}

/// Publisher that records every call and optionally fails.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Published>>,
    fail: bool,
}

#[allow(dead_code)]
impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(
        &self,
        payload: &[u8],
        routing_keys: &[String],
        options: &PublishOptions,
    ) -> Result<(), BrokerError> {
        if self.fail {
            return Err(BrokerError::NoRoutingKey {
                exchange: options.exchange.clone(),
            });
        }
        self.published.lock().unwrap().push(Published {
            payload: String::from_utf8_lossy(payload).into_owned(),
            routing_keys: routing_keys.to_vec(),
            options: options.clone(),
        });
        Ok(())
    }
}
