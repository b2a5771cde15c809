//! Payload composition for publish triggers

use std::path::Path;

use tracing::{error, warn};
use uuid::Uuid;

use crate::amqp::EventRecord;
use crate::config::source::read_stripped;
use crate::context::AppContext;
use crate::{APP_NAME, APP_NAME_FULL, VERSION};

/// Account stamped on the canned test record.
pub const TEST_ACCOUNT_ID: &str = "12a0f57aec7a40a1ccf6d959521d5682";

/// Build the canned test record with fresh call and message ids.
pub fn canned_record(ctx: &AppContext) -> EventRecord {
    EventRecord {
        account_id: TEST_ACCOUNT_ID.to_string(),
        app_name: APP_NAME.to_string(),
        app_version: VERSION.to_string(),
        call_id: Uuid::new_v4().to_string(),
        event_category: "notification".to_string(),
        event_name: "push_req".to_string(),
        msg_id: Uuid::new_v4().to_string(),
        node: ctx.hostname.clone(),
        server_id: ctx.server_id(),
        description: "Test message from RuhNet RabbitHunter".to_string(),
        to: "1234".to_string(),
        ..EventRecord::default()
    }
}

/// Serialized canned test record.
///
/// Serialization failure is logged and yields an empty payload.
pub fn compose_canned(ctx: &AppContext) -> Vec<u8> {
    serde_json::to_vec(&canned_record(ctx)).unwrap_or_else(|e| {
        error!(error = %e, "Unable to serialize test record, published message will be blank");
        Vec::new()
    })
}

/// Literal published when the payload file cannot be read.
///
/// # Examples
///
/// ```
/// use rabbithunter::control::compose::fallback_payload;
///
/// let payload = fallback_payload("edge01");
/// assert!(payload.ends_with(r#""node":"edge01"}"#));
/// ```
pub fn fallback_payload(hostname: &str) -> String {
    format!(
        r#"{{"test":true, "message":"test from {}","node":"{}"}}"#,
        APP_NAME_FULL, hostname
    )
}

/// Payload read from the configured message file.
///
/// The file is read fresh each call with `//` comments stripped; the
/// remaining bytes are published as they are, UTF-8 or not. Any read failure
/// falls back to [`fallback_payload`].
pub fn compose_from_file(ctx: &AppContext) -> Vec<u8> {
    let path = Path::new(&ctx.config.pub_message_file);
    match read_stripped(path) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Could not open publish message file, using default message"
            );
            fallback_payload(&ctx.hostname).into_bytes()
        }
    }
}
