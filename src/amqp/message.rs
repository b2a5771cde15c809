//! Event record exchanged on the call event and push exchanges.
//!
//! Field names on the wire use the `Title-Case-With-Dashes` convention.
//! Every field is optional when decoding; absent or `null` identifiers decode
//! as empty strings and an absent payload as an empty map.
//!
//! # Example
//!
//! ```rust
//! use rabbithunter::amqp::EventRecord;
//!
//! let json = r#"{
//!   "App-Name": "ecallmgr",
//!   "Event-Category": "call_event",
//!   "Event-Name": "CHANNEL_CREATE",
//!   "Call-ID": "abc123",
//!   "Payload": {"Caller-ID-Number": "1000"}
//! }"#;
//!
//! let event = EventRecord::decode(json.as_bytes()).unwrap();
//! assert_eq!(event.event_name, "CHANNEL_CREATE");
//! assert_eq!(event.payload["Caller-ID-Number"], "1000");
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Decoded inbound (or synthesized outbound) event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRecord {
    /// Account the event belongs to
    #[serde(rename = "Account-ID", deserialize_with = "null_as_default")]
    pub account_id: String,

    /// Emitting application
    #[serde(rename = "App-Name", deserialize_with = "null_as_default")]
    pub app_name: String,

    /// Emitting application version
    #[serde(rename = "App-Version", deserialize_with = "null_as_default")]
    pub app_version: String,

    /// Call identifier
    #[serde(rename = "Call-ID", deserialize_with = "null_as_default")]
    pub call_id: String,

    /// Event category, e.g. `call_event`
    #[serde(rename = "Event-Category", deserialize_with = "null_as_default")]
    pub event_category: String,

    /// Event name, e.g. `CHANNEL_CREATE`
    #[serde(rename = "Event-Name", deserialize_with = "null_as_default")]
    pub event_name: String,

    /// Message identifier
    #[serde(rename = "Msg-ID", deserialize_with = "null_as_default")]
    pub msg_id: String,

    /// Node that emitted the event
    #[serde(rename = "Node", deserialize_with = "null_as_default")]
    pub node: String,

    /// Server identifier
    #[serde(rename = "Server-ID", deserialize_with = "null_as_default")]
    pub server_id: String,

    /// Free-form description
    #[serde(rename = "Msg-Description", deserialize_with = "null_as_default")]
    pub description: String,

    /// Destination
    #[serde(rename = "To", deserialize_with = "null_as_default")]
    pub to: String,

    /// Open-ended payload
    #[serde(rename = "Payload", deserialize_with = "null_as_default")]
    pub payload: Map<String, JsonValue>,
}

impl EventRecord {
    /// Decode a raw message body.
    ///
    /// A literal `null` body decodes as an empty record.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the body is not a JSON object with string
    /// identifier fields.
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        let record: Option<Self> = serde_json::from_slice(body)?;
        Ok(record.unwrap_or_default())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
