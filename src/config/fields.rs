//! Declarative field reconciliation
//!
//! A configuration record is described by a table of field descriptors. Each
//! descriptor knows its file key, its environment key, an optional default
//! literal, and how to reach the typed slot in the record. Reconciliation
//! walks the table in order and fills every slot from the first source that
//! has a value: config file, then environment, then default.
//!
//! Only `String`, `bool`, `i64` and `f64` implement [`ConfigValue`], so a
//! descriptor for any other storage type does not compile.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// A single field's resolution problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// No source produced a usable value.
    #[error(
        "Required config item '{file_key}' and/or environment variable '{env_key}' is missing or invalid."
    )]
    Missing {
        /// Key in the config file
        file_key: &'static str,
        /// Environment variable name
        env_key: &'static str,
    },

    /// The environment value could not be converted.
    #[error("Error setting '{file_key}' to env {env_key}='{value}'. Error: {reason}")]
    InvalidEnv {
        /// Key in the config file
        file_key: &'static str,
        /// Environment variable name
        env_key: &'static str,
        /// Raw value found in the environment
        value: String,
        /// Conversion failure
        reason: String,
    },

    /// The declared default literal could not be converted.
    #[error("Error setting '{file_key}' to default '{value}'. Error: {reason}")]
    InvalidDefault {
        /// Key in the config file
        file_key: &'static str,
        /// Default literal
        value: &'static str,
        /// Conversion failure
        reason: String,
    },

    /// The config file holds a value of the wrong JSON type.
    #[error("Config item '{file_key}' has the wrong type in the config file: {reason}")]
    InvalidFile {
        /// Key in the config file
        file_key: &'static str,
        /// Conversion failure
        reason: String,
    },
}

/// Storage types a config field may use.
pub trait ConfigValue: Sized {
    /// Human-readable type name used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Whether the value counts as "not set" and may be filled from env/default.
    fn is_zero(&self) -> bool;

    /// Convert an environment value or default literal.
    fn parse_literal(raw: &str) -> Result<Self, String>;

    /// Convert a config file value. `Ok(None)` means JSON `null`.
    fn from_json(value: &JsonValue) -> Result<Option<Self>, String>;
}

impl ConfigValue for String {
    const TYPE_NAME: &'static str = "string";

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn parse_literal(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn from_json(value: &JsonValue) -> Result<Option<Self>, String> {
        match value {
            JsonValue::Null => Ok(None),
            JsonValue::String(s) => Ok(Some(s.clone())),
            other => Err(type_mismatch(Self::TYPE_NAME, other)),
        }
    }
}

impl ConfigValue for bool {
    const TYPE_NAME: &'static str = "bool";

    // false is a legal value, so a bool is never "missing" once a source set it
    fn is_zero(&self) -> bool {
        false
    }

    fn parse_literal(raw: &str) -> Result<Self, String> {
        parse_bool(raw)
    }

    fn from_json(value: &JsonValue) -> Result<Option<Self>, String> {
        match value {
            JsonValue::Null => Ok(None),
            JsonValue::Bool(b) => Ok(Some(*b)),
            other => Err(type_mismatch(Self::TYPE_NAME, other)),
        }
    }
}

impl ConfigValue for i64 {
    const TYPE_NAME: &'static str = "int";

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn parse_literal(raw: &str) -> Result<Self, String> {
        parse_int(raw)
    }

    fn from_json(value: &JsonValue) -> Result<Option<Self>, String> {
        match value {
            JsonValue::Null => Ok(None),
            JsonValue::Number(n) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| format!("expected int, found number {}", n)),
            other => Err(type_mismatch(Self::TYPE_NAME, other)),
        }
    }
}

impl ConfigValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn parse_literal(raw: &str) -> Result<Self, String> {
        raw.trim()
            .parse::<f64>()
            .map_err(|e| format!("parsing {:?}: {}", raw, e))
    }

    fn from_json(value: &JsonValue) -> Result<Option<Self>, String> {
        match value {
            JsonValue::Null => Ok(None),
            JsonValue::Number(n) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| format!("expected float, found number {}", n)),
            other => Err(type_mismatch(Self::TYPE_NAME, other)),
        }
    }
}

fn type_mismatch(expected: &str, found: &JsonValue) -> String {
    let found = match found {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    };
    format!("expected {}, found {}", expected, found)
}

/// Parse a boolean literal.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
///
/// # Examples
///
/// ```
/// use rabbithunter::config::fields::parse_bool;
///
/// assert_eq!(parse_bool("T"), Ok(true));
/// assert_eq!(parse_bool("0"), Ok(false));
/// assert!(parse_bool("yes").is_err());
/// ```
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("parsing {:?}: invalid syntax", raw)),
    }
}

/// Parse a signed 64-bit integer literal with an optional base prefix.
///
/// `0x`/`0X` is hex, `0o`/`0O` or a bare leading `0` is octal, `0b`/`0B` is
/// binary, anything else is decimal. Single underscores between digits are
/// allowed.
///
/// # Examples
///
/// ```
/// use rabbithunter::config::fields::parse_int;
///
/// assert_eq!(parse_int("42"), Ok(42));
/// assert_eq!(parse_int("-0x1f"), Ok(-31));
/// assert_eq!(parse_int("010"), Ok(8));
/// assert_eq!(parse_int("1_000"), Ok(1000));
/// assert!(parse_int("twelve").is_err());
/// ```
pub fn parse_int(raw: &str) -> Result<i64, String> {
    let invalid = || format!("parsing {:?}: invalid syntax", raw);

    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let (radix, digits) = if let Some(rest) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        (16, rest)
    } else if let Some(rest) = body
        .strip_prefix("0o")
        .or_else(|| body.strip_prefix("0O"))
    {
        (8, rest)
    } else if let Some(rest) = body
        .strip_prefix("0b")
        .or_else(|| body.strip_prefix("0B"))
    {
        (2, rest)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    // An underscore may follow a base prefix, never lead a decimal literal.
    let digits = if radix == 10 {
        digits
    } else {
        digits.strip_prefix('_').unwrap_or(digits)
    };
    if digits.is_empty()
        || digits.ends_with('_')
        || digits.contains("__")
        || digits.starts_with(['+', '-', '_'])
    {
        return Err(invalid());
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    let signed = if negative {
        format!("-{}", cleaned)
    } else {
        cleaned
    };

    i64::from_str_radix(&signed, radix).map_err(|e| format!("parsing {:?}: {}", raw, e))
}

/// Descriptor metadata shared by every field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Key in the config file
    pub file_key: &'static str,
    /// Environment variable name
    pub env_key: &'static str,
    /// Default literal, converted like an environment value
    pub default: Option<&'static str>,
}

/// Type-erased field descriptor for a record `R`.
pub trait Field<R>: Send + Sync {
    /// Descriptor metadata
    fn meta(&self) -> &FieldMeta;

    /// Fill the slot in `record` from the first source that has a value.
    fn reconcile(
        &self,
        record: &mut R,
        document: Option<&Map<String, JsonValue>>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<(), FieldError>;
}

struct TypedField<R, T> {
    meta: FieldMeta,
    slot: fn(&mut R) -> &mut T,
}

impl<R, T> Field<R> for TypedField<R, T>
where
    T: ConfigValue + 'static,
    R: 'static,
{
    fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    fn reconcile(
        &self,
        record: &mut R,
        document: Option<&Map<String, JsonValue>>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<(), FieldError> {
        let FieldMeta {
            file_key,
            env_key,
            default,
        } = self.meta;

        if let Some(raw) = document.and_then(|doc| doc.get(file_key)) {
            let from_file = T::from_json(raw)
                .map_err(|reason| FieldError::InvalidFile { file_key, reason })?;
            if let Some(value) = from_file.filter(|v| !v.is_zero()) {
                *(self.slot)(record) = value;
                return Ok(());
            }
        }

        if let Some(value) = env(env_key).filter(|v| !v.is_empty()) {
            let parsed = T::parse_literal(&value).map_err(|reason| FieldError::InvalidEnv {
                file_key,
                env_key,
                value: value.clone(),
                reason,
            })?;
            *(self.slot)(record) = parsed;
            return Ok(());
        }

        if let Some(value) = default {
            let parsed = T::parse_literal(value).map_err(|reason| FieldError::InvalidDefault {
                file_key,
                value,
                reason,
            })?;
            *(self.slot)(record) = parsed;
            return Ok(());
        }

        Err(FieldError::Missing { file_key, env_key })
    }
}

/// Build a descriptor for one field of `R`.
///
/// # Examples
///
/// ```
/// use rabbithunter::config::fields::{field, reconcile};
///
/// #[derive(Default)]
/// struct Limits {
///     ratio: f64,
/// }
///
/// let table = vec![field("ratio", "RATIO", Some("0.5"), |r: &mut Limits| &mut r.ratio)];
/// let mut limits = Limits::default();
/// let errors = reconcile(&mut limits, &table, None, &|_| None);
/// assert!(errors.is_empty());
/// assert_eq!(limits.ratio, 0.5);
/// ```
pub fn field<R, T>(
    file_key: &'static str,
    env_key: &'static str,
    default: Option<&'static str>,
    slot: fn(&mut R) -> &mut T,
) -> Box<dyn Field<R>>
where
    T: ConfigValue + 'static,
    R: 'static,
{
    Box::new(TypedField {
        meta: FieldMeta {
            file_key,
            env_key,
            default,
        },
        slot,
    })
}

/// Reconcile every field in declaration order, collecting all failures.
///
/// A failing field never stops the pass; the caller gets the complete list.
pub fn reconcile<R>(
    record: &mut R,
    fields: &[Box<dyn Field<R>>],
    document: Option<&Map<String, JsonValue>>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Vec<FieldError> {
    fields
        .iter()
        .filter_map(|f| f.reconcile(record, document, env).err())
        .collect()
}
