//! Config file location and comment stripping
//!
//! The config file and the publish payload file are both JSON documents that
//! may carry `//` comments. Comments are removed textually before parsing.

use regex::bytes::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Matches `//` through end of line when it starts the text or follows whitespace.
///
/// Unicode mode is off so `.` and `\s` step over bytes that are not UTF-8.
const COMMENT_PATTERN: &str = r"(?-u)(\s//.*)|(^//.*)";

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(COMMENT_PATTERN).expect("comment pattern is a valid regex"))
}

/// Candidate config directories for the given application name, in search order.
///
/// # Examples
///
/// ```
/// use rabbithunter::config::source::candidate_dirs;
///
/// let dirs = candidate_dirs("rabbithunter");
/// assert_eq!(dirs.first().unwrap().to_str(), Some("/opt/rabbithunter"));
/// assert_eq!(dirs.last().unwrap().to_str(), Some("."));
/// ```
pub fn candidate_dirs(app_name: &str) -> Vec<PathBuf> {
    vec![
        PathBuf::from(format!("/opt/{}", app_name)),
        PathBuf::from(format!("/opt/{}/etc", app_name)),
        PathBuf::from(format!("/usr/lib/{}", app_name)),
        PathBuf::from(format!("/usr/lib/{}/etc", app_name)),
        PathBuf::from(format!("/var/lib/{}", app_name)),
        PathBuf::from(format!("/var/lib/{}/etc", app_name)),
        PathBuf::from("/usr/local/etc"),
        PathBuf::from("/etc"),
        PathBuf::from("."),
    ]
}

/// Pick the directory to load `filename` from.
///
/// Every candidate is checked and the LAST one containing the file wins, so a
/// copy in a later directory overrides a copy in an earlier one. Falls back to
/// the current directory when no candidate has the file.
///
/// # Examples
///
/// ```
/// use rabbithunter::config::source::search_config_dir;
/// use std::path::PathBuf;
///
/// let dir = search_config_dir(&[PathBuf::from("/nonexistent")], "missing.json");
/// assert_eq!(dir, PathBuf::from("."));
/// ```
pub fn search_config_dir(candidates: &[PathBuf], filename: &str) -> PathBuf {
    let mut chosen = PathBuf::from(".");
    for dir in candidates {
        if dir.join(filename).exists() {
            chosen = dir.clone();
        }
    }
    chosen
}

/// Remove `//` comments from a document.
///
/// A comment is `//` at the very start of the text, or `//` preceded by any
/// whitespace character, running to the end of its line. `//` glued to a
/// non-space character (as in `amqp://host`) is left alone.
///
/// # Examples
///
/// ```
/// use rabbithunter::config::source::strip_comments;
///
/// let cleaned = strip_comments("{\n  // broker\n  \"amqp_uri\": \"amqp://host\" // inline\n}");
/// assert!(!cleaned.contains("broker"));
/// assert!(!cleaned.contains("inline"));
/// assert!(cleaned.contains("\"amqp://host\""));
/// ```
pub fn strip_comments(text: &str) -> String {
    String::from_utf8_lossy(&strip_comment_bytes(text.as_bytes())).into_owned()
}

/// Remove `//` comments from raw bytes, leaving every other byte untouched.
pub fn strip_comment_bytes(raw: &[u8]) -> Vec<u8> {
    comment_regex().replace_all(raw, &b""[..]).into_owned()
}

/// Read a file and strip its comments.
///
/// The content is not required to be UTF-8.
///
/// # Errors
///
/// Returns the underlying IO error if the file cannot be read.
pub fn read_stripped(path: &Path) -> io::Result<Vec<u8>> {
    let raw = std::fs::read(path)?;
    Ok(strip_comment_bytes(&raw))
}
