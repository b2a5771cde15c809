//! Event filtering for inbound event records
//!
//! This module decides which inbound events are shown to the operator. A
//! filter has three independent dimensions (application name, event
//! category, event name), each a set of exact, case-sensitive tokens.

use crate::amqp::EventRecord;

/// Token that matches any value in its dimension.
pub const WILDCARD: &str = "*";

/// One filter dimension: a set of accepted values or the wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    tokens: Vec<String>,
    wildcard: bool,
    exact: bool,
}

impl FilterSet {
    /// Build a set from a comma separated config value.
    ///
    /// Tokens are kept verbatim (no trimming). An empty value yields a set
    /// holding a single empty token, which only matches empty fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use rabbithunter::watcher::FilterSet;
    ///
    /// let set = FilterSet::parse("notification,billing");
    /// assert!(set.accepts("billing"));
    /// assert!(!set.accepts("support"));
    /// assert!(FilterSet::parse("*").is_wildcard());
    /// assert!(FilterSet::parse("billing,*").is_wildcard());
    /// assert!(!FilterSet::parse("billing,*").is_exact_wildcard());
    /// ```
    pub fn parse(raw: &str) -> Self {
        let tokens: Vec<String> = raw.split(',').map(str::to_string).collect();
        let wildcard = tokens.iter().any(|t| t == WILDCARD);
        Self {
            tokens,
            wildcard,
            exact: raw == WILDCARD,
        }
    }

    /// Whether this dimension matches everything.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Whether the configured value was the bare wildcard and nothing else.
    pub fn is_exact_wildcard(&self) -> bool {
        self.exact
    }

    /// Tokens as configured.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether `value` passes this dimension.
    pub fn accepts(&self, value: &str) -> bool {
        self.wildcard || self.tokens.iter().any(|t| t == value)
    }
}

/// Three-dimensional event filter.
///
/// Dimensions are combined with AND; tokens inside a dimension with OR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    app_names: FilterSet,
    categories: FilterSet,
    names: FilterSet,
}

impl FilterSpec {
    /// Create a filter from the three comma separated config values.
    ///
    /// # Examples
    ///
    /// ```
    /// use rabbithunter::watcher::FilterSpec;
    ///
    /// let spec = FilterSpec::new("*", "*", "*");
    /// assert!(spec.is_match_all());
    /// ```
    pub fn new(app_names: &str, categories: &str, names: &str) -> Self {
        Self {
            app_names: FilterSet::parse(app_names),
            categories: FilterSet::parse(categories),
            names: FilterSet::parse(names),
        }
    }

    /// True when every dimension is exactly `*`, so records need no decoding.
    ///
    /// A dimension like `billing,*` still accepts every value, but records
    /// must decode before they reach [`FilterSpec::matches`].
    pub fn is_match_all(&self) -> bool {
        self.app_names.is_exact_wildcard()
            && self.categories.is_exact_wildcard()
            && self.names.is_exact_wildcard()
    }

    /// Check whether a decoded record passes all three dimensions.
    pub fn matches(&self, record: &EventRecord) -> bool {
        if self.is_match_all() {
            return true;
        }
        self.app_names.accepts(&record.app_name)
            && self.categories.accepts(&record.event_category)
            && self.names.accepts(&record.event_name)
    }

    /// Application name dimension
    pub fn app_names(&self) -> &FilterSet {
        &self.app_names
    }

    /// Event category dimension
    pub fn categories(&self) -> &FilterSet {
        &self.categories
    }

    /// Event name dimension
    pub fn names(&self) -> &FilterSet {
        &self.names
    }

    /// Get filter summary for logging.
    ///
    /// # Examples
    ///
    /// ```
    /// use rabbithunter::watcher::FilterSpec;
    ///
    /// assert_eq!(FilterSpec::new("*", "*", "*").summary(), "no filters (all events)");
    /// let summary = FilterSpec::new("*", "billing", "*").summary();
    /// assert_eq!(summary, "categories=billing");
    /// ```
    pub fn summary(&self) -> String {
        let dimensions = [
            ("apps", &self.app_names),
            ("categories", &self.categories),
            ("names", &self.names),
        ];
        let parts: Vec<String> = dimensions
            .iter()
            .filter(|(_, set)| !set.is_wildcard())
            .map(|(label, set)| format!("{}={}", label, set.tokens().join(",")))
            .collect();

        if parts.is_empty() {
            "no filters (all events)".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_event(app_name: &str, category: &str, name: &str) -> EventRecord {
        EventRecord {
            app_name: app_name.to_string(),
            event_category: category.to_string(),
            event_name: name.to_string(),
            ..EventRecord::default()
        }
    }

    #[test]
    fn test_match_all_accepts_empty_record() {
        let spec = FilterSpec::new("*", "*", "*");
        assert!(spec.is_match_all());
        assert!(spec.matches(&EventRecord::default()));
    }

    #[test]
    fn test_filter_by_category_set() {
        let spec = FilterSpec::new("*", "notification,billing", "*");

        assert!(spec.matches(&create_test_event("crossbar", "billing", "x")));
        assert!(spec.matches(&create_test_event("crossbar", "notification", "x")));
        assert!(!spec.matches(&create_test_event("crossbar", "support", "x")));
    }

    #[test]
    fn test_all_dimensions_must_pass() {
        let spec = FilterSpec::new("ecallmgr", "call_event", "CHANNEL_CREATE,CHANNEL_DESTROY");

        assert!(spec.matches(&create_test_event(
            "ecallmgr",
            "call_event",
            "CHANNEL_DESTROY"
        )));
        assert!(!spec.matches(&create_test_event(
            "callflow",
            "call_event",
            "CHANNEL_DESTROY"
        )));
        assert!(!spec.matches(&create_test_event(
            "ecallmgr",
            "call_event",
            "CHANNEL_ANSWER"
        )));
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let spec = FilterSpec::new("*", "billing", "*");
        assert!(!spec.matches(&create_test_event("a", "Billing", "b")));
    }

    #[test]
    fn test_tokens_are_not_trimmed() {
        let spec = FilterSpec::new("*", "notification, billing", "*");
        assert!(!spec.matches(&create_test_event("a", "billing", "b")));
        assert!(spec.matches(&create_test_event("a", " billing", "b")));
    }

    #[test]
    fn test_empty_filter_matches_only_empty_field() {
        let spec = FilterSpec::new("", "*", "*");
        assert!(!spec.is_match_all());
        assert!(spec.matches(&create_test_event("", "any", "any")));
        assert!(!spec.matches(&create_test_event("crossbar", "any", "any")));
    }

    #[test]
    fn test_wildcard_token_overrides_siblings() {
        let set = FilterSet::parse("billing,*");
        assert!(set.is_wildcard());
        assert!(!set.is_exact_wildcard());
        assert!(set.accepts("anything"));
    }

    #[test]
    fn test_mixed_wildcards_are_not_match_all() {
        let spec = FilterSpec::new("billing,*", "billing,*", "billing,*");
        assert!(!spec.is_match_all());
        assert!(spec.matches(&create_test_event("a", "b", "c")));
    }

    #[test]
    fn test_filter_summary_lists_restricted_dimensions() {
        let spec = FilterSpec::new("crossbar", "*", "push_req,push_resp");
        assert_eq!(spec.summary(), "apps=crossbar, names=push_req,push_resp");
    }
}
