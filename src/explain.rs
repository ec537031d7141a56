//! Decision provenance.
//!
//! Deny matches always win over allow matches; no match at all is a denial.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::MatchedRule;

/// Explained decision for one (resource, action) query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// Final decision, identical to `is_allowed`
    pub allowed: bool,
    /// Human-readable justification naming the responsible rules
    pub reason: String,
    /// Matching allow rules, e.g. `users::*;;read`
    pub allow_matches: Vec<String>,
    /// Matching deny rules with their sign marker, e.g. `!users::root;;read`
    pub deny_matches: Vec<String>,
    /// Queried resource path split into segments
    pub resource: Vec<String>,
    /// Requested action
    pub action: String,
}

impl Explanation {
    pub(crate) fn from_matches(
        resource: &[&str],
        action: &str,
        allow: &[MatchedRule],
        deny: &[MatchedRule],
    ) -> Self {
        let allow_matches = render(allow);
        let deny_matches = render(deny);

        let allowed = deny_matches.is_empty() && !allow_matches.is_empty();
        let reason = match (deny_matches.is_empty(), allow_matches.is_empty()) {
            (false, false) => format!(
                "denied by rule(s): {}; deny takes precedence over matching allow rule(s): {}",
                deny_matches.join(", "),
                allow_matches.join(", ")
            ),
            (false, true) => format!("denied by rule(s): {}", deny_matches.join(", ")),
            (true, false) => format!("allowed by rule(s): {}", allow_matches.join(", ")),
            (true, true) => "denied: no allow rule matched (default deny)".to_string(),
        };

        Self {
            allowed,
            reason,
            allow_matches,
            deny_matches,
            resource: resource.iter().map(|s| s.to_string()).collect(),
            action: action.to_string(),
        }
    }

    /// Resource path joined back with `::`
    pub fn resource_path(&self) -> String {
        self.resource.join(crate::types::PATH_SEPARATOR)
    }

    /// Serialize as pretty-printed JSON, for reports
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} on {}: {}",
            if self.allowed { "ALLOW" } else { "DENY" },
            self.action,
            self.resource_path(),
            self.reason
        )
    }
}

fn render(matches: &[MatchedRule]) -> Vec<String> {
    matches.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Effect, Segment};

    fn matched(effect: Effect, path: &[&str], action: &str) -> MatchedRule {
        MatchedRule {
            effect,
            path: path.iter().map(|s| Segment::parse(s)).collect(),
            action: Action::parse(action),
        }
    }

    #[test]
    fn test_allowed_names_allow_rules() {
        let allow = vec![matched(Effect::Allow, &["users", "*"], "read")];
        let exp = Explanation::from_matches(&["users", "1"], "read", &allow, &[]);
        assert!(exp.allowed);
        assert_eq!(exp.reason, "allowed by rule(s): users::*;;read");
        assert_eq!(exp.allow_matches, vec!["users::*;;read"]);
        assert!(exp.deny_matches.is_empty());
        assert_eq!(exp.resource, vec!["users", "1"]);
        assert_eq!(exp.action, "read");
    }

    #[test]
    fn test_deny_overrides_allow_names_both() {
        let allow = vec![matched(Effect::Allow, &["a", "*"], "read")];
        let deny = vec![
            matched(Effect::Deny, &["a", "b"], "read"),
            matched(Effect::Deny, &["***"], "*"),
        ];
        let exp = Explanation::from_matches(&["a", "b"], "read", &allow, &deny);
        assert!(!exp.allowed);
        assert_eq!(exp.deny_matches, vec!["!a::b;;read", "!***;;*"]);
        assert_eq!(
            exp.reason,
            "denied by rule(s): !a::b;;read, !***;;*; deny takes precedence over matching allow rule(s): a::*;;read"
        );
    }

    #[test]
    fn test_deny_only() {
        let deny = vec![matched(Effect::Deny, &["a"], "*")];
        let exp = Explanation::from_matches(&["a"], "read", &[], &deny);
        assert!(!exp.allowed);
        assert_eq!(exp.reason, "denied by rule(s): !a;;*");
    }

    #[test]
    fn test_default_deny() {
        let exp = Explanation::from_matches(&["a"], "read", &[], &[]);
        assert!(!exp.allowed);
        assert_eq!(exp.reason, "denied: no allow rule matched (default deny)");
        assert!(exp.allow_matches.is_empty());
        assert!(exp.deny_matches.is_empty());
    }

    #[test]
    fn test_display() {
        let allow = vec![matched(Effect::Allow, &["a", "***"], "*")];
        let exp = Explanation::from_matches(&["a", "b", "c"], "write", &allow, &[]);
        assert_eq!(
            exp.to_string(),
            "ALLOW write on a::b::c: allowed by rule(s): a::***;;*"
        );
    }

    #[test]
    fn test_json_shape() {
        let exp = Explanation::from_matches(&["a"], "read", &[], &[]);
        let value: serde_json::Value = serde_json::from_str(&exp.to_json().unwrap()).unwrap();
        assert_eq!(value["allowed"], serde_json::json!(false));
        assert_eq!(value["resource"], serde_json::json!(["a"]));
        assert_eq!(value["action"], serde_json::json!("read"));
        assert_eq!(value["allow_matches"], serde_json::json!([]));
    }
}
