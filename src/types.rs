use std::fmt;

/// Separator between path segments, e.g. `users::123::posts`
pub const PATH_SEPARATOR: &str = "::";

/// Separator between a rule's path and its action, e.g. `users::*;;read`
pub const ACTION_SEPARATOR: &str = ";;";

/// Leading marker that turns a rule into a deny rule
pub const DENY_MARKER: char = '!';

/// Matches exactly one segment (or any action when used as the action)
pub const SINGLE_WILDCARD: &str = "*";

/// Matches one or more trailing segments
pub const TRIPLE_WILDCARD: &str = "***";

/// Token classification shared by rule parsing and trie lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Literal,
    Single,
    Triple,
}

/// Only the exact strings `*` and `***` are wildcards; `**` and friends are literals.
#[inline]
pub(crate) fn token_kind(token: &str) -> TokenKind {
    match token {
        SINGLE_WILDCARD => TokenKind::Single,
        TRIPLE_WILDCARD => TokenKind::Triple,
        _ => TokenKind::Literal,
    }
}

/// One path token of a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches the identical segment (case-sensitive)
    Literal(String),
    /// `*`: matches exactly one arbitrary segment
    Single,
    /// `***`: matches one or more arbitrary trailing segments
    Triple,
}

impl Segment {
    /// Classify a raw path token
    pub fn parse(token: &str) -> Self {
        match token_kind(token) {
            TokenKind::Single => Segment::Single,
            TokenKind::Triple => Segment::Triple,
            TokenKind::Literal => Segment::Literal(token.to_string()),
        }
    }

    /// The token as it appears in rule text
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Literal(s) => s,
            Segment::Single => SINGLE_WILDCARD,
            Segment::Triple => TRIPLE_WILDCARD,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action token of a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// `*`: any requested action
    Any,
    /// A specific action name (case-sensitive)
    Literal(String),
}

impl Action {
    /// Classify a raw action token
    pub fn parse(token: &str) -> Self {
        if token == SINGLE_WILDCARD {
            Action::Any
        } else {
            Action::Literal(token.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::Any => SINGLE_WILDCARD,
            Action::Literal(s) => s,
        }
    }

    /// Check if this action token covers the requested action
    pub fn permits(&self, requested: &str) -> bool {
        match self {
            Action::Any => true,
            Action::Literal(s) => s == requested,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a rule grants or revokes access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn is_deny(&self) -> bool {
        matches!(self, Effect::Deny)
    }
}

/// Parsed rule: `[!]segment(::segment)*;;action`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub effect: Effect,
    /// Path tokens in order. Empty only for a rule with an empty path.
    pub segments: Vec<Segment>,
    pub action: Action,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rule(f, self.effect, &self.segments, &self.action)
    }
}

/// A rule instance found by the detailed match, reconstructed from the trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRule {
    pub effect: Effect,
    /// Stored tokens along the matched branch; triple-wildcard matches end in `***`.
    pub path: Vec<Segment>,
    /// The action token that matched (`*` or the requested action)
    pub action: Action,
}

impl fmt::Display for MatchedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rule(f, self.effect, &self.path, &self.action)
    }
}

fn write_rule(
    f: &mut fmt::Formatter<'_>,
    effect: Effect,
    segments: &[Segment],
    action: &Action,
) -> fmt::Result {
    if effect.is_deny() {
        write!(f, "{}", DENY_MARKER)?;
    }
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            f.write_str(PATH_SEPARATOR)?;
        }
        f.write_str(seg.as_str())?;
    }
    write!(f, "{}{}", ACTION_SEPARATOR, action)
}

/// Split a queried resource path into segments.
///
/// Unlike rule paths, a query never collapses to zero segments: `""` is one
/// empty segment.
pub fn split_resource(resource: &str) -> Vec<&str> {
    resource.split(PATH_SEPARATOR).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_classification() {
        assert_eq!(Segment::parse("*"), Segment::Single);
        assert_eq!(Segment::parse("***"), Segment::Triple);
        assert_eq!(Segment::parse("**"), Segment::Literal("**".into()));
        assert_eq!(Segment::parse("****"), Segment::Literal("****".into()));
        assert_eq!(Segment::parse("a*"), Segment::Literal("a*".into()));
        assert_eq!(Segment::parse(""), Segment::Literal(String::new()));
    }

    #[test]
    fn test_segment_display_roundtrips_token() {
        for token in ["*", "***", "**", "users", ""] {
            assert_eq!(Segment::parse(token).to_string(), token);
        }
    }

    #[test]
    fn test_action_permits() {
        assert!(Action::Any.permits("read"));
        assert!(Action::Any.permits("*"));
        assert!(Action::parse("read").permits("read"));
        assert!(!Action::parse("read").permits("Read"));
        assert!(!Action::parse("read").permits("write"));
    }

    #[test]
    fn test_rule_display_restores_sign_marker() {
        let rule = Rule {
            effect: Effect::Deny,
            segments: vec![Segment::parse("users"), Segment::Single, Segment::Triple],
            action: Action::parse("read"),
        };
        assert_eq!(rule.to_string(), "!users::*::***;;read");
    }

    #[test]
    fn test_matched_rule_display() {
        let m = MatchedRule {
            effect: Effect::Allow,
            path: vec![Segment::parse("projects"), Segment::Triple],
            action: Action::Any,
        };
        assert_eq!(m.to_string(), "projects::***;;*");
    }

    #[test]
    fn test_split_resource_never_empty() {
        assert_eq!(split_resource(""), vec![""]);
        assert_eq!(split_resource("a::b"), vec!["a", "b"]);
        assert_eq!(split_resource("a:b"), vec!["a:b"]);
        assert_eq!(split_resource("a::"), vec!["a", ""]);
    }
}
