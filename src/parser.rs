use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{AclError, Result};
use crate::types::{
    token_kind, Action, Effect, Rule, Segment, TokenKind, ACTION_SEPARATOR, DENY_MARKER,
    PATH_SEPARATOR, SINGLE_WILDCARD,
};

/// Literal segment or action token accepted by strict validation:
/// no whitespace and none of the reserved delimiter characters.
static LITERAL_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s:;!]+$").expect("LITERAL_TOKEN: hardcoded regex is invalid")
});

/// Maximum nesting depth for `file:` include directives.
const MAX_INCLUDE_DEPTH: usize = 10;

/// Rule line read from rule text, before it is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    /// Rule text with surrounding whitespace trimmed
    pub text: String,
    /// Line number in the text it was read from (for error reporting)
    pub line_num: usize,
}

/// Parse a single rule.
///
/// Never fails: a missing `;;` means action `*`, and an empty path yields a
/// rule with zero segments. Segments are not trimmed or normalized.
pub fn parse_rule(text: &str) -> Rule {
    // The sign is checked before anything else
    let (effect, body) = match text.strip_prefix(DENY_MARKER) {
        Some(rest) => (Effect::Deny, rest),
        None => (Effect::Allow, text),
    };

    let (path, action) = match body.split_once(ACTION_SEPARATOR) {
        Some((path, action)) => (path, Action::parse(action)),
        None => (body, Action::Any),
    };

    let segments = if path.is_empty() {
        Vec::new()
    } else {
        path.split(PATH_SEPARATOR).map(Segment::parse).collect()
    };

    Rule {
        effect,
        segments,
        action,
    }
}

/// Parse a rule, rejecting input that [`parse_rule`] would silently accept
/// but that would not match as a reader expects.
pub fn validate_rule(text: &str) -> Result<Rule> {
    let body = text.strip_prefix(DENY_MARKER).unwrap_or(text);
    let (path, action) = match body.split_once(ACTION_SEPARATOR) {
        Some((path, action)) => (path, Some(action)),
        None => (body, None),
    };

    if path.is_empty() {
        return Err(AclError::malformed(text, "empty rule path"));
    }

    let tokens: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    let last = tokens.len() - 1;
    for (i, token) in tokens.iter().enumerate() {
        match token_kind(token) {
            TokenKind::Single => {}
            TokenKind::Triple if i == last => {}
            TokenKind::Triple => {
                return Err(AclError::malformed(
                    text,
                    "'***' must be the last path segment",
                ));
            }
            TokenKind::Literal if token.is_empty() => {
                return Err(AclError::malformed(
                    text,
                    format!("empty path segment at position {}", i + 1),
                ));
            }
            TokenKind::Literal => {
                if !LITERAL_TOKEN.is_match(token) {
                    return Err(AclError::malformed(
                        text,
                        format!("segment '{}' contains whitespace or a reserved character", token),
                    ));
                }
            }
        }
    }

    if let Some(action) = action {
        if action.is_empty() {
            return Err(AclError::malformed(text, "empty action"));
        }
        if action.contains(ACTION_SEPARATOR) {
            return Err(AclError::malformed(text, "more than one ';;' separator"));
        }
        if action != SINGLE_WILDCARD && !LITERAL_TOKEN.is_match(action) {
            return Err(AclError::malformed(
                text,
                format!("action '{}' contains whitespace or a reserved character", action),
            ));
        }
    }

    Ok(parse_rule(text))
}

/// Read rules from text, one per line.
///
/// Blank lines and lines starting with `#` are skipped. Supports
/// `file: /path/to/rules.acl` to include rules from an external file.
pub fn parse_rules(text: &str) -> Result<Vec<TextRule>> {
    parse_rules_inner(text, 0)
}

fn parse_rules_inner(text: &str, depth: usize) -> Result<Vec<TextRule>> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(AclError::ParseError(format!(
            "file include depth exceeds maximum ({MAX_INCLUDE_DEPTH}), possible circular include"
        )));
    }

    let mut rules = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line_num = line_num + 1; // 1-based line numbers
        let line = line.trim();

        // '#' inside a rule is a literal character, only whole-line comments exist
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(path) = line.strip_prefix("file:") {
            let path = path.trim();
            debug!(path, depth = depth + 1, "including rules file");
            rules.extend(parse_rules_from_file_inner(path, depth + 1)?);
            continue;
        }

        rules.push(TextRule {
            text: line.to_string(),
            line_num,
        });
    }

    Ok(rules)
}

/// Read rules from a file.
pub fn parse_rules_from_file(path: impl AsRef<Path>) -> Result<Vec<TextRule>> {
    parse_rules_from_file_inner(path, 0)
}

fn parse_rules_from_file_inner(path: impl AsRef<Path>, depth: usize) -> Result<Vec<TextRule>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        AclError::ParseError(format!(
            "Failed to read rules file '{}': {}",
            path.display(),
            e
        ))
    })?;
    parse_rules_inner(&text, depth)
}
