//! Path ACL - allow/deny rule matching over hierarchical resource paths
//!
//! This library decides whether an action may be performed on a
//! `::`-segmented resource path, given allow and deny rules with:
//! - Single-segment wildcards (`*`)
//! - Trailing multi-segment wildcards (`***`)
//! - Action wildcards
//! - Deny-overrides-allow precedence and default deny
//! - Explanations naming every rule behind a decision
//! - LRU caching of decisions
//!
//! # Example
//!
//! ```rust
//! use path_acl::Matcher;
//!
//! let matcher = Matcher::new([
//!     "users::123::posts::*;;read",
//!     "!users::123::posts::456;;read",
//!     "projects::***;;write",
//! ]);
//!
//! assert!(matcher.is_allowed("users::123::posts::789", "read"));
//! assert!(!matcher.is_allowed("users::123::posts::456", "read"));
//! assert!(matcher.is_allowed("projects::x::y", "write"));
//! assert!(!matcher.is_allowed("projects", "write"));
//!
//! let explanation = matcher.explain("users::123::posts::456", "read");
//! assert!(!explanation.allowed);
//! assert_eq!(explanation.deny_matches, vec!["!users::123::posts::456;;read"]);
//! ```
//!
//! # Rule Syntax
//!
//! Rules follow the format:
//! ```text
//! [!]segment(::segment)*[;;action]
//! ```
//!
//! | Part | Example | Description |
//! |------|---------|-------------|
//! | Sign | `!` | Leading `!` makes a deny rule |
//! | Literal | `users` | Matches the identical segment (case-sensitive) |
//! | Single wildcard | `*` | Matches exactly one segment |
//! | Triple wildcard | `***` | Matches one or more trailing segments |
//! | Action | `;;read` | Requested action; `;;*` or no `;;` matches any action |
//!
//! `::`, `;;` and a leading `!` are reserved; there is no escaping.
//!
//! ## Decision
//!
//! - Any matching deny rule denies, regardless of allow rules
//! - Otherwise a matching allow rule allows
//! - Otherwise the request is denied

pub mod cache;
pub mod error;
pub mod explain;
pub mod matcher;
pub mod parser;
pub mod types;

// Re-export commonly used items
pub use cache::CachedMatcher;
pub use error::{AclError, Result};
pub use explain::Explanation;
pub use matcher::{
    explain_permission, Authorizer, Matcher, MatcherNode, MatcherOptions, DEFAULT_CACHE_SIZE,
};
pub use parser::{parse_rule, parse_rules, parse_rules_from_file, validate_rule, TextRule};
pub use types::{Action, Effect, MatchedRule, Rule, Segment};
