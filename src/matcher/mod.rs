pub mod node;

pub use node::MatcherNode;

use std::path::Path;

use tracing::{debug, trace};

use crate::error::{AclError, Result};
use crate::explain::Explanation;
use crate::parser::{parse_rule, parse_rules, parse_rules_from_file, validate_rule, TextRule};
use crate::types::{split_resource, Effect, Rule};

/// Default LRU cache size for [`CachedMatcher`](crate::CachedMatcher)
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Trait for permission deciders
pub trait Authorizer: Send + Sync {
    /// Check if `action` is allowed on `resource`
    fn is_allowed(&self, resource: &str, action: &str) -> bool;

    /// Decide and report which rules produced the decision
    fn explain(&self, resource: &str, action: &str) -> Explanation;
}

/// Matcher builder options.
#[derive(Debug, Clone)]
pub struct MatcherOptions {
    /// Reject malformed rules instead of storing them as never-matching entries
    pub strict: bool,
    /// LRU cache size for cached decisions
    pub cache_size: usize,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            strict: false,
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl MatcherOptions {
    /// Create new matcher options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable strict rule validation.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set cache size.
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }
}

/// Allow/deny decision engine over a fixed rule set.
///
/// Built once; every query takes `&self` and never touches the tries, so a
/// `Matcher` can be shared across threads without locking.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    allow_tree: MatcherNode,
    deny_tree: MatcherNode,
}

impl Matcher {
    /// Build a matcher from rule strings.
    ///
    /// Never fails: malformed rules become entries that match nothing (or
    /// less than intended). Use [`Matcher::try_new`] to reject them instead.
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_parsed(rules.into_iter().map(|r| parse_rule(r.as_ref())))
    }

    /// Build a matcher, failing on the first malformed rule.
    pub fn try_new<I, S>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = rules
            .into_iter()
            .map(|r| validate_rule(r.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parsed(parsed))
    }

    /// Build a matcher honoring `options.strict`.
    pub fn with_options<I, S>(rules: I, options: &MatcherOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if options.strict {
            Self::try_new(rules)
        } else {
            Ok(Self::new(rules))
        }
    }

    /// Build a matcher from rule text (one rule per line, `#` comments, `file:` includes).
    pub fn from_text(text: &str, options: &MatcherOptions) -> Result<Self> {
        let rules = parse_rules(text)?;
        Self::from_text_rules(&rules, options)
    }

    /// Build a matcher from a rules file.
    pub fn from_file(path: impl AsRef<Path>, options: &MatcherOptions) -> Result<Self> {
        let rules = parse_rules_from_file(path)?;
        Self::from_text_rules(&rules, options)
    }

    fn from_text_rules(rules: &[TextRule], options: &MatcherOptions) -> Result<Self> {
        if !options.strict {
            return Ok(Self::new(rules.iter().map(|r| r.text.as_str())));
        }

        let parsed = rules
            .iter()
            .map(|r| {
                validate_rule(&r.text).map_err(|e| AclError::ParseErrorAtLine {
                    line: r.line_num,
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parsed(parsed))
    }

    fn from_parsed(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut allow_tree = MatcherNode::new();
        let mut deny_tree = MatcherNode::new();
        let mut duplicates = 0usize;

        for rule in rules {
            let tree = match rule.effect {
                Effect::Allow => &mut allow_tree,
                Effect::Deny => &mut deny_tree,
            };
            if !tree.insert(&rule.segments, rule.action) {
                duplicates += 1;
            }
        }

        debug!(
            allow_rules = allow_tree.rule_count(),
            deny_rules = deny_tree.rule_count(),
            allow_nodes = allow_tree.node_count(),
            deny_nodes = deny_tree.node_count(),
            duplicates,
            "built rule matcher"
        );

        Self {
            allow_tree,
            deny_tree,
        }
    }

    /// Check if `action` is allowed on `resource` (a `::`-separated path).
    ///
    /// Any matching deny rule denies; otherwise a matching allow rule allows;
    /// otherwise the request is denied.
    pub fn is_allowed(&self, resource: &str, action: &str) -> bool {
        let segments = split_resource(resource);

        if self.deny_tree.matches(&segments, action) {
            trace!(resource, action, "denied by deny rule");
            return false;
        }

        let allowed = self.allow_tree.matches(&segments, action);
        trace!(resource, action, allowed, "evaluated allow rules");
        allowed
    }

    /// Decide like [`Matcher::is_allowed`] and collect every rule that matched.
    pub fn explain(&self, resource: &str, action: &str) -> Explanation {
        let segments = split_resource(resource);
        let deny = self
            .deny_tree
            .collect_matches(&segments, action, Effect::Deny);
        let allow = self
            .allow_tree
            .collect_matches(&segments, action, Effect::Allow);

        let explanation = Explanation::from_matches(&segments, action, &allow, &deny);
        trace!(
            resource,
            action,
            allowed = explanation.allowed,
            allow_matches = allow.len(),
            deny_matches = deny.len(),
            "explained decision"
        );
        explanation
    }

    /// Number of distinct allow rules
    pub fn allow_rule_count(&self) -> usize {
        self.allow_tree.rule_count()
    }

    /// Number of distinct deny rules
    pub fn deny_rule_count(&self) -> usize {
        self.deny_tree.rule_count()
    }

    pub fn allow_tree(&self) -> &MatcherNode {
        &self.allow_tree
    }

    pub fn deny_tree(&self) -> &MatcherNode {
        &self.deny_tree
    }
}

impl Authorizer for Matcher {
    fn is_allowed(&self, resource: &str, action: &str) -> bool {
        Matcher::is_allowed(self, resource, action)
    }

    fn explain(&self, resource: &str, action: &str) -> Explanation {
        Matcher::explain(self, resource, action)
    }
}

/// Explain a permission decision; forwards to [`Authorizer::explain`].
pub fn explain_permission<A: Authorizer + ?Sized>(
    authorizer: &A,
    resource: &str,
    action: &str,
) -> Explanation {
    authorizer.explain(resource, action)
}
