//! Prefix tree of rule paths.
//!
//! `*` and `***` are stored as ordinary keys (in dedicated slots); their
//! wildcard meaning only applies while matching.

use std::collections::{HashMap, HashSet};

use crate::types::{token_kind, Action, Effect, MatchedRule, Segment, TokenKind};

/// Action tokens registered at a node
#[derive(Debug, Clone, Default)]
struct ActionSet {
    any: bool,
    literals: HashSet<String>,
}

impl ActionSet {
    /// Returns false if the action was already registered
    fn insert(&mut self, action: Action) -> bool {
        match action {
            Action::Any => !std::mem::replace(&mut self.any, true),
            Action::Literal(name) => self.literals.insert(name),
        }
    }

    #[inline]
    fn permits(&self, requested: &str) -> bool {
        self.any || self.literals.contains(requested)
    }

    /// Registered tokens covering `requested`: `*` first, then the literal.
    /// A literal `*` is never stored, so a request for `*` yields at most one token.
    fn matching<'a>(&'a self, requested: &'a str) -> impl Iterator<Item = Action> + 'a {
        let any = self.any.then_some(Action::Any);
        let literal = self
            .literals
            .contains(requested)
            .then(|| Action::Literal(requested.to_string()));
        any.into_iter().chain(literal)
    }

    fn len(&self) -> usize {
        usize::from(self.any) + self.literals.len()
    }
}

/// A node in a rule trie. Each node exclusively owns its children.
#[derive(Debug, Clone, Default)]
pub struct MatcherNode {
    /// Literal-keyed children
    children: HashMap<String, MatcherNode>,
    /// Child under the `*` key
    single: Option<Box<MatcherNode>>,
    /// Child under the `***` key
    triple: Option<Box<MatcherNode>>,
    /// Actions of rules whose path ends exactly here
    actions: ActionSet,
}

impl MatcherNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` at the end of `segments`, creating nodes as needed.
    ///
    /// Returns false if the exact (path, action) pair was already present.
    pub fn insert(&mut self, segments: &[Segment], action: Action) -> bool {
        match segments.split_first() {
            None => self.actions.insert(action),
            Some((head, rest)) => self.child_or_insert(head).insert(rest, action),
        }
    }

    fn child_or_insert(&mut self, segment: &Segment) -> &mut MatcherNode {
        match segment {
            Segment::Literal(name) => self.children.entry(name.clone()).or_default(),
            Segment::Single => &mut **self.single.get_or_insert_with(Box::default),
            Segment::Triple => &mut **self.triple.get_or_insert_with(Box::default),
        }
    }

    /// Child stored under the key spelled `token`
    fn child(&self, token: &str) -> Option<&MatcherNode> {
        match token_kind(token) {
            TokenKind::Literal => self.children.get(token),
            TokenKind::Single => self.single.as_deref(),
            TokenKind::Triple => self.triple.as_deref(),
        }
    }

    /// `*` child to explore in addition to the exact child of `head`.
    ///
    /// A query segment spelled `*` already reached it through the exact lookup.
    fn wildcard_branch(&self, head: &str) -> Option<&MatcherNode> {
        if token_kind(head) == TokenKind::Single {
            None
        } else {
            self.single.as_deref()
        }
    }

    /// Check if any rule in this subtree matches the remaining `segments` and `action`.
    ///
    /// Stops at the first match.
    pub fn matches(&self, segments: &[&str], action: &str) -> bool {
        let Some((head, rest)) = segments.split_first() else {
            return self.actions.permits(action);
        };

        // `***` covers any non-empty remainder, which `segments` is here
        if let Some(triple) = &self.triple {
            if triple.actions.permits(action) {
                return true;
            }
        }

        if let Some(exact) = self.child(head) {
            if exact.matches(rest, action) {
                return true;
            }
        }

        self.wildcard_branch(head)
            .is_some_and(|single| single.matches(rest, action))
    }

    /// Collect every rule in this subtree matching `segments` and `action`.
    ///
    /// Order: `***` matches at a node, then the exact branch, then the `*` branch.
    pub fn collect_matches(
        &self,
        segments: &[&str],
        action: &str,
        effect: Effect,
    ) -> Vec<MatchedRule> {
        let mut found = Vec::new();
        let mut path = Vec::with_capacity(segments.len());
        self.collect_into(segments, action, effect, &mut path, &mut found);
        found
    }

    fn collect_into(
        &self,
        segments: &[&str],
        action: &str,
        effect: Effect,
        path: &mut Vec<Segment>,
        found: &mut Vec<MatchedRule>,
    ) {
        let Some((head, rest)) = segments.split_first() else {
            for matched in self.actions.matching(action) {
                found.push(MatchedRule {
                    effect,
                    path: path.clone(),
                    action: matched,
                });
            }
            return;
        };

        if let Some(triple) = &self.triple {
            for matched in triple.actions.matching(action) {
                let mut full = path.clone();
                full.push(Segment::Triple);
                found.push(MatchedRule {
                    effect,
                    path: full,
                    action: matched,
                });
            }
        }

        // A final query segment spelled `***` would re-report the matches just recorded
        let covered = rest.is_empty() && token_kind(head) == TokenKind::Triple;
        if let Some(exact) = self.child(head).filter(|_| !covered) {
            path.push(Segment::parse(head));
            exact.collect_into(rest, action, effect, path, found);
            path.pop();
        }

        if let Some(single) = self.wildcard_branch(head) {
            path.push(Segment::Single);
            single.collect_into(rest, action, effect, path, found);
            path.pop();
        }
    }

    fn child_nodes(&self) -> impl Iterator<Item = &MatcherNode> {
        self.children
            .values()
            .chain(self.single.as_deref())
            .chain(self.triple.as_deref())
    }

    /// Number of distinct (path, action) registrations in this subtree
    pub fn rule_count(&self) -> usize {
        self.actions.len() + self.child_nodes().map(MatcherNode::rule_count).sum::<usize>()
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.child_nodes().map(MatcherNode::node_count).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}
