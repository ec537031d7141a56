//! Property-based tests for decision invariants

use path_acl::Matcher;
use proptest::prelude::*;

// small alphabets so generated rules and queries actually collide
fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-c]".prop_map(|s| s),
        2 => Just("*".to_string()),
        1 => Just("***".to_string()),
    ]
}

fn action_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "(read|write)".prop_map(|s| s),
        1 => Just("*".to_string()),
    ]
}

fn rule_strategy() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        prop::collection::vec(segment_strategy(), 1..5),
        action_strategy(),
    )
        .prop_map(|(deny, segments, action)| {
            format!(
                "{}{};;{}",
                if deny { "!" } else { "" },
                segments.join("::"),
                action
            )
        })
}

fn resource_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-d]", 1..6).prop_map(|segments| segments.join("::"))
}

fn query_action_strategy() -> impl Strategy<Value = String> {
    "(read|write|delete)".prop_map(|s| s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn explain_agrees_with_is_allowed(
        rules in prop::collection::vec(rule_strategy(), 0..12),
        resource in resource_strategy(),
        action in query_action_strategy(),
    ) {
        let matcher = Matcher::new(&rules);
        let explanation = matcher.explain(&resource, &action);
        prop_assert_eq!(matcher.is_allowed(&resource, &action), explanation.allowed);
        prop_assert_eq!(explanation.allowed, explanation.deny_matches.is_empty() && !explanation.allow_matches.is_empty());
    }

    #[test]
    fn construction_order_is_irrelevant(
        rules in prop::collection::vec(rule_strategy(), 0..12),
        resource in resource_strategy(),
        action in query_action_strategy(),
    ) {
        let mut reversed = rules.clone();
        reversed.reverse();
        let forward = Matcher::new(&rules);
        let backward = Matcher::new(&reversed);
        prop_assert_eq!(
            forward.is_allowed(&resource, &action),
            backward.is_allowed(&resource, &action)
        );

        let mut a = forward.explain(&resource, &action).allow_matches;
        let mut b = backward.explain(&resource, &action).allow_matches;
        a.sort();
        b.sort();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn allow_only_rules_never_deny_what_they_match(
        rules in prop::collection::vec(rule_strategy(), 0..12),
        resource in resource_strategy(),
        action in query_action_strategy(),
    ) {
        let allow_only: Vec<&String> = rules.iter().filter(|r| !r.starts_with('!')).collect();
        let matcher = Matcher::new(allow_only);
        let explanation = matcher.explain(&resource, &action);
        prop_assert!(explanation.deny_matches.is_empty());
        prop_assert_eq!(explanation.allowed, !explanation.allow_matches.is_empty());
    }

    #[test]
    fn adding_a_deny_rule_never_grants(
        rules in prop::collection::vec(rule_strategy(), 0..12),
        deny in rule_strategy(),
        resource in resource_strategy(),
        action in query_action_strategy(),
    ) {
        let before = Matcher::new(&rules).is_allowed(&resource, &action);
        let mut extended = rules.clone();
        extended.push(format!("!{}", deny.trim_start_matches('!')));
        let after = Matcher::new(&extended).is_allowed(&resource, &action);
        prop_assert!(!after || before);
    }

    #[test]
    fn default_deny_without_rules(
        resource in resource_strategy(),
        action in query_action_strategy(),
    ) {
        let matcher = Matcher::new(Vec::<String>::new());
        prop_assert!(!matcher.is_allowed(&resource, &action));
    }

    #[test]
    fn exact_rule_matches_its_own_path(
        resource in resource_strategy(),
        action in query_action_strategy(),
    ) {
        let matcher = Matcher::new([format!("{};;{}", resource, action)]);
        prop_assert!(matcher.is_allowed(&resource, &action));
    }
}
