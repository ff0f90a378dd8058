use open_mqtt_charger::topic::{command_suffix, matches, validate_filter, validate_name};
use proptest::prelude::*;

fn levels() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 1..6)
}

proptest! {
    #[test]
    fn hash_filter_matches_every_descendant(levels in levels(), cut in 0usize..6) {
        let cut = cut.min(levels.len());
        let name = levels.join("/");
        let filter = if cut == 0 {
            "#".to_string()
        } else {
            format!("{}/#", levels[..cut].join("/"))
        };

        prop_assert_eq!(validate_name(&name), Ok(()));
        prop_assert_eq!(validate_filter(&filter), Ok(()));
        prop_assert!(matches(&filter, &name));

        let expected = levels[cut..].join("/");
        prop_assert_eq!(command_suffix(&filter, &name), Some(expected.as_str()));
    }

    #[test]
    fn plus_replaces_exactly_one_level(levels in levels(), at in 0usize..6) {
        let at = at % levels.len();
        let name = levels.join("/");

        let mut filter_levels = levels.clone();
        filter_levels[at] = "+".to_string();
        let filter = filter_levels.join("/");
        prop_assert!(matches(&filter, &name));

        let longer = format!("{}/extra", name);
        prop_assert!(!matches(&filter, &longer));
    }

    #[test]
    fn names_only_match_themselves(a in levels(), b in levels()) {
        let (a, b) = (a.join("/"), b.join("/"));
        prop_assert_eq!(matches(&a, &b), a == b);
    }
}
