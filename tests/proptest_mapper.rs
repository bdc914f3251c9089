//! Property-based tests using proptest
//!
//! These tests verify the laws of the field-mapping and pagination-union
//! layers using randomized inputs.

use dosync::resource::mapper::{get_path, map_fields};
use dosync::resource::paginator::union_extend;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Generate arbitrary droplet-like API objects for testing
fn arb_resource() -> impl Strategy<Value = Value> {
    (
        "[a-z][a-z0-9-]{0,30}",                       // name
        prop_oneof!["nyc1", "nyc3", "sfo3", "ams3", "fra1"],
        prop_oneof!["s-1vcpu-1gb", "s-2vcpu-4gb", "c-4", "m-2vcpu-16gb"],
        prop::collection::vec("[a-z]{1,8}", 0..4),    // tags
        prop::option::of(any::<u32>()),               // droplet id on attached resources
    )
        .prop_map(|(name, region, size, tags, droplet_id)| {
            let mut resource = json!({
                "name": name,
                "region": { "slug": region },
                "size": { "slug": size },
                "tags": tags
            });
            if let Some(id) = droplet_id {
                resource["droplet"] = json!({ "id": id });
            }
            resource
        })
}

fn arb_resource_list() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_resource(), 0..50)
}

fn mapping_table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

proptest! {
    /// Mapped output never contains null values
    #[test]
    fn mapping_never_stores_nulls(resource in arb_resource()) {
        let table = mapping_table(&[
            ("name", "name"),
            ("region", "region.slug"),
            ("size", "size.slug"),
            ("droplet_id", "droplet.id"),
            ("missing", "no.such.path"),
        ]);

        let domain = map_fields(&resource, &table);
        for value in domain.values() {
            prop_assert!(!value.is_null());
        }
    }

    /// Mapped output only contains declared domain fields
    #[test]
    fn mapping_emits_only_declared_fields(resource in arb_resource()) {
        let table = mapping_table(&[("name", "name"), ("region", "region.slug")]);

        let domain = map_fields(&resource, &table);
        for key in domain.keys() {
            prop_assert!(table.contains_key(key));
        }
    }

    /// Paths absent from the source are omitted from the result entirely
    #[test]
    fn absent_paths_are_omitted(resource in arb_resource()) {
        let table = mapping_table(&[("ghost", "not.a.real.path")]);

        let domain = map_fields(&resource, &table);
        prop_assert!(!domain.contains_key("ghost"));
    }

    /// Mapping is a pure function of its input
    #[test]
    fn mapping_is_deterministic(resource in arb_resource()) {
        let table = mapping_table(&[
            ("name", "name"),
            ("region", "region.slug"),
            ("tags", "tags"),
        ]);

        let first = map_fields(&resource, &table);
        let second = map_fields(&resource, &table);
        prop_assert_eq!(first, second);
    }

    /// Resolvable paths map to exactly the value at that path
    #[test]
    fn mapped_values_match_source(resource in arb_resource()) {
        let table = mapping_table(&[("region", "region.slug")]);

        let domain = map_fields(&resource, &table);
        let expected = get_path(&resource, "region.slug").unwrap();
        prop_assert_eq!(domain.get("region").unwrap(), expected);
    }
}

proptest! {
    /// Union output never contains duplicates (by deep equality)
    #[test]
    fn union_has_no_duplicates(
        first in arb_resource_list(),
        second in arb_resource_list()
    ) {
        let mut items = Vec::new();
        union_extend(&mut items, first);
        union_extend(&mut items, second);

        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                prop_assert_ne!(a, b);
            }
        }
    }

    /// Union is idempotent: re-adding the same items changes nothing
    #[test]
    fn union_is_idempotent(list in arb_resource_list()) {
        let mut items = Vec::new();
        union_extend(&mut items, list.clone());
        let after_first = items.clone();

        union_extend(&mut items, list);
        prop_assert_eq!(items, after_first);
    }

    /// Union preserves first-seen order
    #[test]
    fn union_preserves_first_seen_order(
        first in arb_resource_list(),
        second in arb_resource_list()
    ) {
        let mut items = Vec::new();
        union_extend(&mut items, first.clone());

        let prefix = items.clone();
        union_extend(&mut items, second);
        prop_assert_eq!(&items[..prefix.len()], &prefix[..]);
    }

    /// Union never grows beyond the combined input size
    #[test]
    fn union_is_bounded_by_input(
        first in arb_resource_list(),
        second in arb_resource_list()
    ) {
        let total = first.len() + second.len();
        let mut items = Vec::new();
        union_extend(&mut items, first);
        union_extend(&mut items, second);

        prop_assert!(items.len() <= total);
    }
}

/// Tests for dot-path extraction edge cases
mod path_edge_cases {
    use super::*;

    proptest! {
        /// Extracting a single-segment path matches direct field access
        #[test]
        fn single_segment_matches_direct_access(resource in arb_resource()) {
            let via_path = get_path(&resource, "name").cloned();
            let direct = resource.get("name").cloned();
            prop_assert_eq!(via_path, direct);
        }

        /// A path through a scalar yields nothing
        #[test]
        fn path_through_scalar_is_absent(resource in arb_resource()) {
            prop_assert!(get_path(&resource, "name.deeper.still").is_none());
        }
    }

    #[test]
    fn empty_path_is_absent() {
        let resource = json!({ "name": "demo" });
        assert!(get_path(&resource, "").is_none());
    }

    #[test]
    fn null_segment_short_circuits() {
        let resource = json!({ "region": null });
        assert!(get_path(&resource, "region").is_none());
        assert!(get_path(&resource, "region.slug").is_none());
    }
}
