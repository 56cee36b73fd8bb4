//! Property-based tests for the filter engine.
//!
//! These tests check the algebra of filter groups and that the incremental
//! pass always agrees with a full pass over the same pool.

use proptest::prelude::*;
use std::collections::BTreeSet;
use vista_core::{
    FolderId, MemoryCatalog, Property, PropertyType, Record, RecordId, Tag, TagId, Value,
    ROOT_FILTER_ID,
};
use vista_filter::{FilterManager, GroupOperator, Operator};

const SIZE: u64 = 1;
const LABELS: u64 = 2;

/// Tags 10 and 13 are roots; 11 and 12 sit under 10, 14 under 13.
const TAGS: [(TagId, &[TagId]); 5] = [(10, &[]), (11, &[10]), (12, &[10]), (13, &[]), (14, &[13])];

/// Strategy for the content of one record: an optional size and some tags.
fn record_strategy() -> impl Strategy<Value = (Option<i32>, Vec<TagId>)> {
    (
        prop::option::of(0i32..20),
        prop::collection::vec(10u64..15, 0..3),
    )
}

/// Folders 100 and 102 are roots; 101 sits under 100.
const FOLDERS: [(FolderId, Option<FolderId>); 3] = [(100, None), (101, Some(100)), (102, None)];

fn make_record(id: RecordId, (size, tags): &(Option<i32>, Vec<TagId>)) -> Record {
    let mut record = Record::new(id).in_folder(100 + id % 3);
    if let Some(size) = size {
        record.set(SIZE, *size as f64);
    }
    record.set(LABELS, Value::Tags(tags.clone()));
    record
}

fn build_catalog(records: &[(Option<i32>, Vec<TagId>)]) -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.insert_property(Property::new(SIZE, "size", PropertyType::Number));
    catalog.insert_property(Property::new(LABELS, "labels", PropertyType::MultiTags));
    for (id, parents) in TAGS {
        let tag = Tag::new(id, LABELS, format!("tag {id}")).with_parents(parents.to_vec());
        catalog.insert_tag(tag);
    }
    for (id, parent) in FOLDERS {
        catalog.insert_folder(id, parent);
    }
    for (i, content) in records.iter().enumerate() {
        catalog.insert_record(make_record(i as RecordId, content));
    }
    catalog
}

fn run(manager: &mut FilterManager, catalog: &MemoryCatalog) -> BTreeSet<RecordId> {
    manager
        .filter(catalog, &catalog.record_ids())
        .records
        .iter()
        .copied()
        .collect()
}

fn single(
    catalog: &MemoryCatalog,
    property: u64,
    operator: Operator,
    value: Value,
) -> FilterManager {
    let mut manager = FilterManager::new();
    manager
        .add_filter(catalog, ROOT_FILTER_ID, property, operator, value)
        .unwrap();
    manager
}

proptest! {
    /// Property: filtering an accepted set again accepts all of it.
    #[test]
    fn filter_is_idempotent(
        records in prop::collection::vec(record_strategy(), 0..40),
        threshold in 0i32..20,
        tag in 10u64..15,
        query_tag in prop::option::of(10u64..15),
        folder in prop::option::of(100u64..103),
    ) {
        let catalog = build_catalog(&records);
        // AND(labels containsAny tag, OR(size >= threshold, size notSet))
        let mut manager = FilterManager::new();
        let tags = Value::Tags(vec![tag]);
        manager
            .add_filter(&catalog, ROOT_FILTER_ID, LABELS, Operator::ContainsAny, tags)
            .unwrap();
        let group = manager.add_new_filter_group(ROOT_FILTER_ID, GroupOperator::Or).unwrap();
        let size = Value::Number(threshold as f64);
        manager
            .add_filter(&catalog, group, SIZE, Operator::Geq, size)
            .unwrap();
        manager
            .add_filter(&catalog, group, SIZE, Operator::NotSet, Value::Null)
            .unwrap();
        if let Some(query_tag) = query_tag {
            manager.set_query(format!("TAG {query_tag}"));
        }
        manager.set_folders(folder.into_iter().collect());

        let first = manager.filter(&catalog, &catalog.record_ids()).records.clone();
        let second = manager.filter(&catalog, &first).records.clone();
        prop_assert_eq!(second.len(), first.len());
        prop_assert_eq!(
            second.into_iter().collect::<BTreeSet<_>>(),
            first.into_iter().collect::<BTreeSet<_>>()
        );
    }

    /// Property: an incremental pass equals a full pass over the new pool.
    #[test]
    fn incremental_equals_full(
        records in prop::collection::vec(record_strategy(), 1..40),
        edits in prop::collection::vec((0u64..50, prop::option::of(record_strategy())), 0..15),
        threshold in 0i32..20,
        tag in 10u64..15,
    ) {
        let mut catalog = build_catalog(&records);
        let mut manager = FilterManager::new();
        let group = manager.add_new_filter_group(ROOT_FILTER_ID, GroupOperator::Or).unwrap();
        manager
            .add_filter(&catalog, group, SIZE, Operator::Lower, Value::Number(threshold as f64))
            .unwrap();
        manager
            .add_filter(&catalog, group, LABELS, Operator::ContainsAny, Value::Tags(vec![tag]))
            .unwrap();
        manager.filter(&catalog, &catalog.record_ids());

        let mut changed = Vec::new();
        for (id, content) in &edits {
            match content {
                Some(content) => {
                    catalog.insert_record(make_record(*id, content));
                }
                None => {
                    catalog.remove_record(*id);
                }
            }
            changed.push(*id);
        }

        let update = manager.update_selection(&catalog, &changed).unwrap();
        let incremental: BTreeSet<_> = manager.result().unwrap().records.iter().copied().collect();
        prop_assert_eq!(incremental.len(), manager.result().unwrap().len());

        let full = run(&mut manager, &catalog);
        prop_assert_eq!(&incremental, &full);
        for id in &update.updated {
            prop_assert!(full.contains(id));
        }
        for id in &update.removed {
            prop_assert!(!full.contains(id));
        }
    }

    /// Property: AND of two leaves is the intersection and OR the union of
    /// the leaves run alone.
    #[test]
    fn groups_are_intersection_and_union(
        records in prop::collection::vec(record_strategy(), 0..40),
        low in 0i32..20,
        tag in 10u64..15,
    ) {
        let catalog = build_catalog(&records);
        let size = Value::Number(low as f64);
        let labels = Value::Tags(vec![tag]);

        let a = run(&mut single(&catalog, SIZE, Operator::Greater, size.clone()), &catalog);
        let b = run(&mut single(&catalog, LABELS, Operator::ContainsAny, labels.clone()), &catalog);

        for (operator, expected) in [
            (GroupOperator::And, a.intersection(&b).copied().collect::<BTreeSet<_>>()),
            (GroupOperator::Or, a.union(&b).copied().collect::<BTreeSet<_>>()),
        ] {
            let mut manager = FilterManager::new();
            manager.update_filter_group(ROOT_FILTER_ID, operator).unwrap();
            manager
                .add_filter(&catalog, ROOT_FILTER_ID, SIZE, Operator::Greater, size.clone())
                .unwrap();
            manager
                .add_filter(&catalog, ROOT_FILTER_ID, LABELS, Operator::ContainsAny, labels.clone())
                .unwrap();
            prop_assert_eq!(run(&mut manager, &catalog), expected);
        }
    }

    /// Property: a leaf without a value accepts everything, and `notSet`
    /// accepts exactly the records without a value.
    #[test]
    fn vacuous_filters(records in prop::collection::vec(record_strategy(), 0..40)) {
        let catalog = build_catalog(&records);
        let all: BTreeSet<_> = catalog.record_ids().into_iter().collect();

        for operator in [Operator::Equal, Operator::EqualNot, Operator::Lower, Operator::Geq] {
            let mut manager = single(&catalog, SIZE, operator, Value::Null);
            prop_assert_eq!(run(&mut manager, &catalog), all.clone());
        }
        for operator in [Operator::ContainsAny, Operator::ContainsAll, Operator::ContainsNot] {
            let mut manager = single(&catalog, LABELS, operator, Value::Tags(vec![]));
            prop_assert_eq!(run(&mut manager, &catalog), all.clone());
        }

        let unset: BTreeSet<_> = records
            .iter()
            .enumerate()
            .filter(|(_, (size, _))| size.is_none())
            .map(|(i, _)| i as RecordId)
            .collect();
        let mut manager = single(&catalog, SIZE, Operator::NotSet, Value::Null);
        prop_assert_eq!(run(&mut manager, &catalog), unset);
    }

    /// Property: filtering on a parent tag accepts at least every record a
    /// filter on one of its children accepts.
    #[test]
    fn tag_expansion_is_monotone(records in prop::collection::vec(record_strategy(), 0..40)) {
        let catalog = build_catalog(&records);
        for (child, parents) in TAGS {
            for parent in parents {
                let narrow = Value::Tags(vec![child]);
                let wide = Value::Tags(vec![*parent]);
                let narrow = run(
                    &mut single(&catalog, LABELS, Operator::ContainsAny, narrow),
                    &catalog,
                );
                let wide = run(
                    &mut single(&catalog, LABELS, Operator::ContainsAny, wide),
                    &catalog,
                );
                prop_assert!(narrow.is_subset(&wide));
            }
        }
    }
}

#[test]
fn and_excludes_record_with_unset_property() {
    let mut catalog = MemoryCatalog::new();
    catalog.insert_property(Property::new(1, "a", PropertyType::String));
    catalog.insert_property(Property::new(2, "b", PropertyType::Number));
    catalog.insert_record(Record::new(1).with(1, "x").with(2, 20.0));
    catalog.insert_record(Record::new(2).with(2, 20.0));
    catalog.insert_record(Record::new(3).with(1, "y").with(2, 5.0));

    let mut manager = FilterManager::new();
    manager
        .add_filter(&catalog, ROOT_FILTER_ID, 1, Operator::IsSet, Value::Null)
        .unwrap();
    manager
        .add_filter(&catalog, ROOT_FILTER_ID, 2, Operator::Greater, Value::Number(10.0))
        .unwrap();

    assert_eq!(manager.filter(&catalog, &catalog.record_ids()).records, vec![1]);
}
