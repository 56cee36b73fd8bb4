//! End-to-end tests of the view pipeline.
//!
//! A view kept up to date through change notifications must always publish
//! what a freshly built view over the same catalog publishes.

use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use vista_collection::{
    CollectionEvent, CollectionManager, CollectionOptions, RecordChange, UpdateMode,
};
use vista_core::{
    MemoryCatalog, Property, PropertyType, Record, RecordId, Tag, Value, ROOT_FILTER_ID,
};
use vista_filter::{GroupOperator, Operator};
use vista_sort::SortOption;

const SIZE: u64 = 1;
const NAME: u64 = 2;
const LABELS: u64 = 3;

#[derive(Clone, Debug)]
enum Edit {
    Upsert(RecordId, Option<i32>, String, Vec<u64>),
    Remove(RecordId),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (
            0u64..30,
            prop::option::of(0i32..10),
            "[a-c]{0,2}",
            prop::collection::vec(10u64..13, 0..2),
        )
            .prop_map(|(id, size, name, tags)| Edit::Upsert(id, size, name, tags)),
        1 => (0u64..30).prop_map(Edit::Remove),
    ]
}

fn base_catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.insert_property(Property::new(SIZE, "size", PropertyType::Number));
    catalog.insert_property(Property::new(NAME, "name", PropertyType::String));
    catalog.insert_property(Property::new(LABELS, "labels", PropertyType::MultiTags));
    catalog.insert_tag(Tag::new(10, LABELS, "fruit"));
    catalog.insert_tag(Tag::new(11, LABELS, "apple").with_parents(vec![10]));
    catalog.insert_tag(Tag::new(12, LABELS, "stone"));
    catalog
}

fn apply(catalog: &mut MemoryCatalog, edit: &Edit) -> RecordChange {
    match edit {
        Edit::Upsert(id, size, name, tags) => {
            let mut record = Record::new(*id)
                .with(NAME, name.as_str())
                .with(LABELS, Value::Tags(tags.clone()));
            if let Some(size) = size {
                record.set(SIZE, *size as f64);
            }
            if catalog.insert_record(record).is_some() {
                RecordChange::modified([*id])
            } else {
                RecordChange::added([*id])
            }
        }
        Edit::Remove(id) => {
            catalog.remove_record(*id);
            RecordChange::removed([*id])
        }
    }
}

/// A view with `OR(size < threshold, labels containsAny fruit)` sorted by
/// name then size.
fn configured_view(
    catalog: &MemoryCatalog,
    options: CollectionOptions,
    threshold: i32,
    desc: bool,
) -> CollectionManager {
    let mut view = CollectionManager::new(options);
    view.edit_filter(catalog, |f| {
        let group = f.add_new_filter_group(ROOT_FILTER_ID, GroupOperator::Or)?;
        f.add_filter(
            catalog,
            group,
            SIZE,
            Operator::Lower,
            Value::Number(threshold as f64),
        )?;
        f.add_filter(
            catalog,
            group,
            LABELS,
            Operator::ContainsAny,
            Value::Tags(vec![10]),
        )
    })
    .unwrap();
    let direction = if desc {
        SortOption::desc()
    } else {
        SortOption::asc()
    };
    view.edit_sort(catalog, |s| {
        s.set_sort(NAME, None);
        s.set_sort(SIZE, Some(direction));
    });
    view.update(catalog, Some(catalog.record_ids()));
    view
}

proptest! {
    /// Property: notifications keep the view equal to a fresh full build.
    #[test]
    fn notified_view_equals_fresh_view(
        edits in prop::collection::vec(edit_strategy(), 0..40),
        threshold in 0i32..10,
        desc in any::<bool>(),
        auto_reload in any::<bool>(),
    ) {
        let mut catalog = base_catalog();
        let options = CollectionOptions { auto_reload };
        let mut view = configured_view(&catalog, options, threshold, desc);

        for edit in &edits {
            let change = apply(&mut catalog, edit);
            view.on_change(&catalog, &change);
        }
        if !auto_reload {
            view.update(&catalog, None);
        }

        let fresh = configured_view(&catalog, CollectionOptions::default(), threshold, desc);
        prop_assert_eq!(view.result(), fresh.result());
        prop_assert!(!view.is_dirty());
    }
}

#[test]
fn listeners_see_every_cycle() {
    let mut catalog = base_catalog();
    for (id, size) in [(1, 5.0), (2, 3.0), (3, 5.0)] {
        catalog.insert_record(Record::new(id).with(SIZE, size));
    }

    let mut view = CollectionManager::new(CollectionOptions::default());
    let events: Rc<RefCell<Vec<CollectionEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    view.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    view.edit_sort(&catalog, |s| s.set_sort(SIZE, None));
    view.update(&catalog, Some(catalog.record_ids()));
    catalog.record_mut(2).unwrap().set(SIZE, 10.0);
    view.on_change(&catalog, &RecordChange::modified([2]));

    let events = events.borrow();
    let modes: Vec<_> = events.iter().map(|e| e.mode).collect();
    assert_eq!(
        modes,
        vec![UpdateMode::Full, UpdateMode::Full, UpdateMode::Incremental]
    );
    assert_eq!(events[1].result.images, vec![2, 1, 3]);
    assert_eq!(events[2].result.images, vec![1, 3, 2]);
}

#[test]
fn pool_replacement_runs_full_update() {
    let mut catalog = base_catalog();
    for id in 1..=4 {
        catalog.insert_record(Record::new(id).with(SIZE, id as f64));
    }

    let mut view = CollectionManager::new(CollectionOptions::default());
    view.edit_sort(&catalog, |s| s.set_sort(SIZE, Some(SortOption::desc())));
    view.on_pool_replaced(&catalog, vec![1, 3, 3, 4]);

    assert_eq!(view.pool(), &[1, 3, 4]);
    assert_eq!(view.result().unwrap().images, vec![4, 3, 1]);
}

#[test]
fn merged_remove_and_readd_keeps_record() {
    let mut catalog = base_catalog();
    for id in 1..=3 {
        catalog.insert_record(Record::new(id).with(SIZE, 1.0).with(NAME, "x"));
    }
    let mut view = configured_view(&catalog, CollectionOptions::default(), 5, false);
    assert_eq!(view.result().unwrap().images, vec![1, 2, 3]);

    catalog.remove_record(2);
    let mut change = RecordChange::removed([2]);
    catalog.insert_record(Record::new(2).with(SIZE, 1.0).with(NAME, "x"));
    change.merge(RecordChange::added([2]));
    view.on_change(&catalog, &change);

    let fresh = configured_view(&catalog, CollectionOptions::default(), 5, false);
    assert_eq!(view.result(), fresh.result());
    assert_eq!(view.result().unwrap().images, vec![1, 2, 3]);
}
