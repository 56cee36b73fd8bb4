//! Compiled predicates and recursive group evaluation.
//!
//! Before a pass the arena is compiled against the catalog: configured tags
//! are expanded to their subtrees, strings are case-folded, `like` patterns
//! are built once and dates become epoch milliseconds. Evaluation then never
//! touches the filter tree or allocates per record.

use crate::operator::{GroupOperator, Operator};
use crate::query::TextQuery;
use crate::tree::{FilterNode, FilterTree};
use hashbrown::HashSet;
use regex::{Regex, RegexBuilder};
use vista_core::{
    Catalog, FilterId, FolderId, Property, PropertyType, Record, RecordId, TagId, Value,
    ROOT_FILTER_ID,
};

/// Result of running a set of records through a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    pub valid: Vec<RecordId>,
    pub reject: Vec<RecordId>,
}

/// The resolved right-hand side of a leaf.
#[derive(Clone, Debug)]
enum Operand {
    /// Filter value empty or unusable: the leaf accepts everything
    Inactive,
    /// Operator ignores the configured value
    Unary,
    Text(String),
    Pattern(Regex),
    Number(f64),
    Millis(i64),
    /// One expanded set per configured tag
    TagSets(Vec<HashSet<TagId>>),
    Folder {
        id: FolderId,
        subtree: HashSet<FolderId>,
    },
}

#[derive(Clone, Debug)]
struct CompiledLeaf {
    property: Property,
    operator: Operator,
    operand: Operand,
}

#[derive(Clone, Debug)]
enum CompiledNode {
    Leaf(CompiledLeaf),
    /// Leaf whose property no longer resolves; treated as inactive
    Skip,
    Group {
        operator: GroupOperator,
        children: Vec<CompiledNode>,
    },
}

/// A filter configuration ready to evaluate against one catalog.
#[derive(Clone, Debug)]
pub struct CompiledFilter {
    query: Option<TextQuery>,
    folders: Option<HashSet<FolderId>>,
    root: CompiledNode,
}

impl CompiledFilter {
    /// Compiles a tree plus the folder and query restrictions.
    pub fn compile<C: Catalog>(
        tree: &FilterTree,
        folders: &[FolderId],
        query: &str,
        catalog: &C,
    ) -> Self {
        let folders = if folders.is_empty() {
            None
        } else {
            Some(
                folders
                    .iter()
                    .flat_map(|f| catalog.expand_folder(*f))
                    .collect(),
            )
        };
        Self {
            query: TextQuery::new(query),
            folders,
            root: compile_node(tree, ROOT_FILTER_ID, catalog),
        }
    }

    /// Returns whether a record passes the query and folder restrictions.
    pub fn admits<C: Catalog>(&self, record: &Record, catalog: &C) -> bool {
        if let Some(folders) = &self.folders {
            match record.folder_id() {
                Some(folder) if folders.contains(&folder) => {}
                _ => return false,
            }
        }
        match &self.query {
            Some(query) => query.matches(record, catalog),
            None => true,
        }
    }

    /// Partitions `records` into valid and rejected ids. Ids missing from
    /// the catalog are rejected.
    pub fn partition<C: Catalog>(&self, records: &[RecordId], catalog: &C) -> Partition {
        let mut candidates = Vec::with_capacity(records.len());
        let mut reject = Vec::new();
        for &id in records {
            match catalog.record(id) {
                Some(record) if self.admits(record, catalog) => candidates.push(id),
                _ => reject.push(id),
            }
        }
        let mut partition = evaluate(&self.root, candidates, catalog);
        reject.append(&mut partition.reject);
        partition.reject = reject;
        partition
    }
}

fn compile_node<C: Catalog>(tree: &FilterTree, id: FilterId, catalog: &C) -> CompiledNode {
    match tree.get(id) {
        Some(FilterNode::Group(group)) => CompiledNode::Group {
            operator: group.group_operator,
            children: group
                .filters
                .iter()
                .map(|child| compile_node(tree, *child, catalog))
                .collect(),
        },
        Some(FilterNode::Leaf(filter)) => match catalog.property(filter.property_id) {
            Some(property) => CompiledNode::Leaf(CompiledLeaf {
                property: property.clone(),
                operator: filter.operator,
                operand: resolve_operand(property, filter.operator, &filter.value, catalog),
            }),
            None => {
                tracing::trace!(
                    filter = filter.id,
                    property = filter.property_id,
                    "skipping filter on unknown property"
                );
                CompiledNode::Skip
            }
        },
        None => CompiledNode::Skip,
    }
}

fn resolve_operand<C: Catalog>(
    property: &Property,
    operator: Operator,
    value: &Value,
    catalog: &C,
) -> Operand {
    if !operator.takes_operand() {
        return Operand::Unary;
    }
    if value.is_empty() {
        return Operand::Inactive;
    }
    let ty = property.property_type;
    if ty.is_text() {
        return match (operator, value) {
            (Operator::Like, Value::String(s)) => match build_pattern(s) {
                Some(re) => Operand::Pattern(re),
                None => Operand::Text(s.to_lowercase()),
            },
            (_, Value::String(s)) => Operand::Text(s.to_lowercase()),
            _ => Operand::Inactive,
        };
    }
    match ty {
        PropertyType::Date => match value {
            Value::Date(_) => value.as_millis().map_or(Operand::Inactive, Operand::Millis),
            Value::Number(n) if n.is_finite() => Operand::Millis(*n as i64),
            _ => Operand::Inactive,
        },
        PropertyType::Tag | PropertyType::MultiTags => {
            let tags = value.tags();
            if tags.is_empty() {
                Operand::Inactive
            } else {
                Operand::TagSets(tags.iter().map(|t| catalog.expand_tag(*t)).collect())
            }
        }
        PropertyType::Folder => match value.as_f64() {
            Some(n) if n.is_finite() && n >= 0.0 => {
                let id = n as FolderId;
                Operand::Folder {
                    id,
                    subtree: catalog.expand_folder(id),
                }
            }
            _ => Operand::Inactive,
        },
        _ if ty.is_numeric() => match value.as_f64() {
            Some(n) if !n.is_nan() => Operand::Number(n),
            _ => Operand::Inactive,
        },
        _ => Operand::Inactive,
    }
}

fn build_pattern(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

fn evaluate<C: Catalog>(node: &CompiledNode, input: Vec<RecordId>, catalog: &C) -> Partition {
    match node {
        CompiledNode::Skip => Partition {
            valid: input,
            reject: Vec::new(),
        },
        CompiledNode::Leaf(leaf) => {
            let (valid, reject) = input.into_iter().partition(|id| {
                catalog
                    .record(*id)
                    .is_some_and(|record| leaf.matches(record))
            });
            Partition { valid, reject }
        }
        CompiledNode::Group { children, .. } if children.is_empty() => Partition {
            valid: input,
            reject: Vec::new(),
        },
        CompiledNode::Group {
            operator: GroupOperator::And,
            children,
        } => {
            let mut valid = input;
            let mut reject = Vec::new();
            for child in children {
                let mut step = evaluate(child, valid, catalog);
                reject.append(&mut step.reject);
                valid = step.valid;
            }
            Partition { valid, reject }
        }
        CompiledNode::Group {
            operator: GroupOperator::Or,
            children,
        } => {
            let mut valid = Vec::new();
            let mut remaining = input;
            for child in children {
                let mut step = evaluate(child, remaining, catalog);
                valid.append(&mut step.valid);
                remaining = step.reject;
            }
            Partition {
                valid,
                reject: remaining,
            }
        }
    }
}

impl CompiledLeaf {
    fn matches(&self, record: &Record) -> bool {
        let value = record.value(&self.property);
        let value = value.as_deref().filter(|v| !v.is_empty());

        match self.operator {
            Operator::IsSet => return value.is_some(),
            Operator::NotSet => return value.is_none(),
            Operator::IsTrue => return value.and_then(Value::as_bool) == Some(true),
            Operator::IsFalse => return value.and_then(Value::as_bool) != Some(true),
            _ => {}
        }

        if matches!(self.operand, Operand::Inactive | Operand::Unary) {
            return true;
        }
        match value {
            Some(value) => self.compare(value),
            None => self.operator.accepts_empty_record(),
        }
    }

    fn compare(&self, value: &Value) -> bool {
        use Operator::*;
        match (&self.operand, self.operator) {
            (Operand::Text(text), op) => {
                let Some(s) = value.as_str() else {
                    return op == EqualNot;
                };
                let folded = s.to_lowercase();
                match op {
                    Equal => folded == *text,
                    EqualNot => folded != *text,
                    Contains | Like => folded.contains(text.as_str()),
                    StartsWith => folded.starts_with(text.as_str()),
                    _ => false,
                }
            }
            (Operand::Pattern(re), _) => value.as_str().is_some_and(|s| re.is_match(s)),
            (Operand::Number(n), op) => match value.as_f64() {
                Some(v) => compare_ordered(v, *n, op),
                None => op == EqualNot,
            },
            (Operand::Millis(m), op) => {
                let v = match value {
                    Value::Date(_) => value.as_millis(),
                    Value::Number(n) => Some(*n as i64),
                    _ => None,
                };
                match v {
                    Some(v) => compare_ordered(v, *m, op),
                    None => op == EqualNot,
                }
            }
            (Operand::TagSets(sets), op) => {
                let tags = value.tags();
                let any = || tags.iter().any(|t| sets.iter().any(|s| s.contains(t)));
                match op {
                    ContainsAny => any(),
                    ContainsAll => sets.iter().all(|s| tags.iter().any(|t| s.contains(t))),
                    ContainsNot => !any(),
                    _ => false,
                }
            }
            (Operand::Folder { id, subtree }, op) => {
                let Some(folder) = value.as_f64().map(|f| f as FolderId) else {
                    return matches!(op, EqualNot | ContainsNot);
                };
                match op {
                    Equal => folder == *id,
                    EqualNot => folder != *id,
                    ContainsAny => subtree.contains(&folder),
                    ContainsNot => !subtree.contains(&folder),
                    _ => false,
                }
            }
            (Operand::Inactive | Operand::Unary, _) => true,
        }
    }
}

fn compare_ordered<T: PartialOrd>(value: T, operand: T, op: Operator) -> bool {
    match op {
        Operator::Equal => value == operand,
        Operator::EqualNot => value != operand,
        Operator::Lower => value < operand,
        Operator::Leq => value <= operand,
        Operator::Greater => value > operand,
        Operator::Geq => value >= operand,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vista_core::{MemoryCatalog, Tag};

    const TITLE: u64 = 1;
    const SIZE: u64 = 2;
    const LABELS: u64 = 3;
    const DONE: u64 = 4;
    const TAKEN: u64 = 5;
    const FOLDER: u64 = 6;

    fn catalog() -> MemoryCatalog {
        let mut c = MemoryCatalog::new();
        c.insert_property(Property::new(TITLE, "title", PropertyType::String));
        c.insert_property(Property::new(SIZE, "size", PropertyType::Number));
        c.insert_property(Property::new(LABELS, "labels", PropertyType::MultiTags));
        c.insert_property(Property::new(DONE, "done", PropertyType::Checkbox));
        c.insert_property(Property::new(TAKEN, "taken", PropertyType::Date));
        c.insert_property(Property::new(FOLDER, "folder", PropertyType::Folder));
        c.insert_tag(Tag::new(10, LABELS, "animal"));
        c.insert_tag(Tag::new(11, LABELS, "cat").with_parents(vec![10]));
        c.insert_tag(Tag::new(12, LABELS, "dog").with_parents(vec![10]));
        c.insert_tag(Tag::new(13, LABELS, "car"));
        c.insert_folder(100, None);
        c.insert_folder(101, Some(100));
        c.insert_folder(200, None);

        let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        c.insert_record(
            Record::new(1)
                .in_folder(100)
                .with(TITLE, "Black Cat")
                .with(SIZE, 5.0)
                .with(LABELS, Value::Tags(vec![11]))
                .with(DONE, true)
                .with(TAKEN, day(1)),
        );
        c.insert_record(
            Record::new(2)
                .in_folder(101)
                .with(TITLE, "Dog")
                .with(SIZE, 12.0)
                .with(LABELS, Value::Tags(vec![12, 13]))
                .with(TAKEN, day(5)),
        );
        c.insert_record(Record::new(3).in_folder(200).with(SIZE, 20.0));
        c
    }

    fn run(catalog: &MemoryCatalog, tree: &FilterTree) -> Vec<RecordId> {
        let compiled = CompiledFilter::compile(tree, &[], "", catalog);
        let mut valid = compiled.partition(&catalog.record_ids(), catalog).valid;
        valid.sort_unstable();
        valid
    }

    fn single(property: u64, operator: Operator, value: impl Into<Value>) -> FilterTree {
        let mut tree = FilterTree::new();
        tree.insert_filter(ROOT_FILTER_ID, property, operator, value.into())
            .unwrap();
        tree
    }

    #[test]
    fn test_text_operators() {
        let c = catalog();
        assert_eq!(run(&c, &single(TITLE, Operator::Equal, "black cat")), vec![1]);
        assert_eq!(run(&c, &single(TITLE, Operator::EqualNot, "dog")), vec![1, 3]);
        assert_eq!(run(&c, &single(TITLE, Operator::Contains, "CAT")), vec![1]);
        assert_eq!(run(&c, &single(TITLE, Operator::StartsWith, "do")), vec![2]);
        assert_eq!(run(&c, &single(TITLE, Operator::Like, "^b.*t$")), vec![1]);
    }

    #[test]
    fn test_like_invalid_pattern_is_literal() {
        let mut c = catalog();
        c.insert_record(Record::new(4).with(TITLE, "a(b"));
        assert_eq!(run(&c, &single(TITLE, Operator::Like, "(")), vec![4]);
    }

    #[test]
    fn test_number_operators() {
        let c = catalog();
        assert_eq!(run(&c, &single(SIZE, Operator::Greater, 10.0)), vec![2, 3]);
        assert_eq!(run(&c, &single(SIZE, Operator::Leq, 12.0)), vec![1, 2]);
        assert_eq!(run(&c, &single(SIZE, Operator::Equal, 20.0)), vec![3]);
    }

    #[test]
    fn test_date_operators() {
        let c = catalog();
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        assert_eq!(run(&c, &single(TAKEN, Operator::Lower, cutoff)), vec![1]);
        // record 3 has no date: ordering operators reject it
        assert_eq!(run(&c, &single(TAKEN, Operator::Geq, cutoff)), vec![2]);
    }

    #[test]
    fn test_checkbox_operators() {
        let c = catalog();
        assert_eq!(run(&c, &single(DONE, Operator::IsTrue, Value::Null)), vec![1]);
        assert_eq!(run(&c, &single(DONE, Operator::IsFalse, Value::Null)), vec![2, 3]);
    }

    #[test]
    fn test_tag_expansion() {
        let c = catalog();
        let any = |tags: Vec<TagId>| single(LABELS, Operator::ContainsAny, Value::Tags(tags));
        assert_eq!(run(&c, &any(vec![10])), vec![1, 2]);
        assert_eq!(run(&c, &any(vec![11])), vec![1]);

        let all = single(LABELS, Operator::ContainsAll, Value::Tags(vec![10, 13]));
        assert_eq!(run(&c, &all), vec![2]);

        let not = single(LABELS, Operator::ContainsNot, Value::Tags(vec![11]));
        assert_eq!(run(&c, &not), vec![2, 3]);
    }

    #[test]
    fn test_set_operators() {
        let c = catalog();
        assert_eq!(run(&c, &single(TITLE, Operator::IsSet, Value::Null)), vec![1, 2]);
        assert_eq!(run(&c, &single(TITLE, Operator::NotSet, Value::Null)), vec![3]);
    }

    #[test]
    fn test_empty_operand_is_inactive() {
        let c = catalog();
        for op in [Operator::Equal, Operator::EqualNot, Operator::Contains] {
            assert_eq!(run(&c, &single(TITLE, op, "")), vec![1, 2, 3]);
        }
        assert_eq!(
            run(&c, &single(LABELS, Operator::ContainsNot, Value::Tags(vec![]))),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_folder_operators() {
        let c = catalog();
        assert_eq!(run(&c, &single(FOLDER, Operator::ContainsAny, 100.0)), vec![1, 2]);
        assert_eq!(run(&c, &single(FOLDER, Operator::Equal, 100.0)), vec![1]);
        assert_eq!(run(&c, &single(FOLDER, Operator::ContainsNot, 100.0)), vec![3]);
    }

    #[test]
    fn test_unknown_property_is_skipped() {
        let c = catalog();
        assert_eq!(run(&c, &single(99, Operator::Equal, "x")), vec![1, 2, 3]);
    }

    #[test]
    fn test_and_or_groups() {
        let c = catalog();
        let mut tree = FilterTree::new();
        let or = tree.insert_group(ROOT_FILTER_ID, GroupOperator::Or).unwrap();
        tree.insert_filter(or, SIZE, Operator::Lower, Value::Number(6.0)).unwrap();
        tree.insert_filter(or, SIZE, Operator::Greater, Value::Number(15.0)).unwrap();
        assert_eq!(run(&c, &tree), vec![1, 3]);

        tree.insert_filter(ROOT_FILTER_ID, TITLE, Operator::IsSet, Value::Null)
            .unwrap();
        assert_eq!(run(&c, &tree), vec![1]);
    }

    #[test]
    fn test_partition_covers_input() {
        let c = catalog();
        let tree = single(SIZE, Operator::Greater, 10.0);
        let compiled = CompiledFilter::compile(&tree, &[], "", &c);
        let p = compiled.partition(&[1, 2, 3, 42], &c);
        assert_eq!(p.valid.len() + p.reject.len(), 4);
        assert!(p.reject.contains(&42));
    }

    #[test]
    fn test_folder_and_query_restrictions() {
        let c = catalog();
        let tree = FilterTree::new();
        let compiled = CompiledFilter::compile(&tree, &[100], "", &c);
        let mut valid = compiled.partition(&c.record_ids(), &c).valid;
        valid.sort_unstable();
        assert_eq!(valid, vec![1, 2]);

        let compiled = CompiledFilter::compile(&tree, &[], "dog", &c);
        assert_eq!(compiled.partition(&c.record_ids(), &c).valid, vec![2]);
    }
}
