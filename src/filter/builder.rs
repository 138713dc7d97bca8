use super::node::{FilterNode, LogicalOp, NodeId, NodeKind, Scalar};
use super::operators::ComparisonOp;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide counter with a kind prefix. Labels only, not tokens.
fn next_id(prefix: &str) -> NodeId {
    let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    NodeId::new(format!("{}-{}", prefix, n))
}

/// Input to [`group`]: a single node or a run of nodes flattened in place.
#[derive(Debug, Clone)]
pub enum GroupItem {
    Node(FilterNode),
    Nodes(Vec<FilterNode>),
}

impl From<FilterNode> for GroupItem {
    fn from(node: FilterNode) -> Self {
        GroupItem::Node(node)
    }
}

impl From<Vec<FilterNode>> for GroupItem {
    fn from(nodes: Vec<FilterNode>) -> Self {
        GroupItem::Nodes(nodes)
    }
}

pub fn comparison(
    field: impl Into<String>,
    operator: ComparisonOp,
    value: impl Into<Scalar>,
) -> FilterNode {
    comparison_with_id(field, operator, value, next_id("cmp"), None)
}

pub fn comparison_with_id(
    field: impl Into<String>,
    operator: ComparisonOp,
    value: impl Into<Scalar>,
    id: impl Into<NodeId>,
    parent_id: Option<NodeId>,
) -> FilterNode {
    FilterNode {
        id: id.into(),
        parent_id,
        kind: NodeKind::Comparison {
            field: field.into(),
            operator,
            value: value.into(),
        },
    }
}

/// Wraps `items` in a group, inserting an implicit `&&` between adjacent
/// operands and re-parenting every child onto the new group.
pub fn group<T: Into<GroupItem>>(items: impl IntoIterator<Item = T>) -> FilterNode {
    let id = next_id("group");
    let mut children: Vec<FilterNode> = Vec::new();

    let flat = items.into_iter().flat_map(|item| match item.into() {
        GroupItem::Node(node) => vec![node],
        GroupItem::Nodes(nodes) => nodes,
    });

    for mut node in flat {
        let needs_and = children.last().is_some_and(|prev| !prev.is_connector());
        if needs_and && !node.is_connector() {
            let mut implicit = and();
            implicit.parent_id = Some(id.clone());
            children.push(implicit);
        }
        node.parent_id = Some(id.clone());
        children.push(node);
    }

    FilterNode {
        id,
        parent_id: None,
        kind: NodeKind::Group { children },
    }
}

fn connector(prefix: &str, operator: LogicalOp) -> FilterNode {
    FilterNode {
        id: next_id(prefix),
        parent_id: None,
        kind: NodeKind::LogicalConnector { operator },
    }
}

pub fn and() -> FilterNode {
    connector("and", LogicalOp::And)
}

pub fn or() -> FilterNode {
    connector("or", LogicalOp::Or)
}

pub fn not() -> FilterNode {
    connector("not", LogicalOp::Not)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connectors(node: &FilterNode) -> Vec<Option<LogicalOp>> {
        node.children()
            .iter()
            .map(|c| match c.kind {
                NodeKind::LogicalConnector { operator } => Some(operator),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_implicit_and() {
        let a = comparison("age", ComparisonOp::GreaterThan, 18);
        let b = comparison("name", ComparisonOp::Equals, "Ann");
        let g = group([a.clone(), b.clone()]);

        assert_eq!(connectors(&g), vec![None, Some(LogicalOp::And), None]);
        assert_eq!(g.children()[0].kind, a.kind);
        assert_eq!(g.children()[2].kind, b.kind);
    }

    #[test]
    fn test_explicit_connector_not_duplicated() {
        let g = group([
            comparison("age", ComparisonOp::GreaterThan, 18),
            and(),
            comparison("name", ComparisonOp::Equals, "Ann"),
        ]);
        assert_eq!(connectors(&g), vec![None, Some(LogicalOp::And), None]);

        let g = group([
            comparison("age", ComparisonOp::GreaterThan, 18),
            or(),
            comparison("name", ComparisonOp::Equals, "Ann"),
        ]);
        assert_eq!(connectors(&g), vec![None, Some(LogicalOp::Or), None]);
    }

    #[test]
    fn test_leading_not() {
        let g = group([not(), comparison("active", ComparisonOp::Equals, true)]);
        assert_eq!(connectors(&g), vec![Some(LogicalOp::Not), None]);
    }

    #[test]
    fn test_nested_sequences_flattened() {
        let g = group([
            vec![comparison("a", ComparisonOp::Equals, 1), or()],
            vec![comparison("b", ComparisonOp::Equals, 2)],
        ]);
        assert_eq!(connectors(&g), vec![None, Some(LogicalOp::Or), None]);

        let g = group([
            GroupItem::from(comparison("a", ComparisonOp::Equals, 1)),
            GroupItem::from(vec![comparison("b", ComparisonOp::Equals, 2)]),
        ]);
        assert_eq!(connectors(&g), vec![None, Some(LogicalOp::And), None]);
    }

    #[test]
    fn test_children_reparented() {
        let g = group([
            comparison("a", ComparisonOp::Equals, 1),
            comparison("b", ComparisonOp::Equals, 2),
        ]);
        assert!(g.parent_id.is_none());
        for child in g.children() {
            assert_eq!(child.parent_id.as_ref(), Some(&g.id));
        }
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = comparison("a", ComparisonOp::Equals, 1);
        let b = comparison("a", ComparisonOp::Equals, 1);
        let g = group([a.clone(), b.clone()]);
        assert_ne!(a.id, b.id);
        assert_ne!(g.id, a.id);
        assert!(g.id.as_str().starts_with("group-"));
    }

    #[test]
    fn test_explicit_id() {
        let c = comparison_with_id(
            "a",
            ComparisonOp::IsNull,
            Scalar::Null,
            "c1",
            Some(NodeId::from("g1")),
        );
        assert_eq!(c.id.as_str(), "c1");
        assert_eq!(c.parent_id, Some(NodeId::from("g1")));
    }

    #[test]
    fn test_connector_only_group_accepted() {
        let g = group([or()]);
        assert_eq!(connectors(&g), vec![Some(LogicalOp::Or)]);
        let empty = group(Vec::<FilterNode>::new());
        assert!(empty.children().is_empty());
    }
}
