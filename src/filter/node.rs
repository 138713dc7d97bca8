use super::operators::ComparisonOp;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for NodeId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Scalar {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    #[default]
    Undefined,
}

impl Scalar {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Scalar::Undefined)
    }
}

/// Bare textual form: strings unquoted, `null` and `undefined` spelled out.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Null => f.write_str("null"),
            Scalar::Undefined => f.write_str("undefined"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(f64::from(n))
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Number(n) => serializer.serialize_f64(*n),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Null | Scalar::Undefined => serializer.serialize_unit(),
        }
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
        Ok(Scalar::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Scalar, E> {
        Ok(Scalar::String(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
        Ok(Scalar::Number(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
        Ok(Scalar::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
        Ok(Scalar::Number(v as f64))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Scalar, E> {
        Ok(Scalar::Bool(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Scalar, E> {
        Ok(Scalar::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Scalar, E> {
        Ok(Scalar::Null)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Scalar, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "!")]
    Not,
}

impl LogicalOp {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Comparison {
        field: String,
        operator: ComparisonOp,
        #[serde(default, skip_serializing_if = "Scalar::is_undefined")]
        value: Scalar,
    },
    LogicalConnector {
        operator: LogicalOp,
    },
    Group {
        #[serde(default)]
        children: Vec<FilterNode>,
    },
}

/// One node of a filter tree. Groups own their children; `parent_id` is only
/// a back-reference to the enclosing group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterNode {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl FilterNode {
    pub fn is_connector(&self) -> bool {
        matches!(self.kind, NodeKind::LogicalConnector { .. })
    }

    pub fn children(&self) -> &[FilterNode] {
        match &self.kind {
            NodeKind::Group { children } => children,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::from_str;

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from(18).to_string(), "18");
        assert_eq!(Scalar::from(2.5).to_string(), "2.5");
        assert_eq!(Scalar::from("Ann").to_string(), "Ann");
        assert_eq!(Scalar::Null.to_string(), "null");
        assert_eq!(Scalar::Undefined.to_string(), "undefined");
        assert_eq!(Scalar::from(None::<bool>), Scalar::Null);
    }

    #[test]
    fn test_deserialize_comparison() {
        let node: FilterNode = from_str(
            r#"
id: c1
parentId: g1
type: comparison
field: age
operator: GreaterThan
value: 18
"#,
        )
        .unwrap();

        assert_eq!(node.id.as_str(), "c1");
        assert_eq!(node.parent_id, Some(NodeId::from("g1")));
        assert_eq!(
            node.kind,
            NodeKind::Comparison {
                field: "age".to_string(),
                operator: ComparisonOp::GreaterThan,
                value: Scalar::Number(18.0),
            }
        );
    }

    #[test]
    fn test_missing_value_is_undefined() {
        let node: FilterNode =
            from_str("{id: c1, type: comparison, field: name, operator: IsUndefined}").unwrap();
        assert!(matches!(
            node.kind,
            NodeKind::Comparison { value: Scalar::Undefined, .. }
        ));
    }

    #[test]
    fn test_undefined_and_null_survive_yaml() {
        let undefined = FilterNode {
            id: NodeId::from("c1"),
            parent_id: None,
            kind: NodeKind::Comparison {
                field: "name".to_string(),
                operator: ComparisonOp::IsUndefined,
                value: Scalar::Undefined,
            },
        };
        let yaml = serde_yaml::to_string(&undefined).unwrap();
        assert!(!yaml.contains("value"));
        assert_eq!(from_str::<FilterNode>(&yaml).unwrap(), undefined);

        let null = FilterNode {
            kind: NodeKind::Comparison {
                field: "name".to_string(),
                operator: ComparisonOp::IsNull,
                value: Scalar::Null,
            },
            ..undefined
        };
        let yaml = serde_yaml::to_string(&null).unwrap();
        assert_eq!(from_str::<FilterNode>(&yaml).unwrap(), null);
    }

    #[test]
    fn test_null_value() {
        let node: FilterNode =
            from_str("{id: c1, type: comparison, field: name, operator: IsNull, value: null}")
                .unwrap();
        assert!(matches!(
            node.kind,
            NodeKind::Comparison { value: Scalar::Null, .. }
        ));
    }

    #[test]
    fn test_deserialize_group() {
        let node: FilterNode = from_str(
            r#"
id: g1
type: group
children:
  - {id: c1, type: comparison, field: name, operator: Equals, value: Ann}
  - {id: a1, type: logicalConnector, operator: "||"}
  - {id: c2, type: comparison, field: active, operator: Equals, value: true}
"#,
        )
        .unwrap();

        let children = node.children();
        assert_eq!(children.len(), 3);
        assert!(children[1].is_connector());
        assert!(matches!(
            children[1].kind,
            NodeKind::LogicalConnector { operator: LogicalOp::Or }
        ));
        assert!(matches!(
            &children[2].kind,
            NodeKind::Comparison { value: Scalar::Bool(true), .. }
        ));
    }
}
