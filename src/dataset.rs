use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML/JSON: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Expected a list of records or a single mapping, got {0}")]
    NotRecords(&'static str),
}

pub fn load_records(path: &Path) -> Result<Vec<Value>, DatasetError> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_records(&content)
}

pub fn read_records(mut reader: impl Read) -> Result<Vec<Value>, DatasetError> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|source| DatasetError::Io {
            path: "<stdin>".to_string(),
            source,
        })?;
    parse_records(&content)
}

/// A sequence yields its items, a mapping is a single record, an empty
/// document yields nothing.
pub fn parse_records(content: &str) -> Result<Vec<Value>, DatasetError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Value = serde_yaml::from_str(content)?;
    match document {
        Value::Sequence(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        record @ Value::Mapping(_) => Ok(vec![record]),
        Value::Bool(_) => Err(DatasetError::NotRecords("a boolean")),
        Value::Number(_) => Err(DatasetError::NotRecords("a number")),
        Value::String(_) => Err(DatasetError::NotRecords("a string")),
        Value::Tagged(_) => Err(DatasetError::NotRecords("a tagged value")),
    }
}

/// Reads any YAML/JSON document from a file, e.g. a filter tree.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_yaml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{comparison, group, ComparisonOp, Filter, FilterNode, Scalar};
    use crate::query::EvalError;

    #[test]
    fn test_sequence_of_records() {
        let records = parse_records(
            r#"
- name: Ann
  age: 34
- name: Bob
  age: 17
"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Ann");
    }

    #[test]
    fn test_json_input() {
        let records = parse_records(r#"[{"name": "Ann"}, {"name": "Bob"}]"#).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_single_mapping() {
        let records = parse_records("name: Ann").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_records("").unwrap().is_empty());
    }

    #[test]
    fn test_scalar_rejected() {
        assert!(matches!(
            parse_records("42"),
            Err(DatasetError::NotRecords("a number"))
        ));
    }

    #[test]
    fn test_read_from_reader() {
        let records = read_records("- a: 1\n- a: 2\n".as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_tree_and_records_end_to_end() {
        let nodes: Vec<FilterNode> = serde_yaml::from_str(
            r#"
- {id: c1, type: comparison, field: age, operator: GreaterThanOrEqual, value: 18}
- {id: o1, type: logicalConnector, operator: "||"}
- id: g1
  type: group
  children:
    - {id: c2, type: comparison, field: name, operator: StartsWith, value: b}
    - {id: c3, type: comparison, field: city, operator: Contains, value: ERG}
"#,
        )
        .unwrap();
        let records = parse_records(
            r#"
- {name: Ann, age: 34, city: Oslo}
- {name: Bob, age: 17, city: Bergen}
- {name: Bea, age: 15, city: Tromso}
"#,
        )
        .unwrap();

        let filter = Filter::from_nodes(nodes);
        assert_eq!(filter.filter_count(), 3);
        assert_eq!(
            filter.predicate(),
            "record?.age >= 18 || (starts_with(lower(record?.name), lower('b')) && contains(lower(record?.city), lower('ERG')))"
        );

        let matched = filter.filter(&records[..]);
        let names: Vec<&str> = matched.iter().filter_map(|r| r["name"].as_str()).collect();
        assert_eq!(names, vec!["Ann", "Bob"]);

        assert_eq!(filter.to_remote_query().filter, "age>=18|(name^b,city=*ERG)");
    }

    #[test]
    fn test_malformed_tree_fails_closed() {
        let nodes: Vec<FilterNode> = serde_yaml::from_str(
            r#"
- {id: c1, type: comparison, field: first name, operator: Equals, value: Ann}
"#,
        )
        .unwrap();
        let records = parse_records("- {first name: Ann}").unwrap();
        let filter = Filter::from_nodes(nodes);
        assert!(filter.filter(&records[..]).is_empty());
    }

    #[test]
    fn test_field_names_are_case_sensitive() {
        let records = parse_records("- {Status: x}").unwrap();

        let undefined = Filter::from_nodes(vec![comparison(
            "status",
            ComparisonOp::IsUndefined,
            Scalar::Undefined,
        )]);
        assert_eq!(undefined.filter(&records[..]).len(), 1);

        let equals = Filter::from_nodes(vec![comparison("status", ComparisonOp::Equals, "x")]);
        assert!(equals.filter(&records[..]).is_empty());
    }

    #[test]
    fn test_contains_on_list_field_fails_closed() {
        let records = parse_records("- {tags: [VIP, new]}").unwrap();
        let filter = Filter::from_nodes(vec![comparison("tags", ComparisonOp::Contains, "vip")]);

        assert!(filter.filter(&records[..]).is_empty());
        assert!(matches!(
            filter.try_filter(&records[..]),
            Err(EvalError::TypeMismatch { context: "lower", .. })
        ));
    }

    #[test]
    fn test_deeply_nested_tree_fails_closed() {
        let mut tree = comparison("age", ComparisonOp::GreaterThan, 18);
        for _ in 0..800 {
            tree = group([tree]);
        }
        let records = parse_records("- {age: 30}").unwrap();
        let filter = Filter::from_nodes(vec![tree]);

        assert!(filter.filter(&records[..]).is_empty());
        assert!(matches!(
            filter.try_filter(&records[..]),
            Err(EvalError::Parse { .. })
        ));
    }

    #[test]
    fn test_moderately_nested_tree_evaluates() {
        let mut tree = comparison("age", ComparisonOp::GreaterThan, 18);
        for _ in 0..100 {
            tree = group([tree]);
        }
        let records = parse_records("- {age: 30}\n- {age: 10}").unwrap();
        let filter = Filter::from_nodes(vec![tree]);
        assert_eq!(filter.filter(&records[..]).len(), 1);
    }
}
