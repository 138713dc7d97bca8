//! Gridify query strings: `,` is AND, `|` is OR, parentheses group.
//!
//! There is no unary NOT in this convention, so a `!` connector emits
//! nothing. Values are written bare and `?` markers are removed from field
//! paths.

use super::node::{FilterNode, LogicalOp, NodeKind};
use serde::{Deserialize, Serialize};

/// Sorting and paging applied to a compiled query. Zero and empty mean
/// "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(default)]
    pub order_by: String,
    /// 1-based.
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEnvelope {
    pub filter: String,
    pub order_by: String,
    pub page: u32,
    pub page_size: u32,
}

impl QueryEnvelope {
    pub fn with_options(mut self, options: &QueryOptions) -> Self {
        self.order_by = options.order_by.clone();
        self.page = options.page;
        self.page_size = options.page_size;
        self
    }

    /// Form-encoded query parameters. Unset paging fields are left out.
    pub fn to_query_string(&self) -> Result<String, serde_urlencoded::ser::Error> {
        let mut params: Vec<(&str, String)> = vec![("filter", self.filter.clone())];
        if !self.order_by.is_empty() {
            params.push(("orderBy", self.order_by.clone()));
        }
        if self.page > 0 {
            params.push(("page", self.page.to_string()));
        }
        if self.page_size > 0 {
            params.push(("pageSize", self.page_size.to_string()));
        }
        serde_urlencoded::to_string(params)
    }
}

pub fn compile_query(nodes: &[FilterNode]) -> QueryEnvelope {
    let mut filter = String::new();
    write_siblings(nodes, &mut filter);
    QueryEnvelope {
        filter,
        ..QueryEnvelope::default()
    }
}

fn write_siblings(nodes: &[FilterNode], out: &mut String) {
    let mut prev_operand = false;
    for node in nodes {
        let is_operand = !node.is_connector();
        if prev_operand && is_operand {
            out.push(',');
        }
        write_node(node, out);
        prev_operand = is_operand;
    }
}

fn write_node(node: &FilterNode, out: &mut String) {
    match &node.kind {
        NodeKind::Comparison {
            field,
            operator,
            value,
        } => {
            if field.is_empty() {
                return;
            }
            out.push_str(&field.replace('?', ""));
            out.push_str(operator.symbol());
            out.push_str(&value.to_string());
        }
        NodeKind::LogicalConnector { operator } => match operator {
            LogicalOp::And => out.push(','),
            LogicalOp::Or => out.push('|'),
            LogicalOp::Not => {}
        },
        NodeKind::Group { children } => {
            out.push('(');
            write_siblings(children, out);
            out.push(')');
        }
    }
}
