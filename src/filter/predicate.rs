use super::node::{FilterNode, NodeKind, Scalar};
use super::operators::ComparisonOp;

/// Compiles a sequence of sibling nodes into a single predicate expression.
///
/// Groups become parentheses and nothing else: no precedence is inferred, so
/// callers nest groups when they need `||` to bind looser than `&&`.
pub fn compile_predicate(nodes: &[FilterNode]) -> String {
    let mut out = String::new();
    write_siblings(nodes, &mut out);
    out
}

fn write_siblings(nodes: &[FilterNode], out: &mut String) {
    let mut prev_operand = false;
    for node in nodes {
        let is_operand = !node.is_connector();
        // Deserialized trees skip the builder, so adjacent operands still get an AND.
        if prev_operand && is_operand {
            out.push_str(" && ");
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
        } => out.push_str(&render_comparison(field, *operator, value)),
        NodeKind::LogicalConnector { operator } => {
            out.push(' ');
            out.push_str(operator.as_str());
            out.push(' ');
        }
        NodeKind::Group { children } => {
            out.push('(');
            write_siblings(children, out);
            out.push(')');
        }
    }
}

fn render_comparison(field: &str, op: ComparisonOp, value: &Scalar) -> String {
    let value = render_value(value);
    op.template()
        .split("{field}")
        .map(|part| part.replace("{value}", &value))
        .collect::<Vec<_>>()
        .join(field)
}

fn render_value(value: &Scalar) -> String {
    match value {
        Scalar::String(s) => {
            let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
            format!("'{}'", escaped)
        }
        other => other.to_string(),
    }
}
