use super::ast::{CompareOp, Date, Expr, Function, Literal};
use super::error::{EvalError, Result};
use super::parser::parse;
use crate::filter::Evaluator;
use serde::Serialize;
use serde_yaml::Value as YamlValue;
use std::cmp::Ordering;
use tracing::debug;

/// Runtime value of a predicate sub-expression.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(Date),
    List(Vec<Value>),
    Object,
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::List(_) => "array",
            Value::Object => "object",
        }
    }

    fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Date(_) | Value::List(_) | Value::Object => true,
        }
    }

    fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) if s.trim().is_empty() => Some(0.0),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<&YamlValue> for Value {
    fn from(v: &YamlValue) -> Self {
        match v {
            YamlValue::Null => Value::Null,
            YamlValue::Bool(b) => Value::Bool(*b),
            YamlValue::Number(n) => n.as_f64().map_or(Value::Undefined, Value::Number),
            YamlValue::String(s) => Value::String(s.clone()),
            YamlValue::Sequence(items) => Value::List(items.iter().map(Value::from).collect()),
            YamlValue::Mapping(_) => Value::Object,
            YamlValue::Tagged(tagged) => Value::from(&tagged.value),
        }
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Number(n) => Value::Number(*n),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
            Literal::Undefined => Value::Undefined,
        }
    }
}

/// Evaluates a parsed predicate against one record.
pub fn evaluate(expr: &Expr, record: &YamlValue) -> Result<bool> {
    Ok(eval_expr(expr, record)?.truthy())
}

fn eval_expr(expr: &Expr, record: &YamlValue) -> Result<Value> {
    match expr {
        Expr::Literal(lit) => Ok(Value::from(lit)),
        Expr::Path(segments) => Ok(resolve_path(record, segments)),
        Expr::Call { function, args } => {
            let args = args
                .iter()
                .map(|arg| eval_expr(arg, record))
                .collect::<Result<Vec<_>>>()?;
            call(*function, args)
        }
        Expr::Not(inner) => Ok(Value::Bool(!eval_expr(inner, record)?.truthy())),
        Expr::Compare { left, op, right } => {
            let left = eval_expr(left, record)?;
            let right = eval_expr(right, record)?;
            Ok(Value::Bool(compare(&left, *op, &right)))
        }
        Expr::And(left, right) => {
            if !eval_expr(left, record)?.truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval_expr(right, record)?.truthy()))
        }
        Expr::Or(left, right) => {
            if eval_expr(left, record)?.truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval_expr(right, record)?.truthy()))
        }
    }
}

fn get_field<'a>(value: &'a YamlValue, field: &str) -> Option<&'a YamlValue> {
    if let Some(seq) = value.as_sequence() {
        return field.parse::<usize>().ok().and_then(|i| seq.get(i));
    }

    value.as_mapping()?.get(field)
}

fn resolve_path(record: &YamlValue, segments: &[String]) -> Value {
    let mut current = record;
    for segment in segments {
        match get_field(current, segment) {
            Some(next) => current = next,
            None => return Value::Undefined,
        }
    }
    Value::from(current)
}

fn call(function: Function, args: Vec<Value>) -> Result<Value> {
    let mut args = args.into_iter();
    let subject = args.next().unwrap_or(Value::Undefined);
    let pattern = args.next().unwrap_or(Value::Undefined);

    match function {
        Function::Lower => lower(subject),
        Function::StartsWith => affix(function, subject, pattern, |s, p| s.starts_with(p)),
        Function::EndsWith => affix(function, subject, pattern, |s, p| s.ends_with(p)),
        Function::Contains => affix(function, subject, pattern, |s, p| s.contains(p)),
        Function::Len => Ok(match subject {
            Value::String(s) => Value::Number(s.chars().count() as f64),
            Value::List(items) => Value::Number(items.len() as f64),
            _ => Value::Undefined,
        }),
        Function::Date => match subject {
            Value::String(s) => Ok(Date::parse_prefix(&s).map_or(Value::Number(f64::NAN), Value::Date)),
            Value::Date(d) => Ok(Value::Date(d)),
            Value::Undefined | Value::Null => Ok(Value::Number(f64::NAN)),
            other => Err(mismatch("date", "string", &other)),
        },
    }
}

fn lower(value: Value) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(s.to_lowercase())),
        Value::Undefined | Value::Null => Ok(Value::Undefined),
        other => Err(mismatch("lower", "string", &other)),
    }
}

fn affix(
    function: Function,
    subject: Value,
    pattern: Value,
    test: impl Fn(&str, &str) -> bool,
) -> Result<Value> {
    let s = match subject {
        Value::String(s) => s,
        Value::Undefined | Value::Null => return Ok(Value::Undefined),
        other => return Err(mismatch(function.name(), "string", &other)),
    };
    match pattern {
        Value::String(p) => Ok(Value::Bool(test(&s, &p))),
        other => Err(mismatch(function.name(), "string", &other)),
    }
}

fn mismatch(context: &'static str, expected: &'static str, actual: &Value) -> EvalError {
    EvalError::TypeMismatch {
        context,
        expected,
        actual: actual.type_name(),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (x, y) if x.is_nullish() || y.is_nullish() => x.is_nullish() && y.is_nullish(),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x == y,
        (Value::List(_), _) | (_, Value::List(_)) | (Value::Object, _) | (_, Value::Object) => false,
        (Value::Date(_), _) | (_, Value::Date(_)) => false,
        (x, y) => match (x.to_number(), y.to_number()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        (Value::Number(_) | Value::Bool(_) | Value::String(_), Value::Number(_) | Value::Bool(_) | Value::String(_)) => {
            a.to_number()?.partial_cmp(&b.to_number()?)
        }
        _ => None,
    }
}

fn compare(a: &Value, op: CompareOp, b: &Value) -> bool {
    match op {
        CompareOp::Eq => loose_eq(a, b),
        CompareOp::Ne => !loose_eq(a, b),
        CompareOp::Gt => ordering(a, b) == Some(Ordering::Greater),
        CompareOp::Lt => ordering(a, b) == Some(Ordering::Less),
        CompareOp::Ge => matches!(ordering(a, b), Some(Ordering::Greater | Ordering::Equal)),
        CompareOp::Le => matches!(ordering(a, b), Some(Ordering::Less | Ordering::Equal)),
    }
}

/// Evaluates predicate expressions against any serializable record by
/// viewing each record as a YAML value.
///
/// An empty expression matches every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordEvaluator;

impl<R: Serialize + Clone> Evaluator<R> for RecordEvaluator {
    type Error = EvalError;

    fn evaluate(&self, expression: &str, dataset: &[R]) -> Result<Vec<R>> {
        if expression.trim().is_empty() {
            return Ok(dataset.to_vec());
        }

        let expr = parse(expression)?;
        let mut matched = Vec::new();
        for record in dataset {
            let value =
                serde_yaml::to_value(record).map_err(|e| EvalError::Record(e.to_string()))?;
            if evaluate(&expr, &value)? {
                matched.push(record.clone());
            }
        }

        debug!(total = dataset.len(), matched = matched.len(), "evaluated predicate");
        Ok(matched)
    }
}
