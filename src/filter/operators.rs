//! Operator catalog: one predicate template and one Gridify symbol per
//! comparison operator.
//!
//! Templates carry two placeholders, `{field}` and `{value}`. Several
//! operators share a Gridify symbol (`IsNull`, `IsEmpty` and `IsUndefined`
//! all become `=`, their negations `!=`, and the date operators reuse the
//! plain ordering symbols). The remote convention has no separate syntax for
//! those checks, so the collapse is expected.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    IsEmpty,
    IsNotEmpty,
    IsNull,
    IsNotNull,
    IsDateGreaterThan,
    IsDateGreaterThanOrEqual,
    IsDateLessThan,
    IsDateLessThanOrEqual,
    IsDateEqualTo,
    IsDateNotEqualTo,
    IsUndefined,
    IsNotUndefined,
}

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 24] = [
        ComparisonOp::Equals,
        ComparisonOp::NotEquals,
        ComparisonOp::LessThan,
        ComparisonOp::GreaterThan,
        ComparisonOp::GreaterThanOrEqual,
        ComparisonOp::LessThanOrEqual,
        ComparisonOp::Contains,
        ComparisonOp::NotContains,
        ComparisonOp::StartsWith,
        ComparisonOp::NotStartsWith,
        ComparisonOp::EndsWith,
        ComparisonOp::NotEndsWith,
        ComparisonOp::IsEmpty,
        ComparisonOp::IsNotEmpty,
        ComparisonOp::IsNull,
        ComparisonOp::IsNotNull,
        ComparisonOp::IsDateGreaterThan,
        ComparisonOp::IsDateGreaterThanOrEqual,
        ComparisonOp::IsDateLessThan,
        ComparisonOp::IsDateLessThanOrEqual,
        ComparisonOp::IsDateEqualTo,
        ComparisonOp::IsDateNotEqualTo,
        ComparisonOp::IsUndefined,
        ComparisonOp::IsNotUndefined,
    ];

    /// Predicate expression template, evaluated against one record.
    pub fn template(self) -> &'static str {
        match self {
            ComparisonOp::Equals => "record?.{field} == {value}",
            ComparisonOp::NotEquals => "record?.{field} != {value}",
            ComparisonOp::GreaterThan => "record?.{field} > {value}",
            ComparisonOp::GreaterThanOrEqual => "record?.{field} >= {value}",
            ComparisonOp::LessThan => "record?.{field} < {value}",
            ComparisonOp::LessThanOrEqual => "record?.{field} <= {value}",
            ComparisonOp::StartsWith => "starts_with(lower(record?.{field}), lower({value}))",
            ComparisonOp::NotStartsWith => "!starts_with(lower(record?.{field}), lower({value}))",
            ComparisonOp::EndsWith => "ends_with(lower(record?.{field}), lower({value}))",
            ComparisonOp::NotEndsWith => "!ends_with(lower(record?.{field}), lower({value}))",
            ComparisonOp::Contains => "contains(lower(record?.{field}), lower({value}))",
            ComparisonOp::NotContains => "!contains(lower(record?.{field}), lower({value}))",
            ComparisonOp::IsEmpty => "len(record?.{field}) == 0",
            ComparisonOp::IsNotEmpty => "len(record?.{field}) != 0",
            ComparisonOp::IsNull => "record?.{field} == null",
            ComparisonOp::IsNotNull => "record?.{field} != null",
            ComparisonOp::IsUndefined => "record?.{field} == undefined",
            ComparisonOp::IsNotUndefined => "record?.{field} != undefined",
            ComparisonOp::IsDateGreaterThan => "date(record?.{field}) > date({value})",
            ComparisonOp::IsDateGreaterThanOrEqual => "date(record?.{field}) >= date({value})",
            ComparisonOp::IsDateLessThan => "date(record?.{field}) < date({value})",
            ComparisonOp::IsDateLessThanOrEqual => "date(record?.{field}) <= date({value})",
            ComparisonOp::IsDateEqualTo => "date(record?.{field}) == date({value})",
            ComparisonOp::IsDateNotEqualTo => "date(record?.{field}) != date({value})",
        }
    }

    /// Gridify comparison symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equals => "=",
            ComparisonOp::NotEquals => "!=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterThanOrEqual => ">=",
            ComparisonOp::LessThanOrEqual => "<=",
            ComparisonOp::Contains => "=*",
            ComparisonOp::NotContains => "!*",
            ComparisonOp::StartsWith => "^",
            ComparisonOp::NotStartsWith => "!^",
            ComparisonOp::EndsWith => "$",
            ComparisonOp::NotEndsWith => "!$",
            ComparisonOp::IsDateEqualTo => "=",
            ComparisonOp::IsDateGreaterThan => ">",
            ComparisonOp::IsDateGreaterThanOrEqual => ">=",
            ComparisonOp::IsDateLessThan => "<",
            ComparisonOp::IsDateLessThanOrEqual => "<=",
            ComparisonOp::IsDateNotEqualTo => "!=",
            ComparisonOp::IsEmpty => "=",
            ComparisonOp::IsNotEmpty => "!=",
            ComparisonOp::IsNull => "=",
            ComparisonOp::IsNotNull => "!=",
            ComparisonOp::IsUndefined => "=",
            ComparisonOp::IsNotUndefined => "!=",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_covers_every_operator_once() {
        let unique: HashSet<ComparisonOp> = ComparisonOp::ALL.iter().copied().collect();
        assert_eq!(unique.len(), 24);

        for op in ComparisonOp::ALL {
            assert!(op.template().contains("{field}"), "{:?}", op);
            assert!(!op.symbol().is_empty(), "{:?}", op);
        }
    }

    #[test]
    fn test_value_placeholder_only_where_needed() {
        let valueless = [
            ComparisonOp::IsEmpty,
            ComparisonOp::IsNotEmpty,
            ComparisonOp::IsNull,
            ComparisonOp::IsNotNull,
            ComparisonOp::IsUndefined,
            ComparisonOp::IsNotUndefined,
        ];
        for op in ComparisonOp::ALL {
            assert_eq!(
                op.template().contains("{value}"),
                !valueless.contains(&op),
                "{:?}",
                op
            );
        }
    }

    #[test]
    fn test_collapsed_symbols() {
        assert_eq!(ComparisonOp::IsNull.symbol(), ComparisonOp::Equals.symbol());
        assert_eq!(ComparisonOp::IsEmpty.symbol(), "=");
        assert_eq!(ComparisonOp::IsNotUndefined.symbol(), "!=");
        assert_eq!(ComparisonOp::IsDateLessThan.symbol(), ComparisonOp::LessThan.symbol());
    }

    #[test]
    fn test_serialized_names() {
        let op: ComparisonOp = serde_yaml::from_str("IsDateGreaterThanOrEqual").unwrap();
        assert_eq!(op, ComparisonOp::IsDateGreaterThanOrEqual);
    }
}
