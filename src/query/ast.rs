#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// `record?.a?.b`; empty for bare `record`.
    Path(Vec<String>),
    Call {
        function: Function,
        args: Vec<Expr>,
    },
    Not(Box<Expr>),
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Lower,
    StartsWith,
    EndsWith,
    Contains,
    Len,
    Date,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lower" => Some(Function::Lower),
            "starts_with" => Some(Function::StartsWith),
            "ends_with" => Some(Function::EndsWith),
            "contains" => Some(Function::Contains),
            "len" => Some(Function::Len),
            "date" => Some(Function::Date),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Lower => "lower",
            Function::StartsWith => "starts_with",
            Function::EndsWith => "ends_with",
            Function::Contains => "contains",
            Function::Len => "len",
            Function::Date => "date",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Function::Lower | Function::Len | Function::Date => 1,
            Function::StartsWith | Function::EndsWith | Function::Contains => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl Date {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Parses the `YYYY-MM-DD` part of a date or timestamp, ignoring anything
    /// from the first `T` on.
    pub fn parse_prefix(s: &str) -> Option<Self> {
        let day_part = s.split('T').next()?.trim();
        let parts: Vec<&str> = day_part.split('-').collect();
        if parts.len() != 3 {
            return None;
        }

        let year: i32 = parts[0].parse().ok()?;
        let month: u8 = parts[1].parse().ok()?;
        let day: u8 = parts[2].parse().ok()?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }

        Some(Date::new(year, month, day))
    }
}
