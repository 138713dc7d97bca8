use super::ast::{CompareOp, Expr, Function, Literal};
use super::error::{EvalError, Result};

/// Nesting limit for parentheses, negations and call arguments.
const MAX_DEPTH: usize = 256;

pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Expr> {
        let expr = self.parse_or()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error("Unexpected input after expression"));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if !self.match_str("||") {
                break;
            }
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_compare()?;
        loop {
            self.skip_whitespace();
            if !self.match_str("&&") {
                break;
            }
            let right = self.parse_compare()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_compare(&mut self) -> Result<Expr> {
        let left = self.parse_unary()?;
        self.skip_whitespace();
        let Some(op) = self.parse_operator() else {
            return Ok(left);
        };
        let right = self.parse_unary()?;
        Ok(Expr::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("Expression nested too deeply"));
        }
        self.depth += 1;
        let expr = self.parse_unary_inner();
        self.depth -= 1;
        expr
    }

    fn parse_unary_inner(&mut self) -> Result<Expr> {
        self.skip_whitespace();
        if self.match_char('!') {
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        self.skip_whitespace();

        if self.match_char('(') {
            let expr = self.parse_or()?;
            self.skip_whitespace();
            if !self.match_char(')') {
                return Err(self.error("Expected ')'"));
            }
            return Ok(expr);
        }

        let c = self.current_char();
        if c == '\'' || c == '"' {
            self.pos += 1;
            return self.parse_string(c);
        }
        if c.is_ascii_digit() || (c == '-' && self.peek_char(1).is_some_and(|n| n.is_ascii_digit())) {
            return self.parse_number();
        }

        let start = self.pos;
        let name = self.parse_identifier()?;
        match name.as_str() {
            "true" => Ok(Expr::Literal(Literal::Bool(true))),
            "false" => Ok(Expr::Literal(Literal::Bool(false))),
            "null" => Ok(Expr::Literal(Literal::Null)),
            "undefined" => Ok(Expr::Literal(Literal::Undefined)),
            "record" => self.parse_path(),
            _ => {
                let function = Function::from_name(&name).ok_or_else(|| {
                    self.pos = start;
                    EvalError::UnknownFunction(name.clone())
                })?;
                self.parse_call(function)
            }
        }
    }

    fn parse_path(&mut self) -> Result<Expr> {
        let mut segments = Vec::new();
        loop {
            if !(self.match_str("?.") || self.match_char('.')) {
                break;
            }
            segments.push(self.parse_segment()?);
        }
        Ok(Expr::Path(segments))
    }

    fn parse_call(&mut self, function: Function) -> Result<Expr> {
        self.skip_whitespace();
        if !self.match_char('(') {
            return Err(self.error("Expected '(' after function name"));
        }

        let mut args = Vec::new();
        self.skip_whitespace();
        if !self.match_char(')') {
            loop {
                args.push(self.parse_or()?);
                self.skip_whitespace();
                if self.match_char(',') {
                    continue;
                }
                if self.match_char(')') {
                    break;
                }
                return Err(self.error("Expected ',' or ')'"));
            }
        }

        if args.len() != function.arity() {
            return Err(EvalError::Arity {
                function: function.name(),
                expected: function.arity(),
                actual: args.len(),
            });
        }

        Ok(Expr::Call { function, args })
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.pos;
        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '_' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(self.error("Expected expression"));
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_segment(&mut self) -> Result<String> {
        let start = self.pos;
        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(self.error("Expected field name"));
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_operator(&mut self) -> Option<CompareOp> {
        if self.match_str("===") || self.match_str("==") {
            return Some(CompareOp::Eq);
        }
        if self.match_str("!==") || self.match_str("!=") {
            return Some(CompareOp::Ne);
        }
        if self.match_str(">=") {
            return Some(CompareOp::Ge);
        }
        if self.match_str("<=") {
            return Some(CompareOp::Le);
        }
        if self.match_char('>') {
            return Some(CompareOp::Gt);
        }
        if self.match_char('<') {
            return Some(CompareOp::Lt);
        }
        None
    }

    fn parse_string(&mut self, quote: char) -> Result<Expr> {
        let mut s = String::new();
        loop {
            if self.pos >= self.input.len() {
                return Err(self.error("Unterminated string"));
            }
            let c = self.current_char();
            self.pos += c.len_utf8();
            if c == quote {
                break;
            }
            if c == '\\' {
                if self.pos >= self.input.len() {
                    return Err(self.error("Unterminated string"));
                }
                let escaped = self.current_char();
                self.pos += escaped.len_utf8();
                s.push(escaped);
            } else {
                s.push(c);
            }
        }
        Ok(Expr::Literal(Literal::String(s)))
    }

    fn parse_number(&mut self) -> Result<Expr> {
        let start = self.pos;
        self.match_char('-');

        while self.pos < self.input.len() {
            let c = self.current_char();
            if c.is_ascii_digit() || c == '.' {
                self.pos += 1;
            } else {
                break;
            }
        }

        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .map(|n| Expr::Literal(Literal::Number(n)))
            .map_err(|_| EvalError::Parse {
                message: format!("Invalid number '{}'", text),
                pos: start,
            })
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.current_char().is_whitespace() {
            self.pos += self.current_char().len_utf8();
        }
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn match_char(&mut self, c: char) -> bool {
        if self.pos < self.input.len() && self.current_char() == c {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn match_str(&mut self, s: &str) -> bool {
        if self.input[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> EvalError {
        EvalError::Parse {
            message: message.to_string(),
            pos: self.pos,
        }
    }
}

pub fn parse(input: &str) -> Result<Expr> {
    Parser::new(input).parse()
}
