use crate::{
    ast::{FilterExpr, Keyword, Literal, OrderKey, Query, Target, Token},
    lexer::{LexError, Lexer},
};
use rust_decimal::prelude::ToPrimitive;

/// Syntax error: what the parser wanted versus what it found, with the
/// character position the lexer had reached.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The lexer failed underneath the parser
    Lex(LexError),
    /// Expected-vs-found mismatch
    Unexpected {
        expected: String,
        found: Token,
        position: usize,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "lexical error: {}", e),
            ParseError::Unexpected {
                expected,
                found,
                position,
            } => {
                write!(
                    f,
                    "expected {}, found {} at position {}",
                    expected, found, position
                )
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn unexpected<T>(&self, expected: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError::Unexpected {
            expected: expected.into(),
            found: self.current_token.clone(),
            position: self.lexer.position(),
        })
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<(), ParseError> {
        if self.current_token == Token::Keyword(kw) {
            self.advance()
        } else {
            self.unexpected(format!("keyword '{}'", kw))
        }
    }

    fn check_keyword(&self, kw: Keyword) -> bool {
        self.current_token == Token::Keyword(kw)
    }

    /// Take the current identifier, or fail with the given expectation.
    fn expect_identifier(&mut self, expected: &str) -> Result<String, ParseError> {
        match std::mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(name) => {
                self.current_token = self.lexer.next_token()?;
                Ok(name)
            }
            other => {
                self.current_token = other;
                self.unexpected(expected)
            }
        }
    }

    /// Take the current number as a non-negative integer (limit/offset).
    fn expect_count(&mut self, clause: &str) -> Result<u64, ParseError> {
        let expected = format!("non-negative integer after '{}'", clause);
        match &self.current_token {
            Token::Number(n) => match n.to_u64().filter(|_| n.fract().is_zero()) {
                Some(value) => {
                    self.advance()?;
                    Ok(value)
                }
                None => self.unexpected(expected),
            },
            _ => self.unexpected(expected),
        }
    }

    /// Parse a complete query and require the input to end.
    pub fn parse(&mut self) -> Result<Query, ParseError> {
        self.expect_keyword(Keyword::Find)?;

        let name = self.expect_identifier("tag name (or '*') after 'find'")?;
        let target = if name == "*" {
            Target::All
        } else {
            Target::Tag(name)
        };

        let filter = if self.check_keyword(Keyword::Where) {
            self.advance()?;
            Some(self.parse_or()?)
        } else {
            None
        };

        let order_by = if self.check_keyword(Keyword::Order) {
            self.advance()?;
            self.expect_keyword(Keyword::By)?;
            self.parse_order_list()?
        } else {
            vec![]
        };

        let limit = if self.check_keyword(Keyword::Limit) {
            self.advance()?;
            Some(self.expect_count("limit")?)
        } else {
            None
        };

        let offset = if self.check_keyword(Keyword::Offset) {
            self.advance()?;
            Some(self.expect_count("offset")?)
        } else {
            None
        };

        let select = if self.check_keyword(Keyword::Select) {
            self.advance()?;
            Some(self.parse_field_list()?)
        } else {
            None
        };

        if self.current_token != Token::Eof {
            return self.unexpected("end of query");
        }

        Ok(Query {
            target,
            filter,
            order_by,
            limit,
            offset,
            select,
        })
    }

    /// Parse a standalone filter expression (the text after `where`) and
    /// require the input to end. Used by the aggregation CLI.
    pub fn parse_filter(&mut self) -> Result<FilterExpr, ParseError> {
        let expr = self.parse_or()?;
        if self.current_token != Token::Eof {
            return self.unexpected("end of filter");
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<FilterExpr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check_keyword(Keyword::Or) {
            self.advance()?;
            let right = self.parse_and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<FilterExpr, ParseError> {
        let mut left = self.parse_unary()?;

        while self.check_keyword(Keyword::And) {
            self.advance()?;
            let right = self.parse_unary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<FilterExpr, ParseError> {
        if self.check_keyword(Keyword::Not) {
            self.advance()?;
            let inner = self.parse_unary()?; // right-associative
            Ok(FilterExpr::Not(Box::new(inner)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<FilterExpr, ParseError> {
        match &self.current_token {
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_or()?;
                if self.current_token != Token::RParen {
                    return self.unexpected("')'");
                }
                self.advance()?;
                Ok(expr)
            }
            Token::Identifier(_) => {
                let field = self.expect_identifier("field name")?;

                match &self.current_token {
                    Token::Keyword(Keyword::Exists) => {
                        self.advance()?;
                        Ok(FilterExpr::Exists { field })
                    }
                    Token::Operator(op) => {
                        let op = *op;
                        self.advance()?;
                        let value = self.parse_value()?;
                        Ok(FilterExpr::Comparison { field, op, value })
                    }
                    _ => self.unexpected(format!("operator or 'exists' after '{}'", field)),
                }
            }
            _ => self.unexpected("'(', 'not', or a field name"),
        }
    }

    fn parse_value(&mut self) -> Result<Literal, ParseError> {
        let value = match std::mem::replace(&mut self.current_token, Token::Eof) {
            Token::String(s) => Literal::String(s),
            Token::Number(n) => Literal::Number(n),
            Token::Identifier(word) => Literal::Word(word),
            other => {
                self.current_token = other;
                return self.unexpected("comparison value");
            }
        };
        self.current_token = self.lexer.next_token()?;
        Ok(value)
    }

    fn parse_order_list(&mut self) -> Result<Vec<OrderKey>, ParseError> {
        let mut keys = vec![self.parse_order_item()?];

        while self.current_token == Token::Comma {
            self.advance()?;
            keys.push(self.parse_order_item()?);
        }
        Ok(keys)
    }

    fn parse_order_item(&mut self) -> Result<OrderKey, ParseError> {
        let name = self.expect_identifier("sort field after 'order by'")?;

        if let Some(field) = name.strip_prefix('-') {
            Ok(OrderKey {
                field: field.to_string(),
                descending: true,
            })
        } else {
            Ok(OrderKey {
                field: name,
                descending: false,
            })
        }
    }

    fn parse_field_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut fields = vec![self.expect_identifier("field name after 'select'")?];

        while self.current_token == Token::Comma {
            self.advance()?;
            fields.push(self.expect_identifier("field name after ','")?);
        }
        Ok(fields)
    }
}

/// Parse a complete query string.
pub fn parse_query(input: &str) -> Result<Query, ParseError> {
    Parser::new(Lexer::new(input))?.parse()
}

/// Parse a bare filter expression string.
pub fn parse_filter(input: &str) -> Result<FilterExpr, ParseError> {
    Parser::new(Lexer::new(input))?.parse_filter()
}
