use crate::ast::operators::CompareOp;
use rust_decimal::Decimal;

/// Reserved word of the query language.
///
/// Keywords are matched case-insensitively by the lexer and always win over
/// identifier matching: `FIND`, `Find`, and `find` all lex to
/// [`Keyword::Find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// Starts a query and names the target tag
    Find,
    /// Introduces the filter expression
    Where,
    /// First half of `order by`
    Order,
    /// Second half of `order by`
    By,
    /// Caps the number of result rows
    Limit,
    /// Skips leading result rows
    Offset,
    /// Logical conjunction inside filters
    And,
    /// Logical disjunction inside filters
    Or,
    /// Logical negation inside filters
    Not,
    /// Postfix existence check (`Email exists`)
    Exists,
    /// Projects a subset of fields
    Select,
}

impl Keyword {
    /// Match a word against the keyword table, ignoring case.
    pub fn from_word(word: &str) -> Option<Keyword> {
        match word.to_ascii_lowercase().as_str() {
            "find" => Some(Keyword::Find),
            "where" => Some(Keyword::Where),
            "order" => Some(Keyword::Order),
            "by" => Some(Keyword::By),
            "limit" => Some(Keyword::Limit),
            "offset" => Some(Keyword::Offset),
            "and" => Some(Keyword::And),
            "or" => Some(Keyword::Or),
            "not" => Some(Keyword::Not),
            "exists" => Some(Keyword::Exists),
            "select" => Some(Keyword::Select),
            _ => None,
        }
    }

    /// Canonical lowercase spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Find => "find",
            Keyword::Where => "where",
            Keyword::Order => "order",
            Keyword::By => "by",
            Keyword::Limit => "limit",
            Keyword::Offset => "offset",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::Exists => "exists",
            Keyword::Select => "select",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexical token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Reserved word, canonicalized to lowercase
    ///
    /// # Examples
    /// ```text
    /// find
    /// WHERE
    /// Order
    /// ```
    Keyword(Keyword),

    /// Comparison operator
    ///
    /// Matched longest-first (`>=` before `>`).
    ///
    /// # Examples
    /// ```text
    /// =  !=  >  >=  <  <=  ~
    /// ```
    Operator(CompareOp),

    /// Field path, tag name, bare comparison value, the wildcard `*`, or a
    /// sign-prefixed sort field
    ///
    /// # Examples
    /// ```text
    /// task
    /// Due_Date
    /// -Priority
    /// *
    /// ```
    Identifier(String),

    /// Quoted string literal, single or double quoted, escape-aware
    ///
    /// Holds the unescaped content.
    ///
    /// # Examples
    /// ```text
    /// "In Progress"
    /// 'it\'s done'
    /// ```
    String(String),

    /// Numeric literal: integer, decimal, or negative
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 9.99
    /// -3
    /// ```
    Number(Decimal),

    /// Left parenthesis for grouping
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma separating order keys and selected fields
    Comma,

    /// End of input
    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Keyword(kw) => write!(f, "keyword '{}'", kw),
            Token::Operator(op) => write!(f, "operator '{}'", op.symbol()),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::String(s) => write!(f, "string \"{}\"", s),
            Token::Number(n) => write!(f, "number {}", n),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}
