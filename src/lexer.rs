use crate::ast::{CompareOp, Keyword, Token};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Lexical error, reported with the offending character position.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// A quoted string with no closing quote
    UnterminatedString { position: usize },
    /// A character no rule consumes
    UnexpectedChar { ch: char, position: usize },
    /// A numeric literal Decimal refuses (overflow, repeated dots)
    InvalidNumber { text: String, position: usize },
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnterminatedString { position } => {
                write!(f, "unterminated string starting at position {}", position)
            }
            LexError::UnexpectedChar { ch, position } => {
                write!(f, "unexpected character '{}' at position {}", ch, position)
            }
            LexError::InvalidNumber { text, position } => {
                write!(f, "invalid number '{}' at position {}", text, position)
            }
        }
    }
}

impl std::error::Error for LexError {}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    /// Set after emitting an operator token: the next bare word is a
    /// comparison value, read greedily and never keyword-matched.
    after_operator: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            after_operator: false,
        }
    }

    /// Position of the next unconsumed character.
    pub fn position(&self) -> usize {
        self.position
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_ident_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '.'
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if Self::is_ident_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Read a bare comparison value: everything up to whitespace, a paren,
    /// a comma, or the start of another operator.
    fn read_bare_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | ',' | '=' | '!' | '<' | '>' | '~') {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance(); // consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('\\') => result.push('\\'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        // Unknown escapes pass the character through
                        Some(other) => result.push(other),
                        None => return Err(LexError::UnterminatedString { position: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    fn read_number(&mut self, negative: bool) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        if negative {
            number.push('-');
            self.advance(); // consume '-'
        }
        let mut seen_dot = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                seen_dot = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match Decimal::from_str(&number) {
            Ok(value) => Ok(Token::Number(value)),
            Err(_) => Err(LexError::InvalidNumber {
                text: number,
                position: start,
            }),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let value_position = std::mem::take(&mut self.after_operator);

        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('=') => {
                self.advance();
                Token::Operator(CompareOp::Eq)
            }
            Some('~') => {
                self.advance();
                Token::Operator(CompareOp::Contains)
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::Operator(CompareOp::GtEq)
                } else {
                    self.advance();
                    Token::Operator(CompareOp::Gt)
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::Operator(CompareOp::LtEq)
                } else {
                    self.advance();
                    Token::Operator(CompareOp::Lt)
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::Operator(CompareOp::NotEq)
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: '!',
                        position: self.position,
                    });
                }
            }
            Some('"') => Token::String(self.read_string('"')?),
            Some('\'') => Token::String(self.read_string('\'')?),
            // In value position the whole run up to the next delimiter is
            // one token: a NUMBER when it spells a plain number, otherwise
            // a bare-word IDENTIFIER (so 2024-01-01 stays in one piece and
            // keywords are never matched here).
            Some(ch) if value_position => {
                let start = self.position;
                let word = self.read_bare_word();
                if word.is_empty() {
                    return Err(LexError::UnexpectedChar {
                        ch,
                        position: self.position,
                    });
                }
                if is_plain_number(&word) {
                    match Decimal::from_str(&word) {
                        Ok(value) => Token::Number(value),
                        Err(_) => {
                            return Err(LexError::InvalidNumber {
                                text: word,
                                position: start,
                            });
                        }
                    }
                } else {
                    Token::Identifier(word)
                }
            }
            Some('*') => {
                self.advance();
                Token::Identifier("*".to_string())
            }
            Some('-') => {
                // A digit right after the hyphen makes a negative number;
                // anything else makes a sign-prefixed sort field.
                if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number(true)?
                } else if self.peek_char(1).is_some_and(Self::is_ident_char) {
                    self.advance(); // consume '-'
                    let name = self.read_identifier();
                    Token::Identifier(format!("-{}", name))
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: '-',
                        position: self.position,
                    });
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(false)?,
            Some(ch) if Self::is_ident_char(ch) => {
                let ident = self.read_identifier();
                match Keyword::from_word(&ident) {
                    Some(kw) => Token::Keyword(kw),
                    None => Token::Identifier(ident),
                }
            }
            Some(ch) => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    position: self.position,
                });
            }
        };

        if matches!(token, Token::Operator(_)) {
            self.after_operator = true;
        }
        Ok(token)
    }
}

/// Whether a bare word is entirely a numeric literal: optional sign,
/// digits, optional fraction.
fn is_plain_number(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    if digits.is_empty() {
        return false;
    }
    let mut dots = 0;
    for (i, ch) in digits.char_indices() {
        match ch {
            '0'..='9' => {}
            '.' if dots == 0 && i > 0 && i + 1 < digits.len() => dots += 1,
            _ => return false,
        }
    }
    true
}

/// Tokenize a whole query string.
///
/// Empty or whitespace-only input yields an empty sequence. The [`Token::Eof`]
/// sentinel is not included.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = vec![];
    loop {
        match lexer.next_token()? {
            Token::Eof => return Ok(tokens),
            token => tokens.push(token),
        }
    }
}

#[test]
fn test_keywords_any_case() {
    for input in ["find", "FIND", "Find", "fInD"] {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token(), Ok(Token::Keyword(Keyword::Find)));
    }
}

#[test]
fn test_operators_longest_first() {
    let mut lexer = Lexer::new(">= >");
    assert_eq!(lexer.next_token(), Ok(Token::Operator(CompareOp::GtEq)));
    assert_eq!(lexer.next_token(), Ok(Token::Operator(CompareOp::Gt)));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_negative_number_vs_sort_prefix() {
    let mut lexer = Lexer::new("-5 -Priority");
    assert_eq!(
        lexer.next_token(),
        Ok(Token::Number(Decimal::from_str("-5").unwrap()))
    );
    assert_eq!(
        lexer.next_token(),
        Ok(Token::Identifier("-Priority".to_string()))
    );
}
