/*
 * lexer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tokenizer for `${...}` expression spans.
//!
//! The lexer starts right after a `${` marker and stops at the first `}`
//! that is not inside a string literal. The expression grammar has no braces
//! of its own, so that brace always closes the span.

use crate::error::{TemplateError, TemplateResult};

/// Lexer token produced from an expression span.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'a> {
    Ident(&'a str),
    Number(f64),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Question,
    Colon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    /// End of the expression span (the closing `}`).
    End,
}

impl Token<'_> {
    /// Human-readable rendering for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier `{name}`"),
            Token::Number(n) => format!("number `{n}`"),
            Token::Str(s) => format!("string {s:?}"),
            Token::End => "`}`".to_string(),
            other => format!("`{}`", other.punctuation()),
        }
    }

    fn punctuation(&self) -> &'static str {
        match self {
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Question => "?",
            Token::Colon => ":",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Bang => "!",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::Ident(_) | Token::Number(_) | Token::Str(_) | Token::End => "",
        }
    }
}

/// Token paired with its byte offset in the template source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpannedToken<'a> {
    pub token: Token<'a>,
    pub position: usize,
}

/// Tokens of one expression span plus the offset just past its closing `}`.
pub(crate) struct LexedSpan<'a> {
    pub tokens: Vec<SpannedToken<'a>>,
    pub end: usize,
}

/// Lexer over a template source, positioned inside an expression span.
pub(crate) struct Lexer<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer that starts at `offset` (just after `${`).
    pub(crate) fn new(input: &'a str, offset: usize) -> Self {
        Self { input, offset }
    }

    /// Tokenize until the closing `}`.
    pub(crate) fn lex_span(mut self) -> TemplateResult<LexedSpan<'a>> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        loop {
            let Some(&ch) = bytes.get(self.offset) else {
                return Err(TemplateError::syntax(
                    "unterminated expression, expected `}`",
                    self.offset,
                ));
            };
            let start = self.offset;
            match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.offset += 1;
                }
                b'}' => {
                    tokens.push(SpannedToken {
                        token: Token::End,
                        position: start,
                    });
                    return Ok(LexedSpan {
                        tokens,
                        end: start + 1,
                    });
                }
                b'(' => tokens.push(self.single(Token::LParen)),
                b')' => tokens.push(self.single(Token::RParen)),
                b'[' => tokens.push(self.single(Token::LBracket)),
                b']' => tokens.push(self.single(Token::RBracket)),
                b',' => tokens.push(self.single(Token::Comma)),
                b'.' => tokens.push(self.single(Token::Dot)),
                b'?' => tokens.push(self.single(Token::Question)),
                b':' => tokens.push(self.single(Token::Colon)),
                b'+' => tokens.push(self.single(Token::Plus)),
                b'-' => tokens.push(self.single(Token::Minus)),
                b'*' => tokens.push(self.single(Token::Star)),
                b'/' => tokens.push(self.single(Token::Slash)),
                b'%' => tokens.push(self.single(Token::Percent)),
                b'!' => {
                    // `!=` and `!==` are the same operator here
                    if self.peek(1) == Some(b'=') {
                        let len = if self.peek(2) == Some(b'=') { 3 } else { 2 };
                        tokens.push(self.multi(Token::NotEq, len));
                    } else {
                        tokens.push(self.single(Token::Bang));
                    }
                }
                b'=' => {
                    if self.peek(1) == Some(b'=') {
                        let len = if self.peek(2) == Some(b'=') { 3 } else { 2 };
                        tokens.push(self.multi(Token::EqEq, len));
                    } else {
                        return Err(TemplateError::syntax(
                            "assignment is not allowed in expressions",
                            start,
                        ));
                    }
                }
                b'<' => {
                    if self.peek(1) == Some(b'=') {
                        tokens.push(self.multi(Token::Le, 2));
                    } else {
                        tokens.push(self.single(Token::Lt));
                    }
                }
                b'>' => {
                    if self.peek(1) == Some(b'=') {
                        tokens.push(self.multi(Token::Ge, 2));
                    } else {
                        tokens.push(self.single(Token::Gt));
                    }
                }
                b'&' => {
                    if self.peek(1) == Some(b'&') {
                        tokens.push(self.multi(Token::AndAnd, 2));
                    } else {
                        return Err(TemplateError::syntax("expected `&&`", start));
                    }
                }
                b'|' => {
                    if self.peek(1) == Some(b'|') {
                        tokens.push(self.multi(Token::OrOr, 2));
                    } else {
                        return Err(TemplateError::syntax("expected `||`", start));
                    }
                }
                b'"' | b'\'' => {
                    let value = self.string(ch)?;
                    tokens.push(SpannedToken {
                        token: Token::Str(value),
                        position: start,
                    });
                }
                b'0'..=b'9' => {
                    let value = self.number()?;
                    tokens.push(SpannedToken {
                        token: Token::Number(value),
                        position: start,
                    });
                }
                b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => {
                    self.consume_while(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$');
                    tokens.push(SpannedToken {
                        token: Token::Ident(&self.input[start..self.offset]),
                        position: start,
                    });
                }
                _ => {
                    let found = self.input[start..].chars().next().unwrap_or_default();
                    return Err(TemplateError::syntax(
                        format!("unexpected character `{found}`"),
                        start,
                    ));
                }
            }
        }
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.input.as_bytes().get(self.offset + ahead).copied()
    }

    fn single(&mut self, token: Token<'a>) -> SpannedToken<'a> {
        self.multi(token, 1)
    }

    fn multi(&mut self, token: Token<'a>, len: usize) -> SpannedToken<'a> {
        let position = self.offset;
        self.offset += len;
        SpannedToken { token, position }
    }

    fn consume_while(&mut self, predicate: impl Fn(u8) -> bool) {
        let bytes = self.input.as_bytes();
        while self.offset < bytes.len() && predicate(bytes[self.offset]) {
            self.offset += 1;
        }
    }

    fn number(&mut self) -> TemplateResult<f64> {
        let start = self.offset;
        self.consume_while(|b| b.is_ascii_digit());
        if self.peek(0) == Some(b'.') && self.peek(1).is_some_and(|b| b.is_ascii_digit()) {
            self.offset += 1;
            self.consume_while(|b| b.is_ascii_digit());
        }
        let raw = &self.input[start..self.offset];
        raw.parse()
            .map_err(|_| TemplateError::syntax(format!("invalid number `{raw}`"), start))
    }

    fn string(&mut self, quote: u8) -> TemplateResult<String> {
        let start = self.offset;
        // Skip the opening quote
        self.offset += 1;
        let mut value = String::new();
        let mut chars = self.input[self.offset..].char_indices();

        while let Some((idx, ch)) = chars.next() {
            match ch {
                c if c as u32 == u32::from(quote) => {
                    self.offset += idx + 1;
                    return Ok(value);
                }
                '\\' => {
                    let Some((_, escaped)) = chars.next() else {
                        break;
                    };
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    });
                }
                other => value.push(other),
            }
        }

        Err(TemplateError::syntax("unterminated string literal", start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(expr: &str) -> Vec<Token<'_>> {
        Lexer::new(expr, 0)
            .lex_span()
            .expect("span should lex")
            .tokens
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_call_with_array() {
        assert_eq!(
            tokens(r#"pluralize(n, ["a", 'b'])}"#),
            vec![
                Token::Ident("pluralize"),
                Token::LParen,
                Token::Ident("n"),
                Token::Comma,
                Token::LBracket,
                Token::Str("a".to_string()),
                Token::Comma,
                Token::Str("b".to_string()),
                Token::RBracket,
                Token::RParen,
                Token::End,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokens("a === b !== c <= d && e || !f}"),
            vec![
                Token::Ident("a"),
                Token::EqEq,
                Token::Ident("b"),
                Token::NotEq,
                Token::Ident("c"),
                Token::Le,
                Token::Ident("d"),
                Token::AndAnd,
                Token::Ident("e"),
                Token::OrOr,
                Token::Bang,
                Token::Ident("f"),
                Token::End,
            ]
        );
    }

    #[test]
    fn test_brace_inside_string_does_not_close() {
        let span = Lexer::new("'}' } tail", 0).lex_span().unwrap();
        assert_eq!(span.tokens[0].token, Token::Str("}".to_string()));
        assert_eq!(span.end, 5);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("1.5 + 20}"),
            vec![Token::Number(1.5), Token::Plus, Token::Number(20.0), Token::End]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens(r#""a\"b\n"}"#),
            vec![Token::Str("a\"b\n".to_string()), Token::End]
        );
    }

    #[test]
    fn test_unterminated_span() {
        let err = Lexer::new("name", 0).lex_span().err().unwrap();
        assert!(matches!(err, TemplateError::Syntax { position: 4, .. }));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("'abc}", 0).lex_span().err().unwrap();
        assert!(matches!(err, TemplateError::Syntax { position: 0, .. }));
    }

    #[test]
    fn test_assignment_rejected() {
        let err = Lexer::new("a = 1}", 0).lex_span().err().unwrap();
        assert_eq!(err.message(), "assignment is not allowed in expressions");
    }
}
