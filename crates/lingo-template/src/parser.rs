/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template compilation.
//!
//! This module splits a template source into literal text and `${...}`
//! expression spans and parses each span into an [`Expr`] tree with a
//! recursive-descent parser. Sources without any `${` marker compile to a
//! constant template that never enters the evaluator.

use crate::ast::{BinaryOp, Constant, Expr, Segment, UnaryOp};
use crate::error::{TemplateError, TemplateResult};
use crate::lexer::{Lexer, SpannedToken, Token};

/// Marker that opens an expression span.
pub const EXPRESSION_MARKER: &str = "${";

/// Escape character. Before a marker, `\${` is a literal `${` and `\\`
/// is a literal backslash; elsewhere backslashes are kept as written.
const ESCAPE: char = '\\';

/// Maximum template source size in bytes.
const MAX_TEMPLATE_BYTES: usize = 1024 * 1024;

/// Maximum nesting depth of a single expression.
const MAX_EXPRESSION_DEPTH: usize = 64;

/// A compiled template ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub(crate) body: TemplateBody,

    /// Original source (for diagnostics and key listings).
    pub(crate) source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TemplateBody {
    /// No expression marker: the text is returned verbatim.
    Constant,
    /// Literal text interleaved with expressions.
    Interpolated(Vec<Segment>),
}

impl Template {
    /// Compile a template from a source string.
    pub fn compile(source: &str) -> TemplateResult<Self> {
        if source.len() > MAX_TEMPLATE_BYTES {
            return Err(TemplateError::syntax(
                format!(
                    "template exceeds size limit: {} bytes (max {MAX_TEMPLATE_BYTES})",
                    source.len()
                ),
                0,
            ));
        }

        let body = if source.contains(EXPRESSION_MARKER) {
            TemplateBody::Interpolated(split_segments(source)?)
        } else {
            TemplateBody::Constant
        };

        Ok(Self {
            body,
            source: source.to_string(),
        })
    }

    /// The original template source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether this template is plain text with no expressions.
    pub fn is_constant(&self) -> bool {
        matches!(self.body, TemplateBody::Constant)
    }

    /// The compiled segments. Constant templates report a single literal.
    pub fn segments(&self) -> Vec<Segment> {
        match &self.body {
            TemplateBody::Constant => vec![Segment::Literal(self.source.clone())],
            TemplateBody::Interpolated(segments) => segments.clone(),
        }
    }
}

/// Split a source into literal and expression segments.
fn split_segments(source: &str) -> TemplateResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut offset = 0;

    while offset < source.len() {
        let rest = &source[offset..];
        if rest.starts_with(ESCAPE) {
            let run = rest.len() - rest.trim_start_matches(ESCAPE).len();
            if rest[run..].starts_with(EXPRESSION_MARKER) {
                literal.extend(std::iter::repeat_n(ESCAPE, run / 2));
                if run % 2 == 1 {
                    literal.push_str(EXPRESSION_MARKER);
                    offset += run + EXPRESSION_MARKER.len();
                } else {
                    offset += run;
                }
            } else {
                literal.push_str(&rest[..run]);
                offset += run;
            }
        } else if rest.starts_with(EXPRESSION_MARKER) {
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let span = Lexer::new(source, offset + EXPRESSION_MARKER.len()).lex_span()?;
            let expr = ExprParser::new(span.tokens).parse()?;
            segments.push(Segment::Expression(expr));
            offset = span.end;
        } else {
            let ch = rest.chars().next().unwrap_or_default();
            literal.push(ch);
            offset += ch.len_utf8();
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Recursive-descent parser over the tokens of one expression span.
///
/// Precedence, lowest first: `?:`, `||`, `&&`, equality, ordering,
/// additive, multiplicative, unary, postfix (call, member, index).
struct ExprParser<'a> {
    tokens: Vec<SpannedToken<'a>>,
    index: usize,
    depth: usize,
}

impl<'a> ExprParser<'a> {
    fn new(tokens: Vec<SpannedToken<'a>>) -> Self {
        Self {
            tokens,
            index: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> TemplateResult<Expr> {
        if self.peek() == &Token::End {
            return Err(TemplateError::syntax("empty expression", self.position()));
        }
        let expr = self.conditional()?;
        if self.peek() != &Token::End {
            return Err(self.unexpected("end of expression"));
        }
        Ok(expr)
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token<'a> {
        // The lexer always terminates the stream with `End`.
        &self.tokens[self.index.min(self.tokens.len() - 1)].token
    }

    fn position(&self) -> usize {
        self.tokens[self.index.min(self.tokens.len() - 1)].position
    }

    fn advance(&mut self) -> SpannedToken<'a> {
        let token = self.tokens[self.index.min(self.tokens.len() - 1)].clone();
        if token.token != Token::End {
            self.index += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token<'_>) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token<'_>, what: &str) -> TemplateResult<()> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> TemplateError {
        TemplateError::syntax(
            format!(
                "unexpected {}, expected {expected}",
                self.peek().describe()
            ),
            self.position(),
        )
    }

    fn enter(&mut self) -> TemplateResult<()> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(TemplateError::syntax(
                format!("expression nesting exceeds limit of {MAX_EXPRESSION_DEPTH}"),
                self.position(),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // ------------------------------------------------------------------
    // Grammar
    // ------------------------------------------------------------------

    fn conditional(&mut self) -> TemplateResult<Expr> {
        self.enter()?;
        let test = self.logical_or()?;
        let expr = if self.eat(&Token::Question) {
            let consequent = self.conditional()?;
            self.expect(Token::Colon, "`:`")?;
            let alternate = self.conditional()?;
            Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            }
        } else {
            test
        };
        self.leave();
        Ok(expr)
    }

    fn logical_or(&mut self) -> TemplateResult<Expr> {
        let mut left = self.logical_and()?;
        while self.eat(&Token::OrOr) {
            let right = self.logical_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> TemplateResult<Expr> {
        let mut left = self.equality()?;
        while self.eat(&Token::AndAnd) {
            let right = self.equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn equality(&mut self) -> TemplateResult<Expr> {
        let mut left = self.ordering()?;
        loop {
            let op = match self.peek() {
                Token::EqEq => BinaryOp::Equal,
                Token::NotEq => BinaryOp::NotEqual,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.ordering()?;
            left = binary(op, left, right);
        }
    }

    fn ordering(&mut self) -> TemplateResult<Expr> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Token::Lt => BinaryOp::Less,
                Token::Le => BinaryOp::LessEqual,
                Token::Gt => BinaryOp::Greater,
                Token::Ge => BinaryOp::GreaterEqual,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.additive()?;
            left = binary(op, left, right);
        }
    }

    fn additive(&mut self) -> TemplateResult<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn multiplicative(&mut self) -> TemplateResult<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                Token::Percent => BinaryOp::Remainder,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.unary()?;
            left = binary(op, left, right);
        }
    }

    fn unary(&mut self) -> TemplateResult<Expr> {
        let op = match self.peek() {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Negate,
            _ => return self.postfix(),
        };
        self.advance();
        self.enter()?;
        let operand = self.unary()?;
        self.leave();
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> TemplateResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            let position = self.position();
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let SpannedToken { token, position } = self.advance();
                    let Token::Ident(name) = token else {
                        return Err(TemplateError::syntax(
                            format!("unexpected {}, expected property name", token.describe()),
                            position,
                        ));
                    };
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: name.to_string(),
                        position,
                    };
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.conditional()?;
                    self.expect(Token::RBracket, "`]`")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        position,
                    };
                }
                Token::LParen => {
                    self.advance();
                    let args = self.list(Token::RParen, "`,` or `)`")?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        position,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> TemplateResult<Expr> {
        let position = self.position();
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Constant(Constant::Number(n)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Constant(Constant::String(s)))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(match name {
                    "true" => Expr::Constant(Constant::Bool(true)),
                    "false" => Expr::Constant(Constant::Bool(false)),
                    "null" | "undefined" => Expr::Constant(Constant::Null),
                    _ => Expr::Identifier {
                        name: name.to_string(),
                        position,
                    },
                })
            }
            Token::LParen => {
                self.advance();
                let inner = self.conditional()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(inner)
            }
            Token::LBracket => {
                self.advance();
                Ok(Expr::Array(self.list(Token::RBracket, "`,` or `]`")?))
            }
            _ => Err(self.unexpected("a value")),
        }
    }

    /// Comma-separated expressions up to (and consuming) `close`.
    /// A trailing comma is accepted.
    fn list(&mut self, close: Token<'_>, what: &str) -> TemplateResult<Vec<Expr>> {
        let mut items = Vec::new();
        loop {
            if self.eat(&close) {
                return Ok(items);
            }
            items.push(self.conditional()?);
            if !self.eat(&Token::Comma) {
                self.expect(close, what)?;
                return Ok(items);
            }
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(name: &str, position: usize) -> Expr {
        Expr::Identifier {
            name: name.to_string(),
            position,
        }
    }

    fn parse_expr(expr: &str) -> Expr {
        let source = format!("${{{expr}}}");
        let template = Template::compile(&source).expect("template should parse");
        match template.segments().as_slice() {
            [Segment::Expression(e)] => e.clone(),
            other => panic!("expected a single expression, got {other:?}"),
        }
    }

    #[test]
    fn test_constant_template() {
        let template = Template::compile("Hello, world!").unwrap();
        assert!(template.is_constant());
        assert_eq!(
            template.segments(),
            vec![Segment::Literal("Hello, world!".to_string())]
        );
    }

    #[test]
    fn test_dollar_without_brace_is_constant() {
        let template = Template::compile("Price: $5 {x}").unwrap();
        assert!(template.is_constant());
    }

    #[test]
    fn test_segments() {
        let template = Template::compile("Hello, ${name}!").unwrap();
        assert!(!template.is_constant());
        assert_eq!(
            template.segments(),
            vec![
                Segment::Literal("Hello, ".to_string()),
                Segment::Expression(ident("name", 9)),
                Segment::Literal("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_escaped_marker() {
        let template = Template::compile(r"cost \${x} and ${y}").unwrap();
        assert_eq!(
            template.segments(),
            vec![
                Segment::Literal("cost ${x} and ".to_string()),
                Segment::Expression(ident("y", 17)),
            ]
        );
    }

    #[test]
    fn test_escaped_backslash_before_marker() {
        let template = Template::compile(r"C:\\${dir} and \\\${x}").unwrap();
        assert_eq!(
            template.segments(),
            vec![
                Segment::Literal("C:\\".to_string()),
                Segment::Expression(ident("dir", 6)),
                Segment::Literal(" and \\${x}".to_string()),
            ]
        );
    }

    #[test]
    fn test_delimiters_in_literal_text_round_trip() {
        let template = Template::compile("`tick` \"q\" 'a' \\n ${x}").unwrap();
        assert_eq!(
            template.segments()[0],
            Segment::Literal("`tick` \"q\" 'a' \\n ".to_string())
        );
    }

    #[test]
    fn test_precedence() {
        // a + b * c
        assert_eq!(
            parse_expr("a + b * c"),
            binary(
                BinaryOp::Add,
                ident("a", 2),
                binary(BinaryOp::Multiply, ident("b", 6), ident("c", 10)),
            )
        );
    }

    #[test]
    fn test_conditional_is_right_associative() {
        let expr = parse_expr("a ? b : c ? d : e");
        let Expr::Conditional { alternate, .. } = expr else {
            panic!("expected conditional");
        };
        assert!(matches!(*alternate, Expr::Conditional { .. }));
    }

    #[test]
    fn test_call_member_index() {
        let expr = parse_expr(r#"user.greet(items[0], ["x",])"#);
        let Expr::Call { callee, args, .. } = expr else {
            panic!("expected call");
        };
        assert_eq!(callee.describe(), "user.greet");
        assert_eq!(args.len(), 2);
        assert!(matches!(args[0], Expr::Index { .. }));
        assert_eq!(
            args[1],
            Expr::Array(vec![Expr::Constant(Constant::String("x".to_string()))])
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse_expr("true"), Expr::Constant(Constant::Bool(true)));
        assert_eq!(parse_expr("null"), Expr::Constant(Constant::Null));
        assert_eq!(parse_expr("undefined"), Expr::Constant(Constant::Null));
    }

    #[test]
    fn test_empty_expression() {
        let err = Template::compile("a ${ } b").unwrap_err();
        assert_eq!(err, TemplateError::syntax("empty expression", 5));
    }

    #[test]
    fn test_trailing_tokens() {
        let err = Template::compile("${a b}").unwrap_err();
        assert_eq!(
            err.message(),
            "unexpected identifier `b`, expected end of expression"
        );
    }

    #[test]
    fn test_missing_property_name() {
        let err = Template::compile("${a.}").unwrap_err();
        assert_eq!(err.message(), "unexpected `}`, expected property name");
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("${{{}1{}}}", "(".repeat(100), ")".repeat(100));
        let err = Template::compile(&deep).unwrap_err();
        assert!(err.message().contains("nesting exceeds limit"));
    }
}
