use super::ast::{BinaryOperator, DaxExpression, LiteralValue, UnaryOperator};
use super::errors::ParseError;
use super::lexer::DaxLexer;
use super::token::{Token, TokenKind};

/// Binding power of unary `-` and `NOT`; tighter than `^`.
const UNARY_BINDING_POWER: u8 = 15;

/// Outcome of a parse. `ast` is present iff `success`; `errors` holds
/// position-tagged messages otherwise.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub success: bool,
    pub ast: Option<DaxExpression>,
    pub errors: Vec<String>,
}

impl ParseResult {
    fn ok(ast: DaxExpression) -> Self {
        Self {
            success: true,
            ast: Some(ast),
            errors: Vec::new(),
        }
    }

    fn failure(errors: Vec<String>) -> Self {
        Self {
            success: false,
            ast: None,
            errors,
        }
    }
}

/// Precedence-climbing parser for DAX expressions.
///
/// The parser is stateless; each call tokenizes and parses one source string.
/// `VAR`/`RETURN` blocks are not part of the grammar and surface as parse
/// errors, which the translator turns into a textual fallback.
#[derive(Debug, Default)]
pub struct DaxParser;

impl DaxParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a standalone expression.
    pub fn parse(&self, source: &str) -> ParseResult {
        let tokens = match DaxLexer::new(source).tokenize() {
            Ok(tokens) => tokens,
            Err(e) => return ParseResult::failure(vec![e.to_string()]),
        };

        let mut cursor = Cursor::new(tokens);
        match cursor.parse_expression(0) {
            Ok(ast) => cursor.finish(ast),
            Err(e) => {
                let mut errors: Vec<String> =
                    cursor.errors.iter().map(ToString::to_string).collect();
                errors.push(e.to_string());
                ParseResult::failure(errors)
            }
        }
    }

    /// Parse a measure definition `[Name] = expression` (`:=` also accepted).
    pub fn parse_measure(&self, source: &str) -> ParseResult {
        let tokens = match DaxLexer::new(source).tokenize() {
            Ok(tokens) => tokens,
            Err(e) => return ParseResult::failure(vec![e.to_string()]),
        };

        let mut cursor = Cursor::new(tokens);
        match cursor.parse_measure_definition() {
            Ok(ast) => cursor.finish(ast),
            Err(e) => {
                let mut errors: Vec<String> =
                    cursor.errors.iter().map(ToString::to_string).collect();
                errors.push(e.to_string());
                ParseResult::failure(errors)
            }
        }
    }
}

/// Left/right binding powers for infix operators, low to high:
/// `||` < `&&` < comparisons < `&` < `+ -` < `* /` < `^` (right-assoc).
fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    let bp = match kind {
        TokenKind::PipePipe => (1, 2),
        TokenKind::AmpAmp => (3, 4),
        TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::LtEq
        | TokenKind::Gt
        | TokenKind::GtEq => (5, 6),
        TokenKind::Amp => (7, 8),
        TokenKind::Plus | TokenKind::Minus => (9, 10),
        TokenKind::Star | TokenKind::Slash => (11, 12),
        TokenKind::Caret => (14, 13),
        _ => return None,
    };
    Some(bp)
}

fn binary_operator(kind: &TokenKind) -> BinaryOperator {
    match kind {
        TokenKind::PipePipe => BinaryOperator::Or,
        TokenKind::AmpAmp => BinaryOperator::And,
        TokenKind::Eq => BinaryOperator::Equals,
        TokenKind::NotEq => BinaryOperator::NotEquals,
        TokenKind::Lt => BinaryOperator::LessThan,
        TokenKind::LtEq => BinaryOperator::LessEqual,
        TokenKind::Gt => BinaryOperator::GreaterThan,
        TokenKind::GtEq => BinaryOperator::GreaterEqual,
        TokenKind::Amp => BinaryOperator::Ampersand,
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Subtract,
        TokenKind::Star => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Caret => BinaryOperator::Power,
        _ => unreachable!("not an infix operator: {kind:?}"),
    }
}

struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    recovered: bool,
}

impl Cursor {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            recovered: false,
        }
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream has Eof"))
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn error_at(token: &Token, expected: &str) -> ParseError {
        if token.kind == TokenKind::Eof {
            ParseError::UnexpectedEnd {
                expected: expected.to_string(),
            }
        } else {
            ParseError::UnexpectedToken {
                lexeme: token.lexeme.clone(),
                line: token.line,
                column: token.column,
                expected: expected.to_string(),
            }
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(Self::error_at(self.peek(), expected))
        }
    }

    /// Wrap up a successful parse: the input must be fully consumed and no
    /// recovered errors may remain.
    fn finish(&mut self, ast: DaxExpression) -> ParseResult {
        if !self.at_eof() {
            let err = Self::error_at(self.peek(), "end of input");
            self.errors.push(err);
        }
        if self.errors.is_empty() {
            ParseResult::ok(ast)
        } else {
            ParseResult::failure(self.errors.iter().map(ToString::to_string).collect())
        }
    }

    fn parse_measure_definition(&mut self) -> Result<DaxExpression, ParseError> {
        self.expect(TokenKind::LBracket, "'[' starting a measure name")?;
        let name = self
            .expect(TokenKind::Identifier, "measure name")?
            .lexeme;
        self.expect(TokenKind::RBracket, "']' closing the measure name")?;

        match self.peek().kind {
            TokenKind::Eq | TokenKind::ColonEq => {
                self.advance();
            }
            _ => return Err(Self::error_at(self.peek(), "'=' after the measure name")),
        }

        let expression = self.parse_expression(0)?;
        Ok(DaxExpression::Measure {
            name,
            expression: Box::new(expression),
        })
    }

    fn parse_expression(&mut self, min_bp: u8) -> Result<DaxExpression, ParseError> {
        let mut lhs = self.parse_prefix()?;

        while let Some((left_bp, right_bp)) = infix_binding_power(&self.peek().kind) {
            if left_bp < min_bp {
                break;
            }
            let op = binary_operator(&self.advance().kind);
            let rhs = self.parse_expression(right_bp)?;
            lhs = DaxExpression::BinaryOp {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<DaxExpression, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number { .. } => {
                self.advance();
                let value: f64 = token
                    .lexeme
                    .parse()
                    .map_err(|_| Self::error_at(&token, "number"))?;
                Ok(DaxExpression::Literal(LiteralValue::Number(value)))
            }
            TokenKind::Str => {
                self.advance();
                Ok(DaxExpression::Literal(LiteralValue::Text(token.lexeme)))
            }
            TokenKind::True => {
                self.advance();
                self.skip_empty_call_parens()?;
                Ok(DaxExpression::Literal(LiteralValue::Boolean(true)))
            }
            TokenKind::False => {
                self.advance();
                self.skip_empty_call_parens()?;
                Ok(DaxExpression::Literal(LiteralValue::Boolean(false)))
            }
            TokenKind::Blank => {
                self.advance();
                self.skip_empty_call_parens()?;
                Ok(DaxExpression::Literal(LiteralValue::Blank))
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expression(UNARY_BINDING_POWER)?;
                Ok(DaxExpression::UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(operand),
                })
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_expression(UNARY_BINDING_POWER)?;
                Ok(DaxExpression::UnaryOp {
                    op: UnaryOperator::Not,
                    operand: Box::new(operand),
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(0)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let name = self.expect(TokenKind::Identifier, "column name")?.lexeme;
                self.expect(TokenKind::RBracket, "']' closing the column name")?;
                Ok(DaxExpression::Column {
                    table: None,
                    column: name,
                })
            }
            TokenKind::Identifier => {
                // `NOT expr` parses as a unary operator, not a table name.
                if token.lexeme.eq_ignore_ascii_case("not") {
                    self.advance();
                    let operand = self.parse_expression(UNARY_BINDING_POWER)?;
                    return Ok(DaxExpression::UnaryOp {
                        op: UnaryOperator::Not,
                        operand: Box::new(operand),
                    });
                }

                self.advance();
                match self.peek().kind {
                    TokenKind::LParen => {
                        self.advance();
                        let args = self.parse_arguments()?;
                        Ok(DaxExpression::FunctionCall {
                            name: token.lexeme,
                            args,
                        })
                    }
                    TokenKind::LBracket => {
                        self.advance();
                        let column = self.expect(TokenKind::Identifier, "column name")?.lexeme;
                        self.expect(TokenKind::RBracket, "']' closing the column name")?;
                        Ok(DaxExpression::Column {
                            table: Some(token.lexeme),
                            column,
                        })
                    }
                    _ => Ok(DaxExpression::Table { name: token.lexeme }),
                }
            }
            _ => Err(Self::error_at(&token, "expression")),
        }
    }

    /// Comma-separated argument list; the opening paren is already consumed.
    ///
    /// On the first error inside an argument, the parser records it and skips
    /// to the next `,` or `)` at this nesting level; a second error aborts.
    fn parse_arguments(&mut self) -> Result<Vec<DaxExpression>, ParseError> {
        let mut args = Vec::new();

        if self.peek().kind == TokenKind::RParen {
            self.advance();
            return Ok(args);
        }

        loop {
            match self.parse_expression(0) {
                Ok(arg) => args.push(arg),
                Err(e) => {
                    if self.recovered {
                        return Err(e);
                    }
                    self.recovered = true;
                    self.errors.push(e.clone());
                    if !self.skip_to_argument_boundary() {
                        return Err(e);
                    }
                }
            }

            match self.peek().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    return Ok(args);
                }
                _ => return Err(Self::error_at(self.peek(), "',' or ')'")),
            }
        }
    }

    /// Skip forward to the next `,` or `)` at the current nesting level.
    /// Returns false when the end of input is reached first.
    fn skip_to_argument_boundary(&mut self) -> bool {
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return false,
                TokenKind::LParen => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen => {
                    if depth == 0 {
                        return true;
                    }
                    depth -= 1;
                    self.advance();
                }
                TokenKind::Comma if depth == 0 => return true,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// `TRUE()`, `FALSE()` and `BLANK()` are also written with call parens.
    fn skip_empty_call_parens(&mut self) -> Result<(), ParseError> {
        if self.peek().kind == TokenKind::LParen {
            self.advance();
            self.expect(TokenKind::RParen, "')'")?;
        }
        Ok(())
    }
}
