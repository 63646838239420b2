use super::errors::LexError;
use super::token::{Token, TokenKind};

/// DAX lexer.
///
/// Produces a flat token stream for one expression or measure definition.
/// Whitespace and comments (`//` line, `/* */` block, non-nesting) are
/// skipped. Quoted identifiers (`'Store Locations'`) and bracketed names
/// (`[Total Sales]`) preserve internal spaces in the token lexeme.
pub struct DaxLexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl DaxLexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole input, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let (line, column) = (self.line, self.column);
            let Some(ch) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, "", line, column));
                return Ok(tokens);
            };

            match ch {
                '"' => tokens.push(self.lex_string(line, column)?),
                '\'' => tokens.push(self.lex_quoted_identifier(line, column)?),
                '[' => self.lex_bracketed_name(&mut tokens, line, column)?,
                c if c.is_ascii_digit() => tokens.push(self.lex_number(line, column)),
                c if c.is_ascii_alphabetic() || c == '_' => {
                    tokens.push(self.lex_identifier(line, column))
                }
                c => tokens.push(self.lex_operator(c, line, column)?),
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Skip whitespace and comments between tokens.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let (line, column) = (self.line, self.column);
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek() {
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => {
                                self.advance();
                            }
                            None => {
                                return Err(LexError::UnterminatedBlockComment { line, column })
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// `"…"` with `""` as the embedded-quote escape.
    fn lex_string(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                Some('"') if self.peek_at(1) == Some('"') => {
                    self.advance();
                    self.advance();
                    value.push('"');
                }
                Some('"') => {
                    self.advance();
                    return Ok(Token::new(TokenKind::Str, value, line, column));
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
                None => return Err(LexError::UnterminatedString { line, column }),
            }
        }
    }

    /// `'Table Name'` - table identifiers containing spaces. Quotes are
    /// stripped; the lexeme is the inner name as written.
    fn lex_quoted_identifier(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut name = String::new();
        loop {
            match self.peek() {
                Some('\'') => {
                    self.advance();
                    return Ok(Token::new(TokenKind::Identifier, name, line, column));
                }
                Some(c) => {
                    self.advance();
                    name.push(c);
                }
                None => return Err(LexError::UnterminatedQuotedIdentifier { line, column }),
            }
        }
    }

    /// `[Column Name]` - emits LBracket, one Identifier with the raw inner
    /// name (spaces preserved), RBracket.
    fn lex_bracketed_name(
        &mut self,
        tokens: &mut Vec<Token>,
        line: u32,
        column: u32,
    ) -> Result<(), LexError> {
        self.advance(); // '['
        tokens.push(Token::new(TokenKind::LBracket, "[", line, column));

        let (name_line, name_column) = (self.line, self.column);
        let mut name = String::new();
        loop {
            match self.peek() {
                Some(']') => {
                    tokens.push(Token::new(
                        TokenKind::Identifier,
                        name.trim().to_string(),
                        name_line,
                        name_column,
                    ));
                    let (close_line, close_column) = (self.line, self.column);
                    self.advance();
                    tokens.push(Token::new(TokenKind::RBracket, "]", close_line, close_column));
                    return Ok(());
                }
                Some(c) => {
                    self.advance();
                    name.push(c);
                }
                None => return Err(LexError::UnterminatedBracketedName { line, column }),
            }
        }
    }

    /// `[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?`
    fn lex_number(&mut self, line: u32, column: u32) -> Token {
        let mut lexeme = String::new();
        let mut decimal = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
                lexeme.push(c);
            } else {
                break;
            }
        }

        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            decimal = true;
            self.advance();
            lexeme.push('.');
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                    lexeme.push(c);
                } else {
                    break;
                }
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut offset = 1;
            if matches!(self.peek_at(1), Some('+') | Some('-')) {
                offset = 2;
            }
            if self.peek_at(offset).is_some_and(|c| c.is_ascii_digit()) {
                decimal = true;
                for _ in 0..offset {
                    if let Some(c) = self.advance() {
                        lexeme.push(c);
                    }
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        self.advance();
                        lexeme.push(c);
                    } else {
                        break;
                    }
                }
            }
        }

        Token::new(TokenKind::Number { decimal }, lexeme, line, column)
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`, then keyword promotion.
    fn lex_identifier(&mut self, line: u32, column: u32) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
                lexeme.push(c);
            } else {
                break;
            }
        }

        let kind = match lexeme.to_uppercase().as_str() {
            "TRUE" => TokenKind::True,
            "FALSE" => TokenKind::False,
            "BLANK" => TokenKind::Blank,
            "VAR" => TokenKind::Var,
            "RETURN" => TokenKind::Return,
            "IN" => TokenKind::In,
            _ => TokenKind::Identifier,
        };
        Token::new(kind, lexeme, line, column)
    }

    fn lex_operator(&mut self, ch: char, line: u32, column: u32) -> Result<Token, LexError> {
        self.advance();
        let tok = |kind: TokenKind, lexeme: &str| Token::new(kind, lexeme, line, column);

        let token = match ch {
            '&' if self.peek() == Some('&') => {
                self.advance();
                tok(TokenKind::AmpAmp, "&&")
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                tok(TokenKind::PipePipe, "||")
            }
            '<' if self.peek() == Some('=') => {
                self.advance();
                tok(TokenKind::LtEq, "<=")
            }
            '<' if self.peek() == Some('>') => {
                self.advance();
                tok(TokenKind::NotEq, "<>")
            }
            '>' if self.peek() == Some('=') => {
                self.advance();
                tok(TokenKind::GtEq, ">=")
            }
            ':' if self.peek() == Some('=') => {
                self.advance();
                tok(TokenKind::ColonEq, ":=")
            }
            '+' => tok(TokenKind::Plus, "+"),
            '-' => tok(TokenKind::Minus, "-"),
            '*' => tok(TokenKind::Star, "*"),
            '/' => tok(TokenKind::Slash, "/"),
            '^' => tok(TokenKind::Caret, "^"),
            '=' => tok(TokenKind::Eq, "="),
            '<' => tok(TokenKind::Lt, "<"),
            '>' => tok(TokenKind::Gt, ">"),
            '&' => tok(TokenKind::Amp, "&"),
            '!' => tok(TokenKind::Bang, "!"),
            '~' => tok(TokenKind::Tilde, "~"),
            '(' => tok(TokenKind::LParen, "("),
            ')' => tok(TokenKind::RParen, ")"),
            ']' => tok(TokenKind::RBracket, "]"),
            '{' => tok(TokenKind::LBrace, "{"),
            '}' => tok(TokenKind::RBrace, "}"),
            ',' => tok(TokenKind::Comma, ","),
            '.' => tok(TokenKind::Dot, "."),
            _ => return Err(LexError::UnexpectedChar { ch, line, column }),
        };
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        DaxLexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_qualified_column_reference() {
        let tokens = DaxLexer::new("Sales[Amount]").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "Sales");
        assert_eq!(tokens[1].kind, TokenKind::LBracket);
        assert_eq!(tokens[2].lexeme, "Amount");
        assert_eq!(tokens[3].kind, TokenKind::RBracket);
        assert_eq!(tokens[4].kind, TokenKind::Eof);
    }

    #[test]
    fn bracketed_name_preserves_spaces() {
        let tokens = DaxLexer::new("[Total Sales Amount]").tokenize().unwrap();
        assert_eq!(tokens[1].lexeme, "Total Sales Amount");
    }

    #[test]
    fn quoted_identifier_preserves_spaces() {
        let tokens = DaxLexer::new("'Store Locations'[City]").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "Store Locations");
    }

    #[test]
    fn lexes_multi_char_operators_as_single_tokens() {
        assert_eq!(
            kinds("a && b || c <= d >= e <> f"),
            vec![
                TokenKind::Identifier,
                TokenKind::AmpAmp,
                TokenKind::Identifier,
                TokenKind::PipePipe,
                TokenKind::Identifier,
                TokenKind::LtEq,
                TokenKind::Identifier,
                TokenKind::GtEq,
                TokenKind::Identifier,
                TokenKind::NotEq,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_numbers_with_subtypes() {
        let tokens = DaxLexer::new("42 3.14 1e5 2.5E-3").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number { decimal: false });
        assert_eq!(tokens[1].kind, TokenKind::Number { decimal: true });
        assert_eq!(tokens[2].kind, TokenKind::Number { decimal: true });
        assert_eq!(tokens[3].kind, TokenKind::Number { decimal: true });
        assert_eq!(tokens[3].lexeme, "2.5E-3");
    }

    #[test]
    fn string_double_quote_escape() {
        let tokens = DaxLexer::new(r#""say ""hi""""#).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].lexeme, "say \"hi\"");
    }

    #[test]
    fn unterminated_string_reports_position() {
        let err = DaxLexer::new("1 + \"oops").tokenize().unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { line: 1, column: 5 });
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            kinds("true FALSE Blank var RETURN in"),
            vec![
                TokenKind::True,
                TokenKind::False,
                TokenKind::Blank,
                TokenKind::Var,
                TokenKind::Return,
                TokenKind::In,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_line_and_block_comments() {
        let source = "1 // trailing\n/* spans\nlines */ + 2";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Number { decimal: false },
                TokenKind::Plus,
                TokenKind::Number { decimal: false },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = DaxLexer::new("1 +\n  foo").tokenize().unwrap();
        assert_eq!((tokens[1].line, tokens[1].column), (1, 3));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
    }

    #[test]
    fn rejects_unknown_character() {
        let err = DaxLexer::new("a @ b").tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedChar {
                ch: '@',
                line: 1,
                column: 3
            }
        );
    }
}
