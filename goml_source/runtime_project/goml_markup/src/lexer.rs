use goml_variant::Number;

use crate::error::{MarkupError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Lt,       // '<'
    Gt,       // '>'
    Slash,    // '/'
    Equals,   // '='
    Comma,    // ','
    Colon,    // ':'
    At,       // '@'
    LParen,   // '('
    RParen,   // ')'
    LBracket, // '['
    RBracket, // ']'
    LBrace,   // '{'
    RBrace,   // '}'

    Ident(String), // tag names, attribute names, bare words
    Number(Number),
    String(String), // "quoted"
    Eof,
}

#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

/// Saved lexer position for backtracking.
#[derive(Debug, Clone, Copy)]
pub struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '#'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | '#')
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
    }

    pub fn error(&self, message: impl Into<String>) -> MarkupError {
        MarkupError {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    pub fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
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

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Skips whitespace and `<!-- -->` comments.
    pub fn skip_trivia(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            if !self.starts_with("<!--") {
                return Ok(());
            }
            let start = self.error("Unterminated comment");
            for _ in 0..4 {
                self.advance();
            }
            loop {
                if self.starts_with("-->") {
                    for _ in 0..3 {
                        self.advance();
                    }
                    break;
                }
                if self.advance().is_none() {
                    return Err(start);
                }
            }
        }
    }

    /// Raw text up to the next `<` (or EOF), trimmed.
    pub fn read_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '<' {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text.trim().to_string()
    }

    fn read_string_literal(&mut self) -> Result<String> {
        // Opening quote already consumed.
        let mut value = String::new();
        while let Some(ch) = self.advance() {
            match ch {
                '"' => return Ok(value),
                '\\' => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(other) => value.push(other),
                    None => return Err(self.error("Unexpected EOF in string escape")),
                },
                _ => value.push(ch),
            }
        }
        Err(self.error("Unterminated string literal"))
    }

    fn read_number(&mut self, first: char) -> Result<Number> {
        let mut s = String::new();
        s.push(first);

        let negative = first == '-';
        let hex = if negative {
            self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X'))
        } else {
            first == '0' && matches!(self.peek(), Some('x' | 'X'))
        };
        if hex {
            if negative {
                self.advance();
            }
            self.advance();
            let mut digits = String::new();
            while let Some(c) = self.peek().filter(char::is_ascii_hexdigit) {
                digits.push(c);
                self.advance();
            }
            let value = i64::from_str_radix(&digits, 16)
                .map_err(|_| self.error(format!("Invalid hex number '0x{digits}'")))?;
            return Ok(Number::I64(if negative { -value } else { value }));
        }

        let mut is_float = first == '.';
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                s.push(c);
            } else if c == '.' && !is_float {
                is_float = true;
                s.push(c);
            } else if (c == 'e' || c == 'E')
                && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit() || d == '-' || d == '+')
            {
                is_float = true;
                s.push(c);
                self.advance();
                if let Some(sign) = self.peek().filter(|d| *d == '-' || *d == '+') {
                    s.push(sign);
                    self.advance();
                }
                continue;
            } else {
                break;
            }
            self.advance();
        }

        if is_float {
            s.parse::<f64>()
                .map(Number::F64)
                .map_err(|_| self.error(format!("Invalid number '{s}'")))
        } else {
            s.parse::<i64>()
                .map(Number::I64)
                .map_err(|_| self.error(format!("Invalid number '{s}'")))
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let Some(ch) = self.advance() else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '<' => Token::Lt,
            '>' => Token::Gt,
            '/' => Token::Slash,
            '=' => Token::Equals,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '@' => Token::At,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '"' => Token::String(self.read_string_literal()?),
            c if c.is_ascii_digit()
                || (c == '-' && matches!(self.peek(), Some(d) if d.is_ascii_digit() || d == '.'))
                || (c == '.' && matches!(self.peek(), Some(d) if d.is_ascii_digit())) =>
            {
                Token::Number(self.read_number(c)?)
            }
            c if is_ident_start(c) => {
                let mut ident = String::new();
                ident.push(c);
                while let Some(next) = self.peek().filter(|n| is_ident_char(*n)) {
                    ident.push(next);
                    self.advance();
                }
                Token::Ident(ident)
            }
            other => return Err(self.error(format!("Unexpected character '{other}'"))),
        };
        Ok(token)
    }
}
