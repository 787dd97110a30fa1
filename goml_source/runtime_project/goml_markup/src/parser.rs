use std::sync::Arc;

use goml_variant::Variant;
use indexmap::IndexMap;

use crate::ast::{MarkupDocument, MarkupElement, MarkupNode};
use crate::error::Result;
use crate::lexer::{Lexer, Token};

/// Parses a whole `.goml` source.
pub fn parse(src: &str) -> Result<MarkupDocument> {
    Parser::new(src).parse_document()
}

pub struct Parser {
    lexer: Lexer,
    declarations: IndexMap<String, Variant>,
}

impl Parser {
    pub fn new(src: &str) -> Self {
        Self {
            lexer: Lexer::new(src),
            declarations: IndexMap::new(),
        }
    }

    fn next(&mut self) -> Result<Token> {
        self.lexer.next_token()
    }

    // Tokens are only lexed on demand, so text and comments after a tag are
    // never fed to the token lexer.
    fn peek(&mut self) -> Result<Token> {
        let mark = self.lexer.mark();
        let token = self.lexer.next_token();
        self.lexer.reset(mark);
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let found = self.next()?;
        if found == expected {
            Ok(())
        } else {
            Err(self
                .lexer
                .error(format!("Expected {expected:?}, found {found:?}")))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(name) => Ok(name),
            other => Err(self
                .lexer
                .error(format!("Expected identifier, found {other:?}"))),
        }
    }

    pub fn parse_document(mut self) -> Result<MarkupDocument> {
        let mut roots = Vec::new();
        loop {
            self.lexer.skip_trivia()?;
            match self.lexer.peek() {
                None => break,
                Some('@') => self.parse_declaration()?,
                Some('<') => roots.push(self.parse_element()?),
                Some(_) => {
                    let text = self.lexer.read_text();
                    return Err(self
                        .lexer
                        .error(format!("Unexpected text outside of any element: '{text}'")));
                }
            }
        }
        Ok(MarkupDocument {
            declarations: self.declarations,
            roots,
        })
    }

    /// `@name = value`
    fn parse_declaration(&mut self) -> Result<()> {
        self.expect(Token::At)?;
        let name = self.expect_ident()?;
        self.expect(Token::Equals)?;
        let value = self.parse_value()?;
        self.declarations.insert(name, value);
        Ok(())
    }

    fn parse_element(&mut self) -> Result<MarkupElement> {
        self.expect(Token::Lt)?;
        let line = self.lexer.line();
        let tag = self.expect_ident()?;

        let mut attributes = IndexMap::new();
        let self_closing = loop {
            match self.next()? {
                Token::Ident(name) => {
                    let value = if self.peek()? == Token::Equals {
                        self.next()?;
                        self.parse_value()?
                    } else {
                        // Bare attribute, as in `<mesh physics>`.
                        Variant::Bool(true)
                    };
                    attributes.insert(name, value);
                }
                Token::Slash => {
                    self.expect(Token::Gt)?;
                    break true;
                }
                Token::Gt => break false,
                other => {
                    return Err(self
                        .lexer
                        .error(format!("Unexpected {other:?} in <{tag}>")));
                }
            }
        };

        let mut children = Vec::new();
        if !self_closing {
            loop {
                self.lexer.skip_trivia()?;
                if self.lexer.starts_with("</") {
                    self.expect(Token::Lt)?;
                    self.expect(Token::Slash)?;
                    let close = self.expect_ident()?;
                    if close != tag {
                        return Err(self
                            .lexer
                            .error(format!("Mismatched closing tag </{close}>, expected </{tag}>")));
                    }
                    self.expect(Token::Gt)?;
                    break;
                }
                match self.lexer.peek() {
                    Some('<') => children.push(MarkupNode::Element(self.parse_element()?)),
                    Some(_) => {
                        let text = self.lexer.read_text();
                        if !text.is_empty() {
                            children.push(MarkupNode::Text(text));
                        }
                    }
                    None => return Err(self.lexer.error(format!("Unclosed tag <{tag}>"))),
                }
            }
        }

        Ok(MarkupElement {
            tag,
            attributes,
            children,
            self_closing,
            line,
        })
    }

    fn parse_value(&mut self) -> Result<Variant> {
        match self.next()? {
            Token::String(s) => Ok(Variant::from(s)),
            Token::Number(n) => Ok(Variant::Number(n)),
            Token::Ident(word) => Ok(match word.as_str() {
                "true" => Variant::Bool(true),
                "false" => Variant::Bool(false),
                "null" => Variant::Null,
                _ => Variant::from(word),
            }),
            Token::At => {
                let name = self.expect_ident()?;
                self.declarations
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| self.lexer.error(format!("Unknown reference @{name}")))
            }
            Token::LBracket => self.parse_list(Token::RBracket).map(Variant::Array),
            // Tuples are plain arrays: (x, y, z)
            Token::LParen => self.parse_list(Token::RParen).map(Variant::Array),
            Token::LBrace => self.parse_object(),
            other => Err(self.lexer.error(format!("Expected a value, found {other:?}"))),
        }
    }

    fn parse_list(&mut self, close: Token) -> Result<Vec<Variant>> {
        let mut items = Vec::new();
        loop {
            if self.peek()? == close {
                self.next()?;
                return Ok(items);
            }
            items.push(self.parse_value()?);
            match self.next()? {
                Token::Comma => continue,
                t if t == close => return Ok(items),
                other => {
                    return Err(self
                        .lexer
                        .error(format!("Expected ',' or {close:?}, found {other:?}")));
                }
            }
        }
    }

    fn parse_object(&mut self) -> Result<Variant> {
        let mut entries = std::collections::BTreeMap::new();
        loop {
            let key = match self.next()? {
                Token::RBrace => break,
                Token::Ident(k) | Token::String(k) => k,
                other => {
                    return Err(self
                        .lexer
                        .error(format!("Expected object key, found {other:?}")));
                }
            };
            self.expect(Token::Colon)?;
            let value = self.parse_value()?;
            entries.insert(Arc::<str>::from(key), value);
            match self.next()? {
                Token::Comma => continue,
                Token::RBrace => break,
                other => {
                    return Err(self
                        .lexer
                        .error(format!("Expected ',' or '}}', found {other:?}")));
                }
            }
        }
        Ok(Variant::Object(entries))
    }
}
