//! Lexer for zappac input. Produces nodes with byte positions, always
//! terminated by an `Eof` node at the end of the input.

use crate::error::SyntaxError;
use crate::node::{Node, NodeKind};
use crate::value::parse_literal;

pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos + 1).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(o, _)| o)
            .unwrap_or(self.source.len())
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += 1;
        Some(ch)
    }

    fn node_from(&self, kind: NodeKind, start: usize) -> Node {
        Node::new(kind, start, &self.source[start..self.offset()])
    }

    pub fn tokenize(mut self) -> Result<Vec<Node>, SyntaxError> {
        let mut nodes = Vec::new();
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
                continue;
            }
            let start = self.offset();
            let node = match ch {
                '0'..='9' => self.read_number(start)?,
                '.' if matches!(self.peek(), Some(d) if d.is_ascii_digit()) => {
                    self.read_number(start)?
                }
                c if c.is_ascii_alphabetic() || c == '_' => self.read_word(start),
                _ => self.read_symbol(ch, start)?,
            };
            nodes.push(node);
        }
        nodes.push(Node::new(NodeKind::Eof, self.source.len(), ""));
        Ok(nodes)
    }

    fn read_number(&mut self, start: usize) -> Result<Node, SyntaxError> {
        while matches!(self.current(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            self.advance();
        }
        let node = self.node_from(NodeKind::Number, start);
        if parse_literal(&node.text).is_none() {
            return Err(SyntaxError::InvalidNumber {
                text: node.text,
                pos: start,
            });
        }
        Ok(node)
    }

    fn read_word(&mut self, start: usize) -> Node {
        while matches!(self.current(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let text = &self.source[start..self.offset()];
        let kind = if is_binary_literal(text) {
            NodeKind::Number
        } else {
            NodeKind::keyword(text).unwrap_or(NodeKind::Variable)
        };
        self.node_from(kind, start)
    }

    fn read_symbol(&mut self, ch: char, start: usize) -> Result<Node, SyntaxError> {
        self.advance();
        let kind = match (ch, self.current()) {
            ('*', Some('*')) => {
                self.advance();
                NodeKind::Exp
            }
            ('/', Some('/')) => {
                self.advance();
                NodeKind::Fdiv
            }
            ('<', Some('<')) => {
                self.advance();
                NodeKind::LShift
            }
            ('>', Some('>')) => {
                self.advance();
                NodeKind::RShift
            }
            ('*', _) => NodeKind::Mult,
            ('/', _) => NodeKind::Div,
            ('+', _) => NodeKind::Add,
            ('-', _) => NodeKind::Sub,
            ('%', _) => NodeKind::Mod,
            ('&', _) => NodeKind::And,
            ('|', _) => NodeKind::Or,
            ('^', _) => NodeKind::Xor,
            ('~', _) => NodeKind::Inv,
            ('=', _) => NodeKind::Assign,
            ('(', _) => NodeKind::LParen,
            (')', _) => NodeKind::RParen,
            _ => return Err(SyntaxError::UnexpectedChar { ch, pos: start }),
        };
        Ok(self.node_from(kind, start))
    }
}

/// `b0101` style binary literals look like identifiers.
fn is_binary_literal(word: &str) -> bool {
    let digits = |rest: &str| {
        !rest.is_empty() && rest.chars().all(|c| c == '0' || c == '1' || c == '_')
    };
    word.strip_prefix('b').is_some_and(digits) && parse_literal(word).is_some()
}

pub fn tokenize(source: &str) -> Result<Vec<Node>, SyntaxError> {
    Lexer::new(source).tokenize()
}
