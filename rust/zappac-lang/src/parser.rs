//! Grammar check over lexed nodes (Pratt parser).
//!
//! ```text
//! program   := statement EOF
//! statement := "clear" ["(" ")"]
//!            | ("save" | "load" | "output") "(" NAME ")"
//!            | NAME "=" expr
//!            | expr
//! ```

use std::str::FromStr;

use crate::ast::{BinOp, Expr, Stmt, PREFIX_BP};
use crate::error::SyntaxError;
use crate::lexer;
use crate::node::{Node, NodeKind};
use crate::value::{parse_literal, OutputFormat};

/// Lex and grammar-check `source`, returning its nodes.
pub fn parse(source: &str) -> Result<Vec<Node>, SyntaxError> {
    let nodes = lexer::tokenize(source)?;
    parse_statement(&nodes)?;
    Ok(nodes)
}

/// Build the statement a node list describes.
pub fn parse_statement(nodes: &[Node]) -> Result<Stmt, SyntaxError> {
    let mut parser = Parser::new(nodes);
    if parser.peek_kind() == NodeKind::Eof {
        return Err(SyntaxError::Empty);
    }
    let stmt = parser.statement()?;
    parser.expect_end()?;
    Ok(stmt)
}

pub struct Parser<'a> {
    nodes: &'a [Node],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(nodes: &'a [Node]) -> Self {
        Self { nodes, pos: 0 }
    }

    fn current(&self) -> Option<&'a Node> {
        self.nodes.get(self.pos)
    }

    /// A missing node reads as end of input.
    fn peek_kind(&self) -> NodeKind {
        self.current().map(|n| n.kind).unwrap_or(NodeKind::Eof)
    }

    fn kind_at(&self, offset: usize) -> NodeKind {
        self.nodes
            .get(self.pos + offset)
            .map(|n| n.kind)
            .unwrap_or(NodeKind::Eof)
    }

    fn advance(&mut self) -> Option<&'a Node> {
        let node = self.current()?;
        self.pos += 1;
        Some(node)
    }

    fn here(&self) -> usize {
        match self.current() {
            Some(node) => node.pos,
            None => self.nodes.last().map(Node::end).unwrap_or(0),
        }
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        let found = match self.current() {
            Some(node) if node.kind != NodeKind::Eof => format!("'{}'", node.text),
            _ => "end of input".to_string(),
        };
        SyntaxError::Unexpected {
            found,
            expected,
            pos: self.here(),
        }
    }

    fn expect(&mut self, kind: NodeKind, expected: &'static str) -> Result<&'a Node, SyntaxError> {
        if self.peek_kind() == kind {
            if let Some(node) = self.advance() {
                return Ok(node);
            }
        }
        Err(self.unexpected(expected))
    }

    fn expect_end(&mut self) -> Result<(), SyntaxError> {
        match self.peek_kind() {
            NodeKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of input")),
        }
    }

    fn statement(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek_kind() {
            NodeKind::Clear => {
                self.advance();
                if self.peek_kind() == NodeKind::LParen {
                    self.advance();
                    self.expect(NodeKind::RParen, "')'")?;
                }
                Ok(Stmt::Clear)
            }
            NodeKind::Save => {
                self.advance();
                Ok(Stmt::Save(self.name_argument("slot name")?.text.clone()))
            }
            NodeKind::Load => {
                self.advance();
                Ok(Stmt::Load(self.name_argument("slot name")?.text.clone()))
            }
            NodeKind::SetOutput => {
                self.advance();
                let arg = self.name_argument("output format")?;
                let format = OutputFormat::from_str(&arg.text).map_err(|_| {
                    SyntaxError::UnknownFormat {
                        name: arg.text.clone(),
                        pos: arg.pos,
                    }
                })?;
                Ok(Stmt::Output(format))
            }
            NodeKind::Variable if self.kind_at(1) == NodeKind::Assign => {
                let name = self.expect(NodeKind::Variable, "variable")?.text.clone();
                self.advance();
                Ok(Stmt::Assign(name, self.expr(0)?))
            }
            _ => Ok(Stmt::Expr(self.expr(0)?)),
        }
    }

    fn name_argument(&mut self, expected: &'static str) -> Result<&'a Node, SyntaxError> {
        self.expect(NodeKind::LParen, "'('")?;
        let name = self.expect(NodeKind::Variable, expected)?;
        self.expect(NodeKind::RParen, "')'")?;
        Ok(name)
    }

    fn expr(&mut self, min_bp: u8) -> Result<Expr, SyntaxError> {
        let mut lhs = self.prefix()?;
        while let Some(op) = BinOp::from_kind(self.peek_kind()) {
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.expr(r_bp)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn prefix(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek_kind() {
            NodeKind::Number => {
                let node = self.expect(NodeKind::Number, "number")?;
                let value = parse_literal(&node.text).ok_or_else(|| SyntaxError::InvalidNumber {
                    text: node.text.clone(),
                    pos: node.pos,
                })?;
                Ok(Expr::Number(value))
            }
            NodeKind::Variable => {
                let node = self.expect(NodeKind::Variable, "variable")?;
                Ok(Expr::Var(node.text.clone()))
            }
            NodeKind::Sub => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.expr(PREFIX_BP)?)))
            }
            NodeKind::Add => {
                self.advance();
                self.expr(PREFIX_BP)
            }
            NodeKind::Inv => {
                self.advance();
                Ok(Expr::Not(Box::new(self.expr(PREFIX_BP)?)))
            }
            NodeKind::LParen => {
                self.advance();
                let inner = self.expr(0)?;
                self.expect(NodeKind::RParen, "')'")?;
                Ok(inner)
            }
            NodeKind::Abs => {
                self.advance();
                self.expect(NodeKind::LParen, "'('")?;
                let inner = self.expr(0)?;
                self.expect(NodeKind::RParen, "')'")?;
                Ok(Expr::Abs(Box::new(inner)))
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn stmt(source: &str) -> Stmt {
        parse_statement(&lexer::tokenize(source).expect("should lex")).expect("should parse")
    }

    fn int(n: i64) -> Box<Expr> {
        Box::new(Expr::Number(Value::Int(n)))
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(
            stmt("1 + 2 * 3"),
            Stmt::Expr(Expr::Binary(
                BinOp::Add,
                int(1),
                Box::new(Expr::Binary(BinOp::Mul, int(2), int(3)))
            ))
        );
        assert_eq!(
            stmt("2 ** 3 ** 2"),
            Stmt::Expr(Expr::Binary(
                BinOp::Exp,
                int(2),
                Box::new(Expr::Binary(BinOp::Exp, int(3), int(2)))
            ))
        );
        assert_eq!(
            stmt("-2 ** 2"),
            Stmt::Expr(Expr::Neg(Box::new(Expr::Binary(BinOp::Exp, int(2), int(2)))))
        );
        assert_eq!(
            stmt("1 | 2 & 3"),
            Stmt::Expr(Expr::Binary(
                BinOp::Or,
                int(1),
                Box::new(Expr::Binary(BinOp::And, int(2), int(3)))
            ))
        );
    }

    #[test]
    fn statements() {
        assert_eq!(stmt("x = 2"), Stmt::Assign("x".into(), Expr::Number(Value::Int(2))));
        assert_eq!(stmt("clear"), Stmt::Clear);
        assert_eq!(stmt("clear()"), Stmt::Clear);
        assert_eq!(stmt("save(work)"), Stmt::Save("work".into()));
        assert_eq!(stmt("load(work)"), Stmt::Load("work".into()));
        assert_eq!(stmt("output(hex)"), Stmt::Output(OutputFormat::Hex));
        assert_eq!(
            stmt("abs(-x)"),
            Stmt::Expr(Expr::Abs(Box::new(Expr::Neg(Box::new(Expr::Var("x".into()))))))
        );
    }

    #[test]
    fn syntax_errors_carry_positions() {
        assert_eq!(parse(""), Err(SyntaxError::Empty));
        assert_eq!(
            parse("1 +"),
            Err(SyntaxError::Unexpected {
                found: "end of input".into(),
                expected: "expression",
                pos: 3
            })
        );
        assert_eq!(
            parse("(1 + 2"),
            Err(SyntaxError::Unexpected {
                found: "end of input".into(),
                expected: "')'",
                pos: 6
            })
        );
        assert_eq!(
            parse("1 2"),
            Err(SyntaxError::Unexpected {
                found: "'2'".into(),
                expected: "end of input",
                pos: 2
            })
        );
        assert_eq!(
            parse("x = = 1"),
            Err(SyntaxError::Unexpected {
                found: "'='".into(),
                expected: "expression",
                pos: 4
            })
        );
        assert_eq!(
            parse("output(roman)"),
            Err(SyntaxError::UnknownFormat {
                name: "roman".into(),
                pos: 7
            })
        );
    }

    #[test]
    fn error_messages_read_well() {
        let err = parse("3 * )").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected ')' at position 4; expected expression"
        );
    }

    #[test]
    fn parse_returns_nodes_ending_in_eof() {
        let nodes = parse("a = 1 + b").unwrap();
        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes.last().map(|n| n.kind), Some(NodeKind::Eof));
    }

    #[test]
    fn node_lists_without_eof_still_parse() {
        let nodes = vec![Node::new(NodeKind::Number, 0, "4")];
        assert_eq!(parse_statement(&nodes), Ok(Stmt::Expr(Expr::Number(Value::Int(4)))));
    }
}
