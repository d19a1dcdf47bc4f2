use super::RuntimeError;
use super::ast::{BinaryOp, DeclarationKind, Expr, LogicalOp, Stmt, UnaryOp};
use super::lexer::{HostToken, Punct, is_reserved};

type ParseResult<T> = std::result::Result<T, RuntimeError>;

const EQUALITY_OPS: [(Punct, BinaryOp); 4] = [
    (Punct::Equal, BinaryOp::Equal),
    (Punct::NotEqual, BinaryOp::NotEqual),
    (Punct::StrictEqual, BinaryOp::StrictEqual),
    (Punct::StrictNotEqual, BinaryOp::StrictNotEqual),
];

const RELATIONAL_OPS: [(Punct, BinaryOp); 4] = [
    (Punct::Less, BinaryOp::Less),
    (Punct::LessEqual, BinaryOp::LessEqual),
    (Punct::Greater, BinaryOp::Greater),
    (Punct::GreaterEqual, BinaryOp::GreaterEqual),
];

const ADDITIVE_OPS: [(Punct, BinaryOp); 2] =
    [(Punct::Plus, BinaryOp::Add), (Punct::Minus, BinaryOp::Sub)];

const MULTIPLICATIVE_OPS: [(Punct, BinaryOp); 3] = [
    (Punct::Star, BinaryOp::Mul),
    (Punct::Slash, BinaryOp::Div),
    (Punct::Percent, BinaryOp::Rem),
];

fn declaration_kind(word: &str) -> Option<DeclarationKind> {
    match word {
        "const" => Some(DeclarationKind::Const),
        "let" => Some(DeclarationKind::Let),
        "var" => Some(DeclarationKind::Var),
        _ => None,
    }
}

fn unexpected(token: Option<&HostToken>) -> RuntimeError {
    RuntimeError::Unexpected {
        found: token
            .map(HostToken::describe)
            .unwrap_or_else(|| "end of input".to_string()),
    }
}

struct HostParser {
    tokens: Vec<HostToken>,
    position: usize,
}

impl HostParser {
    fn parse_program(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while self.peek().is_some() {
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let leading = self.peek().cloned();
        if let Some(HostToken::Identifier(word)) = &leading {
            if let Some(kind) = declaration_kind(word) {
                self.advance();
                let statement = self.parse_declaration(kind)?;
                self.end_statement()?;
                return Ok(statement);
            }
            match word.as_str() {
                "if" => return self.parse_if(),
                "for" => return self.parse_for(),
                "while" => return self.parse_while(),
                _ => {}
            }
        }

        match leading {
            Some(HostToken::Punct(Punct::LBrace)) => {
                self.advance();
                self.parse_block_body()
            }
            Some(HostToken::Punct(Punct::Semicolon)) => {
                self.advance();
                Ok(Stmt::Empty)
            }
            _ => {
                let expr = self.parse_expression()?;
                self.end_statement()?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_declaration(&mut self, kind: DeclarationKind) -> ParseResult<Stmt> {
        let name = match self.advance() {
            Some(HostToken::Identifier(name)) if !is_reserved(&name) => name,
            other => return Err(unexpected(other.as_ref())),
        };
        let init = if self.eat(Punct::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        if kind == DeclarationKind::Const && init.is_none() {
            return Err(RuntimeError::MissingInitializer);
        }
        Ok(Stmt::Declare { kind, name, init })
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        self.advance(); // Consume `if`
        self.expect(Punct::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Punct::RParen)?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if matches!(self.peek(), Some(HostToken::Identifier(word)) if word == "else")
        {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        self.advance(); // Consume `for`
        self.expect(Punct::LParen)?;

        let init = if self.eat(Punct::Semicolon) {
            None
        } else {
            let kind = match self.peek() {
                Some(HostToken::Identifier(word)) => declaration_kind(word),
                _ => None,
            };
            let init = match kind {
                Some(kind) => {
                    self.advance();
                    self.parse_declaration(kind)?
                }
                None => Stmt::Expr(self.parse_expression()?),
            };
            self.expect(Punct::Semicolon)?;
            Some(Box::new(init))
        };

        let condition = if self.check(Punct::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Punct::Semicolon)?;

        let update = if self.check(Punct::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(Punct::RParen)?;

        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        self.advance(); // Consume `while`
        self.expect(Punct::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Punct::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn parse_block_body(&mut self) -> ParseResult<Stmt> {
        let mut body = Vec::new();
        loop {
            match self.peek() {
                Some(HostToken::Punct(Punct::RBrace)) => {
                    self.advance();
                    return Ok(Stmt::Block(body));
                }
                Some(_) => body.push(self.parse_statement()?),
                None => return Err(unexpected(None)),
            }
        }
    }

    /// Accepts `;`, or an implied end before `}` or end of input.
    fn end_statement(&mut self) -> ParseResult<()> {
        match self.peek() {
            Some(HostToken::Punct(Punct::Semicolon)) => {
                self.advance();
                Ok(())
            }
            Some(HostToken::Punct(Punct::RBrace)) | None => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let target = self.parse_logical_or()?;
        let op = match self.peek() {
            Some(HostToken::Punct(Punct::Assign)) => None,
            Some(HostToken::Punct(Punct::PlusAssign)) => Some(BinaryOp::Add),
            Some(HostToken::Punct(Punct::MinusAssign)) => Some(BinaryOp::Sub),
            Some(HostToken::Punct(Punct::StarAssign)) => Some(BinaryOp::Mul),
            Some(HostToken::Punct(Punct::SlashAssign)) => Some(BinaryOp::Div),
            Some(HostToken::Punct(Punct::PercentAssign)) => Some(BinaryOp::Rem),
            _ => return Ok(target),
        };
        self.advance();
        let Expr::Identifier(name) = target else {
            return Err(RuntimeError::InvalidAssignmentTarget);
        };
        let value = self.parse_assignment()?;
        Ok(Expr::Assign {
            name,
            op,
            value: Box::new(value),
        })
    }

    fn parse_logical_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_logical_and()?;
        while self.eat(Punct::Or) {
            let right = self.parse_logical_and()?;
            left = Expr::Logical {
                left: Box::new(left),
                op: LogicalOp::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat(Punct::And) {
            let right = self.parse_equality()?;
            left = Expr::Logical {
                left: Box::new(left),
                op: LogicalOp::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(Self::parse_relational, &EQUALITY_OPS)
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(Self::parse_additive, &RELATIONAL_OPS)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(Self::parse_multiplicative, &ADDITIVE_OPS)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(Self::parse_unary, &MULTIPLICATIVE_OPS)
    }

    fn parse_binary_level(
        &mut self,
        operand: fn(&mut Self) -> ParseResult<Expr>,
        ops: &[(Punct, BinaryOp)],
    ) -> ParseResult<Expr> {
        let mut left = operand(self)?;
        while let Some(op) = self.match_binary(ops) {
            let right = operand(self)?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn match_binary(&mut self, ops: &[(Punct, BinaryOp)]) -> Option<BinaryOp> {
        let Some(HostToken::Punct(punct)) = self.peek() else {
            return None;
        };
        let op = ops
            .iter()
            .find(|(candidate, _)| candidate == punct)
            .map(|(_, op)| *op)?;
        self.advance();
        Some(op)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek() {
            Some(HostToken::Punct(Punct::Bang)) => UnaryOp::Not,
            Some(HostToken::Punct(Punct::Minus)) => UnaryOp::Negate,
            Some(HostToken::Punct(Punct::Plus)) => UnaryOp::Plus,
            Some(HostToken::Punct(punct @ (Punct::Increment | Punct::Decrement))) => {
                let increment = *punct == Punct::Increment;
                self.advance();
                let Expr::Identifier(name) = self.parse_unary()? else {
                    return Err(RuntimeError::InvalidAssignmentTarget);
                };
                return Ok(Expr::Update {
                    name,
                    increment,
                    prefix: true,
                });
            }
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_call_member()?;
        let increment = match self.peek() {
            Some(HostToken::Punct(Punct::Increment)) => true,
            Some(HostToken::Punct(Punct::Decrement)) => false,
            _ => return Ok(expr),
        };
        self.advance();
        let Expr::Identifier(name) = expr else {
            return Err(RuntimeError::InvalidAssignmentTarget);
        };
        Ok(Expr::Update {
            name,
            increment,
            prefix: false,
        })
    }

    fn parse_call_member(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(Punct::Dot) {
                let property = match self.advance() {
                    Some(HostToken::Identifier(property)) => property,
                    other => return Err(unexpected(other.as_ref())),
                };
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.eat(Punct::LParen) {
                let mut args = Vec::new();
                if !self.eat(Punct::RParen) {
                    loop {
                        args.push(self.parse_assignment()?);
                        if !self.eat(Punct::Comma) {
                            break;
                        }
                    }
                    self.expect(Punct::RParen)?;
                }
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.advance() {
            Some(HostToken::Number(value)) => Ok(Expr::Number(value)),
            Some(HostToken::String(value)) => Ok(Expr::String(value)),
            Some(HostToken::Identifier(name)) => match name.as_str() {
                "true" => Ok(Expr::Boolean(true)),
                "false" => Ok(Expr::Boolean(false)),
                "null" => Ok(Expr::Null),
                _ if is_reserved(&name) => Err(unexpected(Some(&HostToken::Identifier(name)))),
                _ => Ok(Expr::Identifier(name)),
            },
            Some(HostToken::Punct(Punct::LParen)) => {
                let expr = self.parse_expression()?;
                self.expect(Punct::RParen)?;
                Ok(expr)
            }
            other => Err(unexpected(other.as_ref())),
        }
    }

    fn expect(&mut self, punct: Punct) -> ParseResult<()> {
        match self.advance() {
            Some(HostToken::Punct(found)) if found == punct => Ok(()),
            other => Err(unexpected(other.as_ref())),
        }
    }

    fn eat(&mut self, punct: Punct) -> bool {
        if self.check(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, punct: Punct) -> bool {
        matches!(self.peek(), Some(HostToken::Punct(found)) if *found == punct)
    }

    fn advance(&mut self) -> Option<HostToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn peek(&self) -> Option<&HostToken> {
        self.tokens.get(self.position)
    }
}

pub(super) fn parse(tokens: Vec<HostToken>) -> ParseResult<Vec<Stmt>> {
    HostParser {
        tokens,
        position: 0,
    }
    .parse_program()
}
