use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{FormulaError, ParseError};
use crate::lexer::Token;
use gridcalc_core::Position;

/// Recursive-descent parser for the formula grammar:
///
/// ```text
/// expr  := expr ('+'|'-') term | term
/// term  := term ('*'|'/') unary | unary
/// unary := ('+'|'-') unary | atom
/// atom  := NUMBER | CELL | '(' expr ')'
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the token stream into an AST
    pub fn parse(&mut self) -> Result<Expr, FormulaError> {
        let expr = self.parse_additive()?;

        if !self.is_at_end() {
            return Err(self.unexpected().into());
        }

        Ok(expr)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Token::Eof => ParseError::UnexpectedEnd,
            token => ParseError::UnexpectedToken(format!("{:?}", token)),
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        let op = match self.peek() {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Minus,
            _ => return self.parse_atom(),
        };

        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::unary(op, operand))
    }

    fn parse_atom(&mut self) -> Result<Expr, FormulaError> {
        match self.advance() {
            Token::Number(n) => Ok(Expr::Number(n)),

            Token::CellRef(text) => {
                // The lexer guarantees the [A-Z]+[0-9]+ shape, so a sentinel
                // here means the coordinates fell outside the sheet bounds.
                let pos = Position::from_a1(&text);
                if !pos.is_valid() {
                    return Err(FormulaError::InvalidReference(text));
                }
                Ok(Expr::Ref(pos))
            }

            Token::LeftParen => {
                let expr = self.parse_additive()?;
                match self.advance() {
                    Token::RightParen => Ok(expr),
                    Token::Eof => Err(ParseError::UnexpectedEnd.into()),
                    token => {
                        Err(ParseError::UnexpectedToken(format!("{:?}", token)).into())
                    }
                }
            }

            Token::Eof => Err(ParseError::UnexpectedEnd.into()),
            token => Err(ParseError::UnexpectedToken(format!("{:?}", token)).into()),
        }
    }
}
