use gridcalc_core::{CellError, CellValue, Position};
use std::fmt;

/// Abstract syntax tree for formula expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),

    /// Cell reference. The position is held by value even when it is out of
    /// range: an invalid reference prints as `#REF!` and evaluates to the
    /// `#REF!` error.
    Ref(Position),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn symbol(&self) -> char {
        match self {
            UnaryOp::Plus => '+',
            UnaryOp::Minus => '-',
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

/// Node precedence for the re-printing rules (higher binds tighter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precedence {
    Add = 0,
    Sub,
    Mul,
    Div,
    Unary,
    Atom,
}

const PR_NONE: u8 = 0b00;
const PR_LEFT: u8 = 0b01;
const PR_RIGHT: u8 = 0b10;
const PR_BOTH: u8 = PR_LEFT | PR_RIGHT;

/// `PAREN_RULES[parent][child]` tells whether a child of a given precedence
/// must be parenthesized under a parent, separately for the left and right
/// slots: `(X c Y) p Z` vs `X p (Y c Z)`. The marked cases are exactly the
/// ones where dropping the parentheses would re-parse to a different tree,
/// e.g. `A-(B+C)` and `A/(B*C)` but not `A+(B-C)`.
const PAREN_RULES: [[u8; 6]; 6] = [
    /* Add   */ [PR_NONE, PR_NONE, PR_NONE, PR_NONE, PR_NONE, PR_NONE],
    /* Sub   */ [PR_RIGHT, PR_RIGHT, PR_NONE, PR_NONE, PR_NONE, PR_NONE],
    /* Mul   */ [PR_BOTH, PR_BOTH, PR_NONE, PR_NONE, PR_NONE, PR_NONE],
    /* Div   */ [PR_BOTH, PR_BOTH, PR_RIGHT, PR_RIGHT, PR_NONE, PR_NONE],
    /* Unary */ [PR_BOTH, PR_BOTH, PR_NONE, PR_NONE, PR_NONE, PR_NONE],
    /* Atom  */ [PR_NONE, PR_NONE, PR_NONE, PR_NONE, PR_NONE, PR_NONE],
];

impl Expr {
    /// Create a unary expression
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create a binary expression
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Evaluate the expression, resolving cell references through `resolve`.
    pub fn evaluate<F>(&self, resolve: &F) -> Result<f64, CellError>
    where
        F: Fn(Position) -> CellValue,
    {
        match self {
            Expr::Number(n) => Ok(*n),

            Expr::Ref(pos) => {
                if !pos.is_valid() {
                    return Err(CellError::InvalidReference);
                }
                match resolve(*pos) {
                    CellValue::Empty => Ok(0.0),
                    CellValue::Number(n) => Ok(n),
                    CellValue::Text(s) if s.is_empty() => Ok(0.0),
                    CellValue::Text(_) => Err(CellError::InvalidValue),
                    CellValue::Error(e) => Err(e),
                }
            }

            Expr::Unary { op, operand } => {
                let value = operand.evaluate(resolve)?;
                Ok(match op {
                    UnaryOp::Plus => value,
                    UnaryOp::Minus => -value,
                })
            }

            Expr::Binary { op, left, right } => {
                let lhs = left.evaluate(resolve)?;
                let rhs = right.evaluate(resolve)?;

                let result = match op {
                    BinaryOp::Add => lhs + rhs,
                    BinaryOp::Sub => lhs - rhs,
                    BinaryOp::Mul => lhs * rhs,
                    BinaryOp::Div => {
                        if rhs.abs() < f64::EPSILON {
                            return Err(CellError::DivisionByZero);
                        }
                        lhs / rhs
                    }
                };

                if result.is_infinite() {
                    return Err(CellError::DivisionByZero);
                }
                Ok(result)
            }
        }
    }

    /// Append every `Ref` leaf to `refs`, in source order, validity ignored.
    pub fn collect_refs(&self, refs: &mut Vec<Position>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ref(pos) => refs.push(*pos),
            Expr::Unary { operand, .. } => operand.collect_refs(refs),
            Expr::Binary { left, right, .. } => {
                left.collect_refs(refs);
                right.collect_refs(refs);
            }
        }
    }

    fn precedence(&self) -> Precedence {
        match self {
            Expr::Number(_) | Expr::Ref(_) => Precedence::Atom,
            Expr::Unary { .. } => Precedence::Unary,
            Expr::Binary { op, .. } => match op {
                BinaryOp::Add => Precedence::Add,
                BinaryOp::Sub => Precedence::Sub,
                BinaryOp::Mul => Precedence::Mul,
                BinaryOp::Div => Precedence::Div,
            },
        }
    }

    fn fmt_child(
        &self,
        f: &mut fmt::Formatter<'_>,
        parent: Precedence,
        right_child: bool,
    ) -> fmt::Result {
        let precedence = self.precedence();
        let mask = if right_child { PR_RIGHT } else { PR_LEFT };
        let parens_needed = PAREN_RULES[parent as usize][precedence as usize] & mask != 0;

        if parens_needed {
            write!(f, "(")?;
        }

        match self {
            Expr::Number(n) => write!(f, "{}", n)?,
            Expr::Ref(pos) => {
                if pos.is_valid() {
                    write!(f, "{}", pos)?;
                } else {
                    write!(f, "{}", CellError::InvalidReference)?;
                }
            }
            Expr::Unary { op, operand } => {
                write!(f, "{}", op.symbol())?;
                operand.fmt_child(f, precedence, false)?;
            }
            Expr::Binary { op, left, right } => {
                left.fmt_child(f, precedence, false)?;
                write!(f, "{}", op.symbol())?;
                right.fmt_child(f, precedence, true)?;
            }
        }

        if parens_needed {
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Canonical form: the minimum parentheses that still round-trip to the same
/// tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_child(f, Precedence::Atom, false)
    }
}
