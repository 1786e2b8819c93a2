use num::{BigRational, Signed};
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

/// The tree produced by the parser, mirroring the surface grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    Literal(BigRational),
    Variable(SmolStr),
    Unary {
        op: UnaryOperator,
        operand: Box<SyntaxNode>,
    },
    /// An expression involving two operands.
    Binary {
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
        op: BinaryOperator,
    },
    Call {
        function: SmolStr,
        arguments: Vec<SyntaxNode>,
    },
}

impl SyntaxNode {
    pub(crate) fn binary(
        op: BinaryOperator,
        left: SyntaxNode,
        right: SyntaxNode,
    ) -> SyntaxNode {
        SyntaxNode::Binary {
            left: Box::new(left),
            right: Box::new(right),
            op,
        }
    }

    /// A human-readable name for this kind of node.
    pub fn kind(&self) -> &'static str {
        match self {
            SyntaxNode::Literal(_) => "literal",
            SyntaxNode::Variable(_) => "variable",
            SyntaxNode::Unary { .. } => "unary operation",
            SyntaxNode::Binary { .. } => "binary operation",
            SyntaxNode::Call { .. } => "function call",
        }
    }

    /// How tightly this node binds when printed next to an operator.
    fn precedence(&self) -> u8 {
        match self {
            SyntaxNode::Literal(value) if value.is_negative() => UNARY,
            SyntaxNode::Literal(value) if !value.is_integer() => PRODUCT,
            SyntaxNode::Literal(_)
            | SyntaxNode::Variable(_)
            | SyntaxNode::Call { .. } => ATOM,
            SyntaxNode::Unary { .. } => UNARY,
            SyntaxNode::Binary { op, .. } => op.precedence(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UnaryOperator {
    Plus,
    Negate,
}

/// An operation that can be applied to two arguments.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Times,
    Divide,
    FloorDivide,
    Modulo,
    Power,
}

const SUM: u8 = 1;
const PRODUCT: u8 = 2;
const UNARY: u8 = 3;
const POWER: u8 = 4;
const ATOM: u8 = 5;

impl BinaryOperator {
    fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Plus | BinaryOperator::Minus => SUM,
            BinaryOperator::Times
            | BinaryOperator::Divide
            | BinaryOperator::FloorDivide
            | BinaryOperator::Modulo => PRODUCT,
            BinaryOperator::Power => POWER,
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::FloorDivide => "//",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "**",
        };

        write!(f, "{}", symbol)
    }
}

impl Display for SyntaxNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxNode::Literal(value) => write!(f, "{}", value),
            SyntaxNode::Variable(name) => write!(f, "{}", name),
            SyntaxNode::Unary { op, operand } => {
                match op {
                    UnaryOperator::Plus => write!(f, "+")?,
                    UnaryOperator::Negate => write!(f, "-")?,
                }
                write_operand(operand, operand.precedence() < UNARY, f)
            },
            SyntaxNode::Binary { left, right, op } => {
                // everything is left associative except for powers
                let precedence = op.precedence();
                let (left_parens, right_parens) = match op {
                    BinaryOperator::Power => (
                        left.precedence() <= POWER,
                        right.precedence() < UNARY,
                    ),
                    _ => (
                        left.precedence() < precedence,
                        right.precedence() <= precedence,
                    ),
                };

                write_operand(left, left_parens, f)?;

                match op {
                    BinaryOperator::Plus | BinaryOperator::Minus => {
                        write!(f, " {} ", op)?
                    },
                    _ => write!(f, "{}", op)?,
                }

                write_operand(right, right_parens, f)
            },
            SyntaxNode::Call {
                function,
                arguments,
            } => {
                write!(f, "{}(", function)?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")
            },
        }
    }
}

fn write_operand(
    node: &SyntaxNode,
    parenthesize: bool,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", node)
    } else {
        write!(f, "{}", node)
    }
}
