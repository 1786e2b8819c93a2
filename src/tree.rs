//! Lowering the parser's [`SyntaxNode`] into the operator tree the evaluator
//! works with.

use crate::{
    expr::Expr,
    syntax::{BinaryOperator, SyntaxNode, UnaryOperator},
};
use num::{BigRational, One};
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

/// A tree of binary operations over exact values.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprTree {
    Leaf(Expr),
    Operation(Operator, Box<ExprTree>, Box<ExprTree>),
}

impl ExprTree {
    pub fn operation(op: Operator, left: ExprTree, right: ExprTree) -> Self {
        ExprTree::Operation(op, Box::new(left), Box::new(right))
    }
}

/// The operations an [`ExprTree`] can contain.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
        };

        write!(f, "{}", symbol)
    }
}

impl Display for ExprTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ExprTree::Leaf(value) => write!(f, "{}", value),
            ExprTree::Operation(op, left, right) => {
                write!(f, "({} {} {})", left, op, right)
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("unsupported {kind}: {name}")]
    UnsupportedNode { kind: &'static str, name: SmolStr },
    #[error("unsupported operator: {operator}")]
    UnsupportedOperator { operator: BinaryOperator },
}

/// Convert a [`SyntaxNode`] into an [`ExprTree`].
pub fn build(node: &SyntaxNode) -> Result<ExprTree, BuildError> {
    match node {
        SyntaxNode::Literal(value) => {
            Ok(ExprTree::Leaf(Expr::constant(value.clone())))
        },
        SyntaxNode::Variable(name) => {
            Ok(ExprTree::Leaf(Expr::symbol(name.clone())))
        },
        SyntaxNode::Unary {
            op: UnaryOperator::Plus,
            operand,
        } => build(operand),
        SyntaxNode::Unary {
            op: UnaryOperator::Negate,
            operand,
        } => match &**operand {
            SyntaxNode::Literal(value) => {
                Ok(ExprTree::Leaf(Expr::constant(-value.clone())))
            },
            other => Ok(ExprTree::operation(
                Operator::Multiply,
                ExprTree::Leaf(Expr::constant(-BigRational::one())),
                build(other)?,
            )),
        },
        SyntaxNode::Binary { left, right, op } => {
            let op = operator(*op)?;
            Ok(ExprTree::operation(op, build(left)?, build(right)?))
        },
        SyntaxNode::Call { function, .. } => Err(BuildError::UnsupportedNode {
            kind: node.kind(),
            name: function.clone(),
        }),
    }
}

fn operator(op: BinaryOperator) -> Result<Operator, BuildError> {
    match op {
        BinaryOperator::Plus => Ok(Operator::Add),
        BinaryOperator::Minus => Ok(Operator::Subtract),
        BinaryOperator::Times => Ok(Operator::Multiply),
        BinaryOperator::Divide => Ok(Operator::Divide),
        BinaryOperator::Power => Ok(Operator::Power),
        BinaryOperator::FloorDivide | BinaryOperator::Modulo => {
            Err(BuildError::UnsupportedOperator { operator: op })
        },
    }
}
