//! Operations on [`ExprTree`]s and [`Expr`]s.

use crate::{
    expr::Expr,
    poly::RationalFunction,
    tree::{ExprTree, Operator},
};
use num::BigRational;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("the exponent {exponent} is too large")]
    ExponentTooLarge { exponent: BigRational },
}

/// Reduce an [`ExprTree`] to a single exact value, bottom-up.
pub fn evaluate(tree: &ExprTree) -> Result<Expr, EvaluationError> {
    match tree {
        ExprTree::Leaf(value) => Ok(value.clone()),
        ExprTree::Operation(op, left, right) => {
            let left = evaluate(left)?;
            let right = evaluate(right)?;
            apply(*op, left, right)
        },
    }
}

/// Apply a single [`Operator`] to two values.
pub fn apply(
    op: Operator,
    left: Expr,
    right: Expr,
) -> Result<Expr, EvaluationError> {
    match op {
        Operator::Add => Ok(left + right),
        Operator::Subtract => Ok(left - right),
        Operator::Multiply => Ok(left * right),
        Operator::Divide => left.checked_div(&right),
        Operator::Power => left.pow(&right),
    }
}

/// Try to tidy up a value.
///
/// Anything which is a ratio of polynomials in a single variable with
/// rational coefficients gets written as `N/D`, with common factors
/// cancelled. Everything else is returned as-is.
pub fn simplify(value: &Expr) -> Expr {
    let symbols = value.symbols();
    let variable = match symbols.iter().next() {
        Some(variable) if symbols.len() == 1 => variable,
        _ => return value.clone(),
    };

    match RationalFunction::from_expr(value, variable) {
        Some(function) if function.is_rational() => {
            match function.reduced().to_expr(variable) {
                Ok(simplified) => simplified,
                Err(e) => {
                    log::debug!("Unable to simplify {}: {}", value, e);
                    value.clone()
                },
            }
        },
        _ => value.clone(),
    }
}
