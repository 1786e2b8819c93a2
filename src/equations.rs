use crate::{
    expr::Expr,
    ops::EvaluationError,
    poly::RationalFunction,
    solve::{self, Root, Solution},
    Error,
};
use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// What gets printed when there is nothing sensible to report as a solution.
pub const NO_SOLUTION: &str = "No solution or infinitely many solutions.";

/// The variable [`solve()`] always solves for.
pub const VARIABLE: &str = "x";

/// An equation of the form `left = right`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub left: Expr,
    pub right: Expr,
}

impl Equation {
    pub fn new(left: Expr, right: Expr) -> Self { Equation { left, right } }

    /// The expression which is zero whenever the equation holds,
    /// `left - right`.
    pub fn body(&self) -> Expr { self.left.clone() - self.right.clone() }

    /// Find every real value of `variable` which satisfies this equation.
    pub fn solve_for(&self, variable: &str) -> Result<Solution, EquationError> {
        let body = self.body();
        let not_polynomial = || EquationError::NotPolynomial {
            expression: body.clone(),
            variable: variable.into(),
        };

        let function = RationalFunction::from_expr(&body, variable)
            .ok_or_else(not_polynomial)?;
        let poles = RationalFunction::poles(&body, variable)
            .ok_or_else(not_polynomial)?;

        solve::find_roots(&function.reduced(), &poles)
    }
}

impl FromStr for Equation {
    type Err = EquationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let found = s.matches('=').count();
        if found != 1 {
            return Err(EquationError::EqualsCount { found });
        }

        let (left, right) = match s.split_once('=') {
            Some(sides) => sides,
            None => return Err(EquationError::EqualsCount { found }),
        };

        let left = evaluate_side(left, Side::Left)?;
        let right = evaluate_side(right, Side::Right)?;

        Ok(Equation::new(left, right))
    }
}

fn evaluate_side(text: &str, side: Side) -> Result<Expr, EquationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EquationError::EmptySide { side });
    }

    crate::calculate(text).map_err(|e| EquationError::Side {
        side,
        source: Box::new(e),
    })
}

/// Solve an equation for `x`, producing the message shown to the user.
///
/// Equations with no real solutions (or infinitely many) aren't errors, they
/// produce [`NO_SOLUTION`].
pub fn solve(text: &str) -> Result<String, EquationError> {
    let solution = text
        .parse::<Equation>()
        .and_then(|equation| equation.solve_for(VARIABLE));

    match solution {
        Ok(Solution::Roots(roots)) => {
            log::info!("Solutions for {}: [{}]", text, list(&roots));
            Ok(format!("Solution: {} = {}", VARIABLE, roots[0]))
        },
        Ok(other) => {
            log::warn!("No unique solution for {} ({:?})", text, other);
            Ok(NO_SOLUTION.to_string())
        },
        Err(e) => {
            log::error!("Unable to solve {}: {}", text, e);
            Err(e)
        },
    }
}

fn list(roots: &[Root]) -> String {
    roots
        .iter()
        .map(Root::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which side of the `=` something came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EquationError {
    #[error("an equation needs exactly one \"=\", found {found}")]
    EqualsCount { found: usize },
    #[error("the {side} side of the equation is empty")]
    EmptySide { side: Side },
    #[error("unable to evaluate the {side} side of the equation: {source}")]
    Side { side: Side, source: Box<Error> },
    #[error("{expression} is not a polynomial in {variable}")]
    NotPolynomial { expression: Expr, variable: SmolStr },
    #[error(
        "unable to solve a degree {degree} equation with symbolic coefficients"
    )]
    Nonlinear { degree: usize },
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
