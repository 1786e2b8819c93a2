//! An exact calculator.
//!
//! Text is parsed into a [`SyntaxNode`], lowered into an [`ExprTree`], then
//! evaluated into an exact [`Expr`]. Equations in `x` are handed to the
//! solver instead.

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod equations;
mod error;
mod expr;
pub mod logging;
pub mod ops;
mod parse;
mod poly;
mod radical;
mod session;
mod solve;
mod syntax;
mod tree;

pub use equations::{
    solve, Equation, EquationError, Side, NO_SOLUTION, VARIABLE,
};
pub use error::Error;
pub use expr::{Atom, Expr, Monomial};
pub use parse::{parse, ParseError, TokenKind};
pub use poly::{Polynomial, RationalFunction};
pub use session::{process, Options, Session};
pub use solve::{Root, Solution};
pub use syntax::{BinaryOperator, SyntaxNode, UnaryOperator};
pub use tree::{build, BuildError, ExprTree, Operator};

/// Parse, build and evaluate an arithmetic expression.
pub fn calculate(text: &str) -> Result<Expr, Error> {
    let node = parse(text)?;
    let tree = build(&node)?;
    let value = ops::evaluate(&tree)?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculate_the_example() {
        let got = calculate("5 + 3*(2 - 1)").unwrap();

        assert_eq!(got, Expr::from(8));
    }

    #[test]
    fn each_stage_has_its_own_error() {
        assert!(matches!(calculate("5 $ 3"), Err(Error::Parse(_))));
        assert!(matches!(calculate("5 // 2"), Err(Error::Build(_))));
        assert!(matches!(calculate("sin(1)"), Err(Error::Build(_))));
        assert!(matches!(calculate("1/0"), Err(Error::Evaluation(_))));
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let src = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));

        let got = calculate(&src);

        assert!(matches!(
            got,
            Err(Error::Parse(ParseError::TooDeeplyNested { .. }))
        ));
    }

    #[test]
    fn parse_an_expr_directly() {
        let got: Expr = "(x + 1)^2".parse().unwrap();

        assert_eq!(got.to_string(), "x^2 + 2*x + 1");
    }
}
