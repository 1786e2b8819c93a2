use crate::{
    equations::EquationError, ops::EvaluationError, parse::ParseError,
    tree::BuildError,
};

/// Everything that can go wrong while handling a line of input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Equation(#[from] EquationError),
}
