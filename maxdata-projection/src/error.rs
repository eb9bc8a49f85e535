use thiserror::Error;

pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors raised while parsing a projection spec.
///
/// The projector never surfaces these: a spec that fails to parse is
/// treated as a reference to an unknown property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("empty projection spec")]
    Empty,

    #[error("unbalanced parentheses in {0}")]
    UnbalancedParens(String),

    #[error("empty argument in {0}")]
    EmptyArgument(String),

    #[error("empty property name in {0}")]
    EmptyProperty(String),

    #[error("empty alias in {0}")]
    EmptyAlias(String),

    #[error("malformed filter term {0}")]
    MalformedFilter(String),

    #[error("unexpected input after call: {0}")]
    TrailingInput(String),
}
