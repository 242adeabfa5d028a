use crate::dist::DistError;
use squiggle_ast::span::Span;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("{0} is not defined")]
    SymbolNotFound(String),
    #[error("{message}: {}", crate::value::format_number(*index))]
    ArrayIndexNotFound { message: String, index: f64 },
    #[error("{message}: {key}")]
    DictPropertyNotFound { message: String, key: String },
    #[error("Can't access a property of a value of type {type_name}")]
    NotIndexable { type_name: String },
    #[error("{0} is not a function")]
    NotAFunction(String),
    #[error("{expected} arguments expected. Instead {given} argument(s) were passed.")]
    Arity { expected: usize, given: usize },
    #[error("Parameter {value} must be in domain {domain}")]
    Domain { value: String, domain: String },
    #[error("There are function matches for {name}(), but with different arguments: {signatures}")]
    NoMatchingDefinition { name: String, signatures: String },
    #[error("Expected type: {expected} but got: {found}")]
    ExpectedType { expected: String, found: String },
    #[error("Distribution Math Error: {0}")]
    Distribution(#[from] DistError),
    #[error("Maximum call stack size exceeded")]
    StackOverflow,
    #[error("{0}")]
    Other(String),
    #[error("{kind}")]
    Traced { kind: Box<RuntimeError>, spans: Vec<Span> },
}

impl RuntimeError {
    pub fn other<S: Into<String>>(msg: S) -> Self {
        RuntimeError::Other(msg.into())
    }

    /// The error with any trace stripped.
    pub fn kind(&self) -> &RuntimeError {
        match self {
            RuntimeError::Traced { kind, .. } => kind.kind(),
            other => other,
        }
    }

    /// Innermost recorded location.
    pub fn location(&self) -> Option<Span> {
        match self {
            RuntimeError::Traced { spans, .. } => spans.first().copied(),
            _ => None,
        }
    }

    /// Record `span` as the next frame while the error unwinds.
    pub fn with_span(self, span: Span) -> Self {
        match self {
            RuntimeError::Traced { kind, mut spans } => {
                if spans.last() != Some(&span) {
                    spans.push(span);
                }
                RuntimeError::Traced { kind, spans }
            }
            other => RuntimeError::Traced { kind: Box::new(other), spans: vec![span] },
        }
    }
}

/// Anything that can go wrong between source text and a value.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SquiggleError {
    #[error("{0}")]
    Parse(#[from] squiggle_parser::ParseError),
    #[error("{0}")]
    Compile(#[from] squiggle_expr::CompileError),
    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}

impl SquiggleError {
    pub fn location(&self) -> Option<Span> {
        match self {
            SquiggleError::Parse(e) => Some(e.span()),
            SquiggleError::Compile(e) => Some(e.span()),
            SquiggleError::Runtime(e) => e.location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_accumulate_outward() {
        let e = RuntimeError::SymbolNotFound("x".into())
            .with_span(Span::new(4, 1))
            .with_span(Span::new(0, 8));
        assert_eq!(e.to_string(), "x is not defined");
        assert_eq!(e.location(), Some(Span::new(4, 1)));
        assert_eq!(e.kind(), &RuntimeError::SymbolNotFound("x".into()));
    }
}
