use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("Syntax error: {message}")]
    #[diagnostic(code(margay::parse::syntax))]
    Syntax {
        message: String,
        #[label("here")]
        span: miette::SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, start: usize, end: usize, source: &str) -> Self {
        ParseError::Syntax {
            message: message.into(),
            span: (start, end.saturating_sub(start).max(1)).into(),
            src: miette::NamedSource::new("<formula>", source.to_string()),
        }
    }
}
