use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source content and filename shared by every error raised for one manifest.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    pub fn validation_error(
        &self,
        message: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }

    pub fn invalid_id_error(
        &self,
        value: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::InvalidId {
            src: self.named_source(),
            span,
            value: value.into(),
            field: field.into(),
            reason: reason.into(),
        })
    }

    pub fn duplicate_entry_error(
        &self,
        name: impl Into<String>,
        kind: impl Into<String>,
        first_span: Option<SourceSpan>,
        second_span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::DuplicateEntry {
            src: self.named_source(),
            first_span,
            second_span,
            name: name.into(),
            kind: kind.into(),
        })
    }

    pub fn unknown_parent_error(
        &self,
        name: impl Into<String>,
        parent: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::UnknownParent {
            src: self.named_source(),
            span,
            name: name.into(),
            parent: parent.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("create an enlist.toml with a [registrar] table"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse enlist.toml")]
    #[diagnostic(code(enlist::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {field} '{value}'")]
    #[diagnostic(
        code(enlist::invalid_id),
        help("{reason}. Ids look like `namespace:path`, using lowercase letters, digits, `_`, `-`, `.` and `/`.")
    )]
    InvalidId {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid {field}")]
        span: Option<SourceSpan>,
        value: String,
        field: String,
        reason: String,
    },

    #[error("entry '{name}' of kind `{kind}` is declared twice")]
    #[diagnostic(
        code(enlist::duplicate_entry),
        help("remove one of the entries, or give it a different name or kind")
    )]
    DuplicateEntry {
        #[source_code]
        src: NamedSource<String>,
        #[label("first declared here")]
        first_span: Option<SourceSpan>,
        #[label("declared again here")]
        second_span: Option<SourceSpan>,
        name: String,
        kind: String,
    },

    #[error("entry '{name}' has no parent of kind `{parent}`")]
    #[diagnostic(
        code(enlist::unknown_parent),
        help("declare an entry named '{name}' of kind `{parent}` before this one")
    )]
    UnknownParent {
        #[source_code]
        src: NamedSource<String>,
        #[label("no such parent")]
        span: Option<SourceSpan>,
        name: String,
        parent: String,
    },

    #[error("{message}")]
    #[diagnostic(code(enlist::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },
}
