use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DateRangeError {
    #[error("no second date in header line '{0}'")]
    MissingUntilDate(String),
    #[error("invalid date token '{0}'")]
    InvalidDate(String),
}

/// Failures that abort parsing of a single document (one PDF page or one
/// markup day). Callers log these and continue with the other documents.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("page contains no date header")]
    MissingDateHeader,
    #[error("malformed date header: {0}")]
    DateHeader(#[from] DateRangeError),
    #[error("markup contains no meal container")]
    MissingContainer,
    #[error("expected category header, found <{0}>")]
    HeaderExpected(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("{0} has no MaxManager location")]
    NoMaxManagerSource(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
