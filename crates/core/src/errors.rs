use thiserror::Error;

pub const EMPTY_SEARCH_MESSAGE: &str = "Suche darf nicht leer sein";
pub const EMPTY_UUID_MESSAGE: &str = "UUID darf nicht leer sein";
pub const API_FAILURE_MESSAGE: &str = "Fehler beim Api Request";

/// Failure of a single archive API call. Detail is for logs only.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("archive request failed: {0}")]
    Transport(String),
    #[error("archive answered with unexpected status {code}")]
    UnexpectedStatus { code: u16 },
    #[error("archive has no recording `{id}`")]
    NotFound { id: String },
    #[error("archive response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Argument {
    Query,
    Uuid,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("required {argument:?} argument is empty")]
    EmptyArgument { argument: Argument },
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CommandError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyArgument { argument: Argument::Query } => EMPTY_SEARCH_MESSAGE,
            Self::EmptyArgument { argument: Argument::Uuid } => EMPTY_UUID_MESSAGE,
            Self::Api(_) => API_FAILURE_MESSAGE,
        }
    }
}
