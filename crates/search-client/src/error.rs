use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Protocol { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    Format(String),

    #[error("{0}")]
    Application(String),
}

impl SearchError {
    /// Short label for the failure class, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::EmptyQuery => "empty_query",
            SearchError::Network(_) => "network",
            SearchError::Protocol { .. } => "protocol",
            SearchError::Format(_) => "format",
            SearchError::Application(_) => "application",
        }
    }
}

pub type SearchResult<T> = Result<T, SearchError>;
