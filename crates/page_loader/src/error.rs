use html::{DomError, Id, SelectorError};
use net::FetchError;
use std::fmt;

#[derive(Debug)]
pub enum LoaderError {
    /// Nothing on the element or its form yields a URL.
    NoUrl(Id),
    InvalidUrl { url: String, message: String },
    Selector(SelectorError),
    Transport(FetchError),
    UnknownElement(Id),
    Dom(DomError),
    /// The runtime side of the bus is gone.
    Disconnected,
    Config(String),
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::NoUrl(id) => {
                write!(f, "the element URL has not been found for the page loader ({id:?})")
            }
            LoaderError::InvalidUrl { url, message } => write!(f, "invalid URL `{url}`: {message}"),
            LoaderError::Selector(err) => write!(f, "{err}"),
            LoaderError::Transport(err) => write!(f, "{err}"),
            LoaderError::UnknownElement(id) => write!(f, "{id:?} is not an element of the page"),
            LoaderError::Dom(err) => write!(f, "{err}"),
            LoaderError::Disconnected => write!(f, "network runtime is not running"),
            LoaderError::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for LoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoaderError::Selector(err) => Some(err),
            LoaderError::Transport(err) => Some(err),
            LoaderError::Dom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SelectorError> for LoaderError {
    fn from(err: SelectorError) -> Self {
        LoaderError::Selector(err)
    }
}

impl From<FetchError> for LoaderError {
    fn from(err: FetchError) -> Self {
        LoaderError::Transport(err)
    }
}

impl From<DomError> for LoaderError {
    fn from(err: DomError) -> Self {
        LoaderError::Dom(err)
    }
}
