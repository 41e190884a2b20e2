use std::fmt;

/// Error type for every stage of the generation chain
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Remote credential is not configured
    CredentialMissing(String)
  , /// Connection, DNS, TLS or timeout failure
    TransportFailure(String)
  , /// Endpoint answered with a non-2xx status
    NonSuccessStatus
    {   status: u16
      , body: String
    }
  , /// 2xx response whose body could not be used
    MalformedResponse(String)
  , /// No local model could be initialized
    ModelUnavailable(String)
  , /// Local model failed while generating
    GenerationException(String)
  , /// Generated text held no HTML document
    ExtractionNotFound
  , /// Extracted text is not a document
    ValidationFailed(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

/// Fieldless classification of [`Error`], carried by
/// [`crate::request::GenerationResult::Failure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind
{   CredentialMissing
  , TransportFailure
  , NonSuccessStatus
  , MalformedResponse
  , ModelUnavailable
  , GenerationException
  , ExtractionNotFound
  , ValidationFailed
  , InvalidConfiguration
  , Other
}

impl Error
{   pub fn kind(&self) -> ErrorKind
    {   match self
        {   Error::CredentialMissing(_) => ErrorKind::CredentialMissing
          , Error::TransportFailure(_) => ErrorKind::TransportFailure
          , Error::NonSuccessStatus { .. } => ErrorKind::NonSuccessStatus
          , Error::MalformedResponse(_) => ErrorKind::MalformedResponse
          , Error::ModelUnavailable(_) => ErrorKind::ModelUnavailable
          , Error::GenerationException(_) => {
              ErrorKind::GenerationException
            }
          , Error::ExtractionNotFound => ErrorKind::ExtractionNotFound
          , Error::ValidationFailed(_) => ErrorKind::ValidationFailed
          , Error::InvalidConfiguration(_) => {
              ErrorKind::InvalidConfiguration
            }
          , Error::Other(_) => ErrorKind::Other
        }
    }

    /// True when the endpoint refused the request for rate limiting
    pub fn is_rate_limited(&self) -> bool
    {   matches!(self, Error::NonSuccessStatus { status: 429, .. })
    }
}

impl ErrorKind
{   /// Transient kinds skip a backend for one request only.
    /// `ModelUnavailable` is memoized for the process lifetime.
    pub fn is_transient(&self) -> bool
    {   !matches!(
          self,
          ErrorKind::ModelUnavailable
            | ErrorKind::CredentialMissing
            | ErrorKind::InvalidConfiguration
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::CredentialMissing(var) => {
              write!(f, "Missing API credential: {}", var)
            }
          , Error::TransportFailure(msg) => {
              write!(f, "Transport failure: {}", msg)
            }
          , Error::NonSuccessStatus { status, body } => {
              write!(f,
                "Endpoint returned status {}: {}",
                status, body
              )
            }
          , Error::MalformedResponse(msg) => {
              write!(f, "Malformed response: {}", msg)
            }
          , Error::ModelUnavailable(msg) => {
              write!(f, "Local model unavailable: {}", msg)
            }
          , Error::GenerationException(msg) => {
              write!(f, "Generation failed: {}", msg)
            }
          , Error::ExtractionNotFound => {
              write!(f, "No HTML document found in generated text")
            }
          , Error::ValidationFailed(msg) => {
              write!(f, "Extracted HTML rejected: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl fmt::Display for ErrorKind
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
