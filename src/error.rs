use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of failure a caller may want to react to differently, e.g. by showing "not found"
/// instead of a generic error.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// No record matched the given id or username.
    NotFound,
    /// The record already exists, e.g. a username that is taken.
    Conflict,
    /// A value supplied by the caller was rejected.
    Validation,
    /// Credentials did not match.
    Unauthorized,
    /// A backing file could not be read or written.
    Io,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error that has been tagged with an `ErrorType` before crossing a public boundary.
struct Tagged {
    error_type: ErrorType,
    inner: Error,
}

impl Debug for Tagged {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Tagged {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Tagged {}

/// Tags the error of a `Result` with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let inner: Error = e.into();
            // Keep the innermost tag.
            if error_type_of(&inner).is_some() {
                return inner;
            }
            Error::new(Tagged { error_type, inner })
        })
    }
}

fn error_type_of(e: &Error) -> Option<ErrorType> {
    e.chain()
        .find_map(|cause| cause.downcast_ref::<Tagged>())
        .map(|tagged| tagged.error_type)
}

/// Returns the `ErrorType` an error was tagged with, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    error_type_of(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_tag_is_recoverable() {
        let result: Result<()> = Err(anyhow!("Transaction 7 not found")).pub_result(ErrorType::NotFound);
        let e = result.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::NotFound));
        assert_eq!(e.to_string(), "Transaction 7 not found");
    }

    #[test]
    fn test_innermost_tag_wins() {
        let inner: Result<()> = Err(anyhow!("disk full")).pub_result(ErrorType::Io);
        let outer = inner.pub_result(ErrorType::Validation).unwrap_err();
        assert_eq!(error_type(&outer), Some(ErrorType::Io));
    }

    #[test]
    fn test_untagged() {
        let e = anyhow!("plain");
        assert_eq!(error_type(&e), None);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(ErrorType::NotFound.to_string(), "not_found");
        assert_eq!("conflict".parse::<ErrorType>().unwrap(), ErrorType::Conflict);
    }
}
