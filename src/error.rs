//! Return values from loader calls.

use thiserror::Error;

/// Failures reported by the loader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// None of the candidate names of a required library could be opened.
    #[error("unable to open any of {candidates:?}")]
    ResourceUnavailable {
        /// Names tried, in order.
        candidates: Vec<String>,
    },
    /// An entry point needed to bootstrap a context could not be resolved.
    ///
    /// Entry points of the general catalogue never produce this error, they
    /// are left unresolved in the table instead.
    #[error("required entry point `{0}` could not be resolved")]
    SymbolMissing(&'static str),
    /// The bootstrap window, pixel format, visual, color map or context
    /// could not be created.
    #[error("bootstrap surface creation failed: {0}")]
    SurfaceCreation(&'static str),
    /// A surface/context pair could not be made current.
    #[error("unable to make the context current")]
    MakeCurrent,
    /// A required output table was not supplied.
    #[error("a required output argument is missing")]
    InvalidArgument,
    /// The operation needs the bootstrap state, which only exists between
    /// `init` and the matching `uninit`.
    #[error("the loader has not been initialized")]
    NotInitialized,
}

impl Error {
    /// The coarse result code of this error.
    pub fn code(&self) -> ErrorCode {
        match *self {
            Error::InvalidArgument => ErrorCode::InvalidArgument,
            _ => ErrorCode::OperationFailed,
        }
    }
}

/// The closed set of result codes surfaced to callers that only care about
/// the outcome category.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum ErrorCode {
    Success,
    /// A required output argument was missing.
    InvalidArgument,
    /// Library, symbol, surface, context or make-current failure.
    OperationFailed,
}

impl<T> From<&Result<T, Error>> for ErrorCode {
    fn from(result: &Result<T, Error>) -> Self {
        match *result {
            Ok(_) => ErrorCode::Success,
            Err(ref e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidArgument.code(), ErrorCode::InvalidArgument);
        assert_eq!(Error::NotInitialized.code(), ErrorCode::OperationFailed);
        assert_eq!(Error::MakeCurrent.code(), ErrorCode::OperationFailed);
        assert_eq!(
            Error::SymbolMissing("glXMakeCurrent").code(),
            ErrorCode::OperationFailed
        );

        let ok: Result<(), Error> = Ok(());
        assert_eq!(ErrorCode::from(&ok), ErrorCode::Success);
        let failed: Result<(), Error> = Err(Error::SurfaceCreation("no visual"));
        assert_eq!(ErrorCode::from(&failed), ErrorCode::OperationFailed);
    }
}
