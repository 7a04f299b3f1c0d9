// Status codes modelled on the gRPC status codes, so that callers can
// handle any error from the index generically.
use std::error::Error;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrorCodes {
    // INVALID_ARGUMENT indicates the caller passed a malformed point, range or parameter.
    InvalidArgument = 3,
    // FAILED_PRECONDITION indicates the index is not in a state required for the operation.
    FailedPrecondition = 9,
}

impl ErrorCodes {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCodes::InvalidArgument => "InvalidArgumentError",
            ErrorCodes::FailedPrecondition => "FailedPreconditionError",
        }
    }
}

pub trait VaError: Error + Send {
    fn code(&self) -> ErrorCodes;
    fn boxed(self) -> Box<dyn VaError>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl Error for Box<dyn VaError> {}

impl VaError for Box<dyn VaError> {
    fn code(&self) -> ErrorCodes {
        self.as_ref().code()
    }
}
