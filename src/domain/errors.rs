/// Coarse classification shared by every engine error, so that the outer layer can map
/// failures onto its own responses without matching each engine's enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InsufficientResource,
    InvalidInput,
    Internal,
}

pub trait ClassifiedError {
    fn kind(&self) -> ErrorKind;
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::Constructor)]
#[display("DomainAssertionError for value {}: {}", value, message)]
pub struct DomainAssertionError<T: std::fmt::Display + std::fmt::Debug> {
    value: T,
    message: &'static str
}
