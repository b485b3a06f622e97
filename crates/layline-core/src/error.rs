use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    #[error("coordinate {0} does not fit the target unit")]
    OutOfRange(f64),
}
