use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum YBusError {
    /// Out-of-range bus index or malformed shunt pointer array.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Input cardinality disagrees with the topology.
    #[error("size mismatch: {what} has {actual} entries, expected {expected}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("sparse matrix error: {0}")]
    Sparse(String),
}

pub type Result<T> = std::result::Result<T, YBusError>;

pub(crate) fn check_size(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(YBusError::SizeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
