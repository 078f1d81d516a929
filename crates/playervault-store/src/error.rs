//! Error types for the store layer.

/// Errors from the record store.
///
/// The acquisition protocol absorbs all of these at its boundary and
/// fails closed (deny); nothing above the store layer needs to match on
/// the individual variants outside of tests and operator logs.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Could not check a connection out of the pool — the store is
    /// unreachable or the pool is exhausted past its wait timeout.
    #[error("store connection unavailable: {0}")]
    Pool(#[from] r2d2::Error),

    /// A statement failed to prepare or execute. Also covers a row that
    /// came back with an impossible shape (schema mismatch / corruption),
    /// which rusqlite reports as a column conversion error.
    #[error("store query failed: {0}")]
    Sql(#[from] rusqlite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sql_error_preserves_message() {
        let err: StoreError =
            rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, StoreError::Sql(_)));
        assert!(err.to_string().contains("store query failed"));
    }
}
