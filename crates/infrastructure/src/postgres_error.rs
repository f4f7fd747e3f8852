use orbita_core::AppError;

/// Maps a driver error to the application error space.
///
/// Connection-level failures are reported as unavailable so callers may
/// retry; everything else is internal.
pub(crate) fn map_database_error(context: &str, error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => {
            AppError::Unavailable(format!("failed to {context}: {error}"))
        }
        error => AppError::Internal(format!("failed to {context}: {error}")),
    }
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23505")
    )
}

#[cfg(test)]
mod tests {
    use orbita_core::AppError;

    use super::{is_unique_violation, map_database_error};

    #[test]
    fn pool_exhaustion_is_transient() {
        let error = map_database_error("load profile", sqlx::Error::PoolTimedOut);
        assert!(matches!(error, AppError::Unavailable(ref message) if message.starts_with("failed to load profile")));
        assert!(error.is_transient());
    }

    #[test]
    fn missing_row_is_internal() {
        let error = map_database_error("load profile", sqlx::Error::RowNotFound);
        assert!(matches!(error, AppError::Internal(_)));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
