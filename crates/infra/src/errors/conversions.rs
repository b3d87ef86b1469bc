//! Conversions from external infrastructure errors into domain errors.

use amocrm_domain::AmoError;
use r2d2::Error as PoolError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AmoError);

impl From<InfraError> for AmoError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AmoError> for InfraError {
    fn from(value: AmoError) -> Self {
        Self(value)
    }
}

/// Shorthand for `InfraError::from(err).into()` at `map_err` call sites.
pub fn into_domain<E>(err: E) -> AmoError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}

trait IntoAmoError {
    fn into_amo(self) -> AmoError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → AmoError */
/* -------------------------------------------------------------------------- */

impl IntoAmoError for SqlError {
    fn into_amo(self) -> AmoError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => AmoError::Storage("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        AmoError::Storage("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 1555 | 2067) => {
                        AmoError::Storage(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ReadOnly, _) => AmoError::Storage("database is read-only".into()),
                    _ => AmoError::Storage(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => AmoError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                AmoError::Storage(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                AmoError::Storage(format!("invalid column type for '{name}': {ty}"))
            }
            RE::InvalidPath(path) => {
                AmoError::Storage(format!("invalid database path: {}", path.to_string_lossy()))
            }
            other => AmoError::Storage(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        Self(value.into_amo())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → AmoError */
/* -------------------------------------------------------------------------- */

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        Self(AmoError::Storage(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → AmoError */
/* -------------------------------------------------------------------------- */

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        if value.is_cancelled() {
            Self(AmoError::Internal("blocking task was cancelled".into()))
        } else {
            Self(AmoError::Internal(format!("blocking task panicked: {value}")))
        }
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → AmoError */
/* -------------------------------------------------------------------------- */

impl IntoAmoError for HttpError {
    fn into_amo(self) -> AmoError {
        if self.is_timeout() {
            return AmoError::Transport("HTTP request timed out".into());
        }

        if self.is_connect() {
            return AmoError::Transport(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return AmoError::Decode(format!("failed to read response body: {self}"));
        }

        if self.is_builder() {
            return AmoError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
            return AmoError::api(code, message);
        }

        AmoError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_amo())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
