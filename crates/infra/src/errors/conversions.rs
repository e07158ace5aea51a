//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use calrelay_domain::CalRelayError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CalRelayError);

impl From<InfraError> for CalRelayError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CalRelayError> for InfraError {
    fn from(value: CalRelayError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCalRelayError {
    fn into_calrelay(self) -> CalRelayError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CalRelayError */
/* -------------------------------------------------------------------------- */

impl IntoCalRelayError for HttpError {
    fn into_calrelay(self) -> CalRelayError {
        if self.is_timeout() {
            return CalRelayError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CalRelayError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return CalRelayError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return CalRelayError::Serialization(format!("invalid response body: {self}"));
        }

        CalRelayError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_calrelay())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → CalRelayError */
/* -------------------------------------------------------------------------- */

impl IntoCalRelayError for IoError {
    fn into_calrelay(self) -> CalRelayError {
        match self.kind() {
            ErrorKind::NotFound => CalRelayError::NotFound(self.to_string()),
            _ => CalRelayError::Storage(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_calrelay())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → CalRelayError */
/* -------------------------------------------------------------------------- */

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(CalRelayError::Serialization(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
