//! Conversions from external infrastructure errors into domain errors.

use assessor_domain::AssessorError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use tokio_tungstenite::tungstenite::Error as SocketError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AssessorError);

impl From<InfraError> for AssessorError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AssessorError> for InfraError {
    fn from(value: AssessorError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoAssessorError {
    fn into_assessor(self) -> AssessorError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → AssessorError */
/* -------------------------------------------------------------------------- */

impl IntoAssessorError for HttpError {
    fn into_assessor(self) -> AssessorError {
        if self.is_timeout() {
            return AssessorError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return AssessorError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return AssessorError::Config(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 => AssessorError::Auth(message),
                403 => AssessorError::Forbidden(message),
                404 => AssessorError::NotFound(message),
                400..=499 => AssessorError::InvalidInput(message),
                _ => AssessorError::Server(message),
            };
        }

        if self.is_decode() {
            return AssessorError::Decode(format!("HTTP response body: {self}"));
        }

        AssessorError::Network(format!("HTTP error: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_assessor())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → AssessorError */
/* -------------------------------------------------------------------------- */

impl IntoAssessorError for std::io::Error {
    fn into_assessor(self) -> AssessorError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => AssessorError::NotFound(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                AssessorError::Storage(format!("permission denied: {self}"))
            }
            _ => AssessorError::Storage(format!("I/O failure: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        Self(value.into_assessor())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → AssessorError */
/* -------------------------------------------------------------------------- */

impl IntoAssessorError for JsonError {
    fn into_assessor(self) -> AssessorError {
        AssessorError::Decode(format!("invalid JSON at line {} column {}: {self}", self.line(), self.column()))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(value.into_assessor())
    }
}

/* -------------------------------------------------------------------------- */
/* tungstenite::Error → AssessorError */
/* -------------------------------------------------------------------------- */

impl IntoAssessorError for SocketError {
    fn into_assessor(self) -> AssessorError {
        match self {
            SocketError::ConnectionClosed | SocketError::AlreadyClosed => {
                AssessorError::Network("live connection closed".into())
            }
            SocketError::Url(err) => AssessorError::Config(format!("invalid live URL: {err}")),
            SocketError::Http(response) => AssessorError::Network(format!(
                "live handshake rejected with status {}",
                response.status()
            )),
            other => AssessorError::Network(format!("live connection error: {other}")),
        }
    }
}

impl From<SocketError> for InfraError {
    fn from(value: SocketError) -> Self {
        Self(value.into_assessor())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "credentials.json");
        let mapped: AssessorError = InfraError::from(err).into();
        assert!(matches!(mapped, AssessorError::NotFound(_)));
    }

    #[test]
    fn io_other_maps_to_storage() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let mapped: AssessorError = InfraError::from(err).into();
        assert!(matches!(mapped, AssessorError::Storage(msg) if msg.contains("disk full")));
    }

    #[test]
    fn json_error_maps_to_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let mapped: AssessorError = InfraError::from(err).into();
        assert!(matches!(mapped, AssessorError::Decode(msg) if msg.contains("line 1")));
    }

    #[test]
    fn closed_socket_maps_to_network() {
        let mapped: AssessorError = InfraError::from(SocketError::ConnectionClosed).into();
        assert_eq!(mapped, AssessorError::Network("live connection closed".into()));
    }

    #[tokio::test]
    async fn http_status_errors_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = Client::new()
            .get(server.uri())
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap_err();

        let mapped: AssessorError = InfraError::from(err).into();
        assert!(matches!(mapped, AssessorError::Forbidden(msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn connection_refused_maps_to_network() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = Client::new().get(format!("http://{addr}")).send().await.unwrap_err();
        let mapped: AssessorError = InfraError::from(err).into();
        assert!(matches!(mapped, AssessorError::Network(_)));
    }
}
