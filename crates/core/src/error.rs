use thiserror::Error;

pub const TEMPORARY_CONNECTIVITY_MESSAGE: &str =
    "Ocorreu um erro temporário de conexão com o Google Maps. Por favor, tente novamente.";

pub const GENERIC_FAILURE_MESSAGE: &str = "Ocorreu um erro ao buscar os locais. Tente novamente.";

const TRANSIENT_MARKERS: [&str; 2] = ["Rpc failed", "500"];

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{}", TEMPORARY_CONNECTIVITY_MESSAGE)]
    TemporaryConnectivity,

    #[error("provider returned {status}: {details}")]
    Provider { status: u16, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Request(String),

    #[error("query is empty")]
    EmptyQuery,

    #[error("no Gemini API key configured (set GEMINI_API_KEY)")]
    MissingCredential,

    #[error("{0}")]
    GeolocationUnavailable(String),
}

fn mentions_transient_marker(text: &str) -> bool {
    TRANSIENT_MARKERS.iter().any(|marker| text.contains(marker))
}

impl SearchError {
    /// Server-side or RPC-level failure that is worth resubmitting.
    pub fn is_transient(&self) -> bool {
        match self {
            SearchError::TemporaryConnectivity => true,
            SearchError::Provider { status, details } => {
                *status >= 500 || mentions_transient_marker(details)
            }
            SearchError::Http(error) => error.status().is_some_and(|s| s.is_server_error()),
            SearchError::Request(message) => mentions_transient_marker(message),
            SearchError::Url(_)
            | SearchError::Serialization(_)
            | SearchError::EmptyQuery
            | SearchError::MissingCredential
            | SearchError::GeolocationUnavailable(_) => false,
        }
    }

    pub fn into_user_facing(self) -> SearchError {
        if self.is_transient() {
            SearchError::TemporaryConnectivity
        } else {
            self
        }
    }

    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_mentioning_500_maps_to_temporary_connectivity() {
        let error = SearchError::Request("upstream said 500 Internal Server Error".to_string());
        let mapped = error.into_user_facing();
        assert!(matches!(mapped, SearchError::TemporaryConnectivity));
        assert_eq!(mapped.user_message(), TEMPORARY_CONNECTIVITY_MESSAGE);
    }

    #[test]
    fn rpc_failure_is_transient() {
        let error = SearchError::Request("Rpc failed due to xhr error".to_string());
        assert!(error.is_transient());
    }

    #[test]
    fn server_status_is_transient_client_status_is_not() {
        let server = SearchError::Provider {
            status: 503,
            details: "backend unavailable".to_string(),
        };
        let client = SearchError::Provider {
            status: 403,
            details: "API key not valid".to_string(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
    }

    #[test]
    fn local_parse_failure_is_never_transient() {
        // Column 500 lands in the rendered serde message.
        let body = format!("{{\"text\": \"{}\" x", "a".repeat(487));
        let parse_error = serde_json::from_str::<crate::gemini::RawModelResponse>(&body)
            .expect_err("body is malformed");
        let error = SearchError::Serialization(parse_error);
        assert!(error.to_string().contains("column 500"));
        assert!(!error.is_transient());
        assert!(matches!(error.into_user_facing(), SearchError::Serialization(_)));
    }

    #[test]
    fn provider_details_with_rpc_marker_are_transient() {
        let error = SearchError::Provider {
            status: 400,
            details: "Rpc failed due to xhr error".to_string(),
        };
        assert!(error.is_transient());
    }

    #[test]
    fn other_errors_keep_their_message() {
        let error = SearchError::Provider {
            status: 400,
            details: "API key not valid".to_string(),
        }
        .into_user_facing();
        assert_eq!(error.user_message(), "provider returned 400: API key not valid");
    }

    #[test]
    fn blank_message_uses_generic_fallback() {
        let error = SearchError::Request("  ".to_string());
        assert_eq!(error.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
