use serde::{Deserialize, Serialize};

/// Failure body returned by the workout API: `{ "message": "..." }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// The server message, if it carries any visible text.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }

    /// Best-effort extraction from a raw response body.
    pub fn message_from_bytes(bytes: &[u8]) -> Option<String> {
        serde_json::from_slice::<ApiErrorBody>(bytes)
            .ok()
            .and_then(|body| body.message().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_messages_are_treated_as_absent() {
        assert_eq!(ApiErrorBody::message_from_bytes(br#"{"message":"  "}"#), None);
        assert_eq!(ApiErrorBody::message_from_bytes(b"<html>502</html>"), None);
        assert_eq!(
            ApiErrorBody::message_from_bytes(br#"{"message":"Email already in use"}"#),
            Some("Email already in use".to_string())
        );
    }
}
