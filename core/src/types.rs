//! Request payloads for the verification endpoint.
//!
//! Expectation payloads are opaque bytes and have no type here; only the
//! verification body is marshalled by the client.

use serde::{Deserialize, Serialize};

/// Identifier of a previously registered expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectationId {
    pub id: String,
}

/// Bounds on how many times an expectation must have been matched.
///
/// Interpreted by the remote server only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationTimes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_least: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_most: Option<u32>,
}

impl VerificationTimes {
    pub fn exactly(n: u32) -> Self {
        Self {
            at_least: Some(n),
            at_most: Some(n),
        }
    }

    pub fn at_least(n: u32) -> Self {
        Self {
            at_least: Some(n),
            at_most: None,
        }
    }
}

/// Body of `PUT /mockserver/verify`.
///
/// Serializes to `{"expectationId":{"id":"..."}}`, plus `"times"` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequestBody {
    pub expectation_id: ExpectationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<VerificationTimes>,
}

impl VerifyRequestBody {
    pub fn for_expectation(id: impl Into<String>) -> Self {
        Self {
            expectation_id: ExpectationId { id: id.into() },
            times: None,
        }
    }

    pub fn with_times(mut self, times: VerificationTimes) -> Self {
        self.times = Some(times);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_body_has_canonical_shape() {
        let body = VerifyRequestBody::for_expectation("055CA455-1DF7-45BB-8535-4F83E7266092");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"expectationId": {"id": "055CA455-1DF7-45BB-8535-4F83E7266092"}})
        );
    }

    #[test]
    fn times_are_camel_cased_and_sparse() {
        let body = VerifyRequestBody::for_expectation("x").with_times(VerificationTimes::at_least(2));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["times"], serde_json::json!({"atLeast": 2}));

        let body = VerifyRequestBody::for_expectation("x").with_times(VerificationTimes::exactly(1));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["times"], serde_json::json!({"atLeast": 1, "atMost": 1}));
    }

    #[test]
    fn verify_body_accepts_missing_times() {
        let body: VerifyRequestBody =
            serde_json::from_str(r#"{"expectationId":{"id":"cart"}}"#).unwrap();
        assert_eq!(body.expectation_id.id, "cart");
        assert!(body.times.is_none());
    }

    #[test]
    fn verify_body_rejects_missing_id() {
        let result: Result<VerifyRequestBody, _> = serde_json::from_str(r#"{"expectationId":{}}"#);
        assert!(result.is_err());
    }
}
