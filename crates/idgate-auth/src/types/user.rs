//! End user whose identity an ID token asserts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An authenticated end user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Technical user identifier; becomes the `sub` claim.
    pub id: String,

    /// Profile attributes keyed by claim name (`name`, `email`, `address`, ...).
    /// Values are copied into tokens verbatim.
    #[serde(default)]
    pub additional_information: Map<String, Value>,
}

impl User {
    /// Creates a user with an empty profile.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            additional_information: Map::new(),
        }
    }

    /// Adds a profile attribute.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_information.insert(name.into(), value.into());
        self
    }

    /// Returns the profile value for `claim`, treating JSON `null` as absent.
    #[must_use]
    pub fn claim(&self, claim: &str) -> Option<&Value> {
        self.additional_information
            .get(claim)
            .filter(|value| !value.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_claim_is_absent() {
        let user = User::new("u1")
            .with_claim("name", "Jane")
            .with_claim("email", Value::Null);

        assert_eq!(user.claim("name"), Some(&json!("Jane")));
        assert!(user.claim("email").is_none());
        assert!(user.claim("locale").is_none());
    }

    #[test]
    fn test_deserialize_profile() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "additionalInformation": {"address": {"country": "FR"}}
        }))
        .unwrap();

        assert_eq!(user.claim("address"), Some(&json!({"country": "FR"})));
    }
}
