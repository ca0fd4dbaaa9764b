use serde::Serialize;
use std::collections::HashMap;

/// Request headers relevant to the gate, keyed by lowercase name.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
}

impl AuthRequest {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            headers: pairs
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
        }
    }

    /// Token from an `Authorization: Bearer <token>` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.headers.get("authorization")?;
        value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .map(str::trim)
    }
}

/// Who passed the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub name: String,
    pub method: &'static str,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".to_string(),
            method: "none",
        }
    }

    pub fn trusted_trigger() -> Self {
        Self {
            name: "sync_trigger".to_string(),
            method: "bearer",
        }
    }
}
