//! Typed identifiers used at repository and service seams.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifier for a user record (autoincrement row id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_round_trip() {
        let id = UserId::new(7);
        assert_eq!(id.as_i64(), 7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(UserId::from(7), id);
    }

    #[test]
    fn user_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&UserId::new(42)).unwrap();
        assert_eq!(json, "42");
        let parsed: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, UserId::new(42));
    }
}
