//! Account payloads exchanged with `/api/account`.
//!
//! # Design
//! These mirror the mock-server's schema but are defined independently;
//! integration tests catch drift between the two crates.

use serde::{Deserialize, Serialize};

/// Account settings as returned by `GET /api/account`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub display_name: String,
    pub receive_summary_email: bool,
}

/// Partial update for `PATCH /api/account`. Omitted fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_summary_email: Option<bool>,
}

impl ChangeAccount {
    pub fn display_name(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn receive_summary_email(receive: bool) -> Self {
        Self {
            receive_summary_email: Some(receive),
            ..Self::default()
        }
    }
}
