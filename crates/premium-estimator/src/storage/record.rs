use crate::estimation::{PredictionInput, PredictionKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of the user that owns records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted outcome of one scoring call. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub input: PredictionInput,
    pub premium: i64,
    pub kind: PredictionKind,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new(
        owner_id: OwnerId,
        input: PredictionInput,
        premium: i64,
        kind: PredictionKind,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            owner_id,
            input,
            premium,
            kind,
            created_at,
        }
    }
}

/// Stored account backing bearer-token identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: OwnerId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
