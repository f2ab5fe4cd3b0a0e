use std::sync::Arc;

use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};

use crate::auth::{Authenticator, TokenSigner};
use crate::estimation::{
    PredictionInput, PredictionKind, PremiumEstimate, PremiumScorer, RawPredictionRequest,
    ScorerError,
};
use crate::gateway::{premium_router, GatewayState, PremiumService};
use crate::storage::{
    IdentityStore, InMemoryStore, OwnerId, PredictionRecord, PredictionRepository, RecordId,
    RepositoryError, UserAccount,
};

pub(super) const OWNER: &str = "user-asha";

pub(super) fn signer() -> TokenSigner {
    TokenSigner::new("gateway-tests", 1)
}

pub(super) fn owner() -> OwnerId {
    OwnerId(OWNER.to_string())
}

/// Reference applicant that scores 13000.
pub(super) fn reference_payload() -> Value {
    json!({
        "age": "30",
        "dependants": 2,
        "income": "10",
        "geneticalRisk": "1",
        "insurancePlan": "silver",
        "smokingStatus": "no-smoking",
        "medicalHistory": "no-disease",
        "region": "northwest"
    })
}

pub(super) fn reference_request() -> RawPredictionRequest {
    serde_json::from_value(reference_payload()).expect("valid raw request")
}

pub(super) fn account(id: &str, username: &str) -> UserAccount {
    UserAccount {
        id: OwnerId(id.to_string()),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "!".to_string(),
        first_name: None,
        last_name: None,
        phone: None,
        is_active: true,
        created_at: Utc::now(),
    }
}

/// Store seeded with the [`OWNER`] account.
pub(super) fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .insert_user(account(OWNER, "asha"))
        .expect("seed account");
    store
}

pub(super) fn bearer(subject: &str, username: &str) -> String {
    let token = signer()
        .issue(&OwnerId(subject.to_string()), username, Utc::now())
        .expect("issue token");
    format!("Bearer {token}")
}

pub(super) fn owner_bearer() -> String {
    bearer(OWNER, "asha")
}

pub(super) fn state_with<R, U>(
    repository: Arc<R>,
    identities: Arc<U>,
    degraded_mode: bool,
) -> GatewayState<R, U>
where
    R: PredictionRepository + 'static,
    U: IdentityStore + 'static,
{
    GatewayState {
        predictions: Arc::new(PremiumService::new(repository)),
        auth: Arc::new(Authenticator::new(identities, signer(), degraded_mode)),
    }
}

pub(super) fn router_with<R, U>(state: GatewayState<R, U>) -> axum::Router
where
    R: PredictionRepository + 'static,
    U: IdentityStore + 'static,
{
    premium_router(state)
}

pub(super) fn seeded_router() -> (axum::Router, Arc<InMemoryStore>) {
    let store = seeded_store();
    let router = router_with(state_with(store.clone(), store.clone(), false));
    (router, store)
}

pub(super) struct UnavailableRepository;

impl PredictionRepository for UnavailableRepository {
    fn insert(&self, _record: PredictionRecord) -> Result<RecordId, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_by_owner(
        &self,
        _owner: &OwnerId,
        _limit: Option<usize>,
    ) -> Result<Vec<PredictionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct OfflineIdentities;

impl IdentityStore for OfflineIdentities {
    fn insert_user(&self, _account: UserAccount) -> Result<UserAccount, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_user(&self, _id: &OwnerId) -> Result<Option<UserAccount>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_username(&self, _username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct OfflineScorer;

impl PremiumScorer for OfflineScorer {
    fn kind(&self) -> PredictionKind {
        PredictionKind::ExternalScrape
    }

    fn estimate(&self, _input: &PredictionInput) -> Result<PremiumEstimate, ScorerError> {
        Err(ScorerError::Unavailable("remote dashboard unreachable".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
