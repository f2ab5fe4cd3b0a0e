use super::passwords::{hash_password, verify_password};
use super::tokens::{TokenClaims, TokenError, TokenSigner};
use crate::config::AuthConfig;
use crate::storage::{IdentityStore, OwnerId, RepositoryError, UserAccount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEVELOPMENT_USER_ID: &str = "dev-user-123";
const DEVELOPMENT_USERNAME: &str = "dev_user";
const DEVELOPMENT_EMAIL: &str = "dev@example.com";

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

/// Caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub owner_id: OwnerId,
    pub username: String,
    pub email: Option<String>,
    /// Built from token claims alone because the identity store was unreachable.
    pub degraded: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Account view returned to clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: OwnerId,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub degraded: bool,
}

impl From<&UserAccount> for UserProfile {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id.clone(),
            username: account.username.clone(),
            email: Some(account.email.clone()),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            phone: account.phone.clone(),
            is_active: account.is_active,
            created_at: Some(account.created_at),
            degraded: false,
        }
    }
}

impl From<&Identity> for UserProfile {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.owner_id.clone(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            first_name: None,
            last_name: None,
            phone: None,
            is_active: true,
            created_at: None,
            degraded: identity.degraded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Access denied. No token provided.")]
    MissingToken,
    #[error("Token is not valid.")]
    InvalidToken,
    #[error("Token has expired.")]
    ExpiredToken,
    #[error("Token is not valid. User not found.")]
    UnknownUser,
    #[error("Account is deactivated.")]
    Deactivated,
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("Username is already taken.")]
    UsernameTaken,
    #[error("{0}")]
    InvalidRegistration(String),
    #[error("Identity store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("identity store failure: {0}")]
    Store(RepositoryError),
    #[error("failed to issue token: {0}")]
    Token(TokenError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unavailable(reason) => AuthError::StoreUnavailable(reason),
            RepositoryError::Conflict => AuthError::UsernameTaken,
            other => AuthError::Store(other),
        }
    }
}

/// Resolves bearer tokens to identities and manages accounts.
pub struct Authenticator<U> {
    store: Arc<U>,
    signer: TokenSigner,
    degraded_mode: bool,
}

impl<U> Authenticator<U>
where
    U: IdentityStore,
{
    pub fn new(store: Arc<U>, signer: TokenSigner, degraded_mode: bool) -> Self {
        Self {
            store,
            signer,
            degraded_mode,
        }
    }

    pub fn from_config(store: Arc<U>, config: &AuthConfig) -> Self {
        Self::new(
            store,
            TokenSigner::new(&config.token_secret, config.token_ttl_hours),
            config.degraded_mode,
        )
    }

    pub fn degraded_mode(&self) -> bool {
        self.degraded_mode
    }

    /// Resolve an `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        self.authenticate_at(header, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthError> {
        let token = bearer_token(header).ok_or(AuthError::MissingToken)?;
        let claims = self.signer.verify(token, now).map_err(|err| match err {
            TokenError::Expired => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        match self.store.find_user(&claims.sub) {
            Ok(Some(account)) if !account.is_active => Err(AuthError::Deactivated),
            Ok(Some(account)) => Ok(Identity {
                owner_id: account.id,
                username: account.username,
                email: Some(account.email),
                degraded: false,
            }),
            Ok(None) => Err(AuthError::UnknownUser),
            Err(RepositoryError::Unavailable(reason)) if self.degraded_mode => {
                warn!(
                    owner = %claims.sub,
                    error = %reason,
                    "identity store unavailable, accepting token claims in degraded mode"
                );
                Ok(degraded_identity(claims))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn register(&self, registration: Registration) -> Result<AuthSession, AuthError> {
        self.register_at(registration, Utc::now())
    }

    pub fn register_at(
        &self,
        registration: Registration,
        now: DateTime<Utc>,
    ) -> Result<AuthSession, AuthError> {
        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_string();
        validate_registration(&username, &email, &registration.password)?;

        let account = UserAccount {
            id: OwnerId(Uuid::new_v4().to_string()),
            username,
            email,
            password_hash: hash_password(&registration.password),
            first_name: non_empty(registration.first_name),
            last_name: non_empty(registration.last_name),
            phone: non_empty(registration.phone),
            is_active: true,
            created_at: now,
        };

        let account = self.store.insert_user(account)?;
        info!(owner = %account.id, username = %account.username, "account registered");
        self.session(&account, now)
    }

    pub fn login(&self, credentials: Credentials) -> Result<AuthSession, AuthError> {
        self.login_at(credentials, Utc::now())
    }

    pub fn login_at(
        &self,
        credentials: Credentials,
        now: DateTime<Utc>,
    ) -> Result<AuthSession, AuthError> {
        let account = self
            .store
            .find_by_username(credentials.username.trim())?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&credentials.password, &account.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        if !account.is_active {
            return Err(AuthError::Deactivated);
        }
        self.session(&account, now)
    }

    /// Degraded identities are answered from their claims without touching the store.
    pub fn profile(&self, identity: &Identity) -> Result<UserProfile, AuthError> {
        if identity.degraded {
            return Ok(UserProfile::from(identity));
        }
        let account = self
            .store
            .find_user(&identity.owner_id)?
            .ok_or(AuthError::UnknownUser)?;
        Ok(UserProfile::from(&account))
    }

    /// Token for the fixed development account, seeding the account when the store is reachable.
    pub fn issue_development_token(&self) -> Result<AuthSession, AuthError> {
        let now = Utc::now();
        let account = development_account(now);

        match self.store.insert_user(account.clone()) {
            Ok(_) | Err(RepositoryError::Conflict) => {}
            Err(err) => warn!(error = %err, "could not seed development account"),
        }
        self.session(&account, now)
    }

    fn session(&self, account: &UserAccount, now: DateTime<Utc>) -> Result<AuthSession, AuthError> {
        let token = self
            .signer
            .issue(&account.id, &account.username, now)
            .map_err(AuthError::Token)?;
        Ok(AuthSession {
            token,
            user: UserProfile::from(account),
        })
    }
}

fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim_start();
    let token = match value.get(..6) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => &value[6..],
        _ => value,
    }
    .trim();
    (!token.is_empty()).then_some(token)
}

fn degraded_identity(claims: TokenClaims) -> Identity {
    Identity {
        owner_id: claims.sub,
        username: claims.username,
        email: None,
        degraded: true,
    }
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), AuthError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(AuthError::InvalidRegistration(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters."
        )));
    }
    if !email.contains('@') {
        return Err(AuthError::InvalidRegistration(
            "Email address is not valid.".to_string(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidRegistration(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn development_account(now: DateTime<Utc>) -> UserAccount {
    UserAccount {
        id: OwnerId(DEVELOPMENT_USER_ID.to_string()),
        username: DEVELOPMENT_USERNAME.to_string(),
        email: DEVELOPMENT_EMAIL.to_string(),
        // Not a valid hash, so password login for this account always fails.
        password_hash: "!".to_string(),
        first_name: Some("Dev".to_string()),
        last_name: Some("User".to_string()),
        phone: None,
        is_active: true,
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use chrono::Duration;

    struct OfflineStore;

    impl IdentityStore for OfflineStore {
        fn insert_user(&self, _account: UserAccount) -> Result<UserAccount, RepositoryError> {
            Err(RepositoryError::Unavailable("offline".to_string()))
        }

        fn find_user(&self, _id: &OwnerId) -> Result<Option<UserAccount>, RepositoryError> {
            Err(RepositoryError::Unavailable("offline".to_string()))
        }

        fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<UserAccount>, RepositoryError> {
            Err(RepositoryError::Unavailable("offline".to_string()))
        }
    }

    fn signer() -> TokenSigner {
        TokenSigner::new("identity-tests", 1)
    }

    fn registration(username: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "s3cret-pass".to_string(),
            first_name: Some("Asha".to_string()),
            last_name: Some(" ".to_string()),
            phone: None,
        }
    }

    fn header(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn registered_account_authenticates_with_issued_token() {
        let auth = Authenticator::new(Arc::new(InMemoryStore::new()), signer(), false);
        let session = auth.register(registration("asha")).expect("register");
        assert_eq!(session.user.username, "asha");
        assert_eq!(session.user.last_name, None);

        let identity = auth
            .authenticate(Some(&header(&session.token)))
            .expect("authenticate");
        assert_eq!(identity.owner_id, session.user.id);
        assert_eq!(identity.email.as_deref(), Some("asha@example.com"));
        assert!(!identity.degraded);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let auth = Authenticator::new(Arc::new(InMemoryStore::new()), signer(), false);
        auth.register(registration("asha")).expect("first");
        assert!(matches!(
            auth.register(registration("ASHA")),
            Err(AuthError::UsernameTaken)
        ));
    }

    #[test]
    fn short_password_is_invalid_registration() {
        let auth = Authenticator::new(Arc::new(InMemoryStore::new()), signer(), false);
        let mut request = registration("asha");
        request.password = "abc".to_string();
        assert!(matches!(
            auth.register(request),
            Err(AuthError::InvalidRegistration(_))
        ));
    }

    #[test]
    fn login_checks_password() {
        let auth = Authenticator::new(Arc::new(InMemoryStore::new()), signer(), false);
        auth.register(registration("asha")).expect("register");

        let session = auth
            .login(Credentials {
                username: "asha".to_string(),
                password: "s3cret-pass".to_string(),
            })
            .expect("login");
        assert_eq!(session.user.username, "asha");

        assert!(matches!(
            auth.login(Credentials {
                username: "asha".to_string(),
                password: "nope-nope".to_string(),
            }),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(Credentials {
                username: "ghost".to_string(),
                password: "s3cret-pass".to_string(),
            }),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn missing_and_invalid_tokens_are_distinguished() {
        let auth = Authenticator::new(Arc::new(InMemoryStore::new()), signer(), false);
        assert!(matches!(auth.authenticate(None), Err(AuthError::MissingToken)));
        assert!(matches!(
            auth.authenticate(Some("Bearer ")),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            auth.authenticate(Some("Bearer")),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            auth.authenticate(Some("Bearer abc.def")),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn bearer_scheme_is_matched_before_trimming() {
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("  Bearer   ")), None);
        assert_eq!(bearer_token(Some("bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("Bearer  abc.def ")), Some("abc.def"));
        assert_eq!(bearer_token(Some("abc.def")), Some("abc.def"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = Authenticator::new(Arc::new(InMemoryStore::new()), signer(), false);
        let session = auth.register(registration("asha")).expect("register");
        let later = Utc::now() + Duration::hours(2);
        assert!(matches!(
            auth.authenticate_at(Some(&header(&session.token)), later),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn token_for_unknown_account_is_rejected() {
        let auth = Authenticator::new(Arc::new(InMemoryStore::new()), signer(), false);
        let token = signer()
            .issue(&OwnerId("ghost".to_string()), "ghost", Utc::now())
            .expect("issue");
        assert!(matches!(
            auth.authenticate(Some(&header(&token))),
            Err(AuthError::UnknownUser)
        ));
    }

    #[test]
    fn deactivated_account_is_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let mut account = development_account(Utc::now());
        account.is_active = false;
        store.insert_user(account).expect("seed");

        let auth = Authenticator::new(store, signer(), false);
        let token = signer()
            .issue(&OwnerId(DEVELOPMENT_USER_ID.to_string()), "dev_user", Utc::now())
            .expect("issue");
        assert!(matches!(
            auth.authenticate(Some(&header(&token))),
            Err(AuthError::Deactivated)
        ));
    }

    #[test]
    fn store_outage_fails_closed_without_degraded_mode() {
        let auth = Authenticator::new(Arc::new(OfflineStore), signer(), false);
        let token = signer()
            .issue(&OwnerId("user-9".to_string()), "nine", Utc::now())
            .expect("issue");
        assert!(matches!(
            auth.authenticate(Some(&header(&token))),
            Err(AuthError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn store_outage_uses_token_claims_in_degraded_mode() {
        let auth = Authenticator::new(Arc::new(OfflineStore), signer(), true);
        let token = signer()
            .issue(&OwnerId("user-9".to_string()), "nine", Utc::now())
            .expect("issue");

        let identity = auth
            .authenticate(Some(&header(&token)))
            .expect("degraded identity");
        assert_eq!(identity.owner_id, OwnerId("user-9".to_string()));
        assert_eq!(identity.username, "nine");
        assert!(identity.degraded);

        let profile = auth.profile(&identity).expect("profile from claims");
        assert!(profile.degraded);
        assert_eq!(profile.email, None);
    }

    #[test]
    fn degraded_mode_still_rejects_bad_tokens() {
        let auth = Authenticator::new(Arc::new(OfflineStore), signer(), true);
        assert!(matches!(
            auth.authenticate(Some("Bearer forged.token")),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn development_token_seeds_account_once() {
        let store = Arc::new(InMemoryStore::new());
        let auth = Authenticator::new(store.clone(), signer(), false);

        let first = auth.issue_development_token().expect("dev token");
        auth.issue_development_token().expect("second dev token");
        assert_eq!(first.user.id, OwnerId(DEVELOPMENT_USER_ID.to_string()));

        let identity = auth
            .authenticate(Some(&header(&first.token)))
            .expect("dev identity");
        assert_eq!(identity.username, "dev_user");
        assert!(store
            .find_user(&OwnerId(DEVELOPMENT_USER_ID.to_string()))
            .expect("lookup")
            .is_some());
    }
}
