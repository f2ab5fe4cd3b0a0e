//! Bearer-token identities, account registration and login.

mod identity;
mod passwords;
mod tokens;

pub use identity::{
    AuthError, AuthSession, Authenticator, Credentials, Identity, Registration, UserProfile,
    DEVELOPMENT_USER_ID,
};
pub use passwords::{hash_password, verify_password};
pub use tokens::{TokenClaims, TokenError, TokenSigner};
