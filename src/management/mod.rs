mod auth;
mod store;

pub use auth::AuthError;
pub use auth::TokenEndpoint;
pub use auth::TokenManager;
pub use store::ACCESS_TOKEN_KEY;
pub use store::CredentialStore;
pub use store::EXPIRATION_DATE_KEY;
pub use store::FileCredentialStore;
pub use store::MemoryCredentialStore;
pub use store::REFRESH_TOKEN_KEY;
pub use store::StoreError;
pub use store::credential_from_entries;
pub use store::merge_entries;
