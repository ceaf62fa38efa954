/// OAuth2 client-credentials exchange with the Microsoft identity platform.
pub mod credentials;
/// Bearer tokens and the credential provider contract.
pub mod token;

pub use credentials::ClientCredentials;
pub use token::{BearerToken, CredentialProvider, RefreshingProvider, StaticToken, TokenExchange};
