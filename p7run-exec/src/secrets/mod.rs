//! API credential handling.
//!
//! The token is named by a reference (`secrets://NAME` for an environment variable,
//! `file-secrets://PATH` for a file) and held in memory as a zeroizing `SecretValue`.

mod error;
mod provider;
mod redact;
mod r#ref;
mod value;

pub use error::SecretError;
pub use provider::{CompositeProvider, EnvSecretsProvider, FileSecretsProvider, SecretsProvider};
pub use r#ref::{SecretRef, SecretRefParseError};
pub use redact::redact_headers;
pub use value::SecretValue;

/// Providers for both built-in reference schemes.
pub fn default_provider() -> CompositeProvider {
    CompositeProvider::new(vec![
        Box::new(EnvSecretsProvider::default()),
        Box::new(FileSecretsProvider::default()),
    ])
}
