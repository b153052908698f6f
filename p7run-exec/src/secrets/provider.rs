use std::path::PathBuf;

use async_trait::async_trait;

use crate::secrets::{SecretError, SecretRef, SecretValue};

#[async_trait]
pub trait SecretsProvider: Send + Sync {
    async fn get(&self, secret_ref: &SecretRef) -> Result<SecretValue, SecretError>;
}

/// Tries each provider in order; `NotFound` falls through to the next one.
#[derive(Default)]
pub struct CompositeProvider {
    providers: Vec<Box<dyn SecretsProvider>>,
}

impl CompositeProvider {
    pub fn new(providers: Vec<Box<dyn SecretsProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl SecretsProvider for CompositeProvider {
    async fn get(&self, secret_ref: &SecretRef) -> Result<SecretValue, SecretError> {
        for p in &self.providers {
            match p.get(secret_ref).await {
                Ok(v) => return Ok(v),
                Err(SecretError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(SecretError::NotFound(secret_ref.clone()))
    }
}

/// `secrets://NAME` -> environment variable `NAME`.
#[derive(Debug, Clone)]
pub struct EnvSecretsProvider {
    pub scheme: String,
}

impl Default for EnvSecretsProvider {
    fn default() -> Self {
        Self {
            scheme: "secrets".to_string(),
        }
    }
}

#[async_trait]
impl SecretsProvider for EnvSecretsProvider {
    async fn get(&self, secret_ref: &SecretRef) -> Result<SecretValue, SecretError> {
        if secret_ref.scheme != self.scheme {
            return Err(SecretError::NotFound(secret_ref.clone()));
        }
        match std::env::var(&secret_ref.id) {
            Ok(v) if !v.trim().is_empty() => Ok(SecretValue::from_string(v)),
            Ok(_) | Err(std::env::VarError::NotPresent) => {
                Err(SecretError::NotFound(secret_ref.clone()))
            }
            Err(e) => Err(SecretError::provider(secret_ref.clone(), e.to_string())),
        }
    }
}

/// `file-secrets://PATH` -> contents of `PATH`, relative to `base_dir` when not absolute.
#[derive(Debug, Clone)]
pub struct FileSecretsProvider {
    pub scheme: String,
    pub base_dir: PathBuf,
}

impl Default for FileSecretsProvider {
    fn default() -> Self {
        Self {
            scheme: "file-secrets".to_string(),
            base_dir: PathBuf::from("."),
        }
    }
}

#[async_trait]
impl SecretsProvider for FileSecretsProvider {
    async fn get(&self, secret_ref: &SecretRef) -> Result<SecretValue, SecretError> {
        if secret_ref.scheme != self.scheme {
            return Err(SecretError::NotFound(secret_ref.clone()));
        }
        let path = self.base_dir.join(&secret_ref.id);
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SecretError::NotFound(secret_ref.clone()),
            _ => SecretError::provider(secret_ref.clone(), e.to_string()),
        })?;
        Ok(SecretValue::from_bytes(bytes))
    }
}
