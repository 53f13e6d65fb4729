use std::sync::OnceLock;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::error;

use crate::config::HashingConfig;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    Corrupt(String),
}

/// Argon2id hasher with configurable cost.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy: OnceLock<String>,
}

impl PasswordHasher {
    pub fn new(cfg: &HashingConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        Ok(Self {
            params,
            dummy: OnceLock::new(),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Fresh salt on every call, so equal passwords never share a hash.
    pub fn hash(&self, plain: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                CredentialError::Hash(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Parameters come from the stored PHC string, not from `self`, so hashes
    /// made under an older cost still verify.
    pub fn verify(&self, plain: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            CredentialError::Corrupt(e.to_string())
        })?;
        Ok(self
            .argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    /// Burns one verification against a throwaway hash made with the current
    /// params. Used when there is no stored hash to check, so a miss costs the
    /// same as a wrong password.
    pub fn verify_dummy(&self, plain: &str) {
        let hash = match self.dummy.get() {
            Some(h) => h,
            None => match self.hash("dummy-password-never-matches") {
                Ok(h) => self.dummy.get_or_init(|| h),
                Err(_) => return,
            },
        };
        let _ = self.verify(plain, hash);
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(&HashingConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap params are valid")
}
