use std::sync::Arc;

use super::{
    model::{NewUser, PublicUser, User, UserChanges},
    password::{CredentialError, PasswordHasher},
    validation::{
        self, NewUserInput, UserChangesInput, ValidChanges, ValidNewUser, ValidationError,
    },
};

/// Owns the user field rules and the password hashing / redaction guarantees.
///
/// Writes go through `validate_* -> before_* -> store`; the store never sees a
/// plaintext password because [`NewUser`] and [`UserChanges`] only carry hashes.
#[derive(Debug, Clone)]
pub struct CredentialManager {
    hasher: Arc<PasswordHasher>,
}

impl CredentialManager {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self {
            hasher: Arc::new(hasher),
        }
    }

    pub fn validate_new_user(&self, input: NewUserInput) -> Result<ValidNewUser, ValidationError> {
        validation::validate_new_user(input)
    }

    pub fn validate_changes(&self, input: UserChangesInput) -> Result<ValidChanges, ValidationError> {
        validation::validate_changes(input)
    }

    /// Create hook: the password is always hashed.
    pub fn before_create(&self, user: ValidNewUser) -> Result<NewUser, CredentialError> {
        let password_hash = self.hasher.hash(&user.password)?;
        Ok(NewUser {
            username: user.username,
            email: user.email,
            password_hash,
            role: user.role,
        })
    }

    /// Update hook: hashes only when a new password is part of the change.
    pub fn before_update(&self, changes: ValidChanges) -> Result<UserChanges, CredentialError> {
        let password_hash = match changes.password {
            Some(plain) => Some(self.hasher.hash(&plain)?),
            None => None,
        };
        Ok(UserChanges {
            role: changes.role,
            password_hash,
        })
    }

    /// `Ok(false)` for a wrong password; `Err` only when the stored hash is corrupt.
    pub fn verify_password(&self, user: &User, candidate: &str) -> Result<bool, CredentialError> {
        self.hasher.verify(candidate, &user.password_hash)
    }

    /// Same cost as [`Self::verify_password`] for a login with no matching user.
    pub fn verify_absent(&self, candidate: &str) {
        self.hasher.verify_dummy(candidate)
    }
}

/// Projection applied to every user that leaves the service.
pub fn to_public_view(user: &User) -> PublicUser {
    PublicUser {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}
