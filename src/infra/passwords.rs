//! Argon2id password hashing for account credentials.

use argon2::password_hash::{self, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::application::accounts::{AccountError, CredentialHasher};

/// PHC-string Argon2id hasher with the crate's default cost parameters.
#[derive(Default, Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AccountError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AccountError::Hashing(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AccountError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| AccountError::Hashing(err.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(AccountError::Hashing(err.to_string())),
        }
    }
}
