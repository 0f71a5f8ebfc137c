//! Password credential handling.
//!
//! A [`Credential`] holds only a salted Argon2id hash. The plaintext is
//! consumed at derivation time and there is no accessor for either the
//! plaintext or the hash: write-only by construction.

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::fmt;

use crate::config::SecurityConfig;

#[derive(Clone)]
pub struct Credential {
    hash: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl Credential {
    /// Derive a credential from a plaintext password with a fresh random salt.
    ///
    /// CPU-intensive; callers on an async runtime should wrap this in
    /// `spawn_blocking`.
    pub fn derive(password: &str, config: &SecurityConfig) -> Result<Self> {
        let salt = SaltString::generate(&mut OsRng);

        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Rehydrate a credential from its stored hash. Storage layer only.
    pub(crate) const fn from_stored(hash: String) -> Self {
        Self { hash }
    }

    /// True iff `password` is the exact plaintext this credential was
    /// derived from. Side-effect free; a malformed stored hash verifies
    /// as false rather than erroring.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        PasswordHash::new(&self.hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// Hand the hash to the persistence layer. Crate-private on purpose:
    /// nothing outside the storage mapping can read it.
    pub(crate) fn into_stored(self) -> String {
        self.hash
    }
}
