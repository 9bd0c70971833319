//! Session tokens for anonymous URL owners.
//!
//! A user id is sealed with AES-256-GCM under a key derived from the
//! configured secret and handed out hex-encoded as a cookie value.
//!
//! # Nonce reuse
//!
//! The nonce is the last 12 bytes of the derived key, so it is the same for
//! every token. Equal user ids therefore encrypt to equal tokens. This is
//! accepted because the sealed value is an opaque, non-secret identifier;
//! the tag still rejects tampered tokens and tokens from another secret.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::warn;

use crate::domain::repositories::UserRepository;
use crate::error::ShortenerError;

const NONCE_LEN: usize = 12;

/// The caller's identity after session resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    /// Set when a new user was minted and the client must store a new token.
    pub issued_token: Option<String>,
}

/// Mints, seals and verifies user identities.
pub struct CredentialService<U: UserRepository + ?Sized> {
    repository: Arc<U>,
    cipher: Aes256Gcm,
    nonce: [u8; NONCE_LEN],
}

impl<U: UserRepository + ?Sized> CredentialService<U> {
    /// Creates a credential service keyed by `secret`.
    pub fn new(repository: Arc<U>, secret: &str) -> Self {
        let key = Sha256::digest(secret.as_bytes());

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&key[key.len() - NONCE_LEN..]);

        Self {
            repository,
            cipher: Aes256Gcm::new(&key),
            nonce,
        }
    }

    /// Creates a new user in storage.
    pub async fn create_user(&self) -> Result<String, ShortenerError> {
        self.repository.create_user().await
    }

    /// Seals `plaintext` and returns the hex-encoded ciphertext and tag.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, ShortenerError> {
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&self.nonce), plaintext.as_bytes())
            .map_err(|_| ShortenerError::Internal("token encryption failed".to_string()))?;

        Ok(hex::encode(sealed))
    }

    /// Opens a hex-encoded token.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::AuthFailure`] for malformed hex, a bad tag,
    /// or a token sealed under another secret.
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, ShortenerError> {
        let sealed = hex::decode(token).map_err(|_| ShortenerError::AuthFailure)?;

        self.cipher
            .decrypt(Nonce::from_slice(&self.nonce), sealed.as_slice())
            .map_err(|_| ShortenerError::AuthFailure)
    }

    /// Checks that `user_id` exists; [`ShortenerError::NotFound`] if it does not.
    pub async fn verify_user(&self, user_id: &str) -> Result<(), ShortenerError> {
        self.repository.verify_user(user_id).await
    }

    /// Resolves a session token to a user, minting a new one when needed.
    ///
    /// A missing token, a token that fails to open, or one naming an unknown
    /// user all lead to a fresh identity with `issued_token` set. Other
    /// storage errors are returned.
    pub async fn resolve(&self, token: Option<&str>) -> Result<Identity, ShortenerError> {
        if let Some(token) = token {
            match self.authenticate(token).await {
                Ok(user_id) => {
                    return Ok(Identity {
                        user_id,
                        issued_token: None,
                    });
                }
                Err(ShortenerError::AuthFailure | ShortenerError::NotFound) => {
                    warn!("Session token rejected, issuing a new identity");
                }
                Err(e) => return Err(e),
            }
        }

        let user_id = self.create_user().await?;
        let token = self.encrypt(&user_id)?;

        Ok(Identity {
            user_id,
            issued_token: Some(token),
        })
    }

    async fn authenticate(&self, token: &str) -> Result<String, ShortenerError> {
        let user_id =
            String::from_utf8(self.decrypt(token)?).map_err(|_| ShortenerError::AuthFailure)?;
        self.verify_user(&user_id).await?;
        Ok(user_id)
    }
}
