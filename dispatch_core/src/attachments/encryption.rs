//! Attachment encryption.
//!
//! The key is the attachment's content digest, so every sender of identical bytes derives
//! the same key and a rapid match can hand out the stored ciphertext. Salt and nonce are
//! random per upload and travel in front of the ciphertext.
use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit};
use hkdf::Hkdf;
use sha2::{Digest, Sha256, Sha512};

use super::AttachmentError;

/// Size of the HKDF salt in bytes (256-bit)
pub const HKDF_SALT_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes (96-bit)
pub const AES_GCM_NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128-bit)
pub const AES_GCM_TAG_SIZE: usize = 16;

/// Size of a content digest in bytes (SHA-512)
pub const CONTENT_DIGEST_SIZE: usize = 64;

const HKDF_INFO: &[u8] = b"dispatch attachment v1";

#[derive(Debug, Clone)]
pub struct EncryptedAttachment {
    /// `salt || nonce || ciphertext || tag`
    pub ciphertext: Vec<u8>,
    /// SHA-256 of `ciphertext`.
    pub digest: Vec<u8>,
}

impl EncryptedAttachment {
    pub fn digest_hex(&self) -> String {
        hex::encode(&self.digest)
    }
}

pub fn content_digest(bytes: &[u8]) -> Vec<u8> {
    Sha512::digest(bytes).to_vec()
}

pub fn sha256(bytes: &[u8]) -> Vec<u8> {
    Sha256::digest(bytes).to_vec()
}

pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<EncryptedAttachment, AttachmentError> {
    let salt: [u8; HKDF_SALT_SIZE] = dispatch_common::rand_array();
    let nonce: [u8; AES_GCM_NONCE_SIZE] = dispatch_common::rand_array();

    let cipher = Aes256Gcm::new_from_slice(&derive_key(key, &salt)?)
        .map_err(|e| AttachmentError::Encryption(format!("failed to create cipher: {e}")))?;
    let sealed = cipher
        .encrypt((&nonce).into(), plaintext)
        .map_err(|e| AttachmentError::Encryption(format!("encryption failed: {e}")))?;

    let mut ciphertext = Vec::with_capacity(HKDF_SALT_SIZE + AES_GCM_NONCE_SIZE + sealed.len());
    ciphertext.extend_from_slice(&salt);
    ciphertext.extend_from_slice(&nonce);
    ciphertext.extend_from_slice(&sealed);

    let digest = sha256(&ciphertext);
    Ok(EncryptedAttachment { ciphertext, digest })
}

/// Reverses [`encrypt`], checking `digest` first when one is given.
pub fn decrypt(
    ciphertext: &[u8],
    key: &[u8],
    digest: Option<&[u8]>,
) -> Result<Vec<u8>, AttachmentError> {
    if digest.is_some_and(|d| d != sha256(ciphertext).as_slice()) {
        return Err(AttachmentError::Encryption("digest mismatch".into()));
    }
    if ciphertext.len() < HKDF_SALT_SIZE + AES_GCM_NONCE_SIZE + AES_GCM_TAG_SIZE {
        return Err(AttachmentError::Encryption(format!(
            "ciphertext too short: {} bytes",
            ciphertext.len()
        )));
    }
    let (salt, rest) = ciphertext.split_at(HKDF_SALT_SIZE);
    let (nonce, sealed) = rest.split_at(AES_GCM_NONCE_SIZE);

    let cipher = Aes256Gcm::new_from_slice(&derive_key(key, salt)?)
        .map_err(|e| AttachmentError::Encryption(format!("failed to create cipher: {e}")))?;
    cipher
        .decrypt(nonce.into(), sealed)
        .map_err(|e| AttachmentError::Encryption(format!("decryption failed: {e}")))
}

fn derive_key(secret: &[u8], salt: &[u8]) -> Result<[u8; 32], AttachmentError> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), secret);
    let mut key = [0u8; 32];
    hkdf.expand(HKDF_INFO, &mut key)
        .map_err(|e| AttachmentError::Encryption(format!("HKDF key derivation failed: {e}")))?;
    Ok(key)
}
