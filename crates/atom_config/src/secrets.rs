//! AES-256-GCM encryption for stored credentials and config values.
//!
//! Ciphertexts are `base64(nonce(12) || ciphertext || tag)`. The key is read
//! from `ATOM_ENCRYPTION_KEY` (base64, 32 bytes) or from the key file named by
//! `ATOM_ENCRYPTION_KEY_PATH` (default `.atom_key`).

use base64::{engine::general_purpose, Engine as _};
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const ENCRYPTION_KEY_ENV: &str = "ATOM_ENCRYPTION_KEY";
pub const ENCRYPTION_KEY_PATH_ENV: &str = "ATOM_ENCRYPTION_KEY_PATH";
const DEFAULT_KEY_PATH: &str = ".atom_key";

/// Marker for encrypted values in configuration files
pub const ENCRYPTED_MARKER: &str = "encrypted:";

/// Error type for secret management operations
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Encryption error: {0}")]
    EncryptionError(String),
    #[error("Decryption error: {0}")]
    DecryptionError(String),
    #[error("Key error: {0}")]
    KeyError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Base64 error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

fn key_from_b64(key_b64: &str) -> Result<[u8; 32], SecretError> {
    let key_bytes = general_purpose::STANDARD.decode(key_b64.trim())?;
    if key_bytes.len() != 32 {
        return Err(SecretError::KeyError(format!(
            "Encryption key must be 32 bytes, got {} bytes",
            key_bytes.len()
        )));
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&key_bytes);
    Ok(key)
}

/// Read the encryption key from the environment or the key file.
pub fn encryption_key() -> Result<[u8; 32], SecretError> {
    if let Ok(key_b64) = env::var(ENCRYPTION_KEY_ENV) {
        return key_from_b64(&key_b64);
    }

    let key_path =
        env::var(ENCRYPTION_KEY_PATH_ENV).unwrap_or_else(|_| DEFAULT_KEY_PATH.to_string());
    if Path::new(&key_path).exists() {
        return key_from_b64(&fs::read_to_string(&key_path)?);
    }

    Err(SecretError::KeyError(format!(
        "{} is not set and no key file exists at {}",
        ENCRYPTION_KEY_ENV, key_path
    )))
}

/// Generate a fresh random key, returned base64 encoded.
pub fn generate_key() -> Result<String, SecretError> {
    let rng = SystemRandom::new();
    let mut key = [0u8; 32];
    rng.fill(&mut key)
        .map_err(|_| SecretError::KeyError("Failed to generate encryption key".to_string()))?;
    Ok(general_purpose::STANDARD.encode(key))
}

/// Write a new key to the key file, refusing to overwrite an existing one.
pub fn write_new_key_file(path: &str) -> Result<String, SecretError> {
    if Path::new(path).exists() {
        return Err(SecretError::KeyError(format!("{} already exists", path)));
    }
    let key_b64 = generate_key()?;
    fs::write(path, &key_b64)?;
    info!("Generated new encryption key and saved to {}", path);
    Ok(key_b64)
}

fn aead_key(key: &[u8; 32]) -> Result<LessSafeKey, SecretError> {
    let unbound = UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| SecretError::KeyError("Failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt with an explicit key.
pub fn encrypt_with_key(key: &[u8; 32], plaintext: &str) -> Result<String, SecretError> {
    let sealing_key = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| SecretError::EncryptionError("Failed to generate nonce".to_string()))?;

    let mut in_out = plaintext.as_bytes().to_vec();
    sealing_key
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| SecretError::EncryptionError("Failed to encrypt data".to_string()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + in_out.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&in_out);
    Ok(general_purpose::STANDARD.encode(out))
}

/// Decrypt with an explicit key.
pub fn decrypt_with_key(key: &[u8; 32], ciphertext_b64: &str) -> Result<String, SecretError> {
    let opening_key = aead_key(key)?;
    let mut data = general_purpose::STANDARD.decode(ciphertext_b64.trim())?;
    if data.len() < NONCE_LEN + aead::AES_256_GCM.tag_len() {
        return Err(SecretError::DecryptionError(
            "Ciphertext is too short".to_string(),
        ));
    }

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&data[..NONCE_LEN]);
    let ciphertext = &mut data[NONCE_LEN..];

    let plaintext = opening_key
        .open_in_place(Nonce::assume_unique_for_key(nonce_bytes), Aad::empty(), ciphertext)
        .map_err(|_| SecretError::DecryptionError("Failed to decrypt data".to_string()))?;

    String::from_utf8(plaintext.to_vec()).map_err(|_| {
        SecretError::DecryptionError("Failed to convert decrypted data to string".to_string())
    })
}

/// Encrypt a string using the configured key
pub fn encrypt_string(plaintext: &str) -> Result<String, SecretError> {
    encrypt_with_key(&encryption_key()?, plaintext)
}

/// Decrypt a string using the configured key
pub fn decrypt_string(ciphertext_b64: &str) -> Result<String, SecretError> {
    decrypt_with_key(&encryption_key()?, ciphertext_b64)
}

/// Check if a string is an encrypted value
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_MARKER)
}

/// Encrypt a value if it's not already encrypted
pub fn ensure_encrypted(value: &str) -> Result<String, SecretError> {
    if is_encrypted(value) {
        Ok(value.to_string())
    } else {
        Ok(format!("{}{}", ENCRYPTED_MARKER, encrypt_string(value)?))
    }
}

/// Decrypt a value if it's encrypted
pub fn ensure_decrypted(value: &str) -> Result<String, SecretError> {
    match value.strip_prefix(ENCRYPTED_MARKER) {
        Some(encrypted_part) => decrypt_string(encrypted_part),
        None => Ok(value.to_string()),
    }
}

/// Decrypt every `encrypted:` string inside a JSON document.
pub fn process_json_for_decryption(value: &mut Value) -> Result<(), SecretError> {
    match value {
        Value::Object(map) => {
            for (_, v) in map {
                process_json_for_decryption(v)?;
            }
        }
        Value::Array(arr) => {
            for v in arr {
                process_json_for_decryption(v)?;
            }
        }
        Value::String(s) => {
            if is_encrypted(s) {
                *s = ensure_decrypted(s)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// True when any string in the document carries the `encrypted:` marker.
pub fn contains_encrypted(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.values().any(contains_encrypted),
        Value::Array(arr) => arr.iter().any(contains_encrypted),
        Value::String(s) => is_encrypted(s),
        _ => false,
    }
}
