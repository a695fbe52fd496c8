// QR token codec
//
// Token layout: optional marker prefix + base64url(JSON envelope) where the
// envelope is {"c": base64(nonce || AES-256-GCM ciphertext), "s": hex
// HMAC-SHA256 over the plaintext payload, "t": issued-at millis}. The issued-at
// value is bound into the ciphertext as associated data.
//
// The codec enforces integrity only. Business expiry lives on the ticket's
// `valid_until` and is checked by the verification engine.

use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use backend_domain::{
    RuntimeConfig, TicketClaims, TicketError, TicketIdentity, TicketNumber, TicketPayload,
    TicketRecord,
};

use super::signing::{constant_time_str_eq, derive_key, sign_hmac_sha256, verify_hmac_sha256};

pub const DEFAULT_TOKEN_PREFIX: &str = "TKT1:";
const NONCE_LEN: usize = 12;
const VERIFICATION_ID_LEN: usize = 32;
const MAX_TOKEN_AGE_DAYS: u64 = 36_500;

#[derive(Debug, Error)]
pub enum CodecError {
    /// Not decodable, not decryptable, or not a known payload format.
    #[error("invalid token")]
    Malformed,
    /// Decrypted cleanly but the plaintext signature did not match.
    #[error("invalid token")]
    SignatureMismatch { ticket_number: Option<TicketNumber> },
    #[error("token expired")]
    Expired,
    #[error("token encoding failed: {0}")]
    Encoding(String),
    #[error("invalid codec key: {0}")]
    Key(String),
}

impl From<CodecError> for TicketError {
    fn from(value: CodecError) -> Self {
        match value {
            CodecError::Expired => TicketError::ExpiredToken,
            _ => TicketError::InvalidToken,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct QrEnvelope {
    #[serde(rename = "c")]
    cipher_text: String,
    #[serde(rename = "s")]
    signature: String,
    #[serde(rename = "t")]
    issued_at: i64,
}

pub struct QrCodec {
    cipher: Aes256Gcm,
    mac_key: [u8; 32],
    prefix: String,
    max_age: Option<Duration>,
}

impl fmt::Debug for QrCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QrCodec")
            .field("prefix", &self.prefix)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

impl QrCodec {
    pub fn new(secret: &str, prefix: &str, max_age: Option<Duration>) -> Result<Self, CodecError> {
        if secret.trim().is_empty() {
            return Err(CodecError::Key("secret must not be empty".to_string()));
        }
        let enc_key = derive_key(secret, "enc");
        let cipher = Aes256Gcm::new_from_slice(&enc_key)
            .map_err(|err| CodecError::Key(err.to_string()))?;
        Ok(Self {
            cipher,
            mac_key: derive_key(secret, "mac"),
            prefix: prefix.trim().to_string(),
            max_age,
        })
    }

    pub fn from_config(config: &RuntimeConfig) -> Result<Self, CodecError> {
        let max_age = if config.max_token_age_days == 0 {
            None
        } else {
            Some(Duration::days(config.max_token_age_days.min(MAX_TOKEN_AGE_DAYS) as i64))
        };
        Self::new(&config.qr_secret, &config.qr_token_prefix, max_age)
    }

    pub fn encode(&self, payload: &TicketPayload) -> Result<String, CodecError> {
        self.encode_at(payload, Utc::now())
    }

    pub fn encode_at(
        &self,
        payload: &TicketPayload,
        issued_at: DateTime<Utc>,
    ) -> Result<String, CodecError> {
        let plaintext =
            serde_json::to_vec(payload).map_err(|err| CodecError::Encoding(err.to_string()))?;
        let issued_at_ms = issued_at.timestamp_millis();
        let aad = issued_at_ms.to_string();

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: &plaintext,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|_| CodecError::Encoding("encryption failed".to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + sealed.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&sealed);

        let envelope = QrEnvelope {
            cipher_text: STANDARD.encode(combined),
            signature: sign_hmac_sha256(&self.mac_key, &plaintext),
            issued_at: issued_at_ms,
        };
        let json =
            serde_json::to_vec(&envelope).map_err(|err| CodecError::Encoding(err.to_string()))?;
        Ok(format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(json)))
    }

    pub fn decode(&self, token: &str) -> Result<TicketPayload, CodecError> {
        self.decode_at(token, Utc::now())
    }

    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<TicketPayload, CodecError> {
        let envelope = self.open_envelope(token)?;
        let sealed = STANDARD
            .decode(envelope.cipher_text.as_bytes())
            .map_err(|_| CodecError::Malformed)?;
        if sealed.len() <= NONCE_LEN {
            return Err(CodecError::Malformed);
        }
        let (nonce, cipher_text) = sealed.split_at(NONCE_LEN);
        let aad = envelope.issued_at.to_string();
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: cipher_text,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|_| CodecError::Malformed)?;

        if !verify_hmac_sha256(&self.mac_key, &plaintext, &envelope.signature) {
            return Err(CodecError::SignatureMismatch {
                ticket_number: claimed_ticket_number(&plaintext),
            });
        }

        if let Some(max_age) = self.max_age {
            let issued_at = DateTime::<Utc>::from_timestamp_millis(envelope.issued_at)
                .ok_or(CodecError::Malformed)?;
            if now - issued_at > max_age {
                return Err(CodecError::Expired);
            }
        }

        serde_json::from_slice::<TicketPayload>(&plaintext).map_err(|_| CodecError::Malformed)
    }

    /// Keyed digest binding a token to the stored identity fields.
    pub fn verification_id(&self, identity: &TicketIdentity) -> String {
        let material = format!(
            "vid|{}|{}|{}|{}|{}",
            identity.ticket_id,
            identity.ticket_number,
            identity.event_id,
            identity.owner_id,
            identity.booking_id
        );
        let mut digest = sign_hmac_sha256(&self.mac_key, material.as_bytes());
        digest.truncate(VERIFICATION_ID_LEN);
        digest
    }

    pub fn payload_for(&self, identity: &TicketIdentity) -> TicketPayload {
        TicketPayload::V1(TicketClaims::from_identity(
            identity,
            self.verification_id(identity),
        ))
    }

    /// Re-derives the verification id from the stored record and compares it
    /// with what the scanned payload carried.
    pub fn matches_record(&self, payload: &TicketPayload, record: &TicketRecord) -> bool {
        let claims = payload.claims();
        let expected = self.verification_id(&record.identity);
        let id_matches = claims.ticket_id == record.identity.ticket_id;
        let vid_matches = constant_time_str_eq(&claims.verification_id, &expected);
        id_matches && vid_matches
    }

    fn open_envelope(&self, token: &str) -> Result<QrEnvelope, CodecError> {
        let trimmed = token.trim();
        let body = if !self.prefix.is_empty() {
            trimmed.strip_prefix(self.prefix.as_str()).unwrap_or(trimmed)
        } else {
            trimmed
        };
        if body.is_empty() {
            return Err(CodecError::Malformed);
        }
        let raw = URL_SAFE_NO_PAD
            .decode(body.as_bytes())
            .or_else(|_| STANDARD.decode(body.as_bytes()))
            .map_err(|_| CodecError::Malformed)?;
        serde_json::from_slice(&raw).map_err(|_| CodecError::Malformed)
    }
}

fn claimed_ticket_number(plaintext: &[u8]) -> Option<TicketNumber> {
    let value: serde_json::Value = serde_json::from_slice(plaintext).ok()?;
    value
        .get("ticket_number")
        .and_then(|number| number.as_str())
        .map(|number| TicketNumber(number.to_string()))
}
