//! Credential decoding.
//!
//! The client holds no key material, so decoding is structural only: the
//! resulting [`Claims`] are routing hints. Every privileged request is
//! re-validated by the backend.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Role carried by a credential. Anything other than `admin` is a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    fn from_claim(value: &str) -> Self {
        if value == "admin" {
            Role::Admin
        } else {
            Role::Client
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }
}

/// Claims as issued by the backend
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(alias = "sub")]
    id: Option<String>,
    email: Option<String>,
    role: Option<String>,
    exp: Option<i64>,
}

/// Decoded credential claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub subject_id: String,
    pub email: Option<String>,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

fn structural_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation
}

/// Decode a credential into claims without verifying its signature.
///
/// Missing subject, role or expiry is a [`DecodeError`], never a partial result.
pub fn decode_credential(credential: &str) -> Result<Claims, DecodeError> {
    let credential = credential.trim();
    if credential.is_empty() {
        return Err(DecodeError::Malformed("empty credential".to_string()));
    }

    let key = DecodingKey::from_secret(&[]);
    let data = decode::<RawClaims>(credential, &key, &structural_validation()).map_err(|e| {
        match e.kind() {
            ErrorKind::Json(inner) => DecodeError::Malformed(format!("claims payload: {}", inner)),
            _ => DecodeError::Malformed(e.to_string()),
        }
    })?;
    let raw = data.claims;

    let subject_id = raw
        .id
        .filter(|id| !id.is_empty())
        .ok_or(DecodeError::MissingClaim("id"))?;
    let role = raw.role.ok_or(DecodeError::MissingClaim("role"))?;
    if role.trim().is_empty() {
        return Err(DecodeError::InvalidRole);
    }
    let exp = raw.exp.ok_or(DecodeError::MissingClaim("exp"))?;
    let expires_at = Utc
        .timestamp_opt(exp, 0)
        .single()
        .ok_or_else(|| DecodeError::Malformed(format!("exp out of range: {}", exp)))?;

    Ok(Claims {
        subject_id,
        email: raw.email,
        role: Role::from_claim(&role),
        expires_at,
    })
}
