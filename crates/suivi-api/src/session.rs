//! Explicit session context
//!
//! The signed-in identity is a value passed to whatever needs it, never read
//! from ambient storage. Claims are decoded from the JWT payload without
//! signature verification: the API verifies, the client only reads.

use crate::error::SessionError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use suivi_model::Matricule;

/// Claims carried by the API's tokens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User the token was issued to
    #[serde(default)]
    pub matricule: Option<Matricule>,
    /// Role label
    #[serde(default)]
    pub role: Option<String>,
    /// Expiry, seconds since the epoch
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issue time, seconds since the epoch
    #[serde(default)]
    pub iat: Option<i64>,
    /// Anything else the API put in the token
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Decode the payload segment of `token`
    pub fn decode(token: &str) -> Result<Self, SessionError> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(SessionError::MalformedToken);
        };
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Expiry instant, if the token has one
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Identity of the signed-in user
#[derive(Clone, PartialEq)]
pub struct SessionContext {
    token: String,
    matricule: Matricule,
    claims: Claims,
}

impl SessionContext {
    /// Build from a token, taking the user from its claims
    pub fn from_token(token: impl Into<String>) -> Result<Self, SessionError> {
        let token = token.into();
        let claims = Claims::decode(&token)?;
        let matricule = claims
            .matricule
            .clone()
            .ok_or(SessionError::MissingMatricule)?;
        Ok(Self {
            token,
            matricule,
            claims,
        })
    }

    /// Build from a token and a user reported alongside it.
    ///
    /// Claims are read when possible; an opaque token yields empty claims.
    #[must_use]
    pub fn with_matricule(token: impl Into<String>, matricule: impl Into<Matricule>) -> Self {
        let token = token.into();
        let claims = Claims::decode(&token).unwrap_or_default();
        Self {
            token,
            matricule: matricule.into(),
            claims,
        }
    }

    /// Bearer token
    #[inline]
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Signed-in user
    #[inline]
    #[must_use]
    pub fn matricule(&self) -> &Matricule {
        &self.matricule
    }

    /// Decoded claims
    #[inline]
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Whether the token's expiry is at or before `now`; tokens without an
    /// expiry never expire client-side.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.claims.expires_at().is_some_and(|exp| exp <= now)
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &"<redacted>")
            .field("matricule", &self.matricule)
            .field("claims", &self.claims)
            .finish()
    }
}
