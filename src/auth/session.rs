use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::auth::repo_types::{PublicUser, SessionMarker};
use crate::config::{SessionConfig, APP_NAME};
use crate::db::{Store, StoreError};
use crate::error::AppError;
use crate::state::AppState;

/// Payload of the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // user email
    pub uid: i64,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
}

/// Signs and checks the token inside the store's session marker. This is the
/// only way operations learn who is logged in.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let SessionConfig {
            secret,
            ttl_minutes,
        } = &state.config.session;
        Self::new(secret, Duration::minutes(*ttl_minutes))
    }
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: APP_NAME.to_string(),
            ttl,
        }
    }

    fn sign(&self, user: &PublicUser) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let expires = now
            .checked_add(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("session ttl {} out of range", self.ttl))?;
        let claims = SessionClaims {
            sub: user.email.clone(),
            uid: user.id,
            iat: usize::try_from(now.unix_timestamp())?,
            exp: usize::try_from(expires.unix_timestamp())
                .context("session would expire before the epoch")?,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = user.id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Replaces whatever session exists with one for `user`.
    pub fn start(&self, store: &Store, user: PublicUser) -> Result<SessionMarker, AppError> {
        let token = self.sign(&user)?;
        let marker = SessionMarker { token, user };
        store.set_session(&marker)?;
        Ok(marker)
    }

    /// The logged-in user, if the marker exists and its token is still valid.
    /// A stale or forged marker is cleared.
    pub fn current(&self, store: &Store) -> Result<Option<PublicUser>, StoreError> {
        let Some(marker) = store.session()? else {
            return Ok(None);
        };
        match self.verify(&marker.token) {
            Ok(claims) if claims.uid == marker.user.id && claims.sub == marker.user.email => {
                Ok(Some(marker.user))
            }
            Ok(claims) => {
                warn!(uid = claims.uid, user_id = marker.user.id, "session token does not match its user");
                store.clear_session()?;
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, user_id = marker.user.id, "session expired or invalid");
                store.clear_session()?;
                Ok(None)
            }
        }
    }

    pub fn require(&self, store: &Store, action: &'static str) -> Result<PublicUser, AppError> {
        self.current(store)?.ok_or(AppError::Unauthorized(action))
    }

    /// Swaps the cached user in the marker, keeping the token and its expiry.
    pub fn refresh_user(&self, store: &Store, user: PublicUser) -> Result<(), StoreError> {
        if let Some(mut marker) = store.session()? {
            marker.user = user;
            store.set_session(&marker)?;
        }
        Ok(())
    }

    pub fn end(&self, store: &Store) -> Result<(), StoreError> {
        store.clear_session()
    }
}
