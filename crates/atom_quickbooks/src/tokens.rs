// --- File: crates/atom_quickbooks/src/tokens.rs ---
//! QBO tokens on top of the shared lifecycle: the realm id travels in `meta`
//! and the refresh token has its own expiry.

use atom_common::oauth::lifecycle::{ensure_fresh_token, needs_refresh};
use atom_common::oauth::{OAuthError, OAuthProvider, TokenSet};
use atom_common::services::{service_names, TokenStore, UserToken};
use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

use crate::auth::qbo_meta;
use crate::error::QboError;

/// A usable QuickBooks access token and the company it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct QboTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub realm_id: String,
    pub access_token_expires_at: Option<DateTime<Utc>>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
}

impl QboTokens {
    fn from_row(row: &UserToken) -> Result<Self, QboError> {
        let realm_id = row
            .meta_str("realmId")
            .filter(|r| !r.is_empty())
            .ok_or(QboError::InvalidTokenStructure)?;
        let refresh_token_expires_at = row
            .meta
            .as_ref()
            .and_then(|m| m.get("refreshTokenExpiresAt"))
            .and_then(|v| v.as_i64())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());
        Ok(Self {
            access_token: row.access_token.clone(),
            refresh_token: row.refresh_token.clone(),
            realm_id: realm_id.to_string(),
            access_token_expires_at: row.expiry_date,
            refresh_token_expires_at,
        })
    }
}

/// Persist tokens from a code exchange for the given company.
pub async fn save_tokens(
    store: &dyn TokenStore,
    user_id: &str,
    realm_id: &str,
    tokens: TokenSet,
    now: DateTime<Utc>,
) -> Result<(), QboError> {
    if realm_id.is_empty() {
        return Err(QboError::InvalidTokenStructure);
    }
    let meta = qbo_meta(realm_id, &tokens, now);
    let row = tokens.into_user_token(user_id, service_names::QUICKBOOKS, Some(meta), now);
    store
        .save_token(row)
        .await
        .map_err(|e| QboError::TokenSave(e.to_string()))?;
    info!(user_id, realm_id, "QBO tokens saved");
    Ok(())
}

/// Load the user's tokens, refreshing them when the access token is about to expire.
pub async fn get_valid_tokens(
    store: &dyn TokenStore,
    provider: &dyn OAuthProvider,
    user_id: &str,
) -> Result<QboTokens, QboError> {
    let row = store
        .latest_token(user_id, service_names::QUICKBOOKS)
        .await
        .map_err(QboError::Store)?
        .ok_or(QboError::AuthRequired)?;
    let current = QboTokens::from_row(&row)?;

    let now = Utc::now();
    if !needs_refresh(&row, now) {
        return Ok(current);
    }

    let refresh_expired = current
        .refresh_token_expires_at
        .map(|at| at <= now)
        .unwrap_or(false);
    if row.usable_refresh_token().is_none() || refresh_expired {
        warn!(user_id, "QBO refresh token missing or expired");
        return Err(QboError::RefreshTokenExpired);
    }

    info!(user_id, "QBO access token expired or nearing expiry; refreshing");
    let refreshed = ensure_fresh_token(store, provider, user_id)
        .await
        .map_err(|e| match e {
            OAuthError::Store(inner) => QboError::TokenSave(inner.to_string()),
            OAuthError::TokenExpiredNoRefresh { .. } => QboError::RefreshTokenExpired,
            other => QboError::RefreshFailed(other.to_string()),
        })?;
    QboTokens::from_row(&refreshed)
}
