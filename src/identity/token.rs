//! ID-token authorship. The submitted token has to verify against the identity service's
//! published signing keys and belong to a live, unrevoked profile; the post is then credited
//! to the verified profile, not to whatever the form claimed.

use crate::config::IdentityConfig;
use crate::identity::{keys::KeySet, Author, Resolver, SubmitForm};
use crate::metrics;
use crate::twoface::{Cause, Describe, ExternalError, Fallible, TfError};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use digest::Digest;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use tracing::warn;
use url::Url;

// Notices are numbered by which verification step failed. Only the token check itself
// echoes the verifier's error, so users can tell an expired login from a broken one.
pub const NOTICE_KEYS: &str = "1. Couldn't authenticate. Try logging in again?";
pub const NOTICE_TOKEN: &str = "2. Couldn't authenticate. Try logging in again?";
pub const NOTICE_PROFILE: &str = "3. Couldn't authenticate. Try logging in again?";
pub const NOTICE_REVOKED: &str = "4. Couldn't authenticate. Try logging in again?";

/// Resolves authorship by verifying the `token` form field.
#[derive(Clone, Debug)]
pub struct TokenResolver {
    /// Expected `iss` claim.
    issuer: String,
    /// Expected `aud` claim.
    audience: String,
    keys_url: Url,
    accounts_url: Url,
    timeout: Duration,
}

/// Claims read out of a verified ID token. Signature, expiry, issuer and audience are
/// checked before these are ever looked at.
#[derive(Deserialize, Debug, Clone)]
pub struct IdClaims {
    /// Subject id of the account the token was minted for.
    pub sub: String,
    /// Unix seconds the token was minted at.
    pub iat: i64,
    /// Unix seconds the subject last signed in, when the service reports it.
    #[serde(default)]
    pub auth_time: Option<i64>,
}

/// The identity service's record of one subject.
#[derive(Deserialize, Debug, Clone)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    /// Unix seconds. Tokens minted before this instant have been revoked.
    #[serde(default)]
    pub tokens_valid_after: i64,
}

impl TokenResolver {
    pub fn from_config(config: &IdentityConfig) -> Result<Self, anyhow::Error> {
        let keys_url =
            Url::parse(&config.keys_url).context("identity.keys_url is not a valid URL")?;
        let mut accounts_url =
            Url::parse(&config.accounts_url).context("identity.accounts_url is not a valid URL")?;
        // Url::join treats the last path segment as a file unless it ends in a slash.
        if !accounts_url.path().ends_with('/') {
            accounts_url.set_path(&format!("{}/", accounts_url.path()));
        }
        Ok(Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            keys_url,
            accounts_url,
            timeout: config.http_timeout(),
        })
    }

    /// The signing keys the identity service currently publishes. Fetched per verification;
    /// the service's cache headers are not honoured.
    async fn fetch_keys(&self) -> Result<KeySet, anyhow::Error> {
        let client = awc::Client::builder().timeout(self.timeout).finish();
        let mut response = client
            .get(self.keys_url.as_str())
            .send()
            .await
            .map_err(|e| anyhow!("fetching signing keys: {}", e))?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "signing-key endpoint answered {}",
                response.status()
            ));
        }
        let raw = response
            .body()
            .await
            .map_err(|e| anyhow!("reading signing keys: {}", e))?;
        let keys: KeySet = serde_json::from_slice(&raw).context("decoding signing keys")?;
        Ok(keys)
    }

    /// Signature, expiry, issuer and audience checks. Pure given the key set.
    fn check_token(&self, token: &str, keys: &KeySet) -> Result<IdClaims, anyhow::Error> {
        let header = decode_header(token).context("reading token header")?;
        let kid = header.kid.ok_or_else(|| anyhow!("token names no key id"))?;
        let key = keys
            .find(&kid)
            .ok_or_else(|| anyhow!("token signed with unknown key {}", kid))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.iss = Some(self.issuer.clone());
        validation.set_audience(&[self.audience.as_str()]);
        let data = decode::<IdClaims>(token, &key.decoding_key(), &validation)?;
        Ok(data.claims)
    }

    async fn fetch_profile(&self, subject: &str) -> Result<UserProfile, anyhow::Error> {
        let url = self
            .accounts_url
            .join(subject)
            .context("building profile URL")?;
        let client = awc::Client::builder().timeout(self.timeout).finish();
        let mut response = client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| anyhow!("fetching profile: {}", e))?;
        if !response.status().is_success() {
            return Err(anyhow!("profile endpoint answered {}", response.status()));
        }
        let raw = response
            .body()
            .await
            .map_err(|e| anyhow!("reading profile: {}", e))?;
        let profile: UserProfile = serde_json::from_slice(&raw).context("decoding profile")?;
        Ok(profile)
    }

    /// A token minted before the profile's cutoff has been revoked.
    fn check_revoked(claims: &IdClaims, profile: &UserProfile) -> Result<(), anyhow::Error> {
        let minted_at = claims.auth_time.unwrap_or(claims.iat);
        if minted_at < profile.tokens_valid_after {
            return Err(anyhow!(
                "token for {} minted at {} but tokens are only valid after {}",
                profile.user_id,
                minted_at,
                profile.tokens_valid_after
            ));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl Resolver for TokenResolver {
    async fn resolve(&self, form: &SubmitForm) -> Fallible<Author> {
        let token = form.token();

        let keys = self
            .fetch_keys()
            .await
            .map_err(|e| refused("no_keys", server_error(NOTICE_KEYS), e))?;

        let claims = match self.check_token(token, &keys) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(token = %fingerprint(token), "rejected ID token: {:#}", e);
                return Err(refused("bad_token", token_check_notice(&e), e));
            }
        };

        let profile = self
            .fetch_profile(&claims.sub)
            .await
            .map_err(|e| refused("no_profile", server_error(NOTICE_PROFILE), e))?;

        if let Err(e) = Self::check_revoked(&claims, &profile) {
            warn!(token = %fingerprint(token), "rejected ID token: {:#}", e);
            return Err(refused(
                "revoked",
                ExternalError {
                    cause: Cause::UserBadAuth,
                    text: NOTICE_REVOKED.into(),
                },
                e,
            ));
        }

        metrics::IDENTITY_CHECKS.with_label_values(&["ok"]).inc();
        Ok(Author {
            name: profile.display_name,
            user_id: profile.user_id,
        })
    }
}

fn server_error(text: &'static str) -> ExternalError {
    ExternalError {
        cause: Cause::ServerError,
        text: text.into(),
    }
}

/// The one notice that carries detail: it echoes the verifier's error text.
fn token_check_notice(err: &anyhow::Error) -> ExternalError {
    ExternalError {
        cause: Cause::UserBadAuth,
        text: format!("{} {:#}", NOTICE_TOKEN, err).into(),
    }
}

fn refused(outcome: &str, external: ExternalError, err: anyhow::Error) -> TfError {
    metrics::IDENTITY_CHECKS.with_label_values(&[outcome]).inc();
    err.describe(external)
}

/// First 8 bytes of the token's SHA-256, hex-encoded. Raw tokens stay out of the logs.
fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}
