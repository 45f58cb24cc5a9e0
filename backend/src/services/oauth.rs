//! Google and Facebook sign-in
//!
//! Authorization-code flow: redirect to the provider, exchange the returned
//! code for an access token, read the profile, then find or create the local
//! account and hand the SPA a bearer token.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Url;
use serde::Deserialize;
use sha2::Sha256;

use crate::config::{Config, OAuthConfig};
use crate::error::{AppError, AppResult};
use crate::services::UserService;
use shared::models::DEFAULT_AVATAR;

type HmacSha256 = Hmac<Sha256>;

/// How long a sign-in attempt may take before its `state` is rejected
const STATE_TTL_SECS: i64 = 600;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

const FACEBOOK_AUTHORIZE_URL: &str = "https://www.facebook.com/v18.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v18.0/oauth/access_token";
const FACEBOOK_PROFILE_URL: &str = "https://graph.facebook.com/v18.0/me";

/// Supported identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
        }
    }

    fn scope(&self) -> &'static str {
        match self {
            Provider::Google => "profile email",
            Provider::Facebook => "email",
        }
    }
}

/// Token endpoint response (both providers)
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google OpenID userinfo
#[derive(Debug, Deserialize)]
struct GoogleProfile {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FacebookPictureData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FacebookPicture {
    data: Option<FacebookPictureData>,
}

/// Facebook Graph `/me` profile
#[derive(Debug, Deserialize)]
struct FacebookProfile {
    id: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<FacebookPicture>,
}

/// Provider-neutral profile used to match or create the local account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialProfile {
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl From<GoogleProfile> for SocialProfile {
    fn from(p: GoogleProfile) -> Self {
        // Google only omits the email when the scope was refused
        let email = p.email.unwrap_or_else(|| format!("{}@google.com", p.sub));
        Self {
            name: p.name.unwrap_or_else(|| email.clone()),
            avatar: p.picture.unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            email,
        }
    }
}

impl From<FacebookProfile> for SocialProfile {
    fn from(p: FacebookProfile) -> Self {
        let email = p
            .email
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| format!("{}@facebook.com", p.id));
        let avatar = p
            .picture
            .and_then(|pic| pic.data)
            .and_then(|data| data.url)
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string());
        Self {
            name: p.name.unwrap_or_else(|| email.clone()),
            email,
            avatar,
        }
    }
}

/// Social sign-in service
#[derive(Clone)]
pub struct OAuthService {
    users: UserService,
    config: OAuthConfig,
    state_secret: String,
    http_client: reqwest::Client,
}

impl OAuthService {
    /// Create a new OAuth service
    pub fn new(users: UserService, config: &Config) -> Self {
        Self {
            users,
            config: config.oauth.clone(),
            state_secret: config.jwt.secret.clone(),
            http_client: reqwest::Client::new(),
        }
    }

    fn credentials(&self, provider: Provider) -> AppResult<(&str, &str)> {
        let (id, secret) = match provider {
            Provider::Google => (
                self.config.google_client_id.as_deref(),
                self.config.google_client_secret.as_deref(),
            ),
            Provider::Facebook => (
                self.config.facebook_app_id.as_deref(),
                self.config.facebook_app_secret.as_deref(),
            ),
        };

        match (id, secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok((id, secret)),
            _ => Err(AppError::Configuration(format!(
                "{} sign-in is not configured",
                provider.as_str()
            ))),
        }
    }

    fn redirect_uri(&self, provider: Provider) -> String {
        format!(
            "{}/api/users/auth/{}/callback",
            self.config.callback_base_url.trim_end_matches('/'),
            provider.as_str()
        )
    }

    /// Provider authorize URL the browser is sent to
    pub fn authorization_url(&self, provider: Provider) -> AppResult<String> {
        let (client_id, _) = self.credentials(provider)?;
        let redirect_uri = self.redirect_uri(provider);
        let state = sign_state(&self.state_secret, provider, Utc::now().timestamp())?;

        let base = match provider {
            Provider::Google => GOOGLE_AUTHORIZE_URL,
            Provider::Facebook => FACEBOOK_AUTHORIZE_URL,
        };

        let url = Url::parse_with_params(
            base,
            &[
                ("response_type", "code"),
                ("client_id", client_id),
                ("redirect_uri", redirect_uri.as_str()),
                ("scope", provider.scope()),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| AppError::Configuration(format!("Invalid authorize URL: {}", e)))?;

        Ok(url.to_string())
    }

    /// Complete the flow and return a bearer token for the local account
    pub async fn complete_sign_in(
        &self,
        provider: Provider,
        code: &str,
        state: Option<&str>,
    ) -> AppResult<String> {
        verify_state(&self.state_secret, provider, state, Utc::now().timestamp())?;

        let access_token = self.exchange_code(provider, code).await?;
        let profile = self.fetch_profile(provider, &access_token).await?;

        let user = self
            .users
            .find_or_create_social(&profile.name, &profile.email, &profile.avatar)
            .await?;

        self.users.issue_token(&user)
    }

    /// SPA login page, carrying the token when sign-in succeeded
    pub fn login_redirect(&self, token: Option<&str>) -> String {
        let base = format!("{}/login", self.config.frontend_url.trim_end_matches('/'));
        match token {
            Some(token) => Url::parse_with_params(&base, &[("token", token)])
                .map(|u| u.to_string())
                .unwrap_or(base),
            None => base,
        }
    }

    async fn exchange_code(&self, provider: Provider, code: &str) -> AppResult<String> {
        let (client_id, client_secret) = self.credentials(provider)?;
        let redirect_uri = self.redirect_uri(provider);

        let request = match provider {
            Provider::Google => self.http_client.post(GOOGLE_TOKEN_URL).form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri.as_str()),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ]),
            Provider::Facebook => self.http_client.get(FACEBOOK_TOKEN_URL).query(&[
                ("code", code),
                ("redirect_uri", redirect_uri.as_str()),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ]),
        };

        let response = request.send().await.map_err(|e| {
            AppError::ExternalService(format!("{} API error: {}", provider.as_str(), e))
        })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "{} token exchange failed: {}",
                provider.as_str(),
                error_text
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!(
                "Failed to parse {} token response: {}",
                provider.as_str(),
                e
            ))
        })?;

        Ok(token.access_token)
    }

    async fn fetch_profile(
        &self,
        provider: Provider,
        access_token: &str,
    ) -> AppResult<SocialProfile> {
        let request = match provider {
            Provider::Google => self
                .http_client
                .get(GOOGLE_USERINFO_URL)
                .bearer_auth(access_token),
            Provider::Facebook => self.http_client.get(FACEBOOK_PROFILE_URL).query(&[
                ("fields", "id,name,email,picture.type(large)"),
                ("access_token", access_token),
            ]),
        };

        let response = request.send().await.map_err(|e| {
            AppError::ExternalService(format!("{} API error: {}", provider.as_str(), e))
        })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "{} profile fetch failed: {}",
                provider.as_str(),
                error_text
            )));
        }

        let parse_err = |e: reqwest::Error| {
            AppError::ExternalService(format!(
                "Failed to parse {} profile: {}",
                provider.as_str(),
                e
            ))
        };

        let profile = match provider {
            Provider::Google => response
                .json::<GoogleProfile>()
                .await
                .map_err(parse_err)?
                .into(),
            Provider::Facebook => response
                .json::<FacebookProfile>()
                .await
                .map_err(parse_err)?
                .into(),
        };

        Ok(profile)
    }
}

fn state_mac(secret: &str, payload: &str) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Configuration("Failed to create HMAC".to_string()))?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

/// `state` parameter binding the attempt to a provider and an issue time
pub fn sign_state(secret: &str, provider: Provider, issued_at: i64) -> AppResult<String> {
    let payload = format!("{}:{}", provider.as_str(), issued_at);
    let signature = URL_SAFE_NO_PAD.encode(state_mac(secret, &payload)?.finalize().into_bytes());
    Ok(format!("{}.{}", URL_SAFE_NO_PAD.encode(payload), signature))
}

/// Check a returned `state` parameter
pub fn verify_state(
    secret: &str,
    provider: Provider,
    state: Option<&str>,
    now: i64,
) -> AppResult<()> {
    let invalid = || AppError::Unauthorized("Invalid sign-in state".to_string());

    let (payload_b64, signature_b64) = state
        .and_then(|s| s.split_once('.'))
        .ok_or_else(invalid)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(invalid)?;
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|_| invalid())?;

    state_mac(secret, &payload)?
        .verify_slice(&signature)
        .map_err(|_| invalid())?;

    let (name, issued_at) = payload.split_once(':').ok_or_else(invalid)?;
    let issued_at: i64 = issued_at.parse().map_err(|_| invalid())?;

    if name != provider.as_str() || now - issued_at > STATE_TTL_SECS || issued_at > now + 60 {
        return Err(invalid());
    }

    Ok(())
}
