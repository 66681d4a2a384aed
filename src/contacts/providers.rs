use crate::config::AccountConfig;
use crate::contacts::feed::{ContactFeed, GroupFeed};
use crate::contacts::{ContactsError, ContactsResult};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Mutex;

const GOOGLE_AUTH_URL: &str = "https://www.google.com/accounts/ClientLogin";
const GOOGLE_FEEDS_URL: &str = "https://www.google.com/m8/feeds";
const GDATA_VERSION: &str = "3.0";
const CLIENT_SOURCE: &str = "contacts2bbdb";

/// Remote address-book service
#[async_trait]
pub trait ContactsProvider: Send + Sync {
    /// List at most `max_results` contact groups of the account
    async fn fetch_groups(
        &self,
        account: &AccountConfig,
        max_results: usize,
    ) -> ContactsResult<GroupFeed>;

    /// Fetch at most `max_results` contacts belonging to one group
    async fn fetch_contacts(
        &self,
        account: &AccountConfig,
        group_id: &str,
        max_results: usize,
    ) -> ContactsResult<ContactFeed>;

    /// Fetch the raw representation of a single contact, for debugging
    async fn lookup_contact(&self, account: &AccountConfig, contact_id: &str)
        -> ContactsResult<String>;

    /// Get provider name
    fn provider_name(&self) -> &str;
}

/// Google Contacts (GData v3) provider using login/password authentication
pub struct GoogleContactsProvider {
    http_client: HttpClient,
    auth_url: String,
    feeds_url: String,
    tokens: Mutex<HashMap<String, String>>,
}

impl GoogleContactsProvider {
    pub fn new() -> Self {
        Self::with_endpoints(GOOGLE_AUTH_URL, GOOGLE_FEEDS_URL)
    }

    /// Point the provider at other endpoints (local test servers, proxies)
    pub fn with_endpoints(auth_url: impl Into<String>, feeds_url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            auth_url: auth_url.into(),
            feeds_url: feeds_url.into().trim_end_matches('/').to_string(),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    fn cached_token(&self, login: &str) -> Option<String> {
        self.tokens
            .lock()
            .ok()
            .and_then(|tokens| tokens.get(login).cloned())
    }

    async fn get_auth_token(&self, account: &AccountConfig) -> ContactsResult<String> {
        if let Some(token) = self.cached_token(&account.login) {
            return Ok(token);
        }

        tracing::debug!("Authenticating {} with {}", account.login, self.auth_url);

        let response = self
            .http_client
            .post(&self.auth_url)
            .form(&[
                ("accountType", "HOSTED_OR_GOOGLE"),
                ("Email", account.login.as_str()),
                ("Passwd", account.password.as_str()),
                ("service", "cp"),
                ("source", CLIENT_SOURCE),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ContactsError::AuthError(format!(
                "Login failed for {}: {}",
                account.login,
                error_text.trim()
            )));
        }

        let body = response.text().await?;
        let token = parse_auth_token(&body).ok_or_else(|| {
            ContactsError::AuthError(format!("No auth token returned for {}", account.login))
        })?;

        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.insert(account.login.clone(), token.clone());
        }

        Ok(token)
    }

    async fn get(
        &self,
        account: &AccountConfig,
        url: &str,
        query: &[(&str, String)],
    ) -> ContactsResult<Response> {
        let token = self.get_auth_token(account).await?;

        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("GoogleLogin auth={}", token))
            .header("GData-Version", GDATA_VERSION)
            .query(query)
            .send()
            .await?;

        check_status(response).await
    }
}

impl Default for GoogleContactsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContactsProvider for GoogleContactsProvider {
    async fn fetch_groups(
        &self,
        account: &AccountConfig,
        max_results: usize,
    ) -> ContactsResult<GroupFeed> {
        let url = format!("{}/groups/default/full", self.feeds_url);
        let query = feed_query(max_results);

        let response = self.get(account, &url, &query).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_contacts(
        &self,
        account: &AccountConfig,
        group_id: &str,
        max_results: usize,
    ) -> ContactsResult<ContactFeed> {
        let url = format!("{}/contacts/default/full", self.feeds_url);
        let mut query = feed_query(max_results);
        query.push(("group", group_id.to_string()));

        let response = self.get(account, &url, &query).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn lookup_contact(
        &self,
        account: &AccountConfig,
        contact_id: &str,
    ) -> ContactsResult<String> {
        // Entry ids point at the "base" projection which carries no extended data
        let url = contact_id.replacen("/base/", "/full/", 1);
        let query = [("alt", "json".to_string())];

        let response = self.get(account, &url, &query).await?;
        Ok(response.text().await?)
    }

    fn provider_name(&self) -> &str {
        "Google Contacts"
    }
}

async fn check_status(response: Response) -> ContactsResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ContactsError::AuthError(
            format!("Google Contacts API rejected credentials ({}): {}", status, error_text),
        )),
        _ => Err(ContactsError::ApiError(format!(
            "Google Contacts API error ({}): {}",
            status, error_text
        ))),
    }
}

/// Query shared by the group and contact feeds
fn feed_query(max_results: usize) -> Vec<(&'static str, String)> {
    vec![
        ("alt", "json".to_string()),
        ("max-results", max_results.to_string()),
    ]
}

/// Pull `Auth=...` out of a ClientLogin response body
fn parse_auth_token(body: &str) -> Option<String> {
    body.lines()
        .filter_map(|line| line.trim().strip_prefix("Auth="))
        .map(str::to_string)
        .find(|token| !token.is_empty())
}
