use crate::api::traits::MarketApi;
use crate::api::types::{
    AccessToken, Attachment, Credentials, ListingUpdate, NewListing, NewTransaction,
    RefreshRequest, TransactionUpdate,
};
use crate::config::Config;
use crate::error::{MarketError, Result};
use crate::models::{Listing, TokenPair, Transaction, TransactionStatus};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// reqwest-backed client for the marketplace backend
pub struct HttpMarketApi {
    client: Client,
    base_url: String,
}

impl HttpMarketApi {
    /// Create a client against `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(config.api_url.clone(), config.timeout)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("farm-market/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured reqwest client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        debug!("{} {}", response.status(), response.url());
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(server_error(response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Turn a non-2xx response into an error carrying the raw server message
async fn server_error(response: Response) -> MarketError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!("Backend returned status {}", status);
    MarketError::Server {
        status,
        message: error_message(&body),
    }
}

/// The backend's `detail` field when present, the raw body otherwise
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn file_part(attachment: &Attachment) -> Result<Part> {
    Ok(Part::bytes(attachment.bytes.clone())
        .file_name(attachment.file_name.clone())
        .mime_str(&attachment.content_type)?)
}

fn listing_form(listing: &NewListing) -> Result<Form> {
    let mut form = Form::new()
        .text("farm_id", listing.farm_id.clone())
        .text("location", listing.location.clone())
        .text("price", listing.price.to_string())
        .text("size", listing.size.to_string())
        .text("quality", listing.quality.clone())
        .text("description", listing.description.clone())
        .text("email", listing.email.clone())
        .text("phone", listing.phone.clone())
        .text("kind", listing.kind.to_string());

    if let Some(duration) = &listing.rent_duration {
        form = form.text("rent_duration", duration.clone());
    }
    for image in &listing.images {
        form = form.part("images", file_part(image)?);
    }
    if let Some(document) = &listing.document {
        form = form.part("document", file_part(document)?);
    }
    Ok(form)
}

#[async_trait]
impl MarketApi for HttpMarketApi {
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair> {
        info!("Logging in as {}", credentials.email);
        self.send_json(self.client.post(self.url("/api/auth/login/")).json(credentials))
            .await
    }

    async fn admin_login(&self, credentials: &Credentials) -> Result<TokenPair> {
        info!("Admin login as {}", credentials.email);
        self.send_json(
            self.client
                .post(self.url("/api/auth/admin/login/"))
                .json(credentials),
        )
        .await
    }

    async fn validate_token(&self, access: &str) -> Result<()> {
        self.send(
            self.client
                .get(self.url("/api/auth/validate/"))
                .bearer_auth(access),
        )
        .await?;
        Ok(())
    }

    async fn refresh_token(&self, refresh: &str) -> Result<String> {
        let token: AccessToken = self
            .send_json(
                self.client
                    .post(self.url("/api/auth/refresh/"))
                    .json(&RefreshRequest { refresh }),
            )
            .await?;
        Ok(token.access)
    }

    async fn list_listings(&self) -> Result<Vec<Listing>> {
        let listings: Vec<Listing> = self
            .send_json(self.client.get(self.url("/api/farms/")))
            .await?;
        debug!("Fetched {} listings", listings.len());
        Ok(listings)
    }

    async fn get_listing(&self, id: i64) -> Result<Listing> {
        self.send_json(self.client.get(self.url(&format!("/api/farms/{}/", id))))
            .await
    }

    async fn my_listings(&self, access: &str) -> Result<Vec<Listing>> {
        self.send_json(
            self.client
                .get(self.url("/api/farms/mine/"))
                .bearer_auth(access),
        )
        .await
    }

    async fn create_listing(&self, access: &str, listing: &NewListing) -> Result<Listing> {
        info!(
            "Uploading listing {} with {} images",
            listing.farm_id,
            listing.images.len()
        );
        let form = listing_form(listing)?;
        self.send_json(
            self.client
                .post(self.url("/api/farms/"))
                .bearer_auth(access)
                .multipart(form),
        )
        .await
    }

    async fn update_listing(&self, access: &str, id: i64, update: &ListingUpdate) -> Result<Listing> {
        self.send_json(
            self.client
                .patch(self.url(&format!("/api/farms/{}/", id)))
                .bearer_auth(access)
                .json(update),
        )
        .await
    }

    async fn delete_listing(&self, access: &str, id: i64) -> Result<()> {
        self.send(
            self.client
                .delete(self.url(&format!("/api/farms/{}/", id)))
                .bearer_auth(access),
        )
        .await?;
        Ok(())
    }

    async fn list_transactions(&self, access: &str) -> Result<Vec<Transaction>> {
        self.send_json(
            self.client
                .get(self.url("/api/transactions/"))
                .bearer_auth(access),
        )
        .await
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction> {
        self.send_json(
            self.client
                .post(self.url("/api/transactions/"))
                .json(transaction),
        )
        .await
    }

    async fn update_transaction(
        &self,
        access: &str,
        id: i64,
        status: TransactionStatus,
    ) -> Result<Transaction> {
        self.send_json(
            self.client
                .patch(self.url(&format!("/api/transactions/{}/", id)))
                .bearer_auth(access)
                .json(&TransactionUpdate { status }),
        )
        .await
    }

    async fn delete_transaction(&self, access: &str, id: i64) -> Result<()> {
        self.send(
            self.client
                .delete(self.url(&format!("/api/transactions/{}/", id)))
                .bearer_auth(access),
        )
        .await?;
        Ok(())
    }

    async fn send_confirmation_email(&self, transaction_id: i64) -> Result<()> {
        self.send(self.client.post(self.url(&format!(
            "/api/transactions/{}/send-email/",
            transaction_id
        ))))
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::responder::{serve_once, CannedResponse};

    fn local_api(base_url: String) -> HttpMarketApi {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpMarketApi::with_client(client, base_url)
    }

    #[test]
    fn error_message_prefers_detail() {
        assert_eq!(error_message(r#"{"detail":"Token is invalid"}"#), "Token is invalid");
        assert_eq!(error_message("  gateway down \n"), "gateway down");
        assert_eq!(error_message(r#"{"price":["required"]}"#), r#"{"price":["required"]}"#);
    }

    #[test]
    fn base_url_is_normalised() {
        let api = HttpMarketApi::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:8000");
        assert_eq!(api.url("/api/farms/"), "http://127.0.0.1:8000/api/farms/");
    }

    #[tokio::test]
    async fn validate_sends_bearer_token() {
        let server = serve_once(CannedResponse::json(200, "{}")).await;
        let api = local_api(server.base_url());

        api.validate_token("abc123").await.unwrap();

        let request = server.request().await;
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/api/auth/validate/");
        assert_eq!(request.header("authorization"), Some("Bearer abc123"));
    }

    #[tokio::test]
    async fn rejected_token_is_a_server_error() {
        let server =
            serve_once(CannedResponse::json(401, r#"{"detail":"Token is invalid or expired"}"#)).await;
        let api = local_api(server.base_url());

        let err = api.validate_token("stale").await.unwrap_err();
        match err {
            MarketError::Server { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Token is invalid or expired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_returns_token_pair() {
        let server = serve_once(CannedResponse::json(
            200,
            r#"{"access":"a-token","refresh":"r-token"}"#,
        ))
        .await;
        let api = local_api(server.base_url());

        let pair = api
            .login(&Credentials {
                email: "jane@example.com".into(),
                password: "hunter2".into(),
            })
            .await
            .unwrap();
        assert_eq!(pair.access, "a-token");
        assert_eq!(pair.refresh, "r-token");

        let request = server.request().await;
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/auth/login/");
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["email"], "jane@example.com");
    }

    #[tokio::test]
    async fn create_listing_posts_multipart() {
        let listing_json = r#"{"id":9,"farm_id":"F-9","location":"Eldoret","price":500.0,
            "size":2.0,"quality":"red soil","description":"d","email":"s@example.com",
            "phone":"0712345678","kind":"rent","rent_duration":"12 months"}"#;
        let server = serve_once(CannedResponse::json(201, listing_json)).await;
        let api = local_api(server.base_url());

        let new_listing = NewListing {
            farm_id: "F-9".into(),
            location: "Eldoret".into(),
            price: 500.0,
            size: 2.0,
            quality: "red soil".into(),
            description: "d".into(),
            email: "s@example.com".into(),
            phone: "0712345678".into(),
            kind: crate::models::ListingKind::Rent,
            rent_duration: Some("12 months".into()),
            images: vec![Attachment::new("a.jpg", "image/jpeg", vec![1, 2, 3])],
            document: None,
        };
        let created = api.create_listing("tok", &new_listing).await.unwrap();
        assert_eq!(created.id, 9);

        let request = server.request().await;
        assert_eq!(request.path, "/api/farms/");
        assert_eq!(request.header("authorization"), Some("Bearer tok"));
        assert!(request
            .header("content-type")
            .unwrap_or_default()
            .starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains("name=\"rent_duration\""));
        assert!(body.contains("filename=\"a.jpg\""));
    }
}
