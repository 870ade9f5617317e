//! In-memory `MarketApi` that records every call it receives.

use crate::api::{Credentials, ListingUpdate, MarketApi, NewListing, NewTransaction};
use crate::error::{MarketError, Result};
use crate::models::{
    Listing, ListingKind, TokenPair, Transaction, TransactionStatus, ValidationStatus,
};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeApi {
    valid_tokens: Vec<String>,
    unreachable: bool,
    email_fails: bool,
    upload_error: Option<String>,
    listing_updates_fail: bool,
    listings: Mutex<Vec<Listing>>,
    transactions: Mutex<Vec<Transaction>>,
    calls: Mutex<Vec<String>>,
    uploads: Mutex<Vec<NewListing>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepting(mut self, token: &str) -> Self {
        self.valid_tokens.push(token.to_string());
        self
    }

    /// Every call fails as if the backend were down
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn failing_email(mut self) -> Self {
        self.email_fails = true;
        self
    }

    pub fn failing_upload(mut self, message: &str) -> Self {
        self.upload_error = Some(message.to_string());
        self
    }

    pub fn failing_listing_updates(mut self) -> Self {
        self.listing_updates_fail = true;
        self
    }

    pub fn with_listings(self, listings: Vec<Listing>) -> Self {
        *self.listings.lock().unwrap() = listings;
        self
    }

    pub fn with_transactions(self, transactions: Vec<Transaction>) -> Self {
        *self.transactions.lock().unwrap() = transactions;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<NewListing> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn listing_state(&self, id: i64) -> Option<Listing> {
        self.listings.lock().unwrap().iter().find(|l| l.id == id).cloned()
    }

    fn record(&self, call: impl Into<String>) -> Result<()> {
        self.calls.lock().unwrap().push(call.into());
        if self.unreachable {
            return Err(MarketError::Server {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }

    fn authorize(&self, access: &str) -> Result<()> {
        if self.valid_tokens.iter().any(|t| t == access) {
            Ok(())
        } else {
            Err(MarketError::Server {
                status: 401,
                message: "Token is invalid or expired".into(),
            })
        }
    }

    fn not_found() -> MarketError {
        MarketError::Server {
            status: 404,
            message: "Not found.".into(),
        }
    }
}

pub fn listing(id: i64, location: &str, kind: ListingKind) -> Listing {
    Listing {
        id,
        farm_id: format!("FARM-{id}"),
        location: location.to_string(),
        price: 100_000.0 * id as f64,
        size: 2.5,
        quality: "loam".to_string(),
        description: format!("Farm {id} in {location}"),
        images: vec![format!("/media/farms/{id}/1.jpg")],
        email: "seller@example.com".to_string(),
        phone: "0712345678".to_string(),
        kind,
        rent_duration: (kind == ListingKind::Rent).then(|| "12 months".to_string()),
        sold: false,
        validation: ValidationStatus::Approved,
        owner: Some("seller@example.com".to_string()),
        created_at: None,
    }
}

pub fn transaction(id: i64, listing: i64, status: TransactionStatus) -> Transaction {
    Transaction {
        id,
        listing,
        full_name: "Wanjiku Kamau".to_string(),
        email: "wanjiku@example.com".to_string(),
        phone: "0722000111".to_string(),
        message: None,
        rent_duration: None,
        status,
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl MarketApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair> {
        self.record(format!("login {}", credentials.email))?;
        if credentials.password != "correct-horse" {
            return Err(MarketError::Server {
                status: 401,
                message: "No active account found with the given credentials".into(),
            });
        }
        Ok(TokenPair {
            access: "user-access".into(),
            refresh: "user-refresh".into(),
        })
    }

    async fn admin_login(&self, credentials: &Credentials) -> Result<TokenPair> {
        self.record(format!("admin_login {}", credentials.email))?;
        Ok(TokenPair {
            access: "admin-access".into(),
            refresh: "admin-refresh".into(),
        })
    }

    async fn validate_token(&self, access: &str) -> Result<()> {
        self.record(format!("validate {access}"))?;
        self.authorize(access)
    }

    async fn refresh_token(&self, refresh: &str) -> Result<String> {
        self.record(format!("refresh {refresh}"))?;
        Ok(format!("{refresh}-renewed"))
    }

    async fn list_listings(&self) -> Result<Vec<Listing>> {
        self.record("list_listings")?;
        Ok(self.listings.lock().unwrap().clone())
    }

    async fn get_listing(&self, id: i64) -> Result<Listing> {
        self.record(format!("get_listing {id}"))?;
        self.listing_state(id).ok_or_else(Self::not_found)
    }

    async fn my_listings(&self, access: &str) -> Result<Vec<Listing>> {
        self.record("my_listings")?;
        self.authorize(access)?;
        Ok(self.listings.lock().unwrap().clone())
    }

    async fn create_listing(&self, access: &str, listing: &NewListing) -> Result<Listing> {
        self.record(format!("create_listing {}", listing.farm_id))?;
        self.authorize(access)?;
        if let Some(message) = &self.upload_error {
            return Err(MarketError::Server {
                status: 400,
                message: message.clone(),
            });
        }
        self.uploads.lock().unwrap().push(listing.clone());
        let mut created = crate::tests::fake_api::listing(100, &listing.location, listing.kind);
        created.farm_id = listing.farm_id.clone();
        created.validation = ValidationStatus::Pending;
        Ok(created)
    }

    async fn update_listing(&self, access: &str, id: i64, update: &ListingUpdate) -> Result<Listing> {
        self.record(format!("update_listing {id}"))?;
        self.authorize(access)?;
        if self.listing_updates_fail {
            return Err(MarketError::Server {
                status: 500,
                message: "database is locked".into(),
            });
        }
        let mut listings = self.listings.lock().unwrap();
        let listing = listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(Self::not_found)?;
        if let Some(price) = update.price {
            listing.price = price;
        }
        if let Some(location) = &update.location {
            listing.location = location.clone();
        }
        if let Some(sold) = update.sold {
            listing.sold = sold;
        }
        if let Some(validation) = update.validation {
            listing.validation = validation;
        }
        Ok(listing.clone())
    }

    async fn delete_listing(&self, access: &str, id: i64) -> Result<()> {
        self.record(format!("delete_listing {id}"))?;
        self.authorize(access)?;
        let mut listings = self.listings.lock().unwrap();
        let before = listings.len();
        listings.retain(|l| l.id != id);
        if listings.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }

    async fn list_transactions(&self, access: &str) -> Result<Vec<Transaction>> {
        self.record("list_transactions")?;
        self.authorize(access)?;
        Ok(self.transactions.lock().unwrap().clone())
    }

    async fn create_transaction(&self, new: &NewTransaction) -> Result<Transaction> {
        self.record(format!("create_transaction {}", new.listing))?;
        let mut transactions = self.transactions.lock().unwrap();
        let mut created = transaction(
            transactions.len() as i64 + 1,
            new.listing,
            TransactionStatus::Pending,
        );
        created.full_name = new.full_name.clone();
        created.email = new.email.clone();
        created.phone = new.phone.clone();
        created.message = new.message.clone();
        created.rent_duration = new.rent_duration.clone();
        transactions.push(created.clone());
        Ok(created)
    }

    async fn update_transaction(
        &self,
        access: &str,
        id: i64,
        status: TransactionStatus,
    ) -> Result<Transaction> {
        self.record(format!("update_transaction {id} {status}"))?;
        self.authorize(access)?;
        let mut transactions = self.transactions.lock().unwrap();
        let tx = transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(Self::not_found)?;
        tx.status = status;
        Ok(tx.clone())
    }

    async fn delete_transaction(&self, access: &str, id: i64) -> Result<()> {
        self.record(format!("delete_transaction {id}"))?;
        self.authorize(access)?;
        self.transactions.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn send_confirmation_email(&self, transaction_id: i64) -> Result<()> {
        self.record(format!("send_email {transaction_id}"))?;
        if self.email_fails {
            return Err(MarketError::Server {
                status: 502,
                message: "mail relay refused".into(),
            });
        }
        Ok(())
    }
}
