//! Admin review of newly uploaded listings.

use crate::api::{ListingUpdate, MarketApi};
use crate::error::{MarketError, Result};
use crate::models::{Listing, ValidationStatus};
use crate::session::TokenStore;
use tracing::info;

pub struct AdminDesk<'a> {
    api: &'a dyn MarketApi,
    access: String,
}

impl<'a> AdminDesk<'a> {
    pub fn open(api: &'a dyn MarketApi, store: &dyn TokenStore) -> Result<Self> {
        let access = store.access_token()?.ok_or(MarketError::NotAuthenticated)?;
        Ok(Self { api, access })
    }

    /// Listings still waiting for review, in fetch order
    pub async fn pending(&self) -> Result<Vec<Listing>> {
        let listings = self.api.list_listings().await?;
        Ok(listings
            .into_iter()
            .filter(|l| l.validation == ValidationStatus::Pending)
            .collect())
    }

    pub async fn approve(&self, id: i64) -> Result<Listing> {
        self.review(id, ValidationStatus::Approved).await
    }

    pub async fn reject(&self, id: i64) -> Result<Listing> {
        self.review(id, ValidationStatus::Rejected).await
    }

    async fn review(&self, id: i64, verdict: ValidationStatus) -> Result<Listing> {
        let update = ListingUpdate {
            validation: Some(verdict),
            ..Default::default()
        };
        let listing = self.api.update_listing(&self.access, id, &update).await?;
        info!("Listing {} reviewed: {:?}", id, verdict);
        Ok(listing)
    }
}
