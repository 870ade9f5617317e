//! Seller management: own listings and the transactions against them.

use crate::api::{ListingUpdate, MarketApi};
use crate::error::{MarketError, Result};
use crate::models::{Listing, ListingKind, Transaction, TransactionStatus};
use crate::session::TokenStore;
use tracing::{info, warn};

/// A logged-in seller's management views
pub struct SellerDesk<'a> {
    api: &'a dyn MarketApi,
    access: String,
}

impl<'a> SellerDesk<'a> {
    /// Fails without a stored session, before any request is made
    pub fn open(api: &'a dyn MarketApi, store: &dyn TokenStore) -> Result<Self> {
        let access = store.access_token()?.ok_or(MarketError::NotAuthenticated)?;
        Ok(Self { api, access })
    }

    pub async fn listings(&self) -> Result<Vec<Listing>> {
        self.api.my_listings(&self.access).await
    }

    pub async fn update_listing(&self, id: i64, update: &ListingUpdate) -> Result<Listing> {
        if update.is_empty() {
            return Err(MarketError::invalid("update", "nothing to change"));
        }
        let listing = self.api.update_listing(&self.access, id, update).await?;
        info!("Updated listing {}", id);
        Ok(listing)
    }

    pub async fn delete_listing(&self, id: i64) -> Result<()> {
        self.api.delete_listing(&self.access, id).await?;
        info!("Deleted listing {}", id);
        Ok(())
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        self.api.list_transactions(&self.access).await
    }

    pub async fn delete_transaction(&self, id: i64) -> Result<()> {
        self.api.delete_transaction(&self.access, id).await?;
        info!("Deleted transaction {}", id);
        Ok(())
    }

    /// Move a transaction along pending → confirmed/cancelled.
    /// Confirming a purchase also marks the farm sold; a farm that is
    /// already sold cannot have another purchase confirmed.
    pub async fn set_transaction_status(
        &self,
        id: i64,
        status: TransactionStatus,
    ) -> Result<StatusChange> {
        let current = self
            .transactions()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| MarketError::invalid("transaction", format!("no transaction {}", id)))?;

        if !current.status.can_become(status) {
            return Err(MarketError::invalid(
                "status",
                format!("cannot change a {} transaction to {}", current.status, status),
            ));
        }

        let sale = if status == TransactionStatus::Confirmed {
            let listing = self.api.get_listing(current.listing).await?;
            if listing.kind == ListingKind::Sale && listing.sold {
                return Err(MarketError::invalid(
                    "listing",
                    format!("listing {} has already been sold", listing.id),
                ));
            }
            (listing.kind == ListingKind::Sale).then_some(listing.id)
        } else {
            None
        };

        let transaction = self.api.update_transaction(&self.access, id, status).await?;
        info!("Transaction {} is now {}", id, status);

        let mut sold_update_failed = false;
        if let Some(listing_id) = sale {
            let mark_sold = ListingUpdate {
                sold: Some(true),
                ..Default::default()
            };
            match self.api.update_listing(&self.access, listing_id, &mark_sold).await {
                Ok(_) => info!("Listing {} marked sold", listing_id),
                Err(e) => {
                    warn!("Listing {} could not be marked sold: {}", listing_id, e);
                    sold_update_failed = true;
                }
            }
        }

        Ok(StatusChange {
            transaction,
            sold_update_failed,
        })
    }
}

/// An applied status change. The transaction is recorded even when
/// marking the farm sold afterwards failed.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub transaction: Transaction,
    pub sold_update_failed: bool,
}
