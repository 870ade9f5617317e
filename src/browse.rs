//! Listing browsers: fetch everything once, filter on the client.

use crate::api::MarketApi;
use crate::error::Result;
use crate::models::{Listing, ListingKind, ValidationStatus};
use tracing::debug;

/// Which listing browser is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowseView {
    /// Everything the backend returns, whatever its review status
    #[default]
    All,
    /// Approved, unsold farms offered for sale
    Buy,
    /// Approved farms offered for rent
    Rent,
}

impl BrowseView {
    pub fn shows(&self, listing: &Listing) -> bool {
        let approved = listing.validation == ValidationStatus::Approved;
        match self {
            BrowseView::All => true,
            BrowseView::Buy => approved && listing.is_purchasable(),
            BrowseView::Rent => approved && listing.kind == ListingKind::Rent,
        }
    }
}

/// Listings whose location contains `search`, ignoring case.
/// An empty or blank search keeps everything. Order is preserved.
pub fn search<'a>(listings: &'a [Listing], search: &str) -> Vec<&'a Listing> {
    let needle = search.trim().to_lowercase();
    listings
        .iter()
        .filter(|l| needle.is_empty() || l.location.to_lowercase().contains(&needle))
        .collect()
}

/// A browser's fetched list plus its current view
pub struct ListingBrowser {
    view: BrowseView,
    listings: Vec<Listing>,
}

impl ListingBrowser {
    pub async fn load(api: &dyn MarketApi, view: BrowseView) -> Result<Self> {
        let listings = api.list_listings().await?;
        debug!("Browser loaded {} listings", listings.len());
        Ok(Self { view, listings })
    }

    pub fn from_listings(view: BrowseView, listings: Vec<Listing>) -> Self {
        Self { view, listings }
    }

    /// Cards to render for the given search box content
    pub fn visible(&self, query: &str) -> Vec<&Listing> {
        search(&self.listings, query)
            .into_iter()
            .filter(|l| self.view.shows(l))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
