pub mod client;
pub mod traits;
pub mod types;

pub use client::HttpMarketApi;
pub use traits::MarketApi;
pub use types::{Attachment, Credentials, ListingUpdate, NewListing, NewTransaction};
