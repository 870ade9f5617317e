pub mod guard;
pub mod store;

pub use guard::{validate_session, GuardOutcome, GuardState, SessionGuard};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
