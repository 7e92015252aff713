pub mod cache;
pub mod error;
pub mod fetcher;
pub mod key_set;

pub use cache::{KeySetCache, RefreshPolicy};
pub use error::KeySetError;
pub use fetcher::{HttpFetcher, KeySetFetcher};
pub use key_set::{KeySet, VerificationKey};
