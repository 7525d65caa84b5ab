// Service exports
pub mod appwrite;
pub mod cache;
pub mod identity;
pub mod ledger;
pub mod memory;
pub mod postgres;
pub mod profiles;
pub mod seed;
pub mod sessions;
pub mod store;
pub mod subscription;

pub use appwrite::AppwriteClient;
pub use cache::{CacheError, CacheKey, CacheManager};
pub use identity::{AuthError, IdentityVerifier};
pub use ledger::{InterestLedger, LedgerError, MemoryLedger};
pub use memory::MemoryStore;
pub use postgres::PostgresClient;
pub use profiles::ProfileService;
pub use seed::{demo_profiles, seed_demo_profiles};
pub use sessions::SessionService;
pub use store::{Document, DocumentQuery, DocumentStore, SortOrder, StoreError};
pub use subscription::{subscribe, Subscription};
