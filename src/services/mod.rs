pub mod identity;
pub mod offer_monitor;
pub mod registry_cache;
pub mod submissions;
pub mod verifier;

pub use identity::IdentityMatcher;
pub use offer_monitor::OfferMonitor;
pub use registry_cache::{CacheStatus, RegistryCache, FETCHED_AT_KEY, REGISTRY_KEY};
pub use submissions::{InterceptedExchange, SubmissionHub};
pub use verifier::Verifier;
