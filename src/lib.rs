pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod runtime;
pub mod services;

pub use adapters::{FileStore, HttpFetcher, KeyValueStore, MemoryStore, PageFetcher, Surface, TerminalSurface};
pub use config::AppConfig;
pub use domain::{
    classify_offer_fragment, MonitorContext, MonitorPhase, OfferLifecycleState, PagePayload,
    Registry, TradeContext, TradeOfferHandle, TradePartner, VerificationResult,
};
pub use error::{GuardError, Result};
pub use services::{
    IdentityMatcher, InterceptedExchange, OfferMonitor, RegistryCache, SubmissionHub, Verifier,
};
