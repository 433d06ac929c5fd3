pub mod bots_page;
pub mod http;
pub mod steam;
pub mod store;
pub mod surface;

pub use bots_page::parse_bot_table;
pub use http::{HttpFetcher, PageFetcher};
pub use steam::{extract_offer_fragment, parse_submission_body, sent_offers_url, SUBMIT_OFFER_PATH};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use surface::{Surface, TerminalSurface};
