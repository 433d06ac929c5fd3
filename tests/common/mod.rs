#![allow(dead_code)]

use offerguard::adapters::{MemoryStore, Surface};
use offerguard::config::AppConfig;
use offerguard::domain::{BannerView, ModalView};
use offerguard::runtime::Components;
use offerguard::HttpFetcher;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BOT_ID: &str = "76561198000000001";
pub const IMPOSTOR_ID: &str = "76561198099999999";

pub const BOTS_PAGE: &str = r#"<html><body>
<table class="table table-bordered">
  <thead><tr><th>Bot</th><th>SteamID64</th></tr></thead>
  <tbody>
    <tr><td>Trusted Trading Co #1</td><td>76561198000000001</td></tr>
  </tbody>
</table>
</body></html>"#;

pub fn offer_page(offer_id: &str, inner: &str) -> String {
    format!(
        r#"<html><body><div class="profile_rightcol">
<div class="tradeoffer" id="tradeofferid_{offer_id}">{inner}</div>
</div></body></html>"#
    )
}

pub fn active_offer(offer_id: &str) -> String {
    offer_page(
        offer_id,
        &format!(
            r#"<div class="tradeoffer_footer_actions"><a href="javascript:CancelTradeOffer( '{offer_id}' );" class="whiteLink">Cancel Trade Offer</a></div>"#
        ),
    )
}

pub fn accepted_offer(offer_id: &str) -> String {
    offer_page(
        offer_id,
        r#"<div class="tradeoffer_items_banner accepted">Trade Accepted</div>"#,
    )
}

pub fn cancelled_offer(offer_id: &str) -> String {
    offer_page(
        offer_id,
        r#"<div class="tradeoffer_items_banner">Trade Offer Canceled</div>"#,
    )
}

pub const NO_OFFERS_PAGE: &str =
    r#"<html><body><div class="profile_rightcol"><div class="no_offers"></div></div></body></html>"#;

#[derive(Default)]
pub struct RecordingSurface {
    pub banners: Mutex<Vec<BannerView>>,
    pub modals: Mutex<Vec<(String, ModalView)>>,
}

impl RecordingSurface {
    pub fn banners(&self) -> Vec<BannerView> {
        self.banners.lock().unwrap().clone()
    }

    pub fn modals_for(&self, offer_id: &str) -> Vec<ModalView> {
        self.modals
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == offer_id)
            .map(|(_, view)| *view)
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn render_banner(&self, view: &BannerView) {
        self.banners.lock().unwrap().push(view.clone());
    }

    fn render_modal(&self, offer_id: &str, view: &ModalView) {
        self.modals
            .lock()
            .unwrap()
            .push((offer_id.to_string(), *view));
    }
}

/// Components talking to `base_url` with an in-memory store and fast polling
pub fn components(base_url: &str, surface: Arc<RecordingSurface>) -> Components {
    components_with_store(base_url, surface, Arc::new(MemoryStore::new()))
}

pub fn components_with_store(
    base_url: &str,
    surface: Arc<RecordingSurface>,
    store: Arc<MemoryStore>,
) -> Components {
    let mut config = AppConfig::default();
    config.registry.url = format!("{}/bots", base_url);
    config.registry.trigger_phrases = vec!["trusted trading".into(), "trustedtrading".into()];
    config.monitor.poll_interval_ms = 5;

    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(5)).unwrap());
    Components::new(config, fetcher, store, surface)
}
