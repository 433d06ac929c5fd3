//! Trade platform page shapes: the sent offers listing and the
//! offer-submission response.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

use crate::domain::OfferFragment;
use crate::error::{GuardError, Result};

/// Endpoint the trade window posts a new offer to
pub const SUBMIT_OFFER_PATH: &str = "/tradeoffer/new/send";

const OFFER_ELEMENT_PREFIX: &str = "tradeofferid_";
const ACCEPTED_BANNER_CLASS: &str = "tradeoffer_items_banner";
const ACCEPTED_CLASS: &str = "accepted";
const CANCEL_ACTION: &str = "CancelTradeOffer";

/// `{profile_url}/{sent_offers_path}`
pub fn sent_offers_url(profile_url: &str, sent_offers_path: &str) -> Result<String> {
    let mut base = profile_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    let base = Url::parse(&base)
        .map_err(|e| GuardError::Validation(format!("invalid profile URL {}: {}", profile_url, e)))?;
    let url = base
        .join(sent_offers_path.trim_start_matches('/'))
        .map_err(|e| GuardError::Validation(format!("invalid sent offers path: {}", e)))?;

    Ok(url.to_string())
}

/// Locate the tracked offer on the sent offers page
pub fn extract_offer_fragment(html: &str, offer_id: &str) -> Result<Option<OfferFragment>> {
    let document = Html::parse_document(html);
    let with_id = selector("[id]")?;
    let expected = format!("{}{}", OFFER_ELEMENT_PREFIX, offer_id);

    let element = document
        .select(&with_id)
        .find(|el| el.value().id() == Some(expected.as_str()));

    match element {
        Some(element) => Ok(Some(OfferFragment {
            accepted: has_accepted_marker(&element)?,
            cancel_available: has_cancel_action(&element)?,
        })),
        None => Ok(None),
    }
}

fn has_accepted_marker(offer: &ElementRef<'_>) -> Result<bool> {
    let banner = selector(&format!(".{}", ACCEPTED_BANNER_CLASS))?;
    Ok(offer
        .select(&banner)
        .any(|el| el.value().classes().any(|c| c == ACCEPTED_CLASS)))
}

fn has_cancel_action(offer: &ElementRef<'_>) -> Result<bool> {
    let anchors = selector("a[href]")?;
    Ok(offer.select(&anchors).any(|a| {
        a.value()
            .attr("href")
            .map(|href| href.contains(CANCEL_ACTION))
            .unwrap_or(false)
    }))
}

/// Offer id from a successful submission response body
pub fn parse_submission_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let id = match value.get("tradeofferid")? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

fn selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| GuardError::Internal(format!("bad selector {}: {:?}", raw, e)))
}
