use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade partner as reported by the trade page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradePartner {
    /// Stable account identifier (SteamID64)
    pub identity: String,
    /// Free-text persona name
    pub display_name: String,
}

impl TradePartner {
    pub fn new(identity: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            display_name: display_name.into(),
        }
    }
}

/// Raw fields read from the host page, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagePayload {
    #[serde(default)]
    pub partner_id: Option<String>,
    #[serde(default)]
    pub partner_name: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
}

/// A page that carries everything needed to guard a trade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeContext {
    pub partner: TradePartner,
    /// Viewing user's profile URL, only needed for offer monitoring
    pub profile_url: Option<String>,
}

/// The page is not a usable trade (e.g. the trade errored out before loading)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotATradeContext {
    pub missing: Vec<&'static str>,
}

impl fmt::Display for NotATradeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.missing.join(", "))
    }
}

impl PagePayload {
    /// Validate once at startup. A blank id counts as missing; an empty name
    /// is kept, it simply never claims to be anyone.
    pub fn into_context(self) -> Result<TradeContext, NotATradeContext> {
        let partner_id = non_blank(self.partner_id);
        let partner_name = self.partner_name;

        let mut missing = Vec::new();
        if partner_id.is_none() {
            missing.push("partner_id");
        }
        if partner_name.is_none() {
            missing.push("partner_name");
        }

        match (partner_id, partner_name) {
            (Some(identity), Some(display_name)) => Ok(TradeContext {
                partner: TradePartner {
                    identity,
                    display_name,
                },
                profile_url: non_blank(self.profile_url),
            }),
            _ => Err(NotATradeContext { missing }),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
