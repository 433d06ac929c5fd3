use std::sync::Arc;
use tracing::{info, warn};

use super::identity::IdentityMatcher;
use super::registry_cache::RegistryCache;
use crate::adapters::Surface;
use crate::domain::{BannerView, TradePartner, VerificationResult};

/// Checks a trade partner who claims to be an official bot
pub struct Verifier {
    matcher: IdentityMatcher,
    cache: Arc<RegistryCache>,
}

impl Verifier {
    pub fn new(matcher: IdentityMatcher, cache: Arc<RegistryCache>) -> Self {
        Self { matcher, cache }
    }

    /// Ordinary names short-circuit to `CheckSkipped` without any fetch.
    pub async fn verify(&self, partner: &TradePartner) -> VerificationResult {
        if !self.matcher.matches(Some(&partner.display_name)) {
            return VerificationResult::CheckSkipped;
        }
        self.check_registry(partner).await
    }

    async fn check_registry(&self, partner: &TradePartner) -> VerificationResult {
        match self.cache.get_registry().await {
            Ok(registry) if registry.contains(&partner.identity) => VerificationResult::Legitimate,
            Ok(_) => VerificationResult::Impersonating,
            Err(e) => {
                warn!(partner = %partner.identity, "Registry unavailable: {}", e);
                VerificationResult::Inconclusive(e.to_string())
            }
        }
    }

    /// Verify and drive the banner: `Loading` once, then the final view
    pub async fn verify_and_render(
        &self,
        partner: &TradePartner,
        surface: &dyn Surface,
    ) -> VerificationResult {
        if !self.matcher.matches(Some(&partner.display_name)) {
            info!(partner = %partner.identity, "Name makes no operator claim, check skipped");
            return VerificationResult::CheckSkipped;
        }

        surface.render_banner(&BannerView::Loading);
        let result = self.check_registry(partner).await;

        match &result {
            VerificationResult::Impersonating => warn!(
                partner = %partner.identity,
                name = %partner.display_name,
                "Partner is impersonating an official bot"
            ),
            other => info!(partner = %partner.identity, result = %other, "Verification complete"),
        }

        if let Some(view) = result.banner() {
            surface.render_banner(&view);
        }
        result
    }
}
