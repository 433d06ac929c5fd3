//! Rendering of the status banner and the offer modal.

use crate::config::SurfaceConfig;
use crate::domain::{BannerView, ModalView};

/// Where banner and modal updates are shown
pub trait Surface: Send + Sync {
    fn render_banner(&self, view: &BannerView);

    fn render_modal(&self, offer_id: &str, view: &ModalView);
}

const RESET: &str = "\x1b[0m";
const GREY: &str = "\x1b[90m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";

/// Colored terminal output, one line per update
#[derive(Debug, Clone)]
pub struct TerminalSurface {
    operator: String,
    remediation_url: String,
    color: bool,
}

impl TerminalSurface {
    pub fn new(config: &SurfaceConfig) -> Self {
        Self {
            operator: config.operator_name.clone(),
            remediation_url: config.remediation_url.clone(),
            color: true,
        }
    }

    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn banner_text(&self, view: &BannerView) -> String {
        match view {
            BannerView::Loading => {
                format!("{} bot check in progress, please wait...", self.operator)
            }
            BannerView::Ok => format!(
                "✓ Verification complete, this is an official {} bot.",
                self.operator
            ),
            BannerView::Danger => format!(
                "× WARNING! This is NOT an official {op} bot. You may be the target of the \
                 {op} impersonation scam, read {url} for more information and what to do next.",
                op = self.operator,
                url = self.remediation_url
            ),
            BannerView::Error(message) => format!(
                "Bot check failed: {}. Run the check again to retry.",
                message
            ),
        }
    }

    pub fn modal_text(&self, offer_id: &str, view: &ModalView) -> String {
        match view {
            ModalView::Instruction => format!(
                "Trade offer {} sent. Do NOT confirm it on your mobile device yet, \
                 checking that the offer stays active...",
                offer_id
            ),
            ModalView::SafeToProceed => format!(
                "Trade offer {} has stayed active. It is safe to proceed and confirm it \
                 on your second device.",
                offer_id
            ),
            ModalView::Accepted => format!("✓ Trade offer {} was accepted.", offer_id),
            ModalView::Inactive(reason) => format!(
                "× WARNING! Trade offer {} is unexpectedly no longer active ({}). It may have \
                 been cancelled or replaced by someone else. Do not confirm any trade on your \
                 mobile device and read {} for what to do next.",
                offer_id, reason, self.remediation_url
            ),
        }
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let color = match style {
            "ok" => GREEN,
            "danger" => RED,
            "loading" => GREY,
            _ => YELLOW,
        };
        format!("{}{}{}", color, text, RESET)
    }

    /// Painted lines for a modal. Persistent warnings are framed so they
    /// stand out in scrollback.
    pub fn modal_lines(&self, offer_id: &str, view: &ModalView) -> Vec<String> {
        let style = if *view == ModalView::SafeToProceed {
            "notice"
        } else {
            view.style()
        };
        let text = self.paint(style, &self.modal_text(offer_id, view));

        if view.is_persistent() {
            let rule = self.paint(style, &"=".repeat(72));
            vec![rule.clone(), text, rule]
        } else {
            vec![text]
        }
    }
}

impl Surface for TerminalSurface {
    fn render_banner(&self, view: &BannerView) {
        println!("{}", self.paint(view.style(), &self.banner_text(view)));
    }

    fn render_modal(&self, offer_id: &str, view: &ModalView) {
        for line in self.modal_lines(offer_id, view) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InactiveReason;

    fn surface() -> TerminalSurface {
        TerminalSurface::new(&SurfaceConfig::default()).without_color()
    }

    #[test]
    fn danger_banner_links_remediation() {
        let text = surface().banner_text(&BannerView::Danger);
        assert!(text.contains("NOT an official Marketplace.tf bot"));
        assert!(text.contains("https://marketplace.tf/blog/posts/YHLZOB"));
    }

    #[test]
    fn error_banner_carries_message() {
        let text = surface().banner_text(&BannerView::Error("Network failure: timeout".into()));
        assert!(text.contains("Network failure: timeout"));
        assert!(text.contains("again"));
    }

    #[test]
    fn inactive_modal_names_offer_and_reason() {
        let text = surface().modal_text("5551234", &ModalView::Inactive(InactiveReason::Missing));
        assert!(text.contains("5551234"));
        assert!(text.contains("missing from sent offers"));
        assert!(text.contains("YHLZOB"));
    }

    #[test]
    fn persistent_modal_is_framed() {
        let s = surface();
        let lines = s.modal_lines("5551234", &ModalView::Inactive(InactiveReason::CancelUnavailable));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], lines[2]);
        assert!(lines[1].contains("5551234"));

        assert_eq!(s.modal_lines("5551234", &ModalView::Accepted).len(), 1);
    }

    #[test]
    fn paint_respects_color_flag() {
        let colored = TerminalSurface::new(&SurfaceConfig::default());
        assert!(colored.paint("ok", "x").starts_with(GREEN));
        assert_eq!(surface().paint("ok", "x"), "x");
    }
}
