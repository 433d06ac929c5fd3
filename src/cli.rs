use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::PagePayload;
use crate::error::Result;

#[derive(Parser)]
#[command(name = "offerguard")]
#[command(version = "0.1.0")]
#[command(about = "Verifies trade partners and watches sent trade offers for tampering", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory
    #[arg(short, long, default_value = "config", global = true)]
    pub config: String,

    /// Cookie header for your logged-in session, overrides monitor.session_cookie
    #[arg(long, env = "OFFERGUARD_SESSION_COOKIE", global = true, hide_env_values = true)]
    pub session_cookie: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether the trade partner is an official bot
    Verify {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Watch one sent trade offer until it is accepted or disappears
    Watch {
        /// Your profile URL (e.g. https://steamcommunity.com/id/you)
        #[arg(long, env = "OFFERGUARD_PROFILE_URL")]
        profile_url: String,
        /// Trade offer id
        #[arg(long)]
        offer_id: String,
    },
    /// Verify the partner, then monitor every offer submission read from stdin
    Guard {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Inspect or refresh the cached bot registry
    Registry {
        #[command(subcommand)]
        action: RegistryCommands,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum RegistryCommands {
    /// Show cache size and age without fetching
    Status,
    /// Fetch the registry now
    Refresh,
}

/// Trade page fields, from flags or a JSON payload file
#[derive(Args, Clone, Default)]
pub struct PageArgs {
    /// Trade partner account id (SteamID64)
    #[arg(long, env = "OFFERGUARD_PARTNER_ID")]
    pub partner_id: Option<String>,
    /// Trade partner display name
    #[arg(long, env = "OFFERGUARD_PARTNER_NAME")]
    pub partner_name: Option<String>,
    /// Your profile URL, needed to monitor sent offers
    #[arg(long, env = "OFFERGUARD_PROFILE_URL")]
    pub profile_url: Option<String>,
    /// JSON file with partner_id / partner_name / profile_url; flags win
    #[arg(long)]
    pub payload: Option<PathBuf>,
}

impl PageArgs {
    pub fn to_payload(&self) -> Result<PagePayload> {
        let mut payload = match &self.payload {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read payload {}", path.display()))?;
                serde_json::from_str::<PagePayload>(&raw)
                    .with_context(|| format!("failed to parse payload {}", path.display()))?
            }
            None => PagePayload::default(),
        };

        if self.partner_id.is_some() {
            payload.partner_id = self.partner_id.clone();
        }
        if self.partner_name.is_some() {
            payload.partner_name = self.partner_name.clone();
        }
        if self.profile_url.is_some() {
            payload.profile_url = self.profile_url.clone();
        }
        Ok(payload)
    }
}
