// ⚙️ Configuration - environment driven, no CLI flags

use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

pub const DATA_PATH_VAR: &str = "VOUCHER_MAP_DATA";
pub const MAPBOX_KEY_VAR: &str = "MAPBOX_API_KEY";
pub const BIND_ADDR_VAR: &str = "VOUCHER_MAP_ADDR";

pub const DEFAULT_DATA_PATH: &str = "data/merchants_seocho.csv";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

const MAPBOX_STYLE: &str = "mapbox://styles/mapbox/dark-v11";

/// Basemap beneath the merchant points.
///
/// Without a map-tile credential the map still renders, just on the plain
/// default style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Basemap {
    Mapbox { token: String },
    Default,
}

impl Basemap {
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => Basemap::Mapbox {
                token: token.trim().to_string(),
            },
            _ => Basemap::Default,
        }
    }

    /// Style URL for the map client; `None` means the client default
    pub fn style(&self) -> Option<&'static str> {
        match self {
            Basemap::Mapbox { .. } => Some(MAPBOX_STYLE),
            Basemap::Default => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Basemap::Mapbox { token } => Some(token),
            Basemap::Default => None,
        }
    }

    /// Informational notice shown to the user when the credential is missing
    pub fn notice(&self) -> Option<String> {
        match self {
            Basemap::Mapbox { .. } => None,
            Basemap::Default => Some(format!(
                "Add {} to the environment for a sharper basemap.",
                MAPBOX_KEY_VAR
            )),
        }
    }
}

/// What the map client needs to know about the basemap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasemapInfo {
    pub style: Option<&'static str>,
    pub access_token: Option<String>,
    pub notice: Option<String>,
}

impl From<&Basemap> for BasemapInfo {
    fn from(basemap: &Basemap) -> Self {
        BasemapInfo {
            style: basemap.style(),
            access_token: basemap.token().map(str::to_string),
            notice: basemap.notice(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub basemap: Basemap,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_path = non_empty(DATA_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let bind_addr = non_empty(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let basemap = Basemap::from_token(lookup(MAPBOX_KEY_VAR));

        Config {
            data_path,
            basemap,
            bind_addr,
        }
    }

    /// Log the effective settings. The missing credential is informational only.
    pub fn log_summary(&self) {
        info!("Data file: {}", self.data_path.display());
        match &self.basemap {
            Basemap::Mapbox { .. } => info!("Basemap: {}", MAPBOX_STYLE),
            Basemap::Default => info!(
                "{} not set, using the default basemap style",
                MAPBOX_KEY_VAR
            ),
        }
    }
}
