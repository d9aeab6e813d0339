use chromiumoxide::handler::viewport::Viewport;
use sitescan_core::config::{BrowserConfig, DEFAULT_USER_AGENT};

/// Identity every browsing context presents to the sites it loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl FingerprintConfig {
    /// Build the fingerprint from the browser settings.
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            viewport_width: config.window_width,
            viewport_height: config.window_height,
        }
    }

    /// Fixed desktop viewport applied to every page.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        }
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport_width: 1920,
            viewport_height: 1080,
        }
    }
}
