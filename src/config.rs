use log::warn;
use serde::Deserialize;
use web_sys::Document;

/// Relative path the contact form posts to when `submit_mode` is `http`.
pub const CONTACT_ENDPOINT: &str = "/api/contact";

/// Attribute on `<body>` that may carry a JSON object overriding any field of
/// [`SiteConfig`].
pub const CONFIG_ATTRIBUTE: &str = "data-site-config";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMode {
    /// Wait `simulated_delay_ms` and report success. No network traffic.
    /// The default: the site has no contact backend yet.
    Simulated,
    /// POST the payload to `contact_endpoint`. Opt-in through
    /// `data-site-config`.
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// `application/x-www-form-urlencoded`
    Form,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site_name: String,
    pub tagline: String,
    pub fallback_phone: String,
    pub contact_endpoint: String,
    pub submit_mode: SubmitMode,
    pub wire_format: WireFormat,
    pub simulated_delay_ms: u32,
    pub submit_timeout_ms: u32,
    pub narrow_breakpoint_px: f64,
    pub reveal_threshold: f64,
    pub reveal_root_margin: String,
    pub dev_hosts: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Republic Lawyers".to_string(),
            tagline: "Website built with modern, accessible web standards.".to_string(),
            fallback_phone: "(02) 8626 5171".to_string(),
            contact_endpoint: CONTACT_ENDPOINT.to_string(),
            submit_mode: SubmitMode::Simulated,
            wire_format: WireFormat::Form,
            simulated_delay_ms: 1_000,
            submit_timeout_ms: 15_000,
            narrow_breakpoint_px: 768.0,
            reveal_threshold: 0.12,
            reveal_root_margin: "0px 0px -50px 0px".to_string(),
            dev_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
        }
    }
}

impl SiteConfig {
    /// Parses an override blob. Fields missing from the JSON keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn from_document(document: &Document) -> Self {
        let raw = document
            .body()
            .and_then(|body| body.get_attribute(CONFIG_ATTRIBUTE));

        match raw {
            Some(raw) => Self::from_json(&raw).unwrap_or_else(|e| {
                warn!("Ignoring invalid {}: {}", CONFIG_ATTRIBUTE, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
