//! Console banners and the dev-only page load timer.

use gloo_timers::callback::Timeout;
use log::{debug, warn};
use web_sys::Window;

use crate::config::SiteConfig;
use crate::dom::Listener;

const TITLE_STYLE: &str = "font-size: 20px; font-weight: bold; color: #1a365d;";
const TAGLINE_STYLE: &str = "font-size: 12px; color: #4a5568;";
const TIMING_STYLE: &str = "color: #38a169; font-weight: bold;";

pub fn print_banners(config: &SiteConfig) {
    gloo_console::log!(format!("%c{}", config.site_name), TITLE_STYLE);
    gloo_console::log!(format!("%c{}", config.tagline), TAGLINE_STYLE);
}

pub fn is_dev_host(hostname: &str, dev_hosts: &[String]) -> bool {
    dev_hosts.iter().any(|host| host == hostname)
}

/// Milliseconds from navigation start to the end of the load event, or
/// `None` if the browser has not filled the timing in.
pub fn load_time_ms(navigation_start: f64, load_event_end: f64) -> Option<f64> {
    (navigation_start > 0.0 && load_event_end >= navigation_start)
        .then(|| load_event_end - navigation_start)
}

fn report_load_time(window: &Window) {
    let Some(performance) = window.performance() else {
        debug!("Performance API unavailable");
        return;
    };
    let timing = performance.timing();

    match load_time_ms(timing.navigation_start(), timing.load_event_end()) {
        Some(ms) => {
            gloo_console::log!(format!("%cPage Load Time: {}ms", ms), TIMING_STYLE);
        }
        None => debug!("Load timing not available yet"),
    }
}

/// Logs page load time once the `load` event has finished. Only active on
/// development hosts.
pub struct LoadTimer {
    _listener: Listener,
}

impl LoadTimer {
    pub fn attach(window: &Window, config: &SiteConfig) -> Option<Self> {
        let hostname = window.location().hostname().ok()?;
        if !is_dev_host(&hostname, &config.dev_hosts) {
            return None;
        }

        let target = window.clone();
        let listener = Listener::new(window, "load", move |_| {
            // loadEventEnd is only set after every load handler has returned.
            let window = target.clone();
            Timeout::new(0, move || report_load_time(&window)).forget();
        });

        match listener {
            Ok(listener) => Some(Self {
                _listener: listener,
            }),
            Err(e) => {
                warn!("Failed to bind load timer: {:?}", e);
                None
            }
        }
    }
}
