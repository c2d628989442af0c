//! Transport and prediction-polling options for the Jaqpot client.

use std::time::Duration;

/// Default Jaqpot API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.jaqpot.org";

/// Transport configuration options.
///
/// Controls how requests are sent over the network.
#[derive(Debug, Clone)]
pub enum TransportOptions {
    /// HTTP transport configuration
    Http {
        /// Per-request timeout. If None, the default client timeout is used.
        timeout: Option<Duration>,
        /// HTTP proxy URL.
        proxy: Option<String>,
    },
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions::Http {
            timeout: None,
            proxy: None,
        }
    }
}

impl TransportOptions {
    /// Create new default HTTP transport options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        match &mut self {
            TransportOptions::Http { timeout, .. } => *timeout = Some(duration),
        }
        self
    }

    /// Set the proxy.
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        match &mut self {
            TransportOptions::Http { proxy, .. } => *proxy = Some(proxy_url),
        }
        self
    }
}

/// How long to wait for an asynchronous prediction and how often to poll it.
///
/// Jaqpot runs predictions as background jobs: the predict call returns a
/// dataset location which is polled until it reaches a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionOptions {
    /// Delay between two polls of the prediction dataset.
    pub poll_interval: Duration,
    /// Total time to wait before giving up with a timeout.
    pub timeout: Duration,
}

impl Default for PredictionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            timeout: Duration::from_secs(60),
        }
    }
}

impl PredictionOptions {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
