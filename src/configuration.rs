static DEFAULT_TIMEOUT_SECS: u64 = 30;

/// This holds the user configurations of the application.
/// Right now, it holds hardcoded defaults as we don't support
/// a config file yet. The only override is the `--timeout` flag.
#[derive(Debug)]
pub struct Settings {
    pub http: HttpSettings,
}

impl Settings {
    /// Build the settings from all available sources
    pub fn build() -> Self {
        let http = HttpSettings::build();
        Self { http }
    }
}

/// This holds the configuration of the HTTP transport.
/// In case we support per-request options later (redirect policy,
/// custom headers, ...) this is where they get loaded to.
#[derive(Debug)]
pub struct HttpSettings {
    /// Upper bound on a whole request, connect included.
    /// A request past this limit surfaces as a transport error.
    pub timeout_secs: u64,
}

impl HttpSettings {
    pub fn build() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
