//! Server configuration.

use std::time::Duration;

use cambio_rates::CurrencyCode;

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path segment the API is nested under; blank serves it at the root.
    pub app_name: String,
    /// Base URL of the AwesomeAPI quote service.
    pub awesome_api_url: String,
    /// Currency every cached rate is expressed in.
    pub reference: CurrencyCode,
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub port: u16,
    /// Set SO_REUSEADDR on the listening socket.
    pub reuse_address: bool,
    /// Time between rate refresh cycles.
    pub refresh_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_name: "cambio".to_string(),
            awesome_api_url: "https://economia.awesomeapi.com.br".to_string(),
            reference: CurrencyCode::new("USD"),
            listen_addr: "0.0.0.0".to_string(),
            port: 8080,
            reuse_address: false,
            refresh_interval: Duration::from_secs(300),
        }
    }
}

impl ServerConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.reference.as_str().is_empty() {
            return Err("Reference currency cannot be empty".to_string());
        }

        if self.awesome_api_url.is_empty() {
            return Err("Quote provider URL cannot be empty".to_string());
        }

        if self.refresh_interval.is_zero() {
            return Err("Refresh interval cannot be zero".to_string());
        }

        Ok(())
    }

    /// Path prefix the API routes are nested under, derived from `app_name`.
    ///
    /// Surrounding whitespace is trimmed; a blank name yields an empty prefix.
    pub fn base_path(&self) -> String {
        let name = self.app_name.trim();
        if name.is_empty() {
            String::new()
        } else {
            format!("/{name}")
        }
    }
}
