use std::net::{IpAddr, Ipv4Addr};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP service to
    pub bind_address: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL of a remote decision service; unset means fully local play
    pub remote_url: Option<String>,
    /// Run the local simulation loop
    pub simulation_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8000,
            remote_url: None,
            simulation_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            if let Ok(parsed) = addr.parse() {
                config.bind_address = parsed;
            } else {
                tracing::warn!("Invalid BIND_ADDRESS '{}', using default", addr);
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                if parsed > 0 {
                    config.port = parsed;
                } else {
                    tracing::warn!("PORT must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid PORT '{}', using default", port);
            }
        }

        if let Ok(url) = std::env::var("REMOTE_URL") {
            if !url.is_empty() {
                config.remote_url = Some(url.trim_end_matches('/').to_string());
            }
        }

        if let Ok(enabled) = std::env::var("SIM_ENABLED") {
            match enabled.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.simulation_enabled = true,
                "0" | "false" | "no" => config.simulation_enabled = false,
                other => tracing::warn!("Invalid SIM_ENABLED '{}', using default", other),
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        if let Some(url) = &self.remote_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("REMOTE_URL must be an http(s) URL, got '{}'", url));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 8000);
        assert!(config.remote_url.is_none());
        assert!(config.simulation_enabled);
    }

    #[test]
    fn test_validate_rejects_bad_remote_url() {
        let config = ServerConfig {
            remote_url: Some("ftp://example".to_string()),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_http_remote() {
        let config = ServerConfig {
            remote_url: Some("http://127.0.0.1:8000".to_string()),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
