//! Demo server configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `SERVICE_UTILS_*` environment variables over
//! configuration files; accessors supply the defaults.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JSON_LOGS: bool = true;

/// Settings for the demo HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SERVICE_UTILS")]
pub struct ServiceSettings {
    /// Socket address the server listens on.
    pub bind_addr: Option<String>,
    /// Emit JSON log lines instead of compact human-readable ones.
    pub json_logs: Option<bool>,
}

impl ServiceSettings {
    /// Return the configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Return whether logs are JSON, falling back to the default.
    pub fn json_logs(&self) -> bool {
        self.json_logs.unwrap_or(DEFAULT_JSON_LOGS)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for demo server configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ServiceSettings {
        ServiceSettings::load_from_iter([OsString::from("service-utils")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("SERVICE_UTILS_BIND_ADDR", None::<String>),
            ("SERVICE_UTILS_JSON_LOGS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert!(settings.json_logs.is_none());
        assert!(settings.json_logs());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SERVICE_UTILS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("SERVICE_UTILS_JSON_LOGS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000");
        assert_eq!(settings.json_logs, Some(false));
        assert!(!settings.json_logs());
    }
}
