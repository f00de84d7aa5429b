//! Application configuration loaded from environment variables.
//!
//! Domain constants for the streak rules live here as well so the jobs
//! and their tests share a single definition.

use std::env;

/// Workouts a member must log per week to count as compliant.
pub const REQUIRED_WORKOUTS: u32 = 3;

/// Streak values (in days) that trigger a celebratory notification.
/// Values above 100 never re-notify.
pub const MILESTONES: [u32; 5] = [7, 14, 30, 60, 100];

/// Header set by Cloud Scheduler on trigger requests. Cloud Run strips
/// this header from external traffic, so its presence guarantees the
/// request came from the scheduler.
pub const SCHEDULER_HEADER: &str = "x-cloudscheduler";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID (Firestore lives here)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("GCP_PROJECT_ID", "test-project");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.gcp_project_id, "test-project");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_milestones_are_sorted() {
        let mut sorted = MILESTONES;
        sorted.sort_unstable();
        assert_eq!(sorted, MILESTONES);
    }
}
