//! Server configuration

use std::path::PathBuf;

/// Server configuration loaded from environment variables
pub struct Config {
    pub bind_address: String,
    /// Directory holding the default dataset and the stored conversion
    pub assets_dir: PathBuf,
    /// Flat dataset served by `/get-file` and converted by the local route
    pub dataset_file: String,
    /// File name of the last reverse conversion
    pub converted_file: String,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".into()),
            assets_dir: std::env::var("ASSETS_DIR")
                .unwrap_or_else(|_| "assets".into())
                .into(),
            dataset_file: std::env::var("DATASET_FILE").unwrap_or_else(|_| "covid.json".into()),
            converted_file: std::env::var("CONVERTED_FILE").unwrap_or_else(|_| "file.json".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64 * 1024 * 1024),
        }
    }

    /// Full path of the default flat dataset
    pub fn dataset_path(&self) -> PathBuf {
        self.assets_dir.join(&self.dataset_file)
    }
}
