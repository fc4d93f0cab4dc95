use std::path::PathBuf;

use anyhow::Context;

/// Runtime knobs, all overridable from the environment (or a .env file).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Messages kept per room. 0 keeps everything.
    pub room_history_limit: usize,
    /// When set, a send from a connection that never joined the room is
    /// rejected with an error event instead of being relayed.
    pub require_join_to_send: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 5 * 1024 * 1024,
            room_history_limit: 0,
            require_join_to_send: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            port: match dotenv::var("PORT") {
                Ok(port) => port.parse().context("PORT is not a port number")?,
                Err(_) => defaults.port,
            },
            upload_dir: dotenv::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: match dotenv::var("MAX_UPLOAD_BYTES") {
                Ok(max) => max.parse().context("MAX_UPLOAD_BYTES is not a number")?,
                Err(_) => defaults.max_upload_bytes,
            },
            room_history_limit: match dotenv::var("ROOM_HISTORY_LIMIT") {
                Ok(limit) => limit.parse().context("ROOM_HISTORY_LIMIT is not a number")?,
                Err(_) => defaults.room_history_limit,
            },
            require_join_to_send: dotenv::var("REQUIRE_JOIN_TO_SEND")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.require_join_to_send),
        })
    }
}
