use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::TicketPolicy;

pub const CONFIG_FILE_NAME: &str = "sart.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Refuse a new ticket while the device still has a pending one.
    pub one_pending_ticket_per_device: bool,
    /// Refuse to delete devices that have closed tickets.
    pub protect_ticket_history: bool,
}

impl ServerConfig {
    /// Reads a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("sart.db")
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    #[must_use]
    pub fn ticket_policy(&self) -> TicketPolicy {
        TicketPolicy {
            one_pending_per_device: self.one_pending_ticket_per_device,
            protect_history: self.protect_ticket_history,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            one_pending_ticket_per_device: false,
            protect_ticket_history: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "port = 9090\none_pending_ticket_per_device = true\n").unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.ticket_policy().one_pending_per_device);
        assert!(!config.ticket_policy().protect_history);
    }

    #[test]
    fn test_save_then_load() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = ServerConfig {
            data_dir: temp.path().to_path_buf(),
            ..Default::default()
        };
        config.save(&config.config_path()).unwrap();
        assert_eq!(ServerConfig::load(&config.config_path()).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "port = \"eighty\"").unwrap();
        assert!(matches!(ServerConfig::load(&path), Err(Error::Config(_))));
    }
}
