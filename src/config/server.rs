use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Directory rendered configurations are exported to.
    /// Defaults to `<data_dir>/export`.
    pub export_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("confgen.db")
    }

    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("export"))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            export_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("confgen.toml");
        std::fs::write(&path, "host = \"0.0.0.0\"\nport = 9090\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_from_file_rejects_unknown_fields() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("confgen.toml");
        std::fs::write(&path, "bogus = true\n").unwrap();

        assert!(matches!(
            ServerConfig::from_file(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_export_path_defaults_under_data_dir() {
        let config = ServerConfig::default();
        assert_eq!(config.export_path(), PathBuf::from("./data/export"));

        let config = ServerConfig {
            export_dir: Some(PathBuf::from("/srv/tftp")),
            ..ServerConfig::default()
        };
        assert_eq!(config.export_path(), PathBuf::from("/srv/tftp"));
    }
}
