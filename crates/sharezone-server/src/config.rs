use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

pub struct Config {
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub jwt_secret: String,
}

impl Config {
    /// Reads `SHAREZONE_*` variables, falling back to development defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = var("SHAREZONE_JWT_SECRET", "dev-secret-change-me");
        let db_path = PathBuf::from(var("SHAREZONE_DB_PATH", "sharezone.db"));
        let host = var("SHAREZONE_HOST", "0.0.0.0");
        let port: u16 = var("SHAREZONE_PORT", "3000")
            .parse()
            .context("SHAREZONE_PORT must be a port number")?;

        let addr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        Ok(Self {
            db_path,
            addr,
            jwt_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_map(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("sharezone.db"));
        assert_eq!(config.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.jwt_secret, "dev-secret-change-me");
    }

    #[test]
    fn overrides() {
        let config = from_map(&[
            ("SHAREZONE_HOST", "127.0.0.1"),
            ("SHAREZONE_PORT", "8080"),
            ("SHAREZONE_DB_PATH", "/tmp/sz.db"),
            ("SHAREZONE_JWT_SECRET", "s3cret"),
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_path, PathBuf::from("/tmp/sz.db"));
        assert_eq!(config.jwt_secret, "s3cret");
    }

    #[test]
    fn bad_port() {
        assert!(from_map(&[("SHAREZONE_PORT", "http")]).is_err());
    }
}
