use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use store::BackendConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the API server to listen on.
    ///  if not set then 0.0.0.0:3000 will be used
    pub api_listen_addr: Option<SocketAddr>,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,
    /// root directory for the disk cache, if not set then
    ///  a temporary directory will be used
    pub cache_path: Option<PathBuf>,
    /// remote object backend that bucket content lives in
    pub backend: BackendConfig,

    // misc
    pub log_level: tracing::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_listen_addr: Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 3000)),
            sqlite_path: None,
            cache_path: None,
            backend: BackendConfig::default(),
            log_level: tracing::Level::INFO,
        }
    }
}
