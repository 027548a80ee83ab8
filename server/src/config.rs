//! Server configuration from command line flags and environment.

use std::net::SocketAddr;

use clap::Parser;

/// Default `RUST_LOG`-style filter when none is set.
pub const DEFAULT_LOG_FILTER: &str = "chainsign_server=info,chainsign_core=info";

#[derive(Debug, Clone, Parser)]
#[command(name = "chainsign-server")]
#[command(about = "Issues device keys and signs chained transactions over HTTP")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "CHAINSIGN_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// Emit logs as JSON lines
    #[arg(long, env = "CHAINSIGN_LOG_JSON")]
    pub log_json: bool,
}
