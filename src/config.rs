use clap::Parser;
use std::net::{IpAddr, SocketAddr};

#[derive(Parser, Debug, Clone)]
#[command(name = "ratgdo-exporter", version, about)]
pub struct Config {
    /// URL with schema to the ratgdo host, eg: http://ratgdo.local.
    /// http:// is assumed when no schema is given.
    #[arg(long, env = "HOST", default_value = "localhost")]
    pub host: String,

    /// Port to expose the metrics page on.
    #[arg(long, env = "METRICS_PORT", default_value_t = 9100)]
    pub metrics_port: u16,

    /// Address to bind the metrics listener to.
    #[arg(long, env = "LISTEN_ADDRESS", default_value = "0.0.0.0")]
    pub listen_address: IpAddr,

    /// Enable JSON structured logging.
    #[arg(long, env = "RATGDO_JSON_LOGS", default_value_t = false)]
    pub json_logs: bool,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_address, self.metrics_port)
    }
}
