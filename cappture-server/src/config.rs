//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;

/// Default port for the agent service.
pub const DEFAULT_PORT: u16 = 8787;

/// Default simulated processing time for agent replies.
pub const DEFAULT_RESPONSE_DELAY_MS: u64 = 500;

/// Server options. Every flag can also be set through its environment
/// variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "cappture-canvas", version, about = "CapptureCanvas agent service")]
pub struct ServerArgs {
    /// Address to bind.
    #[arg(long, env = "CAPPTURE_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to bind.
    #[arg(long, short, env = "CAPPTURE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Delay before each agent reply, in milliseconds.
    #[arg(long, env = "CAPPTURE_RESPONSE_DELAY_MS", default_value_t = DEFAULT_RESPONSE_DELAY_MS)]
    pub response_delay_ms: u64,
}

impl ServerArgs {
    /// Socket address to listen on.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Reply delay as a duration.
    #[must_use]
    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_localhost() {
        let args = ServerArgs::try_parse_from(["cappture-canvas"]).expect("parse");
        assert_eq!(args.addr(), SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)));
        assert_eq!(args.response_delay(), Duration::from_millis(500));
    }

    #[test]
    fn flags_override_defaults() {
        let args = ServerArgs::try_parse_from([
            "cappture-canvas",
            "--host",
            "0.0.0.0",
            "-p",
            "9000",
            "--response-delay-ms",
            "0",
        ])
        .expect("parse");
        assert_eq!(args.addr(), SocketAddr::from(([0, 0, 0, 0], 9000)));
        assert_eq!(args.response_delay(), Duration::ZERO);
    }

    #[test]
    fn rejects_bad_port() {
        assert!(ServerArgs::try_parse_from(["cappture-canvas", "--port", "http"]).is_err());
    }
}
