use std::path::PathBuf;

use clap::Parser;

/// Atelier image generation service
#[derive(Debug, Parser)]
#[command(name = "atelier", about = "HTTP front end for Runway text-to-image generation")]
pub struct Args {
    /// Path to configuration file; `atelier.toml` is used when present
    #[arg(short, long, env = "ATELIER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "ATELIER_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = Args::try_parse_from(["atelier", "--config", "custom.toml", "--listen", "127.0.0.1:9000"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(args.listen.unwrap().port(), 9000);
    }

    #[test]
    fn rejects_bad_listen_address() {
        assert!(Args::try_parse_from(["atelier", "--listen", "nowhere"]).is_err());
    }
}
