use std::path::PathBuf;

use clap::Parser;
use trellis_config::TrellisConfig;

/// Trellis: multi-window shell controller with state sync and a backend proxy.
#[derive(Parser, Debug)]
#[command(name = "trellis", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// IPC port override.
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Route loaded by the primary window.
    #[arg(short = 'r', long)]
    pub route: Option<String>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Flags win over the file and the environment.
    pub fn apply_overrides(&self, config: &mut TrellisConfig) {
        if let Some(port) = self.port {
            config.ipc.port = port;
        }
        if let Some(route) = &self.route {
            config.windows.primary_route = route.clone();
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = Args::parse_from([
            "trellis",
            "--config",
            "/tmp/trellis.toml",
            "--log-level",
            "debug",
            "-p",
            "9000",
            "--route",
            "/home",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/trellis.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.route.as_deref(), Some("/home"));
    }

    #[test]
    fn everything_is_optional() {
        let args = Args::parse_from(["trellis"]);
        assert!(args.config.is_none());
        assert!(args.port.is_none());
        assert!(!args.print_config);
    }

    #[test]
    fn flags_override_loaded_config() {
        let mut config = TrellisConfig::default();
        config.ipc.port = 47900;
        config.windows.primary_route = "/from-file".into();

        Args::parse_from(["trellis", "--port", "9100"]).apply_overrides(&mut config);
        assert_eq!(config.ipc.port, 9100);
        assert_eq!(config.windows.primary_route, "/from-file");

        Args::parse_from(["trellis", "--route", "/home", "--print-config"])
            .apply_overrides(&mut config);
        assert_eq!(config.ipc.port, 9100);
        assert_eq!(config.windows.primary_route, "/home");
    }
}
