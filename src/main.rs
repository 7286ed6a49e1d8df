#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use mrpg_server::config;
use mrpg_server::logging;
use mrpg_server::websocket;
use std::net::SocketAddr;

/// MRPG game server -- accounts, daily rewards and a real-time WebSocket hub
#[derive(Parser, Debug)]
#[command(name = "mrpg-server")]
#[command(about = "Game backend with accounts, daily rewards and a real-time WebSocket hub")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines and pre-deployment checks.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    /// Useful for debugging configuration loading from multiple sources.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load();

    if cli.print_config {
        let mut printable = cfg.clone();
        if printable.security.jwt_secret.is_some() {
            printable.security.jwt_secret = Some("<redacted>".to_string());
        }
        let json = serde_json::to_string_pretty(&printable)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let validation_result = config::validate_config(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Storage backend: InMemory");
                println!("  Mailbox capacity: {}", cfg.hub.mailbox_capacity);
                println!("  Max message size: {}", cfg.hub.max_message_size);
                println!(
                    "  JWT secret configured: {}",
                    cfg.security.jwt_secret.is_some()
                );
                println!("  Production mode: {}", config::is_production_mode());
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    websocket::run_server(addr, cfg).await?;

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn test_cli_default_no_flags() {
        let cli = Cli::try_parse_from(["mrpg-server"]).unwrap();
        assert!(!cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_validate_config_short() {
        let cli = Cli::try_parse_from(["mrpg-server", "-c"]).unwrap();
        assert!(cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_cli_print_config() {
        let cli = Cli::try_parse_from(["mrpg-server", "--print-config"]).unwrap();
        assert!(!cli.validate_config);
        assert!(cli.print_config);
    }

    #[test]
    fn test_cli_validate_and_print_config_conflict() {
        let result = Cli::try_parse_from(["mrpg-server", "--validate-config", "--print-config"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("cannot be used with"));
    }

    #[test]
    fn test_cli_help_contains_flags() {
        let result = Cli::try_parse_from(["mrpg-server", "--help"]);
        assert!(result.is_err());
        let help_text = result.unwrap_err().to_string();
        assert!(help_text.contains("--validate-config"));
        assert!(help_text.contains("--print-config"));
    }
}
