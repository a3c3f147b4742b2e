use clap::{Parser, Subcommand};

use crate::auth::session::SessionManager;
use crate::config::AppConfig;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "blog-api")]
#[command(about = "Blog API - session-authenticated articles and comments")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Interface to bind, overrides SERVER_HOST")]
        host: Option<String>,
        #[arg(long, help = "Port to bind, overrides SERVER_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Create or update the database schema and exit")]
    Migrate,

    #[command(about = "Register an account from the command line")]
    CreateUser {
        #[arg(help = "Account name")]
        username: String,
        #[arg(help = "Plaintext password")]
        password: String,
    },
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Commands::Migrate => {
            AppState::connect(config).await?;
            println!("✓ Schema is up to date");
            Ok(())
        }
        Commands::CreateUser { username, password } => {
            let state = AppState::connect(config).await?;
            let user = state.credentials.create_user(&username, &password).await?;
            println!("✓ Created user '{}' (ID: {})", user.username, user.id);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    if !config.security.secure_cookies && crate::is_production!() {
        tracing::warn!("Secure cookies are disabled in production");
    }

    let bind_addr = config.bind_addr();
    let state = AppState::connect(config).await?;
    purge_sessions(&state.sessions).await;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Blog API listening on http://{}", bind_addr);

    axum::serve(listener, crate::app(state)).await?;
    Ok(())
}

async fn purge_sessions(sessions: &SessionManager) {
    match sessions.purge_expired().await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Purged {} expired sessions", n),
        Err(e) => tracing::warn!("Could not purge expired sessions: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["blog-api"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parses_create_user() {
        let cli = Cli::parse_from(["blog-api", "create-user", "alice", "s3cret"]);
        match cli.command {
            Some(Commands::CreateUser { username, password }) => {
                assert_eq!(username, "alice");
                assert_eq!(password, "s3cret");
            }
            _ => panic!("expected create-user"),
        }
    }

    #[test]
    fn test_parses_serve_overrides() {
        let cli = Cli::parse_from(["blog-api", "serve", "--port", "9000"]);
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert!(host.is_none());
                assert_eq!(port, Some(9000));
            }
            _ => panic!("expected serve"),
        }
    }
}
