// ABOUTME: CLI commands for the stored CLIO connection
// ABOUTME: Supports status, authorization URL generation, token refresh and logout

use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use colored::*;

use clio_connect_auth::{AuthorizationOptions, TokenManager};
use clio_connect_cli::{build_manager, config::Config};

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Show the CLIO connection status
    Status {
        /// User to inspect (defaults to CLIO_DEFAULT_USER_ID)
        #[arg(long)]
        user: Option<String>,
    },

    /// Print a CLIO authorization URL to start the OAuth flow
    Url {
        #[arg(long)]
        user: Option<String>,

        /// Space-delimited scopes (defaults to CLIO_DEFAULT_SCOPE)
        #[arg(long)]
        scope: Option<String>,

        /// Open the URL in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Renew the stored access token with its refresh token
    Refresh {
        #[arg(long)]
        user: Option<String>,
    },

    /// Revoke the token with CLIO and delete it locally
    Logout {
        #[arg(long)]
        user: Option<String>,
    },
}

impl AuthCommands {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let manager = build_manager(config).await?;
        let resolve = |user: &Option<String>| {
            user.clone()
                .unwrap_or_else(|| config.default_user_id.clone())
        };

        match self {
            AuthCommands::Status { user } => status_command(&manager, &resolve(user)).await,
            AuthCommands::Url { user, scope, open } => {
                url_command(&manager, &resolve(user), scope.clone(), *open).await
            }
            AuthCommands::Refresh { user } => refresh_command(&manager, &resolve(user)).await,
            AuthCommands::Logout { user } => logout_command(&manager, &resolve(user)).await,
        }
    }
}

async fn status_command(manager: &TokenManager, user_id: &str) -> anyhow::Result<()> {
    println!("{}", "🔐 CLIO Connection Status".bold().cyan());
    println!();

    let status = manager.check_connection(user_id).await;

    if status.connected {
        println!("  {} {}", "✓".green().bold(), "Connected".bold());
        if let Some(name) = &status.account_name {
            println!("        Account: {}", name.cyan());
        }
        if let Some(email) = &status.account_email {
            println!("        Email: {}", email.cyan());
        }
    } else {
        println!("  {} {}", "✗".red().bold(), "Not connected".bold());
        if let Some(error) = &status.error {
            println!("        {}", error.dimmed());
        }
    }

    if let Some(info) = manager.token_info(user_id).await? {
        let expires = format_timestamp(info.expires_at);
        if info.expired {
            println!("        Expires: {} {}", expires.red(), "(expired)".red());
        } else {
            println!("        Expires: {}", expires.green());
        }
        println!(
            "        Refresh token: {}",
            if info.has_refresh_token { "yes" } else { "no" }
        );
        if !info.scope.is_empty() {
            println!("        Scope: {}", info.scope);
        }
    }

    println!();
    if status.needs_reauth {
        println!("Use {} to connect", "clio-connect auth url --open".yellow());
    }

    Ok(())
}

async fn url_command(
    manager: &TokenManager,
    user_id: &str,
    scope: Option<String>,
    open_browser: bool,
) -> anyhow::Result<()> {
    let url = manager
        .build_authorization_url(user_id, AuthorizationOptions { scope })
        .await?;

    println!("{}", "🔗 Open this URL to connect CLIO:".bold().cyan());
    println!();
    println!("   {}", url.as_str().underline());
    println!();
    println!(
        "{}",
        "The link is single use and expires shortly; the server must be running to receive the callback."
            .dimmed()
    );

    if open_browser {
        if let Err(e) = open::that(url.as_str()) {
            eprintln!("{} Could not open browser: {}", "⚠".yellow().bold(), e);
        }
    }

    Ok(())
}

async fn refresh_command(manager: &TokenManager, user_id: &str) -> anyhow::Result<()> {
    println!("{}", "🔄 Refreshing CLIO token...".bold().cyan());

    match manager.refresh_token(user_id).await? {
        Some(record) => {
            println!("{} Token refreshed", "✓".green().bold());
            println!(
                "        Expires: {}",
                format_timestamp(record.expires_at()).green()
            );
            Ok(())
        }
        None => anyhow::bail!(
            "Token could not be refreshed. Run 'clio-connect auth url' to reconnect."
        ),
    }
}

async fn logout_command(manager: &TokenManager, user_id: &str) -> anyhow::Result<()> {
    println!("{}", "🔓 Disconnecting from CLIO...".bold().cyan());

    if manager.revoke(user_id).await {
        println!("{} Successfully disconnected", "✓".green().bold());
        Ok(())
    } else {
        anyhow::bail!("Failed to delete the stored token")
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}
