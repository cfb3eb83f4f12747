//! Account registration, login, and session commands.

use clap::Subcommand;

use madina_client::MadinaClient;
use madina_client::types::RegisterInput;

use super::{CommandResult, flag_or_prompt};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create a new customer account and log in
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Log in with email and password
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Destroy the local session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Force a token refresh
    Refresh,
}

pub async fn run(client: &MadinaClient, action: AuthAction) -> CommandResult {
    match action {
        AuthAction::Register {
            name,
            email,
            phone,
            password,
        } => {
            let password = flag_or_prompt(password, "Password")?;
            let confirm = flag_or_prompt(None, "Confirm password")?;

            let profile = client
                .auth()
                .register(&RegisterInput {
                    name,
                    email,
                    phone,
                    password,
                    confirm_password: confirm,
                })
                .await?;

            println!("Registered and logged in as {} <{}>", profile.name, profile.email);
        }
        AuthAction::Login { email, password } => {
            let password = flag_or_prompt(password, "Password")?;
            let profile = client.auth().login(&email, &password).await?;
            println!("Logged in as {} ({})", profile.name, profile.role);
        }
        AuthAction::Logout => {
            client.auth().logout().await?;
            println!("Logged out");
        }
        AuthAction::Whoami => match client.auth().current_user().await? {
            Some(profile) => {
                println!("{} <{}>", profile.name, profile.email);
                println!("role: {}", profile.role);
            }
            None => println!("not logged in"),
        },
        AuthAction::Refresh => {
            client.auth().refresh().await?;
            println!("Session refreshed");
        }
    }

    Ok(())
}
