use crate::auth::auth_client;
use crate::cli::AuthCommands;
use crate::commands::common::{load_settings, require_supabase};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands) -> Result<(), CliError> {
    let settings = load_settings()?;
    let supabase = require_supabase(&settings)?;
    let client = auth_client(supabase)?;

    match command {
        AuthCommands::Login { email, password } => {
            let session = client.sign_in(&email, &password).await?;
            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!("Signed in to {} as {email_label}", supabase.url);
        }
        AuthCommands::Status => match client.restore_session().await? {
            Some(session) => {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                let expires = session
                    .expires_at_utc()
                    .map_or_else(|| session.expires_at.to_string(), |at| at.to_rfc3339());
                println!("Signed in as {email_label} (expires_at={expires})");
            }
            None => println!("Not signed in."),
        },
        AuthCommands::Logout => {
            if let Some(session) = client.stored_session()? {
                client.sign_out(&session).await?;
            }
            println!("Signed out of {}", supabase.url);
        }
    }
    Ok(())
}
