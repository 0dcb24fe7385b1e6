use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "staffdesk")]
#[command(about = "Keep the local Staffdesk database replicated with Supabase")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the periodic sync service until Ctrl-C (default)
    Run,
    /// Run a single sync cycle and exit
    Sync,
    /// Manage the Supabase session used for sync
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Login with Supabase email/password and store session in keychain
    Login {
        /// Supabase account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Supabase account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show whether a session is stored
    Status,
    /// Logout and clear stored session
    Logout,
}
