//! Account maintenance outside the web process.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use hiq_invoice::config::DEFAULT_DATABASE_URL;
use hiq_invoice::db::Db;
use hiq_invoice::error::AppError;
use hiq_invoice::store::users;

#[derive(Parser)]
#[command(
    name = "manage-users",
    version = env!("CARGO_PKG_VERSION"),
    about = "List, create and re-password HiQode Invoice login accounts"
)]
struct Cli {
    /// Database URL (defaults to $DATABASE_URL, then sqlite://data.sqlite3)
    #[arg(global = true, long = "db")]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every account
    List,
    /// Add an account
    Create { username: String, password: String },
    /// Set a new password for an existing account
    Change {
        username: String,
        new_password: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let url = cli
        .db
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    let db = match Db::connect(&url).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, url = %url, "Cannot open database");
            return ExitCode::FAILURE;
        }
    };

    match run(&db, cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(db: &Db, command: Command) -> Result<ExitCode, AppError> {
    match command {
        Command::List => {
            println!("Users:");
            for user in users::list(db).await? {
                println!("- [{}] {}", user.id, user.username);
            }
        }
        Command::Create { username, password } => match users::create(db, &username, &password).await {
            Ok(_) => println!("User created: {}", username.trim()),
            Err(AppError::BadRequest(msg)) => {
                eprintln!("Error creating user: {msg}");
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e),
        },
        Command::Change {
            username,
            new_password,
        } => {
            if !users::change_password(db, &username, &new_password).await? {
                eprintln!("User not found: {username}");
                return Ok(ExitCode::FAILURE);
            }
            println!("Password updated for user: {}", username.trim());
        }
    }

    Ok(ExitCode::SUCCESS)
}
