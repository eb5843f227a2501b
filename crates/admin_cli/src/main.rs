use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

mod prompt;

#[derive(Parser, Debug)]
#[command(name = "trackit_admin")]
#[command(about = "Admin utilities for TrackIt (users, balance repair)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./trackit.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Balances(Balances),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Register a user; the password is prompted for.
    Create(CreateUserArgs),
    /// Replace a user's password and revoke their sessions.
    ResetPassword(UsernameArgs),
}

#[derive(Args, Debug)]
struct CreateUserArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct UsernameArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Balances {
    #[command(subcommand)]
    command: BalancesCommand,
}

#[derive(Subcommand, Debug)]
enum BalancesCommand {
    /// Re-derive every wallet balance of a user from its transactions.
    Recompute(UsernameArgs),
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt::new_password()?;
            let user_id = engine
                .register_user_with_email(&args.username, &password, args.email.as_deref())
                .await?;
            println!("created user: {} ({user_id})", args.username);
        }
        Command::User(User {
            command: UserCommand::ResetPassword(args),
        }) => {
            let password = prompt::new_password()?;
            engine.reset_password(&args.username, &password).await?;
            println!("password reset: {}", args.username);
        }
        Command::Balances(Balances {
            command: BalancesCommand::Recompute(args),
        }) => {
            let user_id = engine.user_id(&args.username).await?;
            let wallets = engine.recompute_balances(user_id).await?;
            if wallets.is_empty() {
                println!("no wallets for {}", args.username);
            }
            for wallet in wallets {
                println!("{}\t{}\t{}", wallet.id, wallet.name, wallet.balance);
            }
        }
    }

    Ok(())
}
