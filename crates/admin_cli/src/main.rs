use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{CategoryStructure, Engine, users};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

#[derive(Parser, Debug)]
#[command(name = "tally_admin")]
#[command(about = "Admin utilities for Tally (bootstrap users, inspect categories)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./tally.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Categories(Categories),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserArgs),
}

#[derive(Args, Debug)]
struct UserArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Categories {
    #[command(subcommand)]
    command: CategoriesCommand,
}

#[derive(Subcommand, Debug)]
enum CategoriesCommand {
    /// Print the user's category document as JSON.
    Show(UserArgs),
    /// Replace the user's categories with the defaults.
    Reset(UserArgs),
}

/// Keeps the terminal in raw mode while alive.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn say(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut err = std::io::stderr();
    execute!(
        err,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message)
    )?;
    err.flush()?;
    Ok(())
}

/// Read a line without echoing it; each typed character shows as `*`.
fn read_secret(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawMode::enable()?;
    say(prompt)?;

    let mut err = std::io::stderr();
    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Enter => break,
            KeyCode::Char('c') if ctrl => {
                execute!(err, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Backspace => {
                if secret.pop().is_none() {
                    continue;
                }
                execute!(err, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char(ch) if !ctrl => {
                secret.push(ch);
                execute!(err, Print("*"))?;
            }
            _ => continue,
        }
        err.flush()?;
    }

    execute!(err, Print("\r\n"))?;
    err.flush()?;
    Ok(secret)
}

/// Ask for a new password, twice, up to three attempts.
fn prompt_new_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let password = read_secret("Password: ")?;
        if password.is_empty() {
            say("Password must not be empty.\r\n")?;
            continue;
        }
        if read_secret("Confirm password: ")? == password {
            return Ok(password);
        }
        say("Passwords do not match. Try again.\r\n")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn ensure_user(db: &DatabaseConnection, username: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    if users::Entity::find_by_id(username.to_string())
        .one(db)
        .await?
        .is_none()
    {
        eprintln!("user not found: {username}");
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let password = prompt_new_password()?;
            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::Categories(Categories { command }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            match command {
                CategoriesCommand::Show(args) => {
                    ensure_user(&db, &args.username).await?;
                    let settings = engine.settings(&args.username).await?;
                    println!("{}", serde_json::to_string_pretty(&settings.categories)?);
                    println!("version: {}", settings.version);
                }
                CategoriesCommand::Reset(args) => {
                    ensure_user(&db, &args.username).await?;
                    let settings = engine
                        .replace_categories(&args.username, CategoryStructure::default_seed(), None)
                        .await?;
                    println!(
                        "reset categories of {} (version {})",
                        args.username, settings.version
                    );
                }
            }
        }
    }

    Ok(())
}
