use clap::{Parser, Subcommand};
use unpacked::{
    db,
    repositories::{SqliteOutfitRepository, SqliteUserRepository},
    seed::{seed_showcase, SHOWCASE_EMAIL},
    services::{CreateUserRequest, OutfitService, UserService},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "unpacked-cli")]
#[command(about = "CLI tool for managing Unpacked users and demo content", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Populate the public feed with showcase outfits
    Seed {
        /// Email of the account that owns the showcase outfits
        #[arg(long, default_value = SHOWCASE_EMAIL)]
        owner_email: String,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (will prompt if not provided)
        #[arg(short, long, conflicts_with = "no_password")]
        password: Option<String>,

        /// Create an account without a password
        #[arg(long)]
        no_password: bool,
    },

    /// List all users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Delete a user and all of their outfits
    Delete {
        /// Email address of the user to delete
        #[arg(short, long)]
        email: String,
    },

    /// Set a new password for a user
    SetPassword {
        /// Email address of the user
        #[arg(short, long)]
        email: String,

        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

fn get_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn prompt_new_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    let password = get_password(prompt)?;
    let confirm = get_password("Confirm password")?;

    if password != confirm {
        eprintln!("❌ Passwords do not match");
        std::process::exit(1);
    }

    Ok(password)
}

fn format_created_at(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Connect to database
    let pool = db::create_pool().await?;
    db::run_migrations(&pool).await?;

    // Initialize services
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let user_service = UserService::new(user_repository);

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                email,
                name,
                password,
                no_password,
            } => {
                let password = match (password, no_password) {
                    (_, true) => None,
                    (Some(pw), false) => Some(pw),
                    (None, false) => Some(prompt_new_password("Password")?),
                };

                let request = CreateUserRequest {
                    name,
                    email,
                    password,
                };

                match user_service.create_user(request).await {
                    Ok(user) => {
                        println!("✅ User created successfully!");
                        println!("  ID: {}", user.id);
                        println!("  Name: {}", user.name);
                        println!("  Email: {}", user.email);
                        println!("  Password: {}", if user.has_password() { "set" } else { "none" });
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to create user: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::List { limit, offset } => {
                match user_service.list_users(Some(limit), Some(offset)).await {
                    Ok(users) => {
                        if users.is_empty() {
                            println!("No users found.");
                        } else {
                            println!(
                                "{:<5} {:<36} {:<24} {:<9} {:<16}",
                                "ID", "Email", "Name", "Password", "Created"
                            );
                            println!("{}", "-".repeat(94));
                            for user in users {
                                println!(
                                    "{:<5} {:<36} {:<24} {:<9} {:<16}",
                                    user.id,
                                    user.email,
                                    user.name,
                                    if user.has_password() { "Yes" } else { "No" },
                                    format_created_at(user.created_at)
                                );
                            }
                        }
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to list users: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::Delete { email } => match user_service.find_user_by_email(&email).await {
                Ok(Some(user)) => match user_service.delete_user(user.id).await {
                    Ok(()) => {
                        println!("✅ User '{}' deleted successfully!", email);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to delete user: {}", err);
                        std::process::exit(1);
                    }
                },
                Ok(None) => {
                    eprintln!("❌ User '{}' not found", email);
                    std::process::exit(1);
                }
                Err(err) => {
                    eprintln!("❌ Failed to find user: {}", err);
                    std::process::exit(1);
                }
            },

            UserCommands::SetPassword { email, password } => {
                match user_service.find_user_by_email(&email).await {
                    Ok(Some(user)) => {
                        let new_password = match password {
                            Some(pw) => pw,
                            None => prompt_new_password("New password")?,
                        };

                        match user_service.reset_password(user.id, &new_password).await {
                            Ok(()) => {
                                println!("✅ Password updated successfully for '{}'!", email);
                            }
                            Err(err) => {
                                eprintln!("❌ Failed to update password: {}", err);
                                std::process::exit(1);
                            }
                        }
                    }
                    Ok(None) => {
                        eprintln!("❌ User '{}' not found", email);
                        std::process::exit(1);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to find user: {}", err);
                        std::process::exit(1);
                    }
                }
            }
        },

        Commands::Seed { owner_email } => {
            let outfit_service = OutfitService::new(Arc::new(SqliteOutfitRepository::new(pool)));

            match seed_showcase(&user_service, &outfit_service, &owner_email).await {
                Ok(summary) => {
                    println!(
                        "✅ Seeded {} showcase outfits ({} already present)",
                        summary.created, summary.skipped
                    );
                }
                Err(err) => {
                    eprintln!("❌ Failed to seed outfits: {:#}", err);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
