pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod validation;

use anyhow::Context;
pub use config::Config;
use db::{NewRecipe, Store};
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "init" | "--init" => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists.");
            }
            Ok(())
        }

        "migrate" | "m" => {
            if args.len() < 3 {
                println!("Usage: potluck migrate <up|down|status>");
                return Ok(());
            }
            match args[2].as_str() {
                "up" => cmd_migrate_up(&config).await,
                "down" => {
                    let steps = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(1);
                    cmd_migrate_down(&config, steps).await
                }
                "status" => cmd_migrate_status(&config).await,
                _ => {
                    println!("Unknown migrate subcommand: {}", args[2]);
                    println!("Use: up, down, status");
                    Ok(())
                }
            }
        }

        "user" | "u" => {
            if args.len() < 3 {
                println!("Usage: potluck user <subcommand>");
                println!("Subcommands: add, auth, show, passwd, rm");
                return Ok(());
            }
            match args[2].as_str() {
                "add" => {
                    if args.len() < 5 {
                        println!(
                            "Usage: potluck user add <username> <password> [--image-url URL] [--bio TEXT]"
                        );
                        return Ok(());
                    }
                    let image_url = flag_value(&args, "--image-url");
                    let bio = flag_value(&args, "--bio");
                    cmd_user_add(&config, &args[3], &args[4], image_url, bio).await
                }
                "auth" => {
                    if args.len() < 5 {
                        println!("Usage: potluck user auth <username> <password>");
                        return Ok(());
                    }
                    cmd_user_auth(&config, &args[3], &args[4]).await
                }
                "show" => {
                    if args.len() < 4 {
                        println!("Usage: potluck user show <username>");
                        return Ok(());
                    }
                    cmd_user_show(&config, &args[3]).await
                }
                "passwd" => {
                    if args.len() < 5 {
                        println!("Usage: potluck user passwd <username> <new_password>");
                        return Ok(());
                    }
                    cmd_user_passwd(&config, &args[3], &args[4]).await
                }
                "rm" => {
                    if args.len() < 4 {
                        println!("Usage: potluck user rm <username>");
                        return Ok(());
                    }
                    cmd_user_rm(&config, &args[3]).await
                }
                _ => {
                    println!("Unknown user subcommand: {}", args[2]);
                    println!("Use: add, auth, show, passwd, rm");
                    Ok(())
                }
            }
        }

        "recipe" | "r" => {
            if args.len() < 3 {
                println!("Usage: potluck recipe <subcommand>");
                println!("Subcommands: add, list, edit, rm");
                return Ok(());
            }
            match args[2].as_str() {
                "add" => {
                    if args.len() < 6 {
                        println!(
                            "Usage: potluck recipe add <username> <title> <instructions> [minutes]"
                        );
                        return Ok(());
                    }
                    let minutes = args.get(6).and_then(|s| s.parse().ok());
                    cmd_recipe_add(&config, &args[3], &args[4], &args[5], minutes).await
                }
                "list" | "ls" => {
                    if args.len() < 4 {
                        println!("Usage: potluck recipe list <username>");
                        return Ok(());
                    }
                    cmd_recipe_list(&config, &args[3]).await
                }
                "edit" => {
                    if args.len() < 4 {
                        println!(
                            "Usage: potluck recipe edit <id> [--title T] [--instructions I] [--minutes N]"
                        );
                        return Ok(());
                    }
                    let title = flag_value(&args, "--title");
                    let instructions = flag_value(&args, "--instructions");
                    let minutes = flag_value(&args, "--minutes").and_then(|s| s.parse().ok());
                    cmd_recipe_edit(&config, &args[3], title, instructions, minutes).await
                }
                "rm" => {
                    if args.len() < 4 {
                        println!("Usage: potluck recipe rm <id>");
                        return Ok(());
                    }
                    cmd_recipe_rm(&config, &args[3]).await
                }
                _ => {
                    println!("Unknown recipe subcommand: {}", args[2]);
                    println!("Use: add, list, edit, rm");
                    Ok(())
                }
            }
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn print_help() {
    println!("Potluck - Recipe Sharing Backend");
    println!();
    println!("USAGE:");
    println!("  potluck <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  migrate up              Apply pending schema migrations");
    println!("  migrate down [n]        Roll back the last n migrations (default: 1)");
    println!("  migrate status          Show applied and pending migrations");
    println!("  user add <name> <pw>    Create a user ([--image-url URL] [--bio TEXT])");
    println!("  user auth <name> <pw>   Verify credentials (exit non-zero on mismatch)");
    println!("  user show <name>        Print a user with their recipes as JSON");
    println!("  user passwd <name> <pw> Set a new password");
    println!("  user rm <name>          Delete a user (rejected while recipes exist)");
    println!("  recipe add <user> <title> <instructions> [minutes]");
    println!("                          Create a recipe (instructions >= 50 chars)");
    println!("  recipe list <user>      List a user's recipes");
    println!("  recipe edit <id>        Edit ([--title T] [--instructions I] [--minutes N])");
    println!("  recipe rm <id>          Delete a recipe");
    println!("  init                    Create default config file");
    println!("  help                    Show this help message");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure the database path and hashing costs.");
}

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::with_security(&config.general.database_path, config.security.clone()).await
}

async fn cmd_migrate_up(config: &Config) -> anyhow::Result<()> {
    let store = Store::connect(&config.general.database_path, config.security.clone()).await?;

    let pending = db::migrator::Migrator::get_pending_migrations(&store.conn).await?;
    if pending.is_empty() {
        println!("Schema is up to date.");
        return Ok(());
    }

    db::migrator::Migrator::up(&store.conn, None)
        .await
        .context("Migration failed; no partial schema change was left behind")?;

    println!("✓ Applied {} migration(s)", pending.len());
    Ok(())
}

async fn cmd_migrate_down(config: &Config, steps: u32) -> anyhow::Result<()> {
    let store = Store::connect(&config.general.database_path, config.security.clone()).await?;

    db::migrator::Migrator::down(&store.conn, Some(steps))
        .await
        .context("Rollback failed")?;

    println!("✓ Rolled back {} migration(s)", steps);
    Ok(())
}

async fn cmd_migrate_status(config: &Config) -> anyhow::Result<()> {
    let store = Store::connect(&config.general.database_path, config.security.clone()).await?;

    let applied = db::migrator::Migrator::get_applied_migrations(&store.conn).await?;
    let pending = db::migrator::Migrator::get_pending_migrations(&store.conn).await?;

    println!("Applied migrations:");
    if applied.is_empty() {
        println!("  (none)");
    }
    for m in &applied {
        println!("  ✓ {}", m.name());
    }

    println!("Pending migrations:");
    if pending.is_empty() {
        println!("  (none)");
    }
    for m in &pending {
        println!("  ○ {}", m.name());
    }

    Ok(())
}

async fn cmd_user_add(
    config: &Config,
    username: &str,
    password: &str,
    image_url: Option<&str>,
    bio: Option<&str>,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let user = store
        .create_user(username, password, image_url, bio)
        .await?;

    println!("✓ Created user {} (ID: {})", user.username, user.id);
    Ok(())
}

async fn cmd_user_auth(config: &Config, username: &str, password: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    if store.authenticate(username, password).await? {
        println!("✓ Authenticated as {}", username);
        Ok(())
    } else {
        anyhow::bail!("Invalid credentials for {}", username)
    }
}

async fn cmd_user_show(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let response = store
        .user_response(username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn cmd_user_passwd(
    config: &Config,
    username: &str,
    new_password: &str,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    store.set_user_password(username, new_password).await?;

    println!("✓ Password updated for {}", username);
    Ok(())
}

async fn cmd_user_rm(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let user = store
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))?;

    store.delete_user(user.id).await.context(
        "Delete failed; a user who still owns recipes cannot be removed",
    )?;

    println!("✓ Deleted user {}", username);
    Ok(())
}

async fn cmd_recipe_add(
    config: &Config,
    username: &str,
    title: &str,
    instructions: &str,
    minutes_to_complete: Option<i32>,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let user = store
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))?;

    let recipe = store
        .create_recipe(NewRecipe {
            title: title.to_string(),
            instructions: instructions.to_string(),
            minutes_to_complete,
            user_id: user.id,
        })
        .await?;

    println!("✓ Added recipe '{}' (ID: {})", recipe.title, recipe.id);
    Ok(())
}

async fn cmd_recipe_list(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let user = store
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User '{}' not found", username))?;

    let recipes = store.recipes_for_user(user.id).await?;

    if recipes.is_empty() {
        println!("{} has no recipes yet.", username);
        println!();
        println!("Add one with: potluck recipe add {} <title> <instructions>", username);
        return Ok(());
    }

    println!("Recipes for {} ({} total)", username, recipes.len());
    println!("{:-<70}", "");

    for recipe in recipes {
        let minutes = recipe
            .minutes_to_complete
            .map_or_else(|| "?".to_string(), |m| m.to_string());
        println!("• {} (ID: {}) | {} min", recipe.title, recipe.id, minutes);
        println!("  {}", recipe.instructions);
    }

    Ok(())
}

async fn cmd_recipe_edit(
    config: &Config,
    id_str: &str,
    title: Option<&str>,
    instructions: Option<&str>,
    minutes_to_complete: Option<i32>,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let id: i32 = id_str.parse().context("Invalid recipe ID")?;

    if title.is_none() && instructions.is_none() && minutes_to_complete.is_none() {
        println!("Nothing to change.");
        return Ok(());
    }

    // Instructions go through their own path so validation runs before
    // anything else is touched.
    if let Some(instructions) = instructions {
        store.update_recipe_instructions(id, instructions).await?;
    }

    if title.is_some() || minutes_to_complete.is_some() {
        store.update_recipe(id, title, minutes_to_complete).await?;
    }

    println!("✓ Updated recipe {}", id);
    Ok(())
}

async fn cmd_recipe_rm(config: &Config, id_str: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let id: i32 = id_str.parse().context("Invalid recipe ID")?;

    store.delete_recipe(id).await?;

    println!("✓ Deleted recipe {}", id);
    Ok(())
}
