use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{DashboardController, HttpMenuService};
use shared::{
    domain::ItemId,
    protocol::{ItemDraft, ItemPatch, MenuItem},
};

#[derive(Parser, Debug)]
#[command(about = "Manage the food menu exposed by a remote /foods resource")]
struct Args {
    /// Base URL of the menu server. Falls back to DASHBOARD_SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all menu items.
    List {
        /// Print raw JSON instead of the readable listing.
        #[arg(long)]
        json: bool,
    },
    /// Create a new menu item.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        image: String,
        /// Ask for the item to start unavailable. Creation currently forces
        /// items available; the flag is carried end to end for when that
        /// policy changes.
        #[arg(long)]
        unavailable: bool,
    },
    /// Update fields of an existing item.
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        available: Option<bool>,
        #[arg(long)]
        image: Option<String>,
    },
    /// Delete an item.
    Delete { id: i64 },
}

fn print_item(item: &MenuItem) {
    let availability = if item.available {
        "available"
    } else {
        "unavailable"
    };
    println!(
        "#{} {} (${:.2}, {})",
        item.id, item.name, item.price, availability
    );
    println!("    {}", item.description);
    println!("    image: {}", item.image);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let server_url = args
        .server_url
        .or_else(|| std::env::var("DASHBOARD_SERVER_URL").ok())
        .context("pass --server-url or set DASHBOARD_SERVER_URL")?;

    let service = Arc::new(HttpMenuService::new(server_url)?);
    let controller = DashboardController::new(service);
    controller.load_all().await?;

    match args.command {
        Command::List { json } => {
            let items = controller.items().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("menu is empty");
            } else {
                for item in &items {
                    print_item(item);
                }
            }
        }
        Command::Add {
            name,
            description,
            price,
            image,
            unavailable,
        } => {
            let draft = ItemDraft {
                name,
                description,
                price,
                available: !unavailable,
                image,
            };
            let created = controller.add_item(&draft).await?;
            println!("created:");
            print_item(&created);
        }
        Command::Update {
            id,
            name,
            description,
            price,
            available,
            image,
        } => {
            let patch = ItemPatch {
                name,
                description,
                price,
                available,
                image,
            };
            if patch.is_empty() {
                bail!("nothing to update: pass at least one field flag");
            }
            let target = controller
                .items()
                .await
                .into_iter()
                .find(|item| item.id == ItemId(id))
                .with_context(|| format!("no menu item with id {id}"))?;
            controller.select_for_edit(target).await;
            let updated = controller.update_item(&patch).await?;
            println!("updated:");
            print_item(&updated);
        }
        Command::Delete { id } => {
            controller.delete_item(ItemId(id)).await?;
            println!("deleted item {id}");
        }
    }

    Ok(())
}
