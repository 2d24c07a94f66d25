//! # Seed Cart Generator
//!
//! Fills the stored cart with sample products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the cart in the platform data directory
//! cargo run -p gomarket-cart --bin seed
//!
//! # Seed into a custom directory, replacing whatever is there
//! cargo run -p gomarket-cart --bin seed -- --data-dir ./dev-data --reset
//! ```
//!
//! The cart is built through a mounted `CartProvider`, so the stored blob is
//! exactly what the app would have written.

use std::env;
use std::path::PathBuf;

use gomarket_cart::{init_tracing, CartConfig, CartProvider, LineItem, Product};
use gomarket_core::Cart;
use gomarket_storage::{CartRepository, FileStore};

/// (id, title, price, quantity)
const SAMPLE_ITEMS: &[(&str, &str, f64, u32)] = &[
    ("1", "Cadeira Rivatti", 1400.0, 1),
    ("2", "Poltrona de madeira", 500.0, 2),
    ("3", "Cafeteira italiana", 79.9, 1),
    ("4", "Caneca esmaltada", 24.5, 4),
    ("5", "Luminária de mesa", 189.99, 1),
];

const IMAGE_BASE: &str = "https://storage.gomarket.dev/products";

fn sample_cart() -> Result<Cart, gomarket_core::CoreError> {
    let items = SAMPLE_ITEMS
        .iter()
        .map(|(id, title, price, quantity)| LineItem {
            id: id.to_string(),
            title: title.to_string(),
            image_url: format!("{}/{}.png", IMAGE_BASE, id),
            price: *price,
            quantity: *quantity,
        })
        .collect();

    Cart::try_from_items(items)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut data_dir: Option<PathBuf> = None;
    let mut reset = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--data-dir" | "-d" => {
                if i + 1 < args.len() {
                    data_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--reset" | "-r" => reset = true,
            "--help" | "-h" => {
                println!("GoMarketplace Seed Cart Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>    Config file (default: platform config dir)");
                println!("  -d, --data-dir <PATH>  Storage directory (overrides config)");
                println!("  -r, --reset            Replace an existing cart");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = CartConfig::load(config_path)?;
    if let Some(dir) = data_dir {
        config.storage.data_dir = Some(dir);
    }
    let root = config.storage.resolved_data_dir()?;

    println!("🛒 GoMarketplace Seed Cart Generator");
    println!("====================================");
    println!("Data dir: {}", root.display());
    println!("Cart key: {}", config.storage.cart_key);
    println!();

    let store = FileStore::open(&root).await?;
    let repo = CartRepository::new(store, config.storage.cart_key.clone());

    let existing = repo.load().await;
    if !existing.is_empty() {
        if !reset {
            println!("⚠ Stored cart already has {} products ({} units)", existing.len(), existing.total_quantity());
            println!("  Skipping seed. Pass --reset to replace it.");
            return Ok(());
        }
        repo.clear().await?;
        println!("✓ Cleared existing cart");
    }

    let fixture = sample_cart()?;
    let provider = CartProvider::mount(repo, config.persist.clone()).await;
    let cart = provider.handle();

    for item in fixture.items() {
        cart.add_to_cart(Product::from(item.clone()));
        for _ in 1..item.quantity {
            cart.increment(&item.id);
        }
    }

    provider.unmount().await?;

    if let Some(message) = cart.persist_status().last_error {
        return Err(format!("cart was not written: {}", message).into());
    }

    println!("✓ Seeded {} products ({} units)", fixture.len(), fixture.total_quantity());
    println!("  Subtotal: {}", fixture.subtotal());

    Ok(())
}
