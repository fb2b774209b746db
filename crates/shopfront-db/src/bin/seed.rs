//! # Seed Data Generator
//!
//! Creates staff accounts and a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./shopfront.db with the default admin and ~200 products
//! cargo run -p shopfront-db --bin seed
//!
//! # Custom path, credentials and size
//! cargo run -p shopfront-db --bin seed -- --db ./data/shop.db \
//!     --admin-user owner --admin-password s3cret --count 500
//! ```
//!
//! Products get codes like `BEV-COC-004`, prices between 1.99 and 9.99
//! plus a size surcharge, and stock between 0 and 40 so that some rows
//! show up as low stock straight away.

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shopfront_core::{NewProduct, UserRole};
use shopfront_db::{hash_password, Database, DbConfig};

/// Catalog categories and product names.
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "BEV",
        "Beverages",
        &[
            "Coca-Cola",
            "Orange Juice",
            "Mineral Water",
            "Iced Tea",
            "Ginger Beer",
            "Cold Brew Coffee",
        ],
    ),
    (
        "SNK",
        "Snacks",
        &[
            "Salted Crisps",
            "Roasted Peanuts",
            "Chocolate Bar",
            "Oat Cookies",
            "Rice Crackers",
        ],
    ),
    (
        "DRY",
        "Dairy",
        &["Whole Milk", "Greek Yogurt", "Cheddar", "Butter", "Eggs"],
    ),
    (
        "HOM",
        "Household",
        &[
            "Dish Soap",
            "Laundry Powder",
            "Paper Towels",
            "Bin Bags",
            "Hand Soap",
        ],
    ),
    (
        "GRO",
        "Grocery",
        &["Basmati Rice", "Penne Pasta", "Tomato Passata", "Olive Oil", "Flour"],
    ),
];

/// Size variants with their price surcharge in minor units.
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("Family", 350),
    ("Multipack", 500),
];

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Seed a Shopfront POS database with demo data")]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./shopfront.db")]
    db: String,

    /// Maximum number of products to generate
    #[arg(short, long, default_value_t = 200)]
    count: usize,

    /// Username of the admin account
    #[arg(long, default_value = "admin")]
    admin_user: String,

    /// Password of the admin account
    #[arg(long, default_value = "admin123")]
    admin_password: String,

    /// Also create a `cashier` account with the same password
    #[arg(long)]
    with_cashier: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!(db = %args.db, count = args.count, "Seeding database");

    let db = Database::new(DbConfig::new(&args.db))
        .await
        .with_context(|| format!("opening {}", args.db))?;

    seed_users(&db, &args).await?;
    seed_products(&db, args.count).await?;

    let low = db.products().low_stock().await?;
    info!(low_stock = low.len(), "Seed complete");

    db.close().await;
    Ok(())
}

async fn seed_users(db: &Database, args: &Args) -> anyhow::Result<()> {
    let mut accounts = vec![(args.admin_user.as_str(), "Administrator", UserRole::Admin)];
    if args.with_cashier {
        accounts.push(("cashier", "Front Till", UserRole::Cashier));
    }

    for (username, full_name, role) in accounts {
        if db.users().find_by_username(username).await?.is_some() {
            warn!(username, "User already exists, skipping");
            continue;
        }
        let hash = hash_password(&args.admin_password)?;
        db.users().create(username, &hash, full_name, role).await?;
        info!(username, role = role.as_str(), "Created user");
    }
    Ok(())
}

async fn seed_products(db: &Database, count: usize) -> anyhow::Result<()> {
    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Catalog already has products, skipping");
        return Ok(());
    }

    let mut generated = 0usize;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (prefix, category_name, names)) in CATEGORIES.iter().enumerate() {
        let category = db.products().ensure_category(category_name).await?;

        for (product_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, surcharge)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = category_idx * 1000 + product_idx * 20 + size_idx;
                let product = generate_product(prefix, name, size, *surcharge, seed, category.id);

                if let Err(e) = db.products().insert(&product).await {
                    warn!(code = %product.code, error = %e, "Failed to insert product");
                    continue;
                }
                generated += 1;
            }
        }
    }

    info!(generated, elapsed = ?start.elapsed(), "Generated products");
    Ok(())
}

fn generate_product(
    prefix: &str,
    name: &str,
    size: &str,
    surcharge: i64,
    seed: usize,
    category_id: i64,
) -> NewProduct {
    let stem: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_uppercase();

    NewProduct {
        code: format!("{}-{}-{:03}", prefix, stem, seed % 1000),
        barcode: Some(format!("590{:010}", seed)),
        name: format!("{} {}", name, size),
        price: 199 + ((seed * 17) % 800) as i64 + surcharge,
        category_id: Some(category_id),
        stock: (seed % 41) as i64,
        reorder_level: shopfront_core::DEFAULT_REORDER_LEVEL,
    }
}
