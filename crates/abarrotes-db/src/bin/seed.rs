//! # Seed Data Generator
//!
//! Fills a development database with grocery products and, optionally,
//! a few sales.
//!
//! ## Usage
//! ```bash
//! # 200 products (default)
//! cargo run -p abarrotes-db --bin seed
//!
//! # Custom amount, custom file, plus 20 sample sales
//! cargo run -p abarrotes-db --bin seed -- --count 150 --db ./data/abarrotes.db --sales 20
//! ```
//!
//! ## Generated Products
//! `{name} {presentation}` across the usual aisles of a corner store
//! (refrescos, botanas, lácteos, abarrotes, limpieza). Every product gets
//! a distinct 13-digit barcode, a sale price between $8.00 and $95.00,
//! a cost of 65-85% of that, and 0-60 units of stock.

use abarrotes_core::{Cart, NewProduct};
use abarrotes_db::{Database, DbConfig};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Aisles with the products sold in them.
const AISLES: &[(u64, &[&str])] = &[
    (
        1,
        &[
            "Coca-Cola",
            "Pepsi",
            "Sprite",
            "Fanta Naranja",
            "Jarritos Tamarindo",
            "Peñafiel Mineral",
            "Agua Bonafont",
            "Jumex Mango",
            "Boing Guayaba",
            "Electrolit",
        ],
    ),
    (
        2,
        &[
            "Sabritas Original",
            "Doritos Nacho",
            "Cheetos Torciditos",
            "Ruffles Queso",
            "Takis Fuego",
            "Gansito",
            "Pingüinos",
            "Galletas Marías",
            "Emperador Chocolate",
            "Mazapán de la Rosa",
        ],
    ),
    (
        3,
        &[
            "Leche Lala Entera",
            "Leche Alpura Deslactosada",
            "Yoghurt Yoplait Fresa",
            "Queso Oaxaca",
            "Crema Lala",
            "Mantequilla Gloria",
            "Huevo Blanco",
            "Jamón de Pavo",
        ],
    ),
    (
        4,
        &[
            "Arroz Morelos",
            "Frijol Negro",
            "Azúcar Estándar",
            "Harina de Maíz Maseca",
            "Aceite Nutrioli",
            "Atún Dolores",
            "Sopa Maruchan",
            "Pasta La Moderna",
            "Café Nescafé Clásico",
            "Chiles Jalapeños La Costeña",
        ],
    ),
    (
        5,
        &[
            "Jabón Zote",
            "Detergente Ariel",
            "Cloro Cloralex",
            "Papel Higiénico Pétalo",
            "Suavitel",
            "Fabuloso Lavanda",
        ],
    ),
];

/// Presentations with the price they add on top of the base price.
const PRESENTATIONS: &[(&str, i64)] = &[
    ("chico", 0),
    ("mediano", 600),
    ("grande", 1400),
    ("familiar", 2800),
    ("paquete 6", 4500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut sales: usize = 0;
    let mut db_path = String::from("./abarrotes_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Abarrotes POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -s, --sales <N>    Number of sample sales to commit (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: ./abarrotes_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Abarrotes POS Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut created: Vec<i64> = Vec::with_capacity(count);

    'outer: for (aisle, names) in AISLES {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (presentation, addon)) in PRESENTATIONS.iter().enumerate() {
                if created.len() >= count {
                    break 'outer;
                }

                let seed = *aisle * 1000 + name_idx as u64 * 10 + size_idx as u64;
                let input = generate_product(name, presentation, *addon, seed);

                match db.products().create(input).await {
                    Ok(id) => {
                        created.push(id);
                        if created.len() % 100 == 0 {
                            println!("  Generated {} products...", created.len());
                        }
                    }
                    Err(e) => eprintln!("Failed to insert {} {}: {}", name, presentation, e),
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", created.len(), elapsed);
    if created.len() < count {
        println!(
            "  The catalog template holds fewer than {} products; stopped at {}.",
            count,
            created.len()
        );
    }

    if sales > 0 && !created.is_empty() {
        println!();
        println!("Committing {} sample sales...", sales);

        for n in 0..sales {
            let mut cart = Cart::new();
            let lines = 1 + n % 4;
            for k in 0..lines {
                let id = created[(n * 7 + k * 13) % created.len()];
                let product = db.products().get(id).await?;
                for _ in 0..=(k % 3) {
                    cart.add(&product)?;
                }
            }

            let sale = db.sales().commit(&cart).await?;
            info!(sale_id = sale.id, total = %sale.total(), "Sample sale");
        }

        println!("✓ Committed {} sales", db.sales().count().await?);
    }

    let results = db.products().search("coca").await?;
    println!();
    println!("  Search 'coca': {} results", results.len());

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Initializes logging. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,abarrotes_db=info,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds the input for one generated product.
fn generate_product(name: &str, presentation: &str, addon: i64, seed: u64) -> NewProduct {
    // Base sale price: $8.00 - $49.99 plus the presentation addon.
    let sale_price_cents = 800 + ((seed * 37) % 4200) as i64 + addon;

    // Cost: 65-85% of the sale price
    let cost_pct = 65 + (seed % 21) as i64;
    let purchase_price_cents = sale_price_cents * cost_pct / 100;

    NewProduct::new(
        format!("{} {}", name, presentation),
        purchase_price_cents,
        sale_price_cents,
    )
    .with_stock((seed % 61) as i64)
    .with_barcode(format!("750{:010}", seed))
}
