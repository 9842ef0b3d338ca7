//! # Menu Seeder
//!
//! Populates the drinks table with the house menu for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./boba_dev.db with stock of 50 per drink
//! cargo run -p boba-db --bin seed
//!
//! # Custom database and stock
//! cargo run -p boba-db --bin seed -- --db ./data/boba.db --stock 20
//!
//! # Untracked stock (drinks never sell out)
//! cargo run -p boba-db --bin seed -- --untracked
//! ```

use boba_core::Money;
use boba_db::{Database, DbConfig, NewDrink};
use std::env;

/// `(name, price in cents, image, hot option, tea options)`
type MenuItem = (&'static str, i64, &'static str, bool, bool);

/// The house menu, by series.
const MENU: &[(&str, &[MenuItem])] = &[
    (
        "Milky Series",
        &[
            ("Classic Milk Tea", 400, "classic_milk_tea.png", true, true),
            ("Taro Milk Tea", 450, "taro_milk_tea.png", true, false),
            ("Brown Sugar Milk Tea", 500, "brown_sugar.png", true, false),
            ("Thai Milk Tea", 450, "thai_milk_tea.png", false, false),
        ],
    ),
    (
        "Fruit Tea Series",
        &[
            ("Mango Green Tea", 475, "mango_green_tea.png", false, true),
            ("Passion Fruit Tea", 475, "passion_fruit_tea.png", false, true),
            ("Strawberry Tea", 475, "strawberry_tea.png", false, true),
        ],
    ),
    (
        "Fresh Brew Series",
        &[
            ("House Black Tea", 325, "house_black_tea.png", true, true),
            ("Jasmine Green Tea", 325, "jasmine_green_tea.png", true, true),
            ("Oolong Tea", 350, "oolong_tea.png", true, true),
        ],
    ),
    (
        "Matcha Series",
        &[
            ("Matcha Latte", 525, "matcha_latte.png", true, false),
            ("Strawberry Matcha", 575, "strawberry_matcha.png", false, false),
        ],
    ),
    (
        "Ice Blended Series",
        &[
            ("Mango Smoothie", 525, "mango_smoothie.png", false, false),
            ("Oreo Ice Blended", 550, "oreo_ice_blended.png", false, false),
        ],
    ),
    (
        "Non-Caffeinated Series",
        &[
            ("Honey Lemonade", 375, "honey_lemonade.png", false, false),
            ("Wintermelon Lemonade", 400, "", false, false),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut stock: Option<i64> = Some(50);
    let mut db_path = String::from("./boba_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stock" | "-s" => {
                if i + 1 < args.len() {
                    stock = Some(args[i + 1].parse().unwrap_or(50));
                    i += 1;
                }
            }
            "--untracked" | "-u" => stock = None,
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Boba POS Menu Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --stock <N>    Stock per drink (default: 50)");
                println!("  -u, --untracked    Do not track stock");
                println!("  -d, --db <PATH>    Database file path (default: ./boba_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Boba POS Menu Seeder");
    println!("====================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.drinks().count().await?;
    if existing > 0 {
        println!("⚠ Menu already has {} drinks, updating in place", existing);
    }

    let mut seeded = 0;
    for (series, drinks) in MENU {
        for &(name, cents, image, hot, tea) in drinks.iter() {
            let mut drink = NewDrink::new(name, *series, Money::from_cents(cents));
            drink.qty_remaining = stock;
            if !image.is_empty() {
                drink = drink.image(image);
            }
            if hot {
                drink = drink.hot();
            }
            if tea {
                drink = drink.tea_options();
            }

            if let Err(e) = db.drinks().upsert(&drink).await {
                eprintln!("Failed to seed {}: {}", name, e);
                continue;
            }
            seeded += 1;
        }
        println!("  {} seeded", series);
    }

    println!();
    println!("✓ Seeded {} drinks", seeded);

    Ok(())
}
