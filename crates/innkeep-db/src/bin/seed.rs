//! # Catalog Seed Generator
//!
//! Populates a database with a demo room and item catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./innkeep_dev.db with the full demo catalog
//! cargo run -p innkeep-db --bin seed
//!
//! # Only the first 10 rooms
//! cargo run -p innkeep-db --bin seed -- --rooms 10
//!
//! # Specify database path
//! cargo run -p innkeep-db --bin seed -- --db ./data/innkeep.db
//! ```
//!
//! ## Generated Catalog
//! - Rooms on floors 1-5, room type by floor, rate by type
//! - Items across every category: kitchen, bar, laundry, services

use std::env;

use innkeep_core::{ItemCategory, Money, NewItem, NewRoom, RoomType};
use innkeep_db::{Database, DbConfig};

/// Nightly base rate per room type, in cents.
const ROOM_RATES: &[(RoomType, i64)] = &[
    (RoomType::Standard, 4500),
    (RoomType::Deluxe, 6500),
    (RoomType::Family, 8000),
    (RoomType::Suite, 12000),
    (RoomType::Executive, 15000),
    (RoomType::Presidential, 45000),
];

/// Demo items: (name, category, price in cents).
const ITEMS: &[(&str, ItemCategory, i64)] = &[
    ("Continental Breakfast", ItemCategory::Food, 1500),
    ("Club Sandwich", ItemCategory::Food, 1100),
    ("Chicken Biryani", ItemCategory::Food, 1400),
    ("Caesar Salad", ItemCategory::Food, 900),
    ("Masala Tea", ItemCategory::Beverage, 250),
    ("Fresh Lime Soda", ItemCategory::Beverage, 350),
    ("Espresso", ItemCategory::Beverage, 300),
    ("Mineral Water", ItemCategory::Beverage, 150),
    ("Late Night Snack Tray", ItemCategory::RoomService, 1800),
    ("In-Room Dining Charge", ItemCategory::RoomService, 500),
    ("Shirt Pressing", ItemCategory::Laundry, 300),
    ("Suit Dry Cleaning", ItemCategory::Laundry, 1500),
    ("Wash & Fold (per kg)", ItemCategory::Laundry, 600),
    ("Extra Bed", ItemCategory::Amenity, 2000),
    ("Baby Cot", ItemCategory::Amenity, 0),
    ("Airport Transfer", ItemCategory::Transportation, 3500),
    ("City Tour", ItemCategory::Recreation, 4000),
    ("Spa Session", ItemCategory::Recreation, 6000),
    ("Business Center (per hour)", ItemCategory::Service, 800),
    ("Lost Key Card", ItemCategory::Other, 500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut room_count: usize = 50;
    let mut db_path = String::from("./innkeep_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rooms" | "-r" => {
                if i + 1 < args.len() {
                    room_count = args[i + 1].parse().unwrap_or(50);
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
                println!("Innkeep Catalog Seed Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -r, --rooms <N>    Number of rooms to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./innkeep_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Innkeep Catalog Seed Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Rooms:    {}", room_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.rooms().count().await? + db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has a catalog ({} rows)", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    let start = std::time::Instant::now();

    println!();
    println!("Generating rooms...");
    let mut rooms = 0;
    for room in generate_rooms(room_count) {
        if let Err(e) = db.rooms().create(&room).await {
            eprintln!("Failed to insert room {}: {}", room.room_number, e);
            continue;
        }
        rooms += 1;
    }

    println!("Generating items...");
    let mut items = 0;
    for (name, category, cents) in ITEMS {
        let item = NewItem {
            name: name.to_string(),
            category: *category,
            price: Money::from_cents(*cents),
        };
        if let Err(e) = db.items().create(&item).await {
            eprintln!("Failed to insert item {}: {}", name, e);
            continue;
        }
        items += 1;
    }

    println!();
    println!(
        "✓ Generated {} rooms and {} items in {:?}",
        rooms,
        items,
        start.elapsed()
    );

    db.close().await;
    println!("✓ Seed complete!");

    Ok(())
}

/// Lays rooms out 20 to a floor; higher floors get pricier room types.
fn generate_rooms(count: usize) -> Vec<NewRoom> {
    (0..count)
        .map(|idx| {
            let floor = idx / 20 + 1;
            let door = idx % 20 + 1;
            let (room_type, base) = ROOM_RATES[(floor - 1).min(ROOM_RATES.len() - 1)];
            // Corner rooms (door 1 and 20) carry a small premium.
            let premium = if door == 1 || door == 20 { 500 } else { 0 };

            NewRoom {
                room_number: format!("{}{:02}", floor, door),
                room_type,
                price_per_night: Money::from_cents(base + premium),
            }
        })
        .collect()
}
