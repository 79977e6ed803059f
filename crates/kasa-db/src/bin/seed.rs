//! # Seed Data Loader
//!
//! Loads a sample rate table and opening balances for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p kasa-db --bin seed
//! cargo run -p kasa-db --bin seed -- --db ./data/kasa.db
//! cargo run -p kasa-db --bin seed -- --force   # overwrite existing snapshots
//! ```

use kasa_core::ledger::format_order_number;
use kasa_core::{CashFlowRow, CashPosition, RateCatalog, RateRow, BASE_CURRENCY};
use kasa_db::{Database, DbConfig, DbError};
use std::env;
use std::str::FromStr;

/// flag, code, rate amount, buy, sell, buy VIP, sell VIP, cash limit
const RATES: &[(&str, &str, &str, &str, &str, &str, &str, &str)] = &[
    ("🇪🇺", "EUR", "1", "25.40", "24.10", "25.20", "24.30", "50000"),
    ("🇺🇸", "USD", "1", "23.60", "22.40", "23.40", "22.60", "40000"),
    ("🇬🇧", "GBP", "1", "29.90", "28.30", "29.60", "28.60", "10000"),
    ("🇨🇭", "CHF", "1", "26.80", "25.30", "26.50", "25.60", "10000"),
    ("🇵🇱", "PLN", "1", "6.05", "5.55", "5.95", "5.65", "0"),
    ("🇭🇺", "HUF", "100", "6.90", "6.10", "6.80", "6.20", "0"),
    ("🇩🇰", "DKK", "1", "3.50", "3.20", "3.45", "3.25", "0"),
    ("🇸🇪", "SEK", "1", "2.30", "2.05", "2.25", "2.10", "0"),
    ("🇳🇴", "NOK", "1", "2.25", "2.00", "2.20", "2.05", "0"),
    ("🇯🇵", "JPY", "100", "16.20", "14.80", "16.00", "15.00", "0"),
];

/// Opening cash per currency, base currency first.
const BALANCES: &[(&str, &str)] = &[
    ("CZK", "250000"),
    ("EUR", "12000"),
    ("USD", "8000"),
    ("GBP", "2500"),
    ("CHF", "3000"),
    ("PLN", "6000"),
    ("HUF", "400000"),
    ("DKK", "4500"),
    ("SEK", "9000"),
    ("NOK", "7000"),
    ("JPY", "300000"),
];

type SeedResult<T> = Result<T, Box<dyn std::error::Error>>;

fn decimal(raw: &str) -> SeedResult<rust_decimal::Decimal> {
    Ok(rust_decimal::Decimal::from_str(raw)?)
}

fn sample_catalog() -> SeedResult<RateCatalog> {
    let rows = RATES
        .iter()
        .map(|&(flag, code, amount, buy, sell, buy_vip, sell_vip, limit)| -> SeedResult<RateRow> {
            Ok(RateRow {
                flag: Some(flag.to_string()),
                code: code.to_string(),
                rate_amount: decimal(amount)?,
                buy_rate: decimal(buy)?,
                sell_rate: decimal(sell)?,
                buy_rate_vip: decimal(buy_vip)?,
                sell_rate_vip: decimal(sell_vip)?,
                cash_limit: decimal(limit)?,
            })
        })
        .collect::<SeedResult<Vec<_>>>()?;

    Ok(RateCatalog::from_rows(BASE_CURRENCY, rows)?)
}

fn sample_position() -> SeedResult<CashPosition> {
    let rows = BALANCES
        .iter()
        .map(|&(currency, balance)| -> SeedResult<CashFlowRow> {
            Ok(CashFlowRow {
                currency: currency.to_string(),
                balance: decimal(balance)?,
            })
        })
        .collect::<SeedResult<Vec<_>>>()?;

    Ok(CashPosition::from_rows(rows))
}

#[tokio::main]
async fn main() -> SeedResult<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./kasa.db");
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("Kasa Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kasa.db)");
                println!("  -f, --force        Replace snapshots that already exist");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Kasa Seed Data Loader");
    println!("=====================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let already_seeded = match db.rates().load_catalog(BASE_CURRENCY).await {
        Ok(catalog) => !catalog.is_empty(),
        Err(DbError::Core(_)) => false,
        Err(e) => return Err(e.into()),
    };

    if already_seeded && !force {
        println!("⚠ A rate table is already stored.");
        println!("  Run with --force to replace it.");
        return Ok(());
    }

    let quotes = db.rates().replace_snapshot(&sample_catalog()?).await?;
    println!("✓ Rate table: {} currencies", quotes);

    let balances = db.cash_flow().replace_snapshot(&sample_position()?).await?;
    println!("✓ Cash flow: {} balances", balances);

    println!(
        "  Next order number: {}",
        format_order_number(db.orders().last_number().await? + 1)
    );

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
