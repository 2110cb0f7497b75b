use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use spendfield::{BoardConfig, Category, Ledger, Transaction};

pub fn load_ledger(path: &Path) -> Result<Ledger> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read ledger from {}", path.display()))?;
    let ledger: Ledger = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse ledger JSON in {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        transactions = ledger.transactions.len(),
        "loaded ledger"
    );
    Ok(ledger)
}

pub fn load_config(path: &Path) -> Result<BoardConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    BoardConfig::from_json(&raw)
        .with_context(|| format!("failed to parse config JSON in {}", path.display()))
}

/// Two weeks of everyday spending.
pub fn sample_ledger() -> Ledger {
    let entries: [(&str, &str, f64, (u32, u32), &[&str]); 10] = [
        ("coffee", "Coffee", 4.0, (5, 14), &[]),
        ("groceries", "Safeway", 46.0, (5, 15), &["Groceries"]),
        ("gas", "Valero", 40.0, (5, 13), &["Transport"]),
        ("lunch", "Burrito", 11.5, (5, 16), &["Restaurants"]),
        ("books", "Bookshop", 23.0, (5, 18), &[]),
        ("dinner", "Thai place", 38.0, (5, 9), &["Restaurants"]),
        ("market", "Farmers market", 18.0, (5, 11), &["Groceries"]),
        ("parking", "Parking", 6.0, (5, 7), &["Transport"]),
        ("tea", "Tea", 3.5, (5, 6), &[]),
        ("movie", "Cinema", 15.0, (5, 5), &[]),
    ];

    let transactions = entries
        .into_iter()
        .filter_map(|(id, name, amount, (month, day), categories)| {
            Some(Transaction {
                id: id.to_owned(),
                name: name.to_owned(),
                amount,
                date: NaiveDate::from_ymd_opt(2024, month, day)?,
                categories: categories.iter().map(|name| (*name).to_owned()).collect(),
            })
        })
        .collect();

    let categories = ["Restaurants", "Groceries", "Transport"]
        .into_iter()
        .map(|name| Category {
            name: name.to_owned(),
            anchored: false,
        })
        .collect();

    Ledger::new(transactions, categories)
}
