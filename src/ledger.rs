use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::interaction::DropEvent;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Transaction {
    pub fn in_category(&self, category: &str) -> bool {
        self.categories.iter().any(|name| name == category)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Category {
    pub name: String,
    /// Anchored categories stay where the user last dropped them.
    #[serde(default)]
    pub anchored: bool,
}

/// Directed transaction → category edge, rebuilt from scratch on every refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>, categories: Vec<Category>) -> Self {
        Self {
            transactions,
            categories,
        }
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|transaction| transaction.id == id)
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    /// Sum of member transaction amounts for every category, in category order.
    pub fn category_totals(&self) -> Vec<(&Category, f64)> {
        self.categories
            .iter()
            .map(|category| {
                let total = self
                    .transactions
                    .iter()
                    .filter(|transaction| transaction.in_category(&category.name))
                    .map(|transaction| transaction.amount)
                    .sum();
                (category, total)
            })
            .collect()
    }

    /// Links for every membership whose category exists.
    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::new();
        for transaction in &self.transactions {
            for name in &transaction.categories {
                if self.category(name).is_some() {
                    links.push(Link {
                        source: transaction.id.clone(),
                        target: name.clone(),
                    });
                }
            }
        }
        links
    }

    pub fn add_category(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyCategoryName);
        }
        if self.category(name).is_some() {
            return Err(Error::DuplicateCategory(name.to_owned()));
        }

        self.categories.push(Category {
            name: name.to_owned(),
            anchored: true,
        });
        Ok(())
    }

    /// Applies a completed drop to the domain state.
    ///
    /// `Reassign` toggles membership, so dropping onto a category the transaction already
    /// belongs to removes it again.
    pub fn apply(&mut self, event: &DropEvent) -> Result<()> {
        match event {
            DropEvent::Reassign { item, category } => {
                if self.category(category).is_none() {
                    return Err(Error::UnknownCategory(category.clone()));
                }
                let transaction = self.transaction_mut(item)?;
                if let Some(position) = transaction
                    .categories
                    .iter()
                    .position(|name| name == category)
                {
                    transaction.categories.remove(position);
                    debug!(item = %item, category = %category, "removed category membership");
                } else {
                    transaction.categories.push(category.clone());
                    debug!(item = %item, category = %category, "added category membership");
                }
            }
            DropEvent::Reschedule { item, date } => {
                let transaction = self.transaction_mut(item)?;
                transaction.date = *date;
                debug!(item = %item, date = %date, "rescheduled transaction");
            }
        }
        Ok(())
    }

    fn transaction_mut(&mut self, id: &str) -> Result<&mut Transaction> {
        self.transactions
            .iter_mut()
            .find(|transaction| transaction.id == id)
            .ok_or_else(|| Error::UnknownItem(id.to_owned()))
    }
}

/// Sunday-based start of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// The seven consecutive days starting at `start`, stopping early at the end of the calendar.
pub fn week_days(start: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take(7).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn ledger() -> Ledger {
        Ledger::new(
            vec![
                Transaction {
                    id: "coffee".into(),
                    name: "Coffee".into(),
                    amount: 4.0,
                    date: date(2024, 5, 14),
                    categories: vec!["Restaurants".into()],
                },
                Transaction {
                    id: "groceries".into(),
                    name: "Safeway".into(),
                    amount: 46.0,
                    date: date(2024, 5, 15),
                    categories: vec!["Restaurants".into(), "Missing".into()],
                },
            ],
            vec![Category {
                name: "Restaurants".into(),
                anchored: false,
            }],
        )
    }

    #[test]
    fn totals_sum_member_amounts() {
        let ledger = ledger();
        let totals = ledger.category_totals();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].0.name, "Restaurants");
        assert_eq!(totals[0].1, 50.0);
    }

    #[test]
    fn links_skip_unknown_categories() {
        let links = ledger().links();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|link| link.target == "Restaurants"));
    }

    #[test]
    fn reassign_toggles_membership() {
        let mut ledger = ledger();
        let event = DropEvent::Reassign {
            item: "coffee".into(),
            category: "Restaurants".into(),
        };

        ledger.apply(&event).unwrap();
        assert!(!ledger.transaction("coffee").unwrap().in_category("Restaurants"));

        ledger.apply(&event).unwrap();
        assert!(ledger.transaction("coffee").unwrap().in_category("Restaurants"));
    }

    #[test]
    fn reschedule_moves_the_date() {
        let mut ledger = ledger();
        ledger
            .apply(&DropEvent::Reschedule {
                item: "coffee".into(),
                date: date(2024, 5, 17),
            })
            .unwrap();
        assert_eq!(ledger.transaction("coffee").unwrap().date, date(2024, 5, 17));
    }

    #[test]
    fn apply_rejects_unknown_targets() {
        let mut ledger = ledger();
        let unknown_item = ledger.apply(&DropEvent::Reassign {
            item: "rent".into(),
            category: "Restaurants".into(),
        });
        assert!(matches!(unknown_item, Err(Error::UnknownItem(id)) if id == "rent"));

        let unknown_category = ledger.apply(&DropEvent::Reassign {
            item: "coffee".into(),
            category: "Travel".into(),
        });
        assert!(matches!(unknown_category, Err(Error::UnknownCategory(name)) if name == "Travel"));
    }

    #[test]
    fn add_category_rejects_blank_and_duplicate_names() {
        let mut ledger = ledger();
        assert!(matches!(ledger.add_category("  "), Err(Error::EmptyCategoryName)));
        assert!(matches!(
            ledger.add_category("Restaurants"),
            Err(Error::DuplicateCategory(_))
        ));

        ledger.add_category(" Travel ").unwrap();
        let travel = ledger.category("Travel").unwrap();
        assert!(travel.anchored);
    }

    #[test]
    fn weeks_start_on_sunday() {
        // 2024-05-15 is a Wednesday.
        assert_eq!(week_start(date(2024, 5, 15)), date(2024, 5, 12));
        assert_eq!(week_start(date(2024, 5, 12)), date(2024, 5, 12));

        let days = week_days(date(2024, 5, 12));
        assert_eq!(days.len(), 7);
        assert_eq!(days[6], date(2024, 5, 18));
    }
}
