//! Focus points, radii and drop cells derived from the ledger and the selected week.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Rect, Vec2, vec2};

use crate::config::LayoutConfig;
use crate::ledger::{Category, Ledger, Transaction, week_days, week_start};
use crate::reconcile::Placement;
use crate::scale::{BandScale, Extent, LinearScale, LogScale, Range};

const DAYS_PER_WEEK: usize = 7;

/// One day of the selected week, usable as a reschedule drop target.
#[derive(Clone, Debug, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub center: Vec2,
    pub half_extents: Vec2,
    pub total: f64,
    /// Colour position in `[0, 1]` by the day's total.
    pub fill: f32,
}

impl DayCell {
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.center.to_pos2(), self.half_extents * 2.0)
    }
}

pub struct Layout {
    config: LayoutConfig,
    selected_week: NaiveDate,
    day_x: LinearScale,
    history_x: BandScale,
    week_y: LinearScale,
    amount_radius: LogScale,
    amount_color: LogScale,
    category_radius: LinearScale,
    day_color: LogScale,
    totals_by_day: HashMap<NaiveDate, f64>,
}

impl Layout {
    /// Fits every scale to the current ledger. `selected_week` may be any day of the week.
    pub fn new(config: LayoutConfig, ledger: &Ledger, selected_week: NaiveDate) -> Self {
        let columns = Range::new(config.margin.left, config.width - config.margin.right);

        let weeks = Extent::of(
            ledger
                .transactions
                .iter()
                .map(|transaction| week_ordinal(transaction.date)),
        );
        let amounts = Extent::of(
            ledger
                .transactions
                .iter()
                .map(|transaction| transaction.amount),
        );
        let category_totals = Extent::of(ledger.category_totals().into_iter().map(|(_, total)| total));

        let mut totals_by_day = HashMap::new();
        for transaction in &ledger.transactions {
            *totals_by_day.entry(transaction.date).or_insert(0.0) += transaction.amount;
        }
        let day_totals = Extent::of(totals_by_day.values().copied());

        Self {
            config,
            selected_week: week_start(selected_week),
            day_x: LinearScale::new(columns).with_domain(Extent::of([0.0, (DAYS_PER_WEEK - 1) as f64])),
            history_x: BandScale::new(DAYS_PER_WEEK, columns),
            week_y: LinearScale::new(config.history_band).with_domain(weeks),
            amount_radius: LogScale::new(config.transaction_radius).with_domain(amounts),
            amount_color: LogScale::new(Range::UNIT).with_domain(amounts),
            category_radius: LinearScale::new(config.category_radius).with_domain(category_totals),
            day_color: LogScale::new(Range::UNIT).with_domain(day_totals),
            totals_by_day,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Sunday starting the selected week.
    pub fn selected_week(&self) -> NaiveDate {
        self.selected_week
    }

    pub fn in_selected_week(&self, date: NaiveDate) -> bool {
        week_start(date) == self.selected_week
    }

    /// Centre of the cell for `date` when it falls in the selected week, otherwise its slot
    /// in the history band.
    pub fn day_position(&self, date: NaiveDate) -> Vec2 {
        let weekday = date.weekday().num_days_from_sunday() as usize;
        if !self.in_selected_week(date) {
            return vec2(
                self.history_x.center(weekday),
                self.week_y.map(week_ordinal(date)),
            );
        }

        let x = self.day_x.map(weekday as f64);
        let base = self.config.height - 2.0 * self.config.day_half_height;
        let y = if self.config.curve_selected_week {
            let offset = (3.0 - weekday as f32).abs();
            base - 0.5 * offset * self.config.day_half_height
        } else {
            base
        };
        vec2(x, y)
    }

    pub fn transaction_placement(&self, transaction: &Transaction) -> Placement {
        Placement::at(
            self.day_position(transaction.date),
            self.amount_radius.map(transaction.amount),
        )
    }

    pub fn category_placement(&self, category: &Category, total: f64) -> Placement {
        let focus = vec2(self.config.width / 2.0, self.config.height / 4.0);
        let placement = Placement::at(focus, self.category_radius.map(total));
        if category.anchored {
            placement.anchored()
        } else {
            placement
        }
    }

    /// Colour position in `[0, 1]` for a transaction amount.
    pub fn color_position(&self, amount: f64) -> f32 {
        self.amount_color.map(amount)
    }

    pub fn day_cells(&self) -> Vec<DayCell> {
        let half_extents = vec2(self.config.day_half_width, self.config.day_half_height);
        week_days(self.selected_week)
            .into_iter()
            .map(|date| {
                let total = self.totals_by_day.get(&date).copied().unwrap_or(0.0);
                let fill = if total > 0.0 {
                    self.day_color.map(total)
                } else {
                    0.0
                };
                DayCell {
                    date,
                    center: self.day_position(date),
                    half_extents,
                    total,
                    fill,
                }
            })
            .collect()
    }
}

fn week_ordinal(date: NaiveDate) -> f64 {
    f64::from(week_start(date).num_days_from_ce())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn transaction(id: &str, amount: f64, date: NaiveDate) -> Transaction {
        Transaction {
            id: id.into(),
            name: id.into(),
            amount,
            date,
            categories: Vec::new(),
        }
    }

    fn ledger() -> Ledger {
        Ledger::new(
            vec![
                transaction("coffee", 4.0, date(2024, 5, 14)),
                transaction("groceries", 46.0, date(2024, 5, 15)),
                transaction("gas", 40.0, date(2024, 4, 30)),
                transaction("lunch", 12.0, date(2024, 5, 14)),
            ],
            vec![
                Category {
                    name: "Restaurants".into(),
                    anchored: false,
                },
                Category {
                    name: "Travel".into(),
                    anchored: true,
                },
            ],
        )
    }

    #[test]
    fn selected_week_is_normalized_to_sunday() {
        let layout = Layout::new(LayoutConfig::default(), &ledger(), date(2024, 5, 16));
        assert_eq!(layout.selected_week(), date(2024, 5, 12));
        assert!(layout.in_selected_week(date(2024, 5, 18)));
        assert!(!layout.in_selected_week(date(2024, 5, 19)));
    }

    #[test]
    fn selected_week_days_sit_on_a_curve() {
        let config = LayoutConfig::default();
        let layout = Layout::new(config, &ledger(), date(2024, 5, 12));
        let base = config.height - 2.0 * config.day_half_height;

        let wednesday = layout.day_position(date(2024, 5, 15));
        let sunday = layout.day_position(date(2024, 5, 12));
        let saturday = layout.day_position(date(2024, 5, 18));
        assert_eq!(wednesday.y, base);
        assert_eq!(sunday.y, base - 1.5 * config.day_half_height);
        assert_eq!(sunday.y, saturday.y);
        assert_eq!(sunday.x, config.margin.left);
        assert_eq!(saturday.x, config.width - config.margin.right);
    }

    #[test]
    fn flat_row_when_curve_disabled() {
        let config = LayoutConfig {
            curve_selected_week: false,
            ..LayoutConfig::default()
        };
        let layout = Layout::new(config, &ledger(), date(2024, 5, 12));
        let days = layout.day_cells();
        assert!(days.iter().all(|cell| cell.center.y == days[0].center.y));
    }

    #[test]
    fn history_weeks_fill_the_history_band() {
        let config = LayoutConfig::default();
        let layout = Layout::new(config, &ledger(), date(2024, 5, 12));

        let gas = layout.transaction_placement(&transaction("gas", 40.0, date(2024, 4, 30)));
        assert_eq!(gas.focus_y, Some(config.history_band.start));

        let selected = layout.transaction_placement(&transaction("coffee", 4.0, date(2024, 5, 14)));
        assert_eq!(selected.focus_x, Some(layout.day_position(date(2024, 5, 14)).x));
    }

    #[test]
    fn single_week_history_uses_band_midpoint() {
        let config = LayoutConfig::default();
        let ledger = Ledger::new(vec![transaction("gas", 40.0, date(2024, 4, 30))], Vec::new());
        let layout = Layout::new(config, &ledger, date(2024, 5, 12));
        let position = layout.day_position(date(2024, 4, 30));
        assert_eq!(position.y, config.history_band.midpoint());
    }

    #[test]
    fn radii_follow_amounts() {
        let config = LayoutConfig::default();
        let layout = Layout::new(config, &ledger(), date(2024, 5, 12));
        let small = layout.transaction_placement(&transaction("coffee", 4.0, date(2024, 5, 14)));
        let large = layout.transaction_placement(&transaction("groceries", 46.0, date(2024, 5, 15)));
        assert_eq!(small.radius, config.transaction_radius.start);
        assert_eq!(large.radius, config.transaction_radius.end);
        assert!(layout.color_position(12.0) > 0.0 && layout.color_position(12.0) < 1.0);
    }

    #[test]
    fn categories_share_a_focus_and_anchor_on_request() {
        let config = LayoutConfig::default();
        let ledger = ledger();
        let layout = Layout::new(config, &ledger, date(2024, 5, 12));
        let restaurants = layout.category_placement(&ledger.categories[0], 0.0);
        let travel = layout.category_placement(&ledger.categories[1], 0.0);

        assert_eq!(restaurants.focus_x, Some(config.width / 2.0));
        assert_eq!(restaurants.focus_y, Some(config.height / 4.0));
        assert!(!restaurants.anchored);
        assert!(travel.anchored);
        // Every category total is zero: the scale collapses to its midpoint.
        assert_eq!(restaurants.radius, config.category_radius.midpoint());
    }

    #[test]
    fn day_cells_cover_the_selected_week_with_totals() {
        let layout = Layout::new(LayoutConfig::default(), &ledger(), date(2024, 5, 12));
        let cells = layout.day_cells();
        assert_eq!(cells.len(), 7);
        assert_eq!(cells[0].date, date(2024, 5, 12));

        let tuesday = &cells[2];
        assert_eq!(tuesday.total, 16.0);
        assert_eq!(cells[3].total, 46.0);
        assert_eq!(cells[3].fill, 1.0);
        assert_eq!(cells[0].total, 0.0);
        assert_eq!(cells[0].fill, 0.0);
        assert!(tuesday.rect().contains(tuesday.center.to_pos2()));
    }
}
