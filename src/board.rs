//! One expense board: a ledger, its two simulations and the drag state between them.

use chrono::{Local, NaiveDate};
use eframe::egui::Vec2;
use tracing::{debug, info};

use crate::config::BoardConfig;
use crate::error::Result;
use crate::interaction::{DropEvent, DropTarget, InteractionController, PointerEvent, PointerPhase, TargetId};
use crate::layout::{DayCell, Layout};
use crate::reconcile::ensure_unique_keys;
use crate::ledger::{Category, Ledger, Link, Transaction, week_start};
use crate::sim::{Simulation, SubscriptionId, TickEvent};

/// Domain value carried by a category node.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryNode {
    pub category: Category,
    pub total: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Transactions,
    Categories,
}

/// A link with both endpoints resolved to live node positions.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkSegment {
    pub link: Link,
    pub source: Vec2,
    pub target: Vec2,
}

pub struct Board {
    config: BoardConfig,
    ledger: Ledger,
    layout: Layout,
    transactions: Simulation<Transaction>,
    categories: Simulation<CategoryNode>,
    controller: InteractionController,
    drag_layer: Option<Layer>,
    links: Vec<Link>,
    torn_down: bool,
}

impl Board {
    /// Builds the board and selects the week of the most recent transaction.
    pub fn new(ledger: Ledger, config: BoardConfig) -> Result<Self> {
        let selected_week = ledger
            .transactions
            .iter()
            .map(|transaction| transaction.date)
            .max()
            .unwrap_or_else(|| Local::now().date_naive());

        let mut board = Self {
            layout: Layout::new(config.layout, &ledger, selected_week),
            transactions: Simulation::new(config.expenses),
            categories: Simulation::new(config.categories),
            controller: InteractionController::new(config.interaction),
            drag_layer: None,
            links: Vec::new(),
            torn_down: false,
            config,
            ledger,
        };
        board.refresh()?;
        info!(
            transactions = board.ledger.transactions.len(),
            categories = board.ledger.categories.len(),
            week = %board.selected_week(),
            "board ready"
        );
        Ok(board)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn transactions(&self) -> &Simulation<Transaction> {
        &self.transactions
    }

    pub fn categories(&self) -> &Simulation<CategoryNode> {
        &self.categories
    }

    pub fn selected_week(&self) -> NaiveDate {
        self.layout.selected_week()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Layer and key of the node being dragged.
    pub fn dragging(&self) -> Option<(Layer, &str)> {
        let session = self.controller.session()?;
        Some((self.drag_layer?, session.key()))
    }

    pub fn hovered_target(&self) -> Option<&TargetId> {
        self.controller.session()?.hovered()
    }

    /// Keys for both layers are checked before either table changes.
    pub fn refresh(&mut self) -> Result<()> {
        ensure_unique_keys(
            self.ledger
                .transactions
                .iter()
                .map(|transaction| transaction.id.as_str()),
        )?;
        ensure_unique_keys(
            self.ledger
                .categories
                .iter()
                .map(|category| category.name.as_str()),
        )?;

        let layout = Layout::new(self.config.layout, &self.ledger, self.layout.selected_week());

        let totals = self
            .ledger
            .category_totals()
            .into_iter()
            .map(|(category, total)| CategoryNode {
                category: category.clone(),
                total,
            })
            .collect::<Vec<_>>();

        let transactions = self.transactions.reconcile(
            self.ledger.transactions.iter().cloned(),
            |transaction| transaction.id.clone(),
            |transaction| layout.transaction_placement(transaction),
        )?;
        let categories = self.categories.reconcile(
            totals,
            |node| node.category.name.clone(),
            |node| layout.category_placement(&node.category, node.total),
        )?;

        self.layout = layout;
        self.links = self.ledger.links();
        self.drop_vanished_drag();

        debug!(
            created = transactions.created.len() + categories.created.len(),
            removed = transactions.removed.len() + categories.removed.len(),
            links = self.links.len(),
            "board refreshed"
        );
        Ok(())
    }

    pub fn set_selected_week(&mut self, date: NaiveDate) -> Result<()> {
        let week = week_start(date);
        if week == self.selected_week() {
            return Ok(());
        }
        let previous = std::mem::replace(
            &mut self.layout,
            Layout::new(self.config.layout, &self.ledger, week),
        );
        if let Err(error) = self.refresh() {
            self.layout = previous;
            return Err(error);
        }
        debug!(week = %week, "selected week changed");
        Ok(())
    }

    /// The new ledger is kept only if it refreshes cleanly.
    pub fn set_ledger(&mut self, ledger: Ledger) -> Result<()> {
        let previous = std::mem::replace(&mut self.ledger, ledger);
        if let Err(error) = self.refresh() {
            self.ledger = previous;
            return Err(error);
        }
        Ok(())
    }

    pub fn add_category(&mut self, name: &str) -> Result<()> {
        let mut ledger = self.ledger.clone();
        ledger.add_category(name)?;
        self.set_ledger(ledger)
    }

    /// Advances both simulations by one tick. Returns whether either is still moving.
    pub fn tick(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let transactions = self.transactions.step();
        let categories = self.categories.step();
        transactions || categories
    }

    pub fn subscribe_transactions(
        &mut self,
        listener: impl FnMut(&TickEvent<'_, Transaction>) + 'static,
    ) -> SubscriptionId {
        self.transactions.subscribe(listener)
    }

    pub fn unsubscribe_transactions(&mut self, id: SubscriptionId) -> bool {
        self.transactions.unsubscribe(id)
    }

    /// Feeds one pointer event through the drag controller. A completed drop is applied to
    /// the ledger, the board is refreshed and the event is returned.
    pub fn pointer(&mut self, event: PointerEvent) -> Result<Option<DropEvent>> {
        if self.torn_down {
            return Ok(None);
        }

        match event.phase {
            PointerPhase::Down => {
                self.cancel_drag();
                // Transactions are drawn above categories.
                if self.controller.pointer_down(&mut self.transactions, event.position) {
                    self.drag_layer = Some(Layer::Transactions);
                } else if self.controller.pointer_down(&mut self.categories, event.position) {
                    self.drag_layer = Some(Layer::Categories);
                }
                Ok(None)
            }
            PointerPhase::Move => {
                let targets = self.targets_for_drag();
                match self.drag_layer {
                    Some(Layer::Transactions) => {
                        self.controller
                            .pointer_move(&mut self.transactions, event.position, &targets);
                    }
                    Some(Layer::Categories) => {
                        self.controller
                            .pointer_move(&mut self.categories, event.position, &targets);
                    }
                    None => {}
                }
                self.drop_vanished_drag();
                Ok(None)
            }
            PointerPhase::Up => {
                let targets = self.targets_for_drag();
                let dropped = match self.drag_layer.take() {
                    Some(Layer::Transactions) => {
                        self.controller
                            .pointer_up(&mut self.transactions, event.position, &targets)
                    }
                    Some(Layer::Categories) => {
                        self.controller
                            .pointer_up(&mut self.categories, event.position, &targets)
                    }
                    None => None,
                };
                let Some(dropped) = dropped else {
                    return Ok(None);
                };
                self.ledger.apply(&dropped)?;
                debug!(item = dropped.item(), "drop written to ledger");
                self.refresh()?;
                Ok(Some(dropped))
            }
            PointerPhase::Cancel => {
                self.cancel_drag();
                Ok(None)
            }
        }
    }

    /// Every drop target: category circles at their live positions, then the selected
    /// week's day cells.
    pub fn drop_targets(&self) -> Vec<DropTarget> {
        let categories = self
            .categories
            .nodes()
            .iter()
            .map(|node| DropTarget::category(node.key(), node.position, node.radius));
        let days = self
            .layout
            .day_cells()
            .into_iter()
            .map(|cell| DropTarget::day(cell.date, cell.center, cell.half_extents));
        categories.chain(days).collect()
    }

    pub fn link_segments(&self) -> Vec<LinkSegment> {
        self.links
            .iter()
            .filter_map(|link| {
                let source = self.transactions.node(&link.source)?;
                let target = self.categories.node(&link.target)?;
                Some(LinkSegment {
                    link: link.clone(),
                    source: source.position,
                    target: target.position,
                })
            })
            .collect()
    }

    pub fn day_cells(&self) -> Vec<DayCell> {
        self.layout.day_cells()
    }

    /// Stops ticking, aborts any drag without an event and detaches subscribers. Later
    /// ticks and pointer events are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.cancel_drag();
        self.transactions.stop();
        self.categories.stop();
        self.transactions.clear_subscriptions();
        self.categories.clear_subscriptions();
        self.torn_down = true;
        info!("board torn down");
    }

    /// Only transactions have somewhere to be dropped; categories just move.
    fn targets_for_drag(&self) -> Vec<DropTarget> {
        match self.drag_layer {
            Some(Layer::Transactions) => self.drop_targets(),
            _ => Vec::new(),
        }
    }

    fn cancel_drag(&mut self) {
        match self.drag_layer.take() {
            Some(Layer::Transactions) => self.controller.cancel(&mut self.transactions),
            Some(Layer::Categories) => self.controller.cancel(&mut self.categories),
            None => {}
        }
    }

    fn drop_vanished_drag(&mut self) {
        let Some(layer) = self.drag_layer else {
            return;
        };
        let present = self.controller.session().is_some_and(|session| match layer {
            Layer::Transactions => self.transactions.nodes().contains_key(session.key()),
            Layer::Categories => self.categories.nodes().contains_key(session.key()),
        });
        if !present {
            self.cancel_drag();
        }
    }
}

impl Drop for Board {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::error::Error;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn transaction(id: &str, amount: f64, date: NaiveDate, categories: &[&str]) -> Transaction {
        Transaction {
            id: id.into(),
            name: id.into(),
            amount,
            date,
            categories: categories.iter().map(|name| (*name).to_owned()).collect(),
        }
    }

    fn ledger() -> Ledger {
        Ledger::new(
            vec![
                transaction("coffee", 4.0, date(5, 14), &[]),
                transaction("groceries", 46.0, date(5, 15), &["Food"]),
                transaction("gas", 40.0, date(4, 30), &[]),
            ],
            vec![
                Category {
                    name: "Restaurants".into(),
                    anchored: false,
                },
                Category {
                    name: "Food".into(),
                    anchored: false,
                },
            ],
        )
    }

    fn settle(board: &mut Board) {
        for _ in 0..20_000 {
            if !board.tick() {
                break;
            }
        }
    }

    fn position(board: &Board, layer: Layer, key: &str) -> Vec2 {
        match layer {
            Layer::Transactions => board.transactions().node(key).unwrap().position,
            Layer::Categories => board.categories().node(key).unwrap().position,
        }
    }

    #[test]
    fn new_board_selects_latest_week() {
        let board = Board::new(ledger(), BoardConfig::default()).unwrap();
        assert_eq!(board.selected_week(), date(5, 12));
        assert_eq!(board.transactions().nodes().len(), 3);
        assert_eq!(board.categories().nodes().len(), 2);
        assert_eq!(board.day_cells().len(), 7);
        assert!(board.transactions().is_running());
    }

    #[test]
    fn duplicate_transaction_ids_are_rejected() {
        let mut ledger = ledger();
        ledger.transactions.push(transaction("coffee", 3.0, date(5, 13), &[]));
        let error = Board::new(ledger, BoardConfig::default()).err().unwrap();
        assert!(matches!(error, Error::DuplicateKey { .. }));
    }

    #[test]
    fn drop_targets_list_categories_before_days() {
        let board = Board::new(ledger(), BoardConfig::default()).unwrap();
        let targets = board.drop_targets();
        assert_eq!(targets.len(), 2 + 7);
        assert_eq!(targets[0].id, TargetId::Category("Restaurants".into()));
        assert_eq!(targets[2].id, TargetId::Day(date(5, 12)));
    }

    #[test]
    fn link_segments_follow_memberships() {
        let board = Board::new(ledger(), BoardConfig::default()).unwrap();
        let segments = board.link_segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].link.source, "groceries");
        assert_eq!(segments[0].target, position(&board, Layer::Categories, "Food"));
    }

    #[test]
    fn dropping_on_a_category_reassigns_and_relinks() {
        let mut board = Board::new(ledger(), BoardConfig::default()).unwrap();
        settle(&mut board);

        let coffee = position(&board, Layer::Transactions, "coffee");
        let restaurants = position(&board, Layer::Categories, "Restaurants");

        board.pointer(PointerEvent::down(coffee)).unwrap();
        assert_eq!(board.dragging(), Some((Layer::Transactions, "coffee")));
        board.pointer(PointerEvent::moved(restaurants)).unwrap();
        assert_eq!(
            board.hovered_target(),
            Some(&TargetId::Category("Restaurants".into()))
        );

        let event = board.pointer(PointerEvent::up(restaurants)).unwrap();
        assert_eq!(
            event,
            Some(DropEvent::Reassign {
                item: "coffee".into(),
                category: "Restaurants".into(),
            })
        );
        assert!(board.ledger().transaction("coffee").unwrap().in_category("Restaurants"));
        assert_eq!(board.link_segments().len(), 2);
        assert!(board.dragging().is_none());
    }

    #[test]
    fn dropping_on_a_day_reschedules() {
        let mut board = Board::new(ledger(), BoardConfig::default()).unwrap();
        settle(&mut board);

        let coffee = position(&board, Layer::Transactions, "coffee");
        let saturday = board.day_cells()[6].clone();
        let corner = saturday.center + saturday.half_extents * 0.9;

        board.pointer(PointerEvent::down(coffee)).unwrap();
        let event = board.pointer(PointerEvent::up(corner)).unwrap();
        assert_eq!(
            event,
            Some(DropEvent::Reschedule {
                item: "coffee".into(),
                date: date(5, 18),
            })
        );
        assert_eq!(board.ledger().transaction("coffee").unwrap().date, date(5, 18));
        let focus = board.transactions().node("coffee").unwrap().focus().unwrap();
        assert_eq!(focus, saturday.center);
    }

    #[test]
    fn dragging_a_category_never_raises_events() {
        let mut board = Board::new(ledger(), BoardConfig::default()).unwrap();
        settle(&mut board);

        let food = position(&board, Layer::Categories, "Food");
        let restaurants = position(&board, Layer::Categories, "Restaurants");
        board.pointer(PointerEvent::down(food)).unwrap();
        assert_eq!(board.dragging().map(|(layer, _)| layer), Some(Layer::Categories));
        let event = board.pointer(PointerEvent::up(restaurants)).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn drag_is_dropped_when_its_transaction_disappears() {
        let mut board = Board::new(ledger(), BoardConfig::default()).unwrap();
        settle(&mut board);

        let coffee = position(&board, Layer::Transactions, "coffee");
        board.pointer(PointerEvent::down(coffee)).unwrap();

        let mut ledger = board.ledger().clone();
        ledger.transactions.retain(|transaction| transaction.id != "coffee");
        board.set_ledger(ledger).unwrap();

        assert!(board.dragging().is_none());
        let event = board.pointer(PointerEvent::up(vec2(0.0, 0.0))).unwrap();
        assert!(event.is_none());
        assert!(!board.transactions().nodes().contains_key("coffee"));
    }

    #[test]
    fn changing_week_refocuses_transactions() {
        let mut board = Board::new(ledger(), BoardConfig::default()).unwrap();
        let before = board.transactions().node("gas").unwrap().focus().unwrap();

        board.set_selected_week(date(4, 30)).unwrap();
        assert_eq!(board.selected_week(), date(4, 28));
        let after = board.transactions().node("gas").unwrap().focus().unwrap();
        assert_ne!(before, after);
        assert_eq!(after, board.layout().day_position(date(4, 30)));
    }

    #[test]
    fn added_categories_are_anchored() {
        let mut board = Board::new(ledger(), BoardConfig::default()).unwrap();
        board.add_category(" Travel ").unwrap();
        let node = board.categories().node("Travel").unwrap();
        assert!(node.anchored);
        assert!(node.pin().is_set());
        assert!(matches!(
            board.add_category("Travel"),
            Err(Error::DuplicateCategory(_))
        ));
    }

    #[test]
    fn duplicate_categories_leave_the_board_untouched() {
        let food = || Category {
            name: "Food".into(),
            anchored: false,
        };
        let coffee = transaction("coffee", 4.0, date(5, 14), &["Food"]);
        let original = Ledger::new(vec![coffee.clone()], vec![food()]);
        let mut board = Board::new(original.clone(), BoardConfig::default()).unwrap();
        let links = board.link_segments().len();

        let broken = Ledger::new(
            vec![coffee, transaction("tea", 3.0, date(5, 15), &["Food"])],
            vec![food(), food()],
        );
        let error = board.set_ledger(broken).err().unwrap();
        assert!(matches!(error, Error::DuplicateKey { ref key } if key == "Food"));

        assert_eq!(board.ledger(), &original);
        let keys = board
            .transactions()
            .positions()
            .map(|(key, _)| key.to_owned())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["coffee".to_owned()]);
        assert_eq!(board.link_segments().len(), links);

        board.add_category("Other").unwrap();
        assert!(board.categories().node("Other").is_some());
    }

    #[test]
    fn failed_category_add_keeps_the_ledger() {
        let mut board = Board::new(ledger(), BoardConfig::default()).unwrap();
        let before = board.ledger().clone();
        assert!(board.add_category("Food").is_err());
        assert_eq!(board.ledger(), &before);
        assert_eq!(board.categories().nodes().len(), 2);
    }

    #[test]
    fn teardown_mid_drag_fires_nothing() {
        let mut board = Board::new(ledger(), BoardConfig::default()).unwrap();
        settle(&mut board);

        let coffee = position(&board, Layer::Transactions, "coffee");
        let restaurants = position(&board, Layer::Categories, "Restaurants");
        board.pointer(PointerEvent::down(coffee)).unwrap();
        board.pointer(PointerEvent::moved(restaurants)).unwrap();
        board.teardown();

        assert!(board.is_torn_down());
        assert!(board.dragging().is_none());
        assert!(!board.tick());
        assert!(board.pointer(PointerEvent::up(restaurants)).unwrap().is_none());
        assert!(!board.ledger().transaction("coffee").unwrap().in_category("Restaurants"));
    }
}
