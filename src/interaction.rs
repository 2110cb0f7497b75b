use chrono::NaiveDate;
use eframe::egui::Vec2;
use tracing::{debug, warn};

use crate::config::InteractionConfig;
use crate::sim::{NodeSerial, Pin, Simulation};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropEvent {
    /// Toggles membership.
    Reassign { item: String, category: String },
    Reschedule { item: String, date: NaiveDate },
}

impl DropEvent {
    pub fn item(&self) -> &str {
        match self {
            Self::Reassign { item, .. } | Self::Reschedule { item, .. } => item,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetId {
    Category(String),
    Day(NaiveDate),
}

impl TargetId {
    /// Categories win over day cells when both contain the pointer.
    fn precedence(&self) -> u8 {
        match self {
            Self::Category(_) => 0,
            Self::Day(_) => 1,
        }
    }

    fn drop_event(&self, item: String) -> DropEvent {
        match self {
            Self::Category(category) => DropEvent::Reassign {
                item,
                category: category.clone(),
            },
            Self::Day(date) => DropEvent::Reschedule { item, date: *date },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetShape {
    Circle { center: Vec2, radius: f32 },
    Rect { center: Vec2, half_extents: Vec2 },
}

impl TargetShape {
    pub fn contains(&self, point: Vec2) -> bool {
        match *self {
            Self::Circle { center, radius } => (point - center).length_sq() <= radius * radius,
            Self::Rect {
                center,
                half_extents,
            } => {
                let offset = (point - center).abs();
                offset.x <= half_extents.x && offset.y <= half_extents.y
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DropTarget {
    pub id: TargetId,
    pub shape: TargetShape,
}

impl DropTarget {
    pub fn category(name: impl Into<String>, center: Vec2, radius: f32) -> Self {
        Self {
            id: TargetId::Category(name.into()),
            shape: TargetShape::Circle { center, radius },
        }
    }

    pub fn day(date: NaiveDate, center: Vec2, half_extents: Vec2) -> Self {
        Self {
            id: TargetId::Day(date),
            shape: TargetShape::Rect {
                center,
                half_extents,
            },
        }
    }
}

/// Target under `point`: categories before days, then the order of `targets`.
pub fn hit_test(targets: &[DropTarget], point: Vec2) -> Option<&DropTarget> {
    targets
        .iter()
        .enumerate()
        .filter(|(_, target)| target.shape.contains(point))
        .min_by_key(|(index, target)| (target.id.precedence(), *index))
        .map(|(_, target)| target)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Vec2,
    pub phase: PointerPhase,
}

impl PointerEvent {
    pub fn down(position: Vec2) -> Self {
        Self {
            position,
            phase: PointerPhase::Down,
        }
    }

    pub fn moved(position: Vec2) -> Self {
        Self {
            position,
            phase: PointerPhase::Move,
        }
    }

    pub fn up(position: Vec2) -> Self {
        Self {
            position,
            phase: PointerPhase::Up,
        }
    }

    pub fn cancel() -> Self {
        Self {
            position: Vec2::ZERO,
            phase: PointerPhase::Cancel,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DragSession {
    key: String,
    serial: NodeSerial,
    prior_pin: Pin,
    hovered: Option<TargetId>,
    anchored: bool,
    origin: Vec2,
    moved: bool,
}

impl DragSession {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn hovered(&self) -> Option<&TargetId> {
        self.hovered.as_ref()
    }

    pub fn prior_pin(&self) -> Pin {
        self.prior_pin
    }

    pub fn anchored(&self) -> bool {
        self.anchored
    }
}

#[derive(Debug, Default)]
pub struct InteractionController {
    config: InteractionConfig,
    session: Option<DragSession>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// A drag still in progress is cancelled first.
    pub fn pointer_down<T>(&mut self, simulation: &mut Simulation<T>, point: Vec2) -> bool {
        if self.session.is_some() {
            self.cancel(simulation);
        }

        let Some(node) = simulation.node_at(point) else {
            return false;
        };
        let key = node.key().to_owned();
        let session = DragSession {
            serial: node.serial(),
            prior_pin: node.pin(),
            anchored: node.anchored,
            hovered: None,
            origin: point,
            moved: false,
            key,
        };

        let target = self.config.drag_alpha_target;
        simulation.set_alpha_target(target);
        simulation.restart(target);
        if let Some(node) = simulation.node_mut(&session.key) {
            node.pin_to(point);
        }

        debug!(key = session.key, "drag started");
        self.session = Some(session);
        true
    }

    pub fn pointer_move<T>(
        &mut self,
        simulation: &mut Simulation<T>,
        point: Vec2,
        targets: &[DropTarget],
    ) -> Option<&TargetId> {
        if !self.hold(simulation, point) {
            return None;
        }
        let session = self.session.as_mut()?;
        session.hovered = hit_test(targets, point).map(|target| target.id.clone());
        session.hovered.as_ref()
    }

    /// Releases the held node; a release over a target yields exactly one event. Anchored
    /// nodes are re-pinned at `point`. Otherwise a motionless release restores the earlier pin.
    pub fn pointer_up<T>(
        &mut self,
        simulation: &mut Simulation<T>,
        point: Vec2,
        targets: &[DropTarget],
    ) -> Option<DropEvent> {
        if !self.hold(simulation, point) {
            return None;
        }
        let session = self.session.take()?;
        let hovered = hit_test(targets, point).map(|target| target.id.clone());

        if let Some(node) = simulation.node_mut(&session.key) {
            if session.anchored {
                node.pin_to(point);
            } else if !session.moved && session.prior_pin.is_set() {
                node.set_pin(session.prior_pin);
            } else {
                node.unpin();
            }
        }
        simulation.set_alpha_target(0.0);

        let event = hovered.map(|target| target.drop_event(session.key.clone()));
        debug!(key = session.key, dropped = event.is_some(), "drag ended");
        event
    }

    /// Aborts the drag without an event and restores the node's earlier pin.
    pub fn cancel<T>(&mut self, simulation: &mut Simulation<T>) {
        let Some(session) = self.session.take() else {
            return;
        };
        match simulation.node_mut(&session.key) {
            Some(node) if node.serial() == session.serial => node.set_pin(session.prior_pin),
            _ => {}
        }
        simulation.set_alpha_target(0.0);
        debug!(key = session.key, "drag cancelled");
    }

    pub fn handle<T>(
        &mut self,
        simulation: &mut Simulation<T>,
        event: PointerEvent,
        targets: &[DropTarget],
    ) -> Option<DropEvent> {
        match event.phase {
            PointerPhase::Down => {
                self.pointer_down(simulation, event.position);
                None
            }
            PointerPhase::Move => {
                self.pointer_move(simulation, event.position, targets);
                None
            }
            PointerPhase::Up => self.pointer_up(simulation, event.position, targets),
            PointerPhase::Cancel => {
                self.cancel(simulation);
                None
            }
        }
    }

    /// Pins the held node to `point`. Drops the session when its node no longer exists.
    fn hold<T>(&mut self, simulation: &mut Simulation<T>, point: Vec2) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        match simulation.node_mut(&session.key) {
            Some(node) if node.serial() == session.serial => {
                node.pin_to(point);
                session.moved |= point != session.origin;
                true
            }
            _ => {
                warn!(key = session.key, "dragged node vanished; drag aborted");
                self.session = None;
                simulation.set_alpha_target(0.0);
                false
            }
        }
    }
}
