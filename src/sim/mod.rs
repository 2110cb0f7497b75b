mod forces;
mod node;
mod quadtree;

use eframe::egui::Vec2;
use tracing::{debug, warn};

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::reconcile::{Placement, Reconciliation, reconcile};
use forces::{ForceScratch, apply_forces};
pub use node::{Node, NodeSerial, NodeTable, Pin};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
    Idle,
    Running,
    Settled,
}

pub struct TickEvent<'a, T> {
    pub tick: u64,
    pub alpha: f32,
    pub nodes: &'a [Node<T>],
}

impl<T> TickEvent<'_, T> {
    pub fn positions(&self) -> impl Iterator<Item = (&str, Vec2)> + '_ {
        self.nodes.iter().map(|node| (node.key(), node.position))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type TickListener<T> = Box<dyn FnMut(&TickEvent<'_, T>)>;

pub struct Simulation<T> {
    config: SimulationConfig,
    nodes: NodeTable<T>,
    alpha: f32,
    alpha_target: f32,
    state: SimulationState,
    tick: u64,
    listeners: Vec<(SubscriptionId, TickListener<T>)>,
    next_subscription: u64,
    scratch: ForceScratch,
    previous_positions: Vec<Vec2>,
}

impl<T> Simulation<T> {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            nodes: NodeTable::new(),
            alpha: 1.0,
            alpha_target: 0.0,
            state: SimulationState::Idle,
            tick: 0,
            listeners: Vec::new(),
            next_subscription: 0,
            scratch: ForceScratch::default(),
            previous_positions: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn nodes(&self) -> &NodeTable<T> {
        &self.nodes
    }

    pub fn node(&self, key: &str) -> Option<&Node<T>> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: &str) -> Option<&mut Node<T>> {
        self.nodes.get_mut(key)
    }

    pub fn positions(&self) -> impl Iterator<Item = (&str, Vec2)> + '_ {
        self.nodes.iter().map(|node| (node.key(), node.position))
    }

    /// Topmost node whose circle contains `point`; the closest centre wins, then the
    /// earliest node in table order.
    pub fn node_at(&self, point: Vec2) -> Option<&Node<T>> {
        self.nodes
            .iter()
            .filter(|node| node.contains(point))
            .min_by(|a, b| {
                let a = (a.position - point).length_sq();
                let b = (b.position - point).length_sq();
                a.total_cmp(&b)
            })
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.nodes
            .iter()
            .map(|node| 0.5 * node.velocity.length_sq())
            .sum()
    }

    pub fn reconcile<I, K, P>(&mut self, items: I, key_fn: K, placement_fn: P) -> Result<Reconciliation<T>>
    where
        I: IntoIterator<Item = T>,
        K: Fn(&T) -> String,
        P: FnMut(&T) -> Placement,
    {
        let outcome = reconcile(&mut self.nodes, items, key_fn, placement_fn)?;
        self.restart(self.config.restart_alpha);
        Ok(outcome)
    }

    /// Raises alpha to at least `alpha` and resumes ticking. Positions are kept.
    pub fn restart(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.alpha = self.alpha.max(alpha);
        }
        if self.state != SimulationState::Running {
            debug!(alpha = self.alpha, nodes = self.nodes.len(), "simulation restarted");
        }
        self.state = SimulationState::Running;
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn stop(&mut self) {
        if self.state != SimulationState::Idle {
            debug!(tick = self.tick, "simulation stopped");
        }
        self.state = SimulationState::Idle;
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TickEvent<'_, T>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn clear_subscriptions(&mut self) {
        self.listeners.clear();
    }

    pub fn step(&mut self) -> bool {
        if self.state != SimulationState::Running {
            return false;
        }

        self.tick += 1;
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        self.previous_positions.clear();
        self.previous_positions
            .extend(self.nodes.iter().map(|node| node.position));

        let nodes = self.nodes.as_mut_slice();
        apply_forces(&self.config, nodes, self.alpha, &mut self.scratch);
        integrate(nodes, self.config.velocity_retention(), &self.previous_positions);

        let event = TickEvent {
            tick: self.tick,
            alpha: self.alpha,
            nodes: self.nodes.as_slice(),
        };
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }

        if self.alpha < self.config.alpha_min {
            self.state = SimulationState::Settled;
            debug!(tick = self.tick, alpha = self.alpha, "simulation settled");
        }
        self.is_running()
    }

    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let start = self.tick;
        for _ in 0..max_ticks {
            if !self.step() {
                break;
            }
        }
        (self.tick - start) as usize
    }
}

fn integrate<T>(nodes: &mut [Node<T>], retention: f32, previous: &[Vec2]) {
    for (index, node) in nodes.iter_mut().enumerate() {
        match node.fx {
            Some(fx) => {
                node.position.x = fx;
                node.velocity.x = 0.0;
            }
            None => {
                node.velocity.x *= retention;
                node.position.x += node.velocity.x;
            }
        }
        match node.fy {
            Some(fy) => {
                node.position.y = fy;
                node.velocity.y = 0.0;
            }
            None => {
                node.velocity.y *= retention;
                node.position.y += node.velocity.y;
            }
        }

        if !(node.position.is_finite() && node.velocity.is_finite()) {
            let fallback = previous
                .get(index)
                .copied()
                .filter(|position| position.is_finite())
                .or_else(|| node.focus())
                .filter(|position| position.is_finite())
                .unwrap_or(Vec2::ZERO);
            warn!(key = node.key(), "non-finite node state reset");
            node.position = fallback;
            node.velocity = Vec2::ZERO;
        }
    }
}
