use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

/// Handed out once per node creation. A key that survives reconciliation keeps its serial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeSerial(u64);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pin {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

impl Pin {
    pub const NONE: Self = Self { x: None, y: None };

    pub fn at(point: Vec2) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
        }
    }

    pub fn is_set(self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Node<T> {
    key: String,
    serial: NodeSerial,
    pub position: Vec2,
    pub velocity: Vec2,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
    pub focus_x: Option<f32>,
    pub focus_y: Option<f32>,
    pub radius: f32,
    pub anchored: bool,
    pub domain: T,
}

impl<T> Node<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn serial(&self) -> NodeSerial {
        self.serial
    }

    pub fn pin(&self) -> Pin {
        Pin {
            x: self.fx,
            y: self.fy,
        }
    }

    pub fn set_pin(&mut self, pin: Pin) {
        self.fx = pin.x;
        self.fy = pin.y;
    }

    pub fn pin_to(&mut self, point: Vec2) {
        self.set_pin(Pin::at(point));
    }

    pub fn unpin(&mut self) {
        self.set_pin(Pin::NONE);
    }

    pub fn focus(&self) -> Option<Vec2> {
        Some(vec2(self.focus_x?, self.focus_y?))
    }

    pub fn contains(&self, point: Vec2) -> bool {
        (self.position - point).length_sq() <= self.radius * self.radius
    }
}

#[derive(Debug)]
pub struct NodeTable<T> {
    nodes: Vec<Node<T>>,
    index_by_key: HashMap<String, usize>,
    next_serial: u64,
}

impl<T> Default for NodeTable<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index_by_key: HashMap::new(),
            next_serial: 0,
        }
    }
}

impl<T> NodeTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index_by_key.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Node<T>> {
        self.index_by_key.get(key).map(|&index| &self.nodes[index])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node<T>> {
        let index = *self.index_by_key.get(key)?;
        self.nodes.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node<T>> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[Node<T>] {
        &self.nodes
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Node<T>] {
        &mut self.nodes
    }

    pub(crate) fn new_node(&mut self, key: String, position: Vec2, radius: f32, domain: T) -> Node<T> {
        let serial = NodeSerial(self.next_serial);
        self.next_serial += 1;
        Node {
            key,
            serial,
            position,
            velocity: Vec2::ZERO,
            fx: None,
            fy: None,
            focus_x: None,
            focus_y: None,
            radius,
            anchored: false,
            domain,
        }
    }

    pub(crate) fn drain_by_key(&mut self) -> HashMap<String, Node<T>> {
        self.index_by_key.clear();
        self.nodes
            .drain(..)
            .map(|node| (node.key.clone(), node))
            .collect()
    }

    pub(crate) fn install(&mut self, nodes: Vec<Node<T>>) {
        self.index_by_key.clear();
        self.index_by_key.reserve(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            self.index_by_key.insert(node.key.clone(), index);
        }
        self.nodes = nodes;
    }
}

impl<'a, T> IntoIterator for &'a NodeTable<T> {
    type Item = &'a Node<T>;
    type IntoIter = std::slice::Iter<'a, Node<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials_are_unique_per_creation() {
        let mut table = NodeTable::new();
        let first = table.new_node("a".into(), Vec2::ZERO, 5.0, ());
        let second = table.new_node("a".into(), Vec2::ZERO, 5.0, ());
        assert_ne!(first.serial(), second.serial());
    }

    #[test]
    fn install_indexes_by_key() {
        let mut table = NodeTable::new();
        let nodes = vec![
            table.new_node("a".into(), vec2(1.0, 2.0), 5.0, 1),
            table.new_node("b".into(), vec2(3.0, 4.0), 5.0, 2),
        ];
        table.install(nodes);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("b").map(|node| node.domain), Some(2));
        assert!(table.get("c").is_none());

        let drained = table.drain_by_key();
        assert!(table.is_empty());
        assert!(!table.contains_key("a"));
        assert_eq!(drained["a"].position, vec2(1.0, 2.0));
    }

    #[test]
    fn focus_requires_both_axes() {
        let mut table = NodeTable::new();
        let mut node = table.new_node("a".into(), Vec2::ZERO, 5.0, ());
        assert_eq!(node.focus(), None);
        node.focus_x = Some(0.0);
        assert_eq!(node.focus(), None);
        node.focus_y = Some(0.0);
        assert_eq!(node.focus(), Some(Vec2::ZERO));
    }

    #[test]
    fn pin_round_trips() {
        let mut table = NodeTable::new();
        let mut node = table.new_node("a".into(), Vec2::ZERO, 5.0, ());
        node.pin_to(vec2(10.0, 0.0));
        assert_eq!(node.pin(), Pin::at(vec2(10.0, 0.0)));
        node.unpin();
        assert!(!node.pin().is_set());
    }
}
