use std::collections::HashSet;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::error::{Error, Result};
use crate::sim::{Node, NodeTable};
use crate::util::stable_pair;

const UNPLACED_JITTER: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    pub focus_x: Option<f32>,
    pub focus_y: Option<f32>,
    pub radius: f32,
    /// Keep the node pinned in place between drags.
    pub anchored: bool,
}

impl Placement {
    pub fn at(focus: Vec2, radius: f32) -> Self {
        Self {
            focus_x: Some(focus.x),
            focus_y: Some(focus.y),
            radius,
            anchored: false,
        }
    }

    pub fn anchored(mut self) -> Self {
        self.anchored = true;
        self
    }
}

#[derive(Debug)]
pub struct Reconciliation<T> {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<Node<T>>,
}

impl<T> Reconciliation<T> {
    pub fn removed_keys(&self) -> impl Iterator<Item = &str> {
        self.removed.iter().map(Node::key)
    }

    pub fn is_membership_unchanged(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }
}

/// Persisting keys keep their node and pins. On a duplicate key nothing is changed.
pub fn reconcile<T, I, K, P>(
    table: &mut NodeTable<T>,
    items: I,
    key_fn: K,
    mut placement_fn: P,
) -> Result<Reconciliation<T>>
where
    I: IntoIterator<Item = T>,
    K: Fn(&T) -> String,
    P: FnMut(&T) -> Placement,
{
    let items = items
        .into_iter()
        .map(|item| (key_fn(&item), item))
        .collect::<Vec<_>>();

    ensure_unique_keys(items.iter().map(|(key, _)| key.as_str()))?;

    let previous_order = table
        .iter()
        .map(|node| node.key().to_owned())
        .collect::<Vec<_>>();
    let mut prior = table.drain_by_key();

    let mut created = Vec::new();
    let mut updated = Vec::new();
    let mut next = Vec::with_capacity(items.len());
    for (key, domain) in items {
        let placement = sanitize(placement_fn(&domain));
        let node = match prior.remove(&key) {
            Some(mut node) => {
                node.domain = domain;
                updated.push(key);
                node
            }
            None => {
                let position = initial_position(&key, placement);
                created.push(key.clone());
                table.new_node(key, position, 0.0, domain)
            }
        };
        next.push(apply_placement(node, placement));
    }

    let removed = previous_order
        .iter()
        .filter_map(|key| prior.remove(key))
        .collect::<Vec<_>>();
    table.install(next);

    debug!(
        created = created.len(),
        updated = updated.len(),
        removed = removed.len(),
        "reconciled nodes"
    );
    Ok(Reconciliation {
        created,
        updated,
        removed,
    })
}

pub fn ensure_unique_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    match keys.into_iter().find(|key| !seen.insert(*key)) {
        Some(key) => Err(Error::DuplicateKey {
            key: key.to_owned(),
        }),
        None => Ok(()),
    }
}

fn initial_position(key: &str, placement: Placement) -> Vec2 {
    let (jx, jy) = stable_pair(key);
    vec2(
        placement.focus_x.unwrap_or(jx * UNPLACED_JITTER),
        placement.focus_y.unwrap_or(jy * UNPLACED_JITTER),
    )
}

fn sanitize(placement: Placement) -> Placement {
    Placement {
        focus_x: placement.focus_x.filter(|value| value.is_finite()),
        focus_y: placement.focus_y.filter(|value| value.is_finite()),
        radius: if placement.radius.is_finite() {
            placement.radius.max(0.0)
        } else {
            0.0
        },
        anchored: placement.anchored,
    }
}

fn apply_placement<T>(mut node: Node<T>, placement: Placement) -> Node<T> {
    node.focus_x = placement.focus_x;
    node.focus_y = placement.focus_y;
    node.radius = placement.radius;

    if placement.anchored && !node.pin().is_set() {
        let position = node.position;
        node.pin_to(position);
    } else if !placement.anchored && node.anchored {
        node.unpin();
    }
    node.anchored = placement.anchored;
    node
}
