use eframe::egui::Vec2;

use crate::config::{CenterForce, CollideForce, FocusForce, ManyBodyForce, SimulationConfig};
use crate::util::separation_direction;

use super::Node;
use super::quadtree::Quad;

const COINCIDENT_DISTANCE_SQ: f32 = 1e-12;

#[derive(Default)]
pub(super) struct ForceScratch {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    deltas: Vec<Vec2>,
}

impl ForceScratch {
    fn load_positions<T>(&mut self, nodes: &[Node<T>], predicted: bool) {
        self.positions.clear();
        self.positions.extend(nodes.iter().map(|node| {
            if predicted {
                node.position + node.velocity
            } else {
                node.position
            }
        }));
    }

    fn reset_deltas(&mut self, len: usize) {
        self.deltas.clear();
        self.deltas.resize(len, Vec2::ZERO);
    }

    fn flush_deltas<T>(&self, nodes: &mut [Node<T>]) {
        for (node, delta) in nodes.iter_mut().zip(&self.deltas) {
            node.velocity += *delta;
        }
    }
}

pub(super) fn apply_forces<T>(
    config: &SimulationConfig,
    nodes: &mut [Node<T>],
    alpha: f32,
    scratch: &mut ForceScratch,
) {
    if nodes.is_empty() {
        return;
    }

    if let Some(many_body) = config.many_body {
        apply_many_body(many_body, nodes, alpha, scratch);
    }
    if let Some(focus) = config.focus {
        apply_focus(focus, nodes, alpha);
    }
    if let Some(collide) = config.collide {
        apply_collide(collide, nodes, scratch);
    }
    if let Some(center) = config.center {
        apply_center(center, nodes);
    }
}

fn apply_focus<T>(force: FocusForce, nodes: &mut [Node<T>], alpha: f32) {
    let pull = force.strength * alpha;
    for node in nodes {
        if let Some(focus_x) = node.focus_x {
            node.velocity.x += (focus_x - node.position.x) * pull;
        }
        if let Some(focus_y) = node.focus_y {
            node.velocity.y += (focus_y - node.position.y) * pull;
        }
    }
}

fn apply_center<T>(force: CenterForce, nodes: &mut [Node<T>]) {
    let mut centroid = Vec2::ZERO;
    for node in nodes.iter() {
        centroid += node.position;
    }
    centroid /= nodes.len() as f32;

    let shift = (centroid - Vec2::new(force.x, force.y)) * force.strength;
    if !shift.is_finite() {
        return;
    }
    for node in nodes {
        node.velocity -= shift;
    }
}

#[derive(Clone, Copy)]
struct Charge {
    strength: f32,
    theta_sq: f32,
    distance_min_sq: f32,
    distance_max_sq: f32,
}

fn apply_many_body<T>(
    force: ManyBodyForce,
    nodes: &mut [Node<T>],
    alpha: f32,
    scratch: &mut ForceScratch,
) {
    if nodes.len() < 2 {
        return;
    }

    scratch.load_positions(nodes, false);
    scratch.radii.clear();
    scratch.radii.resize(nodes.len(), 0.0);
    scratch.reset_deltas(nodes.len());
    let Some(quad) = Quad::build(&scratch.positions, &scratch.radii) else {
        return;
    };

    let charge = Charge {
        strength: force.strength * alpha,
        theta_sq: force.theta * force.theta,
        distance_min_sq: force.distance_min * force.distance_min,
        distance_max_sq: force
            .distance_max
            .map_or(f32::INFINITY, |distance| distance * distance),
    };
    for index in 0..nodes.len() {
        let mut delta = Vec2::ZERO;
        accumulate_charge(&quad, index, &scratch.positions, charge, &mut delta);
        scratch.deltas[index] = delta;
    }
    scratch.flush_deltas(nodes);
}

fn charge_between(offset: Vec2, weight: f32, seed: (usize, usize), charge: Charge) -> Vec2 {
    let mut offset = offset;
    let mut distance_sq = offset.length_sq();
    if distance_sq >= charge.distance_max_sq {
        return Vec2::ZERO;
    }
    if distance_sq < COINCIDENT_DISTANCE_SQ {
        offset = separation_direction(seed.0, seed.1) * 1e-3;
        distance_sq = offset.length_sq();
    }
    if distance_sq < charge.distance_min_sq {
        distance_sq = (charge.distance_min_sq * distance_sq).sqrt();
    }
    offset * (charge.strength * weight / distance_sq)
}

fn accumulate_charge(quad: &Quad, index: usize, positions: &[Vec2], charge: Charge, delta: &mut Vec2) {
    if quad.count <= 0.0 {
        return;
    }

    let point = positions[index];
    if quad.is_leaf() {
        for &other in &quad.indices {
            if other != index {
                *delta += charge_between(positions[other] - point, 1.0, (index, other), charge);
            }
        }
        return;
    }

    let offset = quad.centroid - point;
    let side = quad.bounds.side();
    if !quad.bounds.contains(point) && side * side < charge.theta_sq * offset.length_sq() {
        *delta += charge_between(offset, quad.count, (index, usize::MAX), charge);
        return;
    }

    for child in quad.children() {
        accumulate_charge(child, index, positions, charge, delta);
    }
}

#[derive(Clone, Copy)]
struct Collision {
    padding: f32,
    strength: f32,
}

fn apply_collide<T>(force: CollideForce, nodes: &mut [Node<T>], scratch: &mut ForceScratch) {
    if nodes.len() < 2 {
        return;
    }

    let params = Collision {
        padding: force.padding,
        strength: force.strength,
    };
    for _ in 0..force.iterations.max(1) {
        scratch.load_positions(nodes, true);
        scratch.radii.clear();
        scratch
            .radii
            .extend(nodes.iter().map(|node| node.radius.max(0.0) + params.padding));
        scratch.reset_deltas(nodes.len());

        let Some(quad) = Quad::build(&scratch.positions, &scratch.radii) else {
            return;
        };
        accumulate_collision_pairs(
            &quad,
            &quad,
            true,
            &scratch.positions,
            &scratch.radii,
            params,
            &mut scratch.deltas,
        );
        scratch.flush_deltas(nodes);
    }
}

fn resolve_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: Collision,
    deltas: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let offset = positions[from] - positions[to];
    let distance_sq = offset.length_sq();
    if distance_sq >= reach * reach {
        return;
    }

    let push = if distance_sq < COINCIDENT_DISTANCE_SQ {
        separation_direction(from, to) * (reach * params.strength)
    } else {
        let distance = distance_sq.sqrt();
        offset * ((reach - distance) / distance * params.strength)
    };

    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let total = from_sq + to_sq;
    let share = if total > 0.0 { to_sq / total } else { 0.5 };
    deltas[from] += push * share;
    deltas[to] -= push * (1.0 - share);
}

fn accumulate_collision_pairs(
    quad_a: &Quad,
    quad_b: &Quad,
    same: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: Collision,
    deltas: &mut [Vec2],
) {
    let reach = quad_a.max_radius + quad_b.max_radius;
    if quad_a.bounds.gap_sq(quad_b.bounds) > reach * reach {
        return;
    }

    if quad_a.is_leaf() && quad_b.is_leaf() {
        if same {
            for (offset, &from) in quad_a.indices.iter().enumerate() {
                for &to in &quad_a.indices[offset + 1..] {
                    resolve_pair(from, to, positions, radii, params, deltas);
                }
            }
        } else {
            for &from in &quad_a.indices {
                for &to in &quad_b.indices {
                    resolve_pair(from, to, positions, radii, params, deltas);
                }
            }
        }
        return;
    }

    if same {
        let children = quad_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, deltas);
            for child_b in &children[offset + 1..] {
                accumulate_collision_pairs(child_a, child_b, false, positions, radii, params, deltas);
            }
        }
        return;
    }

    let split_a = !quad_a.is_leaf() && (quad_b.is_leaf() || quad_a.bounds.half_extent >= quad_b.bounds.half_extent);
    if split_a {
        for child in quad_a.children() {
            accumulate_collision_pairs(child, quad_b, false, positions, radii, params, deltas);
        }
    } else {
        for child in quad_b.children() {
            accumulate_collision_pairs(quad_a, child, false, positions, radii, params, deltas);
        }
    }
}
