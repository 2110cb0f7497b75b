//! Explicit configuration for the simulations, the layout and drag handling.
//!
//! Everything deserializes with defaults, so a config file only has to name the values it
//! overrides.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scale::Range;

/// Pulls the centroid of all nodes toward a fixed point.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CenterForce {
    pub x: f32,
    pub y: f32,
    pub strength: f32,
}

impl Default for CenterForce {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            strength: 1.0,
        }
    }
}

/// Pairwise overlap resolution using each node's radius plus `padding`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CollideForce {
    pub padding: f32,
    pub strength: f32,
    pub iterations: usize,
}

impl Default for CollideForce {
    fn default() -> Self {
        Self {
            padding: 0.0,
            strength: 1.0,
            iterations: 1,
        }
    }
}

/// Pulls every node toward its own focus point, axis by axis.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FocusForce {
    pub strength: f32,
}

impl Default for FocusForce {
    fn default() -> Self {
        Self { strength: 0.1 }
    }
}

/// Inverse-distance charge between all pairs; negative strength repels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ManyBodyForce {
    pub strength: f32,
    pub theta: f32,
    pub distance_min: f32,
    pub distance_max: Option<f32>,
}

impl Default for ManyBodyForce {
    fn default() -> Self {
        Self {
            strength: -30.0,
            theta: 0.9,
            distance_min: 1.0,
            distance_max: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticking stops once alpha falls below this.
    pub alpha_min: f32,
    /// Fraction of the distance to `alpha_target` closed every tick.
    pub alpha_decay: f32,
    /// Fraction of velocity lost every tick.
    pub velocity_decay: f32,
    /// Alpha used when the node set changes.
    pub restart_alpha: f32,
    pub center: Option<CenterForce>,
    pub collide: Option<CollideForce>,
    pub focus: Option<FocusForce>,
    pub many_body: Option<ManyBodyForce>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_min: 0.001,
            // 1 - alpha_min^(1/300): settles in roughly 300 ticks from alpha 1.
            alpha_decay: 0.022_763_06,
            velocity_decay: 0.4,
            restart_alpha: 0.9,
            center: None,
            collide: Some(CollideForce::default()),
            focus: Some(FocusForce::default()),
            many_body: None,
        }
    }
}

impl SimulationConfig {
    /// Transaction bubbles: tight collisions, pulled onto their day or week slot.
    pub fn expenses() -> Self {
        Self::default()
    }

    /// Category bubbles: slow cooling, low friction and a generous gap between circles.
    pub fn categories() -> Self {
        Self {
            alpha_decay: 0.001,
            velocity_decay: 0.3,
            collide: Some(CollideForce {
                padding: 10.0,
                ..CollideForce::default()
            }),
            ..Self::default()
        }
    }

    pub fn velocity_retention(&self) -> f32 {
        (1.0 - self.velocity_decay).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Margin {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            left: 60.0,
            top: 20.0,
            right: 60.0,
            bottom: 20.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
    pub margin: Margin,
    pub day_half_width: f32,
    pub day_half_height: f32,
    /// Vertical band holding the weeks outside the selected one, oldest at `start`.
    pub history_band: Range,
    /// Lay the selected week's day cells out on a shallow arc instead of a flat row.
    pub curve_selected_week: bool,
    pub transaction_radius: Range,
    pub category_radius: Range,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 900.0,
            margin: Margin::default(),
            day_half_width: 55.0,
            day_half_height: 75.0,
            history_band: Range::new(480.0, 340.0),
            curve_selected_week: true,
            transaction_radius: Range::new(6.0, 14.0),
            category_radius: Range::new(15.0, 50.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Alpha the simulation is held at while a node is being dragged.
    pub drag_alpha_target: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_alpha_target: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BoardConfig {
    pub expenses: SimulationConfig,
    pub categories: SimulationConfig,
    pub layout: LayoutConfig,
    pub interaction: InteractionConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            expenses: SimulationConfig::expenses(),
            categories: SimulationConfig::categories(),
            layout: LayoutConfig::default(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl BoardConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
