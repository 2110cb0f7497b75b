use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2};

const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
const DAY_EMPTY: Color32 = Color32::from_rgb(31, 37, 46);
const DAY_FULL: Color32 = Color32::from_rgb(92, 58, 48);

/// Uniform fit of the board's layout space into the panel.
#[derive(Clone, Copy, Debug)]
pub(super) struct Viewport {
    origin: Pos2,
    scale: f32,
}

impl Viewport {
    pub(super) fn fit(rect: Rect, size: Vec2) -> Self {
        let scale = if size.x > 0.0 && size.y > 0.0 {
            (rect.width() / size.x).min(rect.height() / size.y).max(0.05)
        } else {
            1.0
        };
        Self {
            origin: rect.center() - (size * scale * 0.5),
            scale,
        }
    }

    pub(super) fn scale(self) -> f32 {
        self.scale
    }

    pub(super) fn world_to_screen(self, world: Vec2) -> Pos2 {
        self.origin + world * self.scale
    }

    pub(super) fn screen_to_world(self, screen: Pos2) -> Vec2 {
        (screen - self.origin) / self.scale
    }

    pub(super) fn rect_to_screen(self, rect: Rect) -> Rect {
        Rect::from_min_max(
            self.world_to_screen(rect.min.to_vec2()),
            self.world_to_screen(rect.max.to_vec2()),
        )
    }
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;
    let mix = |a: u8, b: u8| ((a as f32 * inverse) + (b as f32 * amount)) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, BACKGROUND);
}

/// Cool blue for small amounts through to warm red for the largest.
pub(super) fn amount_color(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let r = (55.0 + (190.0 * t)) as u8;
    let g = (150.0 - (70.0 * t)) as u8;
    let b = (215.0 - (155.0 * t)) as u8;
    Color32::from_rgb(r, g, b)
}

pub(super) fn day_fill(t: f32) -> Color32 {
    blend_color(DAY_EMPTY, DAY_FULL, t)
}
