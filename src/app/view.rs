use eframe::egui::{Align2, Color32, FontId, Sense, Stroke, Ui, vec2};
use spendfield::util::format_amount;
use spendfield::{Layer, TargetId};

use super::SpendfieldApp;
use super::render_utils::{Viewport, amount_color, blend_color, day_fill, draw_background};

const LABEL: Color32 = Color32::from_rgb(222, 228, 236);
const LABEL_DIM: Color32 = Color32::from_rgb(140, 150, 164);
const LINK: Color32 = Color32::from_rgba_premultiplied(70, 80, 92, 90);
const CATEGORY_FILL: Color32 = Color32::from_rgb(42, 52, 66);
const CATEGORY_EDGE: Color32 = Color32::from_rgb(110, 126, 148);
const HIGHLIGHT: Color32 = Color32::from_rgb(250, 204, 92);

impl SpendfieldApp {
    pub(super) fn draw_board(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        let layout = *self.board.layout().config();
        let viewport = Viewport::fit(rect, vec2(layout.width, layout.height));
        self.forward_pointer(ui, &response, viewport);

        let hovered = self.board.hovered_target().cloned();
        let scale = viewport.scale();
        let small = FontId::proportional(12.0);

        for cell in self.board.day_cells() {
            let screen = viewport.rect_to_screen(cell.rect());
            let mut fill = day_fill(cell.fill);
            if hovered == Some(TargetId::Day(cell.date)) {
                fill = blend_color(fill, HIGHLIGHT, 0.35);
            }
            painter.rect_filled(screen, 6.0, fill);
            painter.text(
                screen.center_top() + vec2(0.0, 6.0),
                Align2::CENTER_TOP,
                cell.date.format("%a %-d").to_string(),
                small.clone(),
                LABEL,
            );
            if cell.total > 0.0 {
                painter.text(
                    screen.center_bottom() - vec2(0.0, 6.0),
                    Align2::CENTER_BOTTOM,
                    format_amount(cell.total),
                    small.clone(),
                    LABEL_DIM,
                );
            }
        }

        for segment in self.board.link_segments() {
            painter.line_segment(
                [
                    viewport.world_to_screen(segment.source),
                    viewport.world_to_screen(segment.target),
                ],
                Stroke::new(1.0, LINK),
            );
        }

        for node in self.board.categories().nodes() {
            let center = viewport.world_to_screen(node.position);
            let radius = node.radius * scale;
            let fill = match &hovered {
                Some(TargetId::Category(name)) if name == node.key() => {
                    blend_color(CATEGORY_FILL, HIGHLIGHT, 0.4)
                }
                _ => CATEGORY_FILL,
            };
            let edge_width = if node.anchored { 2.0 } else { 1.0 };

            painter.circle_filled(center, radius, fill);
            painter.circle_stroke(center, radius, Stroke::new(edge_width, CATEGORY_EDGE));
            painter.text(
                center,
                Align2::CENTER_CENTER,
                node.key(),
                FontId::proportional(13.0),
                LABEL,
            );
            if node.domain.total > 0.0 {
                painter.text(
                    center + vec2(0.0, 14.0),
                    Align2::CENTER_TOP,
                    format_amount(node.domain.total),
                    small.clone(),
                    LABEL_DIM,
                );
            }
        }

        let dragged = self
            .board
            .dragging()
            .filter(|(layer, _)| *layer == Layer::Transactions)
            .map(|(_, key)| key.to_owned());
        let pointer = response
            .hover_pos()
            .map(|position| viewport.screen_to_world(position));
        let mut tooltip = None;

        for node in self.board.transactions().nodes() {
            let center = viewport.world_to_screen(node.position);
            let radius = (node.radius * scale).max(2.0);
            let color = amount_color(self.board.layout().color_position(node.domain.amount));
            painter.circle_filled(center, radius, color);

            if dragged.as_deref() == Some(node.key()) {
                painter.circle_stroke(center, radius + 2.0, Stroke::new(2.0, HIGHLIGHT));
            }
            if pointer.is_some_and(|position| node.contains(position)) {
                let text = format!("{} {}", node.domain.name, format_amount(node.domain.amount));
                tooltip = Some((center, radius, text));
            }
        }

        if let Some((center, radius, text)) = tooltip {
            painter.text(
                center - vec2(0.0, radius + 4.0),
                Align2::CENTER_BOTTOM,
                text,
                small,
                LABEL,
            );
        }
    }
}
