use eframe::egui::{self, PointerButton, Response, Ui};
use spendfield::PointerEvent;
use tracing::info;

use super::SpendfieldApp;
use super::render_utils::Viewport;

impl SpendfieldApp {
    pub(super) fn forward_pointer(&mut self, ui: &Ui, response: &Response, viewport: Viewport) {
        for event in pointer_events(ui, response, viewport) {
            match self.board.pointer(event) {
                Ok(Some(dropped)) => {
                    info!(?dropped, "drop applied");
                    self.status = None;
                }
                Ok(None) => {}
                Err(error) => self.report(Err(error)),
            }
        }
    }
}

/// Translates this frame's primary-button drag into board pointer events in layout space.
fn pointer_events(ui: &Ui, response: &Response, viewport: Viewport) -> Vec<PointerEvent> {
    let mut events = Vec::new();

    if response.drag_started_by(PointerButton::Primary) {
        let origin = ui
            .input(|input| input.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(origin) = origin {
            events.push(PointerEvent::down(viewport.screen_to_world(origin)));
        }
    }

    if response.dragged_by(PointerButton::Primary)
        && let Some(position) = response.interact_pointer_pos()
    {
        events.push(PointerEvent::moved(viewport.screen_to_world(position)));
    }

    if response.drag_stopped_by(PointerButton::Primary) {
        let position = response
            .interact_pointer_pos()
            .or_else(|| ui.input(|input| input.pointer.latest_pos()));
        events.push(match position {
            Some(position) => PointerEvent::up(viewport.screen_to_world(position)),
            None => PointerEvent::cancel(),
        });
    }

    if ui.input(|input| input.key_pressed(egui::Key::Escape)) {
        events.push(PointerEvent::cancel());
    }

    events
}
