use chrono::Days;
use eframe::egui::{self, Align, Key, Layout, Ui};
use spendfield::util::format_amount;

use super::SpendfieldApp;

impl SpendfieldApp {
    pub(super) fn draw_top_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("spendfield");
            ui.separator();

            let week = self.board.selected_week();
            if ui.button("◀ Previous week").clicked()
                && let Some(previous) = week.checked_sub_days(Days::new(7))
            {
                let result = self.board.set_selected_week(previous);
                self.report(result);
            }
            ui.label(format!("Week of {}", week.format("%b %-d, %Y")));
            if ui.button("Next week ▶").clicked()
                && let Some(next) = week.checked_add_days(Days::new(7))
            {
                let result = self.board.set_selected_week(next);
                self.report(result);
            }
            ui.separator();

            let input = ui.add(
                egui::TextEdit::singleline(&mut self.category_input)
                    .hint_text("New category")
                    .desired_width(160.0),
            );
            let submitted = input.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
            if ui.button("Add category").clicked() || submitted {
                let result = self.board.add_category(&self.category_input);
                if result.is_ok() {
                    self.category_input.clear();
                }
                self.report(result);
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let total = self
                    .board
                    .day_cells()
                    .iter()
                    .map(|cell| cell.total)
                    .sum::<f64>();
                ui.label(format!("week total: {}", format_amount(total)));
                if let Some(status) = &self.status {
                    ui.colored_label(egui::Color32::from_rgb(235, 110, 100), status);
                }
            });
        });
    }
}
