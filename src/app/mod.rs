use eframe::egui::{self, Context};
use spendfield::Board;

mod panels;
mod pointer;
mod render_utils;
mod view;

pub struct SpendfieldApp {
    board: Board,
    category_input: String,
    status: Option<String>,
}

impl SpendfieldApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, board: Board) -> Self {
        Self {
            board,
            category_input: String::new(),
            status: None,
        }
    }

    fn report(&mut self, result: spendfield::Result<()>) {
        match result {
            Ok(()) => self.status = None,
            Err(error) => {
                tracing::warn!(%error, "board update rejected");
                self.status = Some(error.to_string());
            }
        }
    }
}

impl eframe::App for SpendfieldApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_board(ui));

        if self.board.tick() || self.board.dragging().is_some() {
            ctx.request_repaint();
        }
    }
}
