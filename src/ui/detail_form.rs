use eframe::egui;

use crate::types::detail_form::DetailForm;
use crate::types::timestamp::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailEvent {
    Save,
    Run,
}

/// Three text fields bound to the selected row. Locked while nothing is
/// selected.
pub fn detail_form(ui: &mut egui::Ui, form: &mut DetailForm, dirty: bool) -> Option<DetailEvent> {
    let mut event = None;
    let locked = form.is_read_only();

    ui.add_enabled_ui(!locked, |ui| {
        egui::Grid::new("detail_form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                if let Some(draft) = form.draft_mut() {
                    for (column, text) in [
                        (Column::Start, &mut draft.start),
                        (Column::End, &mut draft.end),
                        (Column::Description, &mut draft.description),
                    ] {
                        ui.label(column.header());
                        let hint = if column.is_time() { "H:MM:SS.mmm" } else { "" };
                        ui.add(egui::TextEdit::singleline(text).hint_text(hint));
                        ui.end_row();
                    }
                } else {
                    for column in Column::ALL {
                        ui.label(column.header());
                        ui.label(form.draft().field(column));
                        ui.end_row();
                    }
                }
            });

        ui.horizontal(|ui| {
            if ui.add_enabled(dirty, egui::Button::new("Save")).clicked() {
                event = Some(DetailEvent::Save);
            }
            if ui.button("Loop this").clicked() {
                event = Some(DetailEvent::Run);
            }
        });
    });

    event
}
