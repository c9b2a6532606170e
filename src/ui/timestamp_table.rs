use eframe::egui;
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::types::timestamp_table::TimestampTable;

const ROW_HEIGHT: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    Selected(Option<usize>),
    /// Reorder by start time; `true` means descending.
    SortByStart(bool),
    AddRow,
    /// A cell editor was committed with this text.
    Edited {
        row: usize,
        column: usize,
        text: String,
    },
    Save,
}

/// In-place editor for one cell. It stays open until the edit is accepted,
/// showing `error` when the text was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEditor {
    pub row: usize,
    pub column: usize,
    pub text: String,
    pub error: Option<String>,
    focus: bool,
}

impl CellEditor {
    pub fn open(row: usize, column: usize, text: String) -> Self {
        Self {
            row,
            column,
            text,
            error: None,
            focus: true,
        }
    }

    pub fn reject(&mut self, error: String) {
        self.error = Some(error);
        self.focus = true;
    }

    fn is_at(&self, row: usize, column: usize) -> bool {
        self.row == row && self.column == column
    }
}

#[derive(Debug, Default)]
pub struct TableViewState {
    pub sort_descending: bool,
    pub editing: Option<CellEditor>,
}

/// Selection after clicking `clicked`: clicking the selected row clears it.
pub fn next_selection(current: Option<usize>, clicked: usize) -> Option<usize> {
    if current == Some(clicked) {
        None
    } else {
        Some(clicked)
    }
}

/// Grid of the timestamps. A double click edits a cell in place; Enter or
/// leaving the field commits, Escape cancels.
pub fn timestamp_table(
    ui: &mut egui::Ui,
    table: &TimestampTable,
    state: &mut TableViewState,
    selected: Option<usize>,
) -> Vec<TableEvent> {
    let mut events = Vec::new();

    ui.horizontal(|ui| {
        if ui.button("+ Add Row").clicked() {
            events.push(TableEvent::AddRow);
        }
        if ui.button("Save").clicked() {
            events.push(TableEvent::Save);
        }
        if table.collection().is_empty() {
            ui.weak("No entries");
        } else {
            ui.label(format!("{} entries", table.row_count()));
        }
    });

    TableBuilder::new(ui)
        .striped(true)
        .sense(egui::Sense::click())
        .column(TableColumn::initial(100.0).resizable(true))
        .column(TableColumn::initial(100.0).resizable(true))
        .column(TableColumn::remainder())
        .header(ROW_HEIGHT, |mut header| {
            for column in 0..table.column_count() {
                header.col(|ui| {
                    let title = table.header(column).unwrap_or_default();
                    if column == 0 {
                        let arrow = if state.sort_descending { "v" } else { "^" };
                        if ui.button(format!("{} {}", title, arrow)).clicked() {
                            events.push(TableEvent::SortByStart(state.sort_descending));
                            state.sort_descending = !state.sort_descending;
                        }
                    } else {
                        ui.strong(title);
                    }
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, table.row_count(), |mut row| {
                let row_idx = row.index();
                row.set_selected(selected == Some(row_idx));
                // Rows that cannot be highlighted on the seek bar are dimmed.
                let drawable = table
                    .record(row_idx)
                    .is_some_and(|record| record.has_concrete_range());
                let mut clicked = false;
                for column in 0..table.column_count() {
                    row.col(|ui| {
                        if let Some(editor) = state.editing.as_mut().filter(|e| e.is_at(row_idx, column)) {
                            match cell_editor(ui, editor) {
                                Some(EditorOutcome::Commit) => events.push(TableEvent::Edited {
                                    row: row_idx,
                                    column,
                                    text: editor.text.clone(),
                                }),
                                Some(EditorOutcome::Cancel) => state.editing = None,
                                None => {}
                            }
                            return;
                        }

                        let text = table.display(row_idx, column).unwrap_or_default();
                        let text = if drawable {
                            egui::RichText::new(text.clone())
                        } else {
                            egui::RichText::new(text.clone()).weak()
                        };
                        let response = ui.add(
                            egui::Label::new(text)
                                .truncate()
                                .selectable(false)
                                .sense(egui::Sense::click()),
                        );
                        if response.double_clicked() {
                            let current = table.display(row_idx, column).unwrap_or_default();
                            state.editing = Some(CellEditor::open(row_idx, column, current));
                        } else if response.clicked() {
                            clicked = true;
                        }
                    });
                }
                if clicked || row.response().clicked() {
                    events.push(TableEvent::Selected(next_selection(selected, row_idx)));
                }
            });
        });

    events
}

enum EditorOutcome {
    Commit,
    Cancel,
}

fn cell_editor(ui: &mut egui::Ui, editor: &mut CellEditor) -> Option<EditorOutcome> {
    let mut edit = egui::TextEdit::singleline(&mut editor.text).desired_width(f32::INFINITY);
    if editor.error.is_some() {
        edit = edit.text_color(ui.visuals().error_fg_color);
    }
    let mut response = ui.add(edit);
    if let Some(error) = &editor.error {
        response = response.on_hover_text(error.as_str());
    }
    if editor.focus {
        response.request_focus();
        editor.focus = false;
    }

    if !response.lost_focus() {
        return None;
    }
    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        Some(EditorOutcome::Cancel)
    } else {
        Some(EditorOutcome::Commit)
    }
}
