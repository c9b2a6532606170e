use std::path::Path;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::error::LoopResult;
use crate::player::loop_controller::LoopController;
use crate::types::timestamp::display_time;
use crate::ui::detail_form::{DetailEvent, detail_form};
use crate::ui::seek_bar::{SeekBar, SeekBarEvent, SeekBarState};
use crate::ui::timestamp_table::{TableEvent, TableViewState, timestamp_table};

pub struct LoopApp {
    controller: LoopController,
    table_state: TableViewState,
    seek_state: SeekBarState,
    last_poll: Instant,
    warning: Option<String>,
}

impl LoopApp {
    pub fn new(controller: LoopController) -> Self {
        Self {
            controller,
            table_state: TableViewState::default(),
            seek_state: SeekBarState::default(),
            last_poll: Instant::now(),
            warning: None,
        }
    }

    /// Opens a sidecar and, when one sits next to it, its video.
    pub fn open_timestamps(&mut self, path: &Path) {
        let sibling = self.controller.load_timestamps(path);
        match sibling {
            Ok(Some(video)) => self.open_video(&video),
            Ok(None) => {}
            Err(err) => self.warn(err),
        }
    }

    pub fn open_video(&mut self, path: &Path) {
        let loaded = self.controller.load_video(path);
        self.report(loaded.map(|_| ()));
    }

    fn warn(&mut self, err: impl std::fmt::Display) {
        tracing::warn!(error = %err, "operation failed");
        self.warning = Some(err.to_string());
    }

    fn report(&mut self, result: LoopResult<()>) {
        if let Err(err) = result {
            self.warn(err);
        }
    }

    fn poll(&mut self, ctx: &egui::Context) {
        let interval = Duration::from_millis(self.controller.settings().poll_interval_ms);
        if self.last_poll.elapsed() >= interval {
            self.last_poll = Instant::now();
            let polled = self.controller.poll();
            self.report(polled);
            self.sync_table();
        }
        ctx.request_repaint_after(interval);
    }

    fn set_full_screen(&self, ctx: &egui::Context, full_screen: bool) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(full_screen));
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (space, f, escape) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::F),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if space {
            let toggled = self.controller.toggle_pause();
            self.report(toggled);
        }
        if f {
            let full_screen = self.controller.toggle_full_screen();
            self.set_full_screen(ctx, full_screen);
        }
        if escape && self.controller.leave_full_screen() {
            self.set_full_screen(ctx, false);
        }
    }

    /// Re-binds the detail form when a grid edit touched its row.
    fn sync_table(&mut self) {
        match self.controller.sync_changes() {
            Ok(cells) => {
                for cell in cells {
                    tracing::trace!(row = cell.row, column = cell.column.index(), "cell refreshed");
                }
            }
            Err(err) => self.warn(err),
        }
    }

    fn handle_table_event(&mut self, event: TableEvent) {
        let result = match event {
            TableEvent::Selected(row) => self.controller.select_row(row),
            TableEvent::SortByStart(descending) => {
                self.table_state.editing = None;
                self.controller.sort_by_start(descending)
            }
            TableEvent::AddRow => self.controller.add_row().map(|_| ()),
            TableEvent::Edited { row, column, text } => {
                self.commit_cell(row, column, &text);
                Ok(())
            }
            TableEvent::Save => self.controller.save_table(),
        };
        self.report(result);
    }

    /// Writes a grid edit through. A rejected value stays in the cell editor
    /// as a warning on that field instead of a dialog.
    fn commit_cell(&mut self, row: usize, column: usize, text: &str) {
        match self.controller.edit_cell(row, column, text) {
            Ok(_) => {
                self.table_state.editing = None;
                self.sync_table();
            }
            Err(err) => {
                tracing::debug!(row, column, error = %err, "cell edit rejected");
                if let Some(editor) = self.table_state.editing.as_mut() {
                    editor.reject(err.to_string());
                }
            }
        }
    }

    fn handle_detail_event(&mut self, event: DetailEvent) {
        let result = match event {
            DetailEvent::Save => self.controller.save_detail().map(|_| ()),
            DetailEvent::Run => self.controller.run(),
        };
        self.report(result);
    }

    fn top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("files_panel").show(ctx, |ui| {
            let session = self.controller.session();
            let describe = |path: Option<&Path>| {
                path.map(|path| path.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string())
            };
            ui.horizontal(|ui| {
                ui.label("Timestamps:");
                ui.monospace(describe(session.timestamp_path.as_deref()));
            });
            ui.horizontal(|ui| {
                ui.label("Video:");
                ui.monospace(describe(session.video_path.as_deref()));
            });
        });
    }

    fn transport_panel(&mut self, ctx: &egui::Context) {
        let mut seek = None;
        egui::TopBottomPanel::bottom("transport_panel").show(ctx, |ui| {
            let resolution = self.controller.settings().seek_bar_resolution;
            let progress = self.controller.progress();
            let highlight = self.controller.session().highlight;
            seek = SeekBar::new(&mut self.seek_state, progress, resolution)
                .highlight(highlight)
                .show(ui);

            ui.horizontal(|ui| {
                if ui.button("Run").clicked() {
                    let ran = self.controller.run();
                    self.report(ran);
                }
                let label = if self.controller.session().is_playing() {
                    "Pause"
                } else {
                    "Play"
                };
                if ui.button(label).clicked() {
                    let toggled = self.controller.toggle_pause();
                    self.report(toggled);
                }
                if ui.button("Slower").clicked() {
                    let changed = self.controller.slow_down();
                    self.report(changed);
                }
                ui.label(format!("{:.1}x", self.controller.rate()));
                if ui.button("Faster").clicked() {
                    let changed = self.controller.speed_up();
                    self.report(changed);
                }

                ui.separator();
                let mute_label = if self.controller.session().muted {
                    "Unmute"
                } else {
                    "Mute"
                };
                if ui.button(mute_label).clicked() {
                    self.controller.toggle_mute();
                }
                let mut volume = self.controller.volume();
                let max = self.controller.settings().volume_max;
                if ui
                    .add(egui::Slider::new(&mut volume, 0..=max).text("Volume"))
                    .changed()
                {
                    self.controller.set_volume(volume);
                }

                ui.separator();
                let playback = &self.controller.session().playback;
                let end = if playback.is_bounded() {
                    display_time(playback.loop_end)
                } else {
                    "end".to_string()
                };
                ui.label(format!("Loop {} - {}", display_time(playback.loop_start), end));
                ui.monospace(display_time(self.controller.time_ms()));
                ui.label(format!("{:?}", self.controller.state()));
            });
        });

        if let Some(SeekBarEvent::Released(value)) = seek {
            let resolution = self.controller.settings().seek_bar_resolution.max(1);
            let moved = self
                .controller
                .set_media_position(f64::from(value) / f64::from(resolution));
            self.report(moved);
        }
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        let mut table_events = Vec::new();
        let mut detail_event = None;
        egui::SidePanel::left("timestamps_panel")
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                table_events = timestamp_table(
                    ui,
                    self.controller.table(),
                    &mut self.table_state,
                    self.controller.selected_row(),
                );
                ui.separator();
                let dirty = self.controller.form().is_dirty(self.controller.table());
                detail_event = detail_form(ui, self.controller.form_mut(), dirty);
            });

        for event in table_events {
            self.handle_table_event(event);
        }
        if let Some(event) = detail_event {
            self.handle_detail_event(event);
        }
    }

    fn video_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click());
            ui.painter()
                .rect_filled(response.rect, 0.0, egui::Color32::BLACK);

            if response.double_clicked() {
                let full_screen = self.controller.toggle_full_screen();
                self.set_full_screen(ctx, full_screen);
            }
            if response.hovered() {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                let step = self.controller.settings().volume_step;
                if scroll > 0.0 {
                    self.controller.modify_volume(step);
                } else if scroll < 0.0 {
                    self.controller.modify_volume(-step);
                }
            }
        });
    }

    fn warning_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.warning.clone() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Warning")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.warning = None;
        }
    }
}

impl eframe::App for LoopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll(ctx);
        self.handle_keys(ctx);

        if !self.controller.session().full_screen {
            self.top_panel(ctx);
            self.side_panel(ctx);
        }
        self.transport_panel(ctx);
        self.video_panel(ctx);
        self.warning_window(ctx);
    }
}
