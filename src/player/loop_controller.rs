use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::PlayerSettings;
use crate::error::{LoopError, LoopResult};
use crate::ops::adjust::{adjusted_rate, adjusted_volume};
use crate::ops::discovery::find_sibling_video;
use crate::ops::highlight::project_range;
use crate::player::boundary::BoundaryWatch;
use crate::player::engine::MediaEngine;
use crate::types::detail_form::DetailForm;
use crate::types::playback_state::{LoopState, PlaybackState};
use crate::types::session::SessionState;
use crate::types::timestamp::{Column, FieldValue, TimestampRecord, UNBOUNDED};
use crate::types::timestamp_table::{CellIndex, TimestampTable};

/// Drives an engine around the selected timestamp range.
///
/// Boundary detection happens on the engine's notification thread, which
/// only raises a flag in the [`BoundaryWatch`]. Every engine command,
/// including the restart seek, is issued from the thread that owns the
/// controller, when [`LoopController::poll`] runs.
pub struct LoopController {
    engine: Box<dyn MediaEngine>,
    settings: PlayerSettings,
    session: SessionState,
    table: TimestampTable,
    form: DetailForm,
    watch: Arc<BoundaryWatch>,
}

impl LoopController {
    pub fn new(mut engine: Box<dyn MediaEngine>, settings: PlayerSettings) -> Self {
        let watch = Arc::new(BoundaryWatch::new());
        let producer = Arc::clone(&watch);
        engine.subscribe_time_changed(Box::new(move |time_ms| producer.observe(time_ms)));
        engine.set_volume(adjusted_volume(settings.initial_volume, 0, settings.volume_max));

        Self {
            engine,
            settings,
            session: SessionState::new(),
            table: TimestampTable::default(),
            form: DetailForm::new(),
            watch,
        }
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn table(&self) -> &TimestampTable {
        &self.table
    }

    pub fn form(&self) -> &DetailForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut DetailForm {
        &mut self.form
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.form.row()
    }

    pub fn state(&self) -> LoopState {
        match self.session.playback.state {
            LoopState::Playing if self.watch.is_pending() => LoopState::RestartPending,
            state => state,
        }
    }

    /// Opens a sidecar file and returns the sibling video found next to it,
    /// if any. A failure leaves the current table untouched.
    pub fn load_timestamps(&mut self, path: &Path) -> LoopResult<Option<PathBuf>> {
        if !path.is_file() {
            return Err(LoopError::FileNotAccessible {
                kind: "timestamp",
                path: path.to_path_buf(),
            });
        }
        let table = TimestampTable::open(path)?;

        self.table = table;
        self.form.unbind();
        self.session.timestamp_path = Some(path.to_path_buf());

        match find_sibling_video(path) {
            Ok(video) => Ok(video),
            Err(err) => {
                tracing::warn!(error = %err, "could not scan for a sibling video");
                Ok(None)
            }
        }
    }

    /// Loads a video into the engine. On failure the previous media, if any,
    /// stays loaded and the session keeps pointing at it.
    pub fn load_video(&mut self, path: &Path) -> LoopResult<u64> {
        if !path.is_file() {
            return Err(LoopError::FileNotAccessible {
                kind: "video",
                path: path.to_path_buf(),
            });
        }
        let media_error = |reason: String| LoopError::MediaError {
            path: path.to_path_buf(),
            reason,
        };
        let duration_ms = match self.engine.load(path) {
            Ok(0) => return Err(media_error("media reports no duration".to_string())),
            Ok(duration_ms) => duration_ms,
            Err(err @ LoopError::MediaError { .. }) => return Err(err),
            Err(err) => return Err(media_error(err.to_string())),
        };

        tracing::info!(video = %path.display(), duration_ms, "loaded video");
        self.session.video_path = Some(path.to_path_buf());
        self.session.duration_ms = Some(duration_ms);
        self.session.playback = PlaybackState::new();
        self.session.highlight = None;
        self.watch.disarm();
        Ok(duration_ms)
    }

    /// Repoints the detail form. Any unsaved draft is discarded.
    pub fn select_row(&mut self, row: Option<usize>) -> LoopResult<()> {
        match row {
            Some(row) => self.form.bind(row, &self.table)?,
            None => self.form.unbind(),
        }
        Ok(())
    }

    /// Commits the detail form and rewrites the sidecar file.
    pub fn save_detail(&mut self) -> LoopResult<Vec<CellIndex>> {
        let changed = self.form.submit(&mut self.table)?;
        self.table.save()?;
        Ok(changed)
    }

    pub fn add_row(&mut self) -> LoopResult<usize> {
        let start_ms = self.engine.time().max(0);
        let row = self
            .table
            .append(TimestampRecord::new(start_ms, UNBOUNDED, String::new()));
        self.select_row(Some(row))?;
        Ok(row)
    }

    pub fn sort_by_start(&mut self, reverse: bool) -> LoopResult<()> {
        self.table.sort_by_start(reverse);
        self.select_row(None)
    }

    /// Edits one grid cell in place. The sidecar file is rewritten only by
    /// [`LoopController::save_table`] or a detail save.
    pub fn edit_cell(&mut self, row: usize, column: usize, text: &str) -> LoopResult<CellIndex> {
        self.table.set_cell(row, column, text)
    }

    pub fn save_table(&mut self) -> LoopResult<()> {
        self.table.save()
    }

    /// Drains the cells changed since the last call. When the detail form's
    /// row is among them the form is re-bound, so it shows the new values and
    /// drops its own unsaved edits of that row.
    pub fn sync_changes(&mut self) -> LoopResult<Vec<CellIndex>> {
        let changes = self.table.take_changes();
        if let Some(row) = self.form.row() {
            if changes.iter().any(|cell| cell.row == row) {
                self.form.bind(row, &self.table)?;
            }
        }
        Ok(changes)
    }

    /// Takes the loop range from the selected row, or the whole file when
    /// nothing is selected, and re-arms the boundary watch.
    pub fn arm(&mut self) -> LoopResult<()> {
        if self.session.timestamp_path.is_none() {
            return Err(LoopError::NothingToPlay { what: "timestamp" });
        }
        if self.session.video_path.is_none() {
            return Err(LoopError::NothingToPlay { what: "video" });
        }

        let (start_ms, end_ms) = match self.form.row() {
            Some(row) => (
                self.time_value(row, Column::Start)?,
                self.time_value(row, Column::End)?,
            ),
            None => (0, UNBOUNDED),
        };

        self.session.highlight = self.session.duration_ms.and_then(|duration_ms| {
            project_range(
                start_ms,
                end_ms,
                duration_ms,
                0.0,
                f64::from(self.settings.seek_bar_resolution),
            )
        });
        let playback = &mut self.session.playback;
        playback.loop_start = start_ms;
        playback.loop_end = end_ms;
        playback.state = LoopState::Armed;
        self.watch.arm(end_ms);
        tracing::debug!(start_ms, end_ms, "loop armed");
        Ok(())
    }

    /// Starts the engine at the armed range's start.
    pub fn start(&mut self) -> LoopResult<()> {
        if self.session.playback.state != LoopState::Armed {
            return Err(LoopError::engine("loop is not armed"));
        }
        self.engine.play()?;
        self.engine.set_time(self.session.playback.loop_start)?;
        self.session.playback.started = true;
        self.session.playback.state = LoopState::Playing;
        Ok(())
    }

    pub fn run(&mut self) -> LoopResult<()> {
        self.arm()?;
        self.start()
    }

    /// Pauses or resumes. Before anything has played this behaves like
    /// [`LoopController::run`].
    pub fn toggle_pause(&mut self) -> LoopResult<()> {
        if !self.session.playback.started {
            return self.run();
        }
        match self.session.playback.state {
            LoopState::Playing | LoopState::RestartPending => {
                self.engine.pause()?;
                self.session.playback.state = LoopState::Paused;
            }
            LoopState::Paused => {
                self.engine.play()?;
                self.session.playback.state = LoopState::Playing;
            }
            LoopState::Armed => self.start()?,
            LoopState::Idle => self.run()?,
        }
        Ok(())
    }

    /// Main-thread driver tick: performs a restart requested by the engine
    /// thread since the last tick.
    pub fn poll(&mut self) -> LoopResult<()> {
        if self.session.playback.state != LoopState::Playing || !self.watch.take_pending() {
            return Ok(());
        }
        let start_ms = self.session.playback.loop_start;
        tracing::debug!(start_ms, "restarting loop");
        self.engine.set_time(start_ms)
    }

    /// Seeks to a fraction of the media. The loop becomes unbounded.
    pub fn set_media_position(&mut self, fraction: f64) -> LoopResult<()> {
        self.engine.set_position(fraction.clamp(0.0, 1.0))?;
        self.session.playback.loop_end = UNBOUNDED;
        self.session.highlight = None;
        self.watch.disarm();
        Ok(())
    }

    /// Seek bar value for the current engine position.
    pub fn progress(&self) -> u32 {
        let resolution = f64::from(self.settings.seek_bar_resolution);
        (self.engine.position().clamp(0.0, 1.0) * resolution) as u32
    }

    pub fn time_ms(&self) -> i64 {
        self.engine.time()
    }

    pub fn volume(&self) -> i32 {
        self.engine.volume()
    }

    pub fn set_volume(&mut self, volume: i32) {
        self.engine
            .set_volume(adjusted_volume(volume, 0, self.settings.volume_max));
    }

    pub fn modify_volume(&mut self, delta: i32) {
        let volume = adjusted_volume(self.engine.volume(), delta, self.settings.volume_max);
        self.engine.set_volume(volume);
    }

    pub fn rate(&self) -> f64 {
        self.engine.rate()
    }

    /// Changes the rate by `delta`; silently ignored when the result falls
    /// outside the configured bounds.
    pub fn modify_rate(&mut self, delta: f64) -> LoopResult<()> {
        let Some(rate) = adjusted_rate(
            self.engine.rate(),
            delta,
            self.settings.rate_min,
            self.settings.rate_max,
        ) else {
            return Ok(());
        };
        self.engine.set_rate(rate)
    }

    pub fn speed_up(&mut self) -> LoopResult<()> {
        self.modify_rate(self.settings.rate_step)
    }

    pub fn slow_down(&mut self) -> LoopResult<()> {
        self.modify_rate(-self.settings.rate_step)
    }

    pub fn toggle_mute(&mut self) {
        let muted = !self.engine.mute();
        self.engine.set_mute(muted);
        self.session.muted = muted;
    }

    pub fn toggle_full_screen(&mut self) -> bool {
        self.session.full_screen = !self.session.full_screen;
        self.session.full_screen
    }

    pub fn leave_full_screen(&mut self) -> bool {
        std::mem::replace(&mut self.session.full_screen, false)
    }

    fn time_value(&self, row: usize, column: Column) -> LoopResult<i64> {
        match self.table.value(row, column.index())? {
            FieldValue::Millis(ms) => Ok(ms),
            FieldValue::Text(text) => Err(LoopError::invalid_time(text)),
        }
    }
}
