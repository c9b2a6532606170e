use eframe::egui;

use crate::ops::highlight::Highlight;

const BAR_HEIGHT: f32 = 18.0;
const TRACK_HEIGHT: f32 = 6.0;
const HANDLE_RADIUS: f32 = 7.0;

/// Drag state that persists between frames.
#[derive(Debug, Default)]
pub struct SeekBarState {
    /// Slider value under the pointer while dragging.
    pub dragging: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekBarEvent {
    /// The handle was released at this slider value.
    Released(u32),
}

/// Horizontal seek bar with an optional highlighted loop range. Values run
/// from 0 to `max`; a new position is only reported on release.
pub struct SeekBar<'a> {
    state: &'a mut SeekBarState,
    value: u32,
    max: u32,
    highlight: Option<Highlight>,
}

impl<'a> SeekBar<'a> {
    pub fn new(state: &'a mut SeekBarState, value: u32, max: u32) -> Self {
        Self {
            state,
            value,
            max,
            highlight: None,
        }
    }

    pub fn highlight(mut self, highlight: Option<Highlight>) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> Option<SeekBarEvent> {
        let width = ui.available_width();
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(width, BAR_HEIGHT), egui::Sense::click_and_drag());

        let mut event = None;
        if let Some(pos) = response.interact_pointer_pos() {
            let value = x_to_value(pos.x - rect.left(), rect.width(), self.max);
            if response.drag_stopped() || response.clicked() {
                self.state.dragging = None;
                event = Some(SeekBarEvent::Released(value));
            } else {
                self.state.dragging = Some(value);
            }
        }
        let shown = self.state.dragging.unwrap_or(self.value);

        let painter = ui.painter_at(rect);
        let track = egui::Rect::from_center_size(
            rect.center(),
            egui::vec2(rect.width(), TRACK_HEIGHT),
        );
        painter.rect_filled(track, 3.0, ui.visuals().widgets.inactive.bg_fill);

        if let Some(highlight) = self.highlight {
            let left = track.left() + value_to_x(highlight.start, rect.width(), self.max);
            let right = track.left() + value_to_x(highlight.end, rect.width(), self.max);
            let span = egui::Rect::from_x_y_ranges(left..=right, rect.y_range());
            painter.rect_filled(
                span,
                2.0,
                egui::Color32::from_rgba_unmultiplied(0, 152, 116, 77),
            );
        }

        let handle_x = track.left() + value_to_x(f64::from(shown), rect.width(), self.max);
        painter.circle_filled(
            egui::pos2(handle_x, rect.center().y),
            HANDLE_RADIUS,
            ui.visuals().widgets.active.fg_stroke.color,
        );

        event
    }
}

/// Slider value at `x` pixels from the left edge of a bar `width` wide.
pub fn x_to_value(x: f32, width: f32, max: u32) -> u32 {
    if width <= 0.0 {
        return 0;
    }
    let fraction = (x / width).clamp(0.0, 1.0);
    (f64::from(fraction) * f64::from(max)).round() as u32
}

fn value_to_x(value: f64, width: f32, max: u32) -> f32 {
    if max == 0 {
        return 0.0;
    }
    ((value / f64::from(max)).clamp(0.0, 1.0) * f64::from(width)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_maps_onto_the_slider_range() {
        assert_eq!(x_to_value(0.0, 200.0, 10_000), 0);
        assert_eq!(x_to_value(50.0, 200.0, 10_000), 2500);
        assert_eq!(x_to_value(200.0, 200.0, 10_000), 10_000);
    }

    #[test]
    fn pointer_outside_the_bar_is_clamped() {
        assert_eq!(x_to_value(-30.0, 200.0, 10_000), 0);
        assert_eq!(x_to_value(260.0, 200.0, 10_000), 10_000);
        assert_eq!(x_to_value(10.0, 0.0, 10_000), 0);
    }

    #[test]
    fn values_map_back_to_pixels() {
        assert_eq!(value_to_x(5000.0, 200.0, 10_000), 100.0);
        assert_eq!(value_to_x(1.0, 200.0, 0), 0.0);
    }
}
