use crate::error::{LoopError, LoopResult};

/// End time meaning "play to the end of the media".
pub const UNBOUNDED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Start,
    End,
    Description,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Start, Column::End, Column::Description];

    pub fn index(self) -> usize {
        match self {
            Column::Start => 0,
            Column::End => 1,
            Column::Description => 2,
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Column::Start => "Start Time",
            Column::End => "End Time",
            Column::Description => "Description",
        }
    }

    pub fn is_time(self) -> bool {
        !matches!(self, Column::Description)
    }
}

impl TryFrom<usize> for Column {
    type Error = LoopError;

    fn try_from(column: usize) -> LoopResult<Self> {
        Column::ALL
            .get(column)
            .copied()
            .ok_or(LoopError::InvalidColumn { column })
    }
}

/// Typed cell content: milliseconds for the time columns, text for the
/// description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Millis(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampRecord {
    pub start_ms: i64,
    pub end_ms: i64,
    pub description: String,
}

impl TimestampRecord {
    pub fn new(start_ms: i64, end_ms: i64, description: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            description: description.into(),
        }
    }

    pub fn display(&self, column: Column) -> String {
        match column {
            Column::Start => display_time(self.start_ms),
            Column::End => display_time(self.end_ms),
            Column::Description => self.description.clone(),
        }
    }

    pub fn value(&self, column: Column) -> FieldValue {
        match column {
            Column::Start => FieldValue::Millis(self.start_ms),
            Column::End => FieldValue::Millis(self.end_ms),
            Column::Description => FieldValue::Text(self.description.clone()),
        }
    }

    /// Writes one field. Time columns take either raw milliseconds or text
    /// in any form accepted by [`parse_time_field`].
    pub fn set(&mut self, column: Column, value: FieldValue) -> LoopResult<()> {
        match column {
            Column::Start | Column::End => {
                let ms = match value {
                    FieldValue::Millis(ms) => ms,
                    FieldValue::Text(text) => parse_time_field(&text, column)?,
                };
                check_time(ms, column)?;
                if column == Column::Start {
                    self.start_ms = ms;
                } else {
                    self.end_ms = ms;
                }
            }
            Column::Description => {
                self.description = match value {
                    FieldValue::Text(text) => text,
                    FieldValue::Millis(ms) => ms.to_string(),
                };
            }
        }
        Ok(())
    }

    pub fn is_unbounded(&self) -> bool {
        self.end_ms == UNBOUNDED
    }

    /// Whether the record describes a drawable range on the seek bar.
    pub fn has_concrete_range(&self) -> bool {
        !self.is_unbounded() && self.start_ms < self.end_ms
    }
}

pub(crate) fn check_time(ms: i64, column: Column) -> LoopResult<()> {
    let lowest = if column == Column::End { UNBOUNDED } else { 0 };
    if ms < lowest {
        return Err(LoopError::invalid_time(ms.to_string()));
    }
    Ok(())
}

/// Formats milliseconds as `H:MM:SS.mmm`. Hours have no fixed width.
pub fn format_ms(ms: u64) -> String {
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
}

/// Like [`format_ms`], but the unbounded sentinel renders as empty text.
pub fn display_time(ms: i64) -> String {
    if ms < 0 {
        String::new()
    } else {
        format_ms(ms as u64)
    }
}

/// Parses strict `H:MM:SS.mmm` text.
pub fn parse_time(text: &str) -> LoopResult<u64> {
    let invalid = || LoopError::invalid_time(text);
    let mut parts = text.trim().splitn(3, ':');
    let (hours, minutes, rest) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(rest)) => (h, m, rest),
        _ => return Err(invalid()),
    };
    let (seconds, millis) = rest.split_once('.').ok_or_else(invalid)?;

    let hours = digits(hours, 1, usize::MAX).ok_or_else(invalid)?;
    let minutes = digits(minutes, 1, 2).ok_or_else(invalid)?;
    let seconds = digits(seconds, 1, 2).ok_or_else(invalid)?;
    let millis = digits(millis, 3, 3).ok_or_else(invalid)?;
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1000 + millis))
        .ok_or_else(invalid)
}

/// Parses text typed into a time cell: a plain millisecond count, `H:MM:SS.mmm`,
/// or empty text (0 for a start time, unbounded for an end time).
pub fn parse_time_field(text: &str, column: Column) -> LoopResult<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(if column == Column::End { UNBOUNDED } else { 0 });
    }
    if column == Column::End && trimmed == "-1" {
        return Ok(UNBOUNDED);
    }
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse::<i64>().map_err(|_| LoopError::invalid_time(text));
    }
    let ms = parse_time(trimmed)?;
    i64::try_from(ms).map_err(|_| LoopError::invalid_time(text))
}

fn digits(part: &str, min_len: usize, max_len: usize) -> Option<u64> {
    if part.len() < min_len || part.len() > max_len || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
