use crate::error::LoopResult;
use crate::types::timestamp::{Column, parse_time_field};
use crate::types::timestamp_table::{CellIndex, TimestampTable};

/// Uncommitted text of the three detail fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub start: String,
    pub end: String,
    pub description: String,
}

impl Draft {
    fn from_row(table: &TimestampTable, row: usize) -> LoopResult<Self> {
        Ok(Self {
            start: table.display(row, Column::Start.index())?,
            end: table.display(row, Column::End.index())?,
            description: table.display(row, Column::Description.index())?,
        })
    }

    pub fn field(&self, column: Column) -> &str {
        match column {
            Column::Start => &self.start,
            Column::End => &self.end,
            Column::Description => &self.description,
        }
    }
}

/// Single-record editor bound to one table row. Edits stay in the draft until
/// [`DetailForm::submit`]; rebinding or unbinding throws the draft away.
#[derive(Debug, Default)]
pub struct DetailForm {
    row: Option<usize>,
    draft: Draft,
}

impl DetailForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, row: usize, table: &TimestampTable) -> LoopResult<()> {
        self.draft = Draft::from_row(table, row)?;
        self.row = Some(row);
        Ok(())
    }

    /// Clears the fields and locks the form.
    pub fn unbind(&mut self) {
        self.row = None;
        self.draft = Draft::default();
    }

    pub fn row(&self) -> Option<usize> {
        self.row
    }

    pub fn is_read_only(&self) -> bool {
        self.row.is_none()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// `None` while the form is locked.
    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        if self.is_read_only() {
            None
        } else {
            Some(&mut self.draft)
        }
    }

    pub fn is_dirty(&self, table: &TimestampTable) -> bool {
        match self.row {
            Some(row) => Draft::from_row(table, row).is_ok_and(|saved| saved != self.draft),
            None => false,
        }
    }

    /// Commits the draft to the bound row. Both time fields are validated
    /// before anything is written, so a bad field commits nothing. Only cells
    /// whose text differs are written.
    pub fn submit(&mut self, table: &mut TimestampTable) -> LoopResult<Vec<CellIndex>> {
        let Some(row) = self.row else {
            return Ok(Vec::new());
        };
        parse_time_field(&self.draft.start, Column::Start)?;
        parse_time_field(&self.draft.end, Column::End)?;

        let saved = Draft::from_row(table, row)?;
        let mut changed = Vec::new();
        for column in Column::ALL {
            let text = self.draft.field(column);
            if text != saved.field(column) {
                changed.push(table.set_cell(row, column.index(), text)?);
            }
        }
        self.draft = Draft::from_row(table, row)?;
        Ok(changed)
    }
}
