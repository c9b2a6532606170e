use std::path::{Path, PathBuf};

use crate::error::{LoopError, LoopResult};
use crate::types::timestamp::{Column, FieldValue, TimestampRecord};
use crate::types::timestamp_list::TimestampCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub row: usize,
    pub column: Column,
}

/// Grid view over a [`TimestampCollection`]: rows are records, columns are
/// start, end and description. Every edit records exactly one changed cell.
#[derive(Debug, Default)]
pub struct TimestampTable {
    collection: TimestampCollection,
    source: Option<PathBuf>,
    changes: Vec<CellIndex>,
}

impl TimestampTable {
    pub fn new(collection: TimestampCollection, source: Option<PathBuf>) -> Self {
        Self {
            collection,
            source,
            changes: Vec::new(),
        }
    }

    pub fn open(path: &Path) -> LoopResult<Self> {
        let collection = TimestampCollection::load_from_file(path)?;
        tracing::info!(path = %path.display(), rows = collection.len(), "loaded timestamps");
        Ok(Self::new(collection, Some(path.to_path_buf())))
    }

    pub fn collection(&self) -> &TimestampCollection {
        &self.collection
    }

    pub fn row_count(&self) -> usize {
        self.collection.len()
    }

    pub fn column_count(&self) -> usize {
        Column::ALL.len()
    }

    pub fn header(&self, column: usize) -> LoopResult<&'static str> {
        Ok(Column::try_from(column)?.header())
    }

    pub fn record(&self, row: usize) -> Option<&TimestampRecord> {
        self.collection.get(row)
    }

    /// Text shown in (and edited from) a cell.
    pub fn display(&self, row: usize, column: usize) -> LoopResult<String> {
        let column = Column::try_from(column)?;
        Ok(self.record_at(row)?.display(column))
    }

    /// Typed cell content for programmatic consumers.
    pub fn value(&self, row: usize, column: usize) -> LoopResult<FieldValue> {
        let column = Column::try_from(column)?;
        Ok(self.record_at(row)?.value(column))
    }

    pub fn set_cell(&mut self, row: usize, column: usize, text: &str) -> LoopResult<CellIndex> {
        self.set_value(row, column, FieldValue::Text(text.to_string()))
    }

    pub fn set_value(
        &mut self,
        row: usize,
        column: usize,
        value: FieldValue,
    ) -> LoopResult<CellIndex> {
        let column = Column::try_from(column)?;
        self.collection.set_field(row, column, value)?;
        let cell = CellIndex { row, column };
        tracing::debug!(row, column = column.index(), "cell changed");
        self.changes.push(cell);
        Ok(cell)
    }

    pub fn append(&mut self, record: TimestampRecord) -> usize {
        self.collection.append(record);
        self.collection.len() - 1
    }

    /// Reorders rows. Callers should treat every row as changed.
    pub fn sort_by_start(&mut self, reverse: bool) {
        self.collection.sort_by_start(reverse);
    }

    /// Drains the cells changed since the last call.
    pub fn take_changes(&mut self) -> Vec<CellIndex> {
        std::mem::take(&mut self.changes)
    }

    pub fn save(&self) -> LoopResult<()> {
        let path = self
            .source
            .as_deref()
            .ok_or(LoopError::NothingToPlay { what: "timestamp" })?;
        self.collection.save_to_file(path)?;
        tracing::info!(path = %path.display(), "saved timestamps");
        Ok(())
    }

    fn record_at(&self, row: usize) -> LoopResult<&TimestampRecord> {
        self.collection.get(row).ok_or(LoopError::RowOutOfRange {
            row,
            len: self.collection.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::timestamp::UNBOUNDED;

    fn table() -> TimestampTable {
        TimestampTable::new(
            TimestampCollection::from_records(vec![
                TimestampRecord::new(1000, 5000, "verse"),
                TimestampRecord::new(5000, UNBOUNDED, "outro"),
            ]),
            None,
        )
    }

    #[test]
    fn display_and_value_are_separate_modes() {
        let table = table();
        assert_eq!(table.display(0, 0).unwrap(), "0:00:01.000");
        assert_eq!(table.value(0, 0).unwrap(), FieldValue::Millis(1000));
        assert_eq!(table.display(1, 1).unwrap(), "");
        assert_eq!(table.value(1, 1).unwrap(), FieldValue::Millis(UNBOUNDED));
        assert_eq!(
            table.value(1, 2).unwrap(),
            FieldValue::Text("outro".to_string())
        );
    }

    #[test]
    fn headers_follow_the_schema() {
        let table = table();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.header(0).unwrap(), "Start Time");
        assert_eq!(table.header(1).unwrap(), "End Time");
        assert_eq!(table.header(2).unwrap(), "Description");
        assert!(table.header(3).is_err());
    }

    #[test]
    fn set_cell_notifies_only_that_cell() {
        let mut table = table();
        let cell = table.set_cell(1, 1, "0:00:09.500").unwrap();
        assert_eq!(
            cell,
            CellIndex {
                row: 1,
                column: Column::End
            }
        );
        assert_eq!(table.take_changes(), vec![cell]);
        assert!(table.take_changes().is_empty());
        assert_eq!(table.value(1, 1).unwrap(), FieldValue::Millis(9500));
    }

    #[test]
    fn bad_time_text_leaves_the_cell_alone() {
        let mut table = table();
        let err = table.set_cell(0, 0, "soon").unwrap_err();
        assert!(matches!(err, LoopError::InvalidTimeFormat { .. }));
        assert!(table.take_changes().is_empty());
        assert_eq!(table.display(0, 0).unwrap(), "0:00:01.000");
        assert!(table.set_cell(0, 2, "still editable").is_ok());
    }

    #[test]
    fn out_of_range_addresses_are_errors() {
        let mut table = table();
        assert!(matches!(
            table.display(7, 0),
            Err(LoopError::RowOutOfRange { row: 7, len: 2 })
        ));
        assert!(matches!(
            table.set_cell(0, 5, "x"),
            Err(LoopError::InvalidColumn { column: 5 })
        ));
    }

    #[test]
    fn save_rewrites_the_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.tmsp");
        table().collection().save_to_file(&path).unwrap();

        let mut table = TimestampTable::open(&path).unwrap();
        table.set_cell(0, 2, "chorus").unwrap();
        table.save().unwrap();

        let reloaded = TimestampTable::open(&path).unwrap();
        assert_eq!(reloaded.display(0, 2).unwrap(), "chorus");
    }

    #[test]
    fn save_without_source_fails() {
        assert!(table().save().is_err());
    }
}
