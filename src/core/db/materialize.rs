/// Result Materialization Module
///
/// Turns a driver cursor into a `TableListing` that no longer depends on the
/// connection. The cursor is first copied into a detached snapshot; when the
/// cursor cannot be detached, rows are read from the live cursor instead, which
/// only works while the connection is still open.

use crate::core::db::driver::{ResultCursor, ResultHandler};
use crate::core::{MiniQueryError, Result};
use crate::table_listing::{ListingStyle, TableListing};
use tracing::debug;

/// How the rows of a cursor were read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPath {
    Detached,
    Live,
}

/// `ResultHandler` that builds a `TableListing` from any cursor.
#[derive(Debug, Clone)]
pub struct ResultMaterializer {
    style: ListingStyle,
    detach: bool,
    last_path: Option<ReadPath>,
}

impl ResultMaterializer {
    /// `detach = false` skips the snapshot attempt and always reads the live cursor.
    pub fn new(style: ListingStyle, detach: bool) -> Self {
        ResultMaterializer {
            style,
            detach,
            last_path: None,
        }
    }

    /// Path taken by the most recent materialization.
    pub fn last_path(&self) -> Option<ReadPath> {
        self.last_path
    }

    pub fn materialize(&mut self, cursor: &mut dyn ResultCursor) -> Result<TableListing> {
        let mut builder = TableListing::builder().style(self.style.clone());
        for column in cursor.columns() {
            builder = builder.add_field(column.display_name());
        }
        let mut listing = builder.build();

        if self.detach {
            match cursor.detach() {
                Ok(mut snapshot) => {
                    fill(&mut listing, &mut snapshot)?;
                    self.last_path = Some(ReadPath::Detached);
                    return Ok(listing);
                }
                Err(MiniQueryError::DetachUnsupported) => {
                    debug!("cursor cannot be detached, reading it live");
                }
                Err(err) => return Err(err),
            }
        }

        fill(&mut listing, cursor)?;
        self.last_path = Some(ReadPath::Live);
        Ok(listing)
    }
}

impl ResultHandler for ResultMaterializer {
    fn handle(&mut self, cursor: &mut dyn ResultCursor) -> Result<TableListing> {
        self.materialize(cursor)
    }
}

fn fill<C: ResultCursor + ?Sized>(listing: &mut TableListing, cursor: &mut C) -> Result<()> {
    while let Some(row) = cursor.next_row()? {
        listing.add_row(row)?;
    }
    debug!(rows = listing.row_count(), "materialized result");
    Ok(())
}
