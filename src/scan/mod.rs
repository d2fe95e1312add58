//! Scan module
//!
//! Rolling iteration over sources whose responses carry their own next
//! cursor, such as `SCAN`-style commands or APIs returning
//! `{ "items": [...], "next": "..." }`.
//!
//! Unlike the page scroller, the cursor is never derived from an entity:
//! each response says where the next one starts, and the scan ends when a
//! response has no next cursor or the end checker accepts the cursor.

mod scanner;

pub use scanner::{CursorScan, CursorScanBuilder, ScanIter};
