//! Record store and its interchange formats.
//!
//! [`records`] owns the in-memory index and the record file; [`interchange`] adds CSV and JSON
//! import/export on top of the same store.

pub mod interchange;
pub mod records;
