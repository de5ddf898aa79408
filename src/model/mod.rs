//! Data model for two-state score reconciliation.
//!
//! Raw input arrives as [`ScoreRecord`]s grouped into one [`RecordSet`] per
//! reference state. The engine reduces them into [`ScoreCell`]s and emits one
//! [`GroupResult`] per rankable group.

mod cell;
mod group;
mod record;
mod result;

pub use cell::*;
pub use group::*;
pub use record::*;
pub use result::*;
