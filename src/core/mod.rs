pub mod chore_sheet;
pub mod debt_sheet;
pub mod household;
pub mod shopping_sheet;

pub use household::{Clock, FixedClock, Household, SystemClock, TableLayout};
pub use crate::domain::ports::{Snapshot, TableStore};
pub use crate::utils::error::Result;
