// Domain layer: ledgers, value types and the storage port. Nothing here
// touches the network or the filesystem.

pub mod chores;
pub mod debts;
pub mod model;
pub mod money;
pub mod ports;
pub mod shopping;
pub mod table;
