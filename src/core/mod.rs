pub mod attendance;
pub mod backup;
pub mod calculator;
pub mod checkpoint;
pub mod engine;
pub mod ledger;
pub mod log;
pub mod policy;
pub mod roster;
pub mod shift;
