pub mod checkpoints;
pub mod columns;
pub mod fines;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod participants;
pub mod policies;
pub mod pool;
pub mod shifts;
pub mod stats;
