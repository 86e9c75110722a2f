pub mod attendance;
pub mod backup;
pub mod checkpoint;
pub mod config;
pub mod db;
pub mod evaluate;
pub mod fines;
pub mod init;
pub mod log;
pub mod policy;
pub mod roster;
pub mod shift;
