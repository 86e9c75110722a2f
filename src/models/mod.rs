pub mod check_in_method;
pub mod checkpoint;
pub mod fine;
pub mod fine_policy;
pub mod participant;
pub mod shift;
pub mod violation_kind;
