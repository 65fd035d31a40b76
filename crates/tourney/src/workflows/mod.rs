pub mod applications;
pub mod divisions;
pub mod rosters;
pub mod schedule;
pub mod standings;
