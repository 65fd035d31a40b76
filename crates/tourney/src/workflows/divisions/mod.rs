//! Divisions: tier+pool groupings of approved teams, their round-robin fixtures, results
//! and the publish switch that gates public views.

pub mod domain;
pub mod fixtures;
pub mod router;
pub mod scores;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Division, DivisionDraft, Match, MatchDetailsPatch};
pub use router::{division_router, public_router};
pub use scores::{parse_score, score_from_json, MAX_SCORE};
pub use service::DivisionService;
