//! Identity and team records the tournament workflows look up but never own.

pub mod router;
pub mod teams;
pub mod users;

pub use router::{team_router, user_router};
pub use teams::{Player, PlayerDraft, Team, TeamDirectory, TeamDraft, TeamRegistry};
pub use users::{Role, User, UserDirectory, DEMO_IDENTITIES};
