use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ApplicationId, TeamId, TournamentId};
use crate::store::{Collection, Record};

/// Coach-provided request to enter one team into one tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub coach_email: String,
    /// Requested tier label, e.g. Gold/Silver/Bronze or a custom name.
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub pool_pref: Option<String>,
}

/// Tier and pool a director placed the team into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub tier: String,
    pub pool: String,
}

/// Partial assignment edit; omitted fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPatch {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub pool: Option<String>,
}

impl AssignmentPatch {
    pub(crate) fn apply(self, assignment: &mut Assignment) -> bool {
        let mut changed = false;
        if let Some(tier) = self.tier {
            changed |= assignment.tier != tier;
            assignment.tier = tier;
        }
        if let Some(pool) = self.pool {
            changed |= assignment.pool != pool;
            assignment.pool = pool;
        }
        changed
    }
}

/// Review state. Pending moves to approved or rejected; nothing moves back to pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected { reason: String },
}

impl ApplicationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected { .. } => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub coach_email: String,
    pub tier: String,
    #[serde(default)]
    pub pool_pref: Option<String>,
    pub status: ApplicationStatus,
    pub assigned: Assignment,
    pub created_at: DateTime<Utc>,
}

impl Record for Application {
    const COLLECTION: Collection = Collection::Applications;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Application {
    pub fn is_approved(&self) -> bool {
        matches!(self.status, ApplicationStatus::Approved)
    }

    pub fn reason(&self) -> Option<&str> {
        match &self.status {
            ApplicationStatus::Rejected { reason } => Some(reason),
            ApplicationStatus::Pending | ApplicationStatus::Approved => None,
        }
    }

    /// Tier the team plays in: the assignment when set, otherwise the requested tier.
    pub fn effective_tier(&self) -> &str {
        if self.assigned.tier.is_empty() {
            &self.tier
        } else {
            &self.assigned.tier
        }
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        let assigned = match self.status {
            ApplicationStatus::Approved => Some(self.assigned.clone()),
            ApplicationStatus::Pending | ApplicationStatus::Rejected { .. } => None,
        };

        ApplicationStatusView {
            application_id: self.id.clone(),
            tournament_id: self.tournament_id.clone(),
            team_id: self.team_id.clone(),
            status: self.status.label(),
            requested_tier: self.tier.clone(),
            assigned,
            reason: self.reason().map(str::to_string),
        }
    }
}

/// Coach-facing summary; the assignment only shows once the application is approved.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub status: &'static str,
    pub requested_tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned: Option<Assignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// An approved team and where it was placed, used to fill divisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovedEntry {
    pub application_id: ApplicationId,
    pub team_id: TeamId,
    pub tier: String,
    pub pool: String,
}

impl From<&Application> for ApprovedEntry {
    fn from(application: &Application) -> Self {
        Self {
            application_id: application.id.clone(),
            team_id: application.team_id.clone(),
            tier: application.effective_tier().to_string(),
            pool: application.assigned.pool.clone(),
        }
    }
}
