use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    Application, ApplicationStatus, ApplicationSubmission, ApprovedEntry, Assignment,
    AssignmentPatch,
};
use crate::ids::{ApplicationId, TournamentId};
use crate::store::{RecordStore, Repository, StoreError};

/// Tournament entry workflow: submission, review and post-approval placement edits.
///
/// Not-found ids come back as `Ok(None)`; only storage failures are errors.
pub struct ApplicationService<S> {
    applications: Repository<S, Application>,
}

impl<S: RecordStore> ApplicationService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            applications: Repository::new(store),
        }
    }

    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<Application, ApplicationServiceError> {
        let ApplicationSubmission {
            tournament_id,
            team_id,
            coach_email,
            tier,
            pool_pref,
        } = submission;

        if tournament_id.as_str().trim().is_empty() {
            return Err(SubmissionError::MissingField("tournament_id").into());
        }
        if team_id.as_str().trim().is_empty() {
            return Err(SubmissionError::MissingField("team_id").into());
        }
        let coach_email = coach_email.trim().to_string();
        if coach_email.is_empty() {
            return Err(SubmissionError::MissingField("coach_email").into());
        }

        let application = Application {
            id: ApplicationId::generate(),
            tournament_id,
            team_id,
            coach_email,
            assigned: Assignment {
                tier: tier.clone(),
                pool: String::new(),
            },
            tier,
            pool_pref: pool_pref.filter(|pool| !pool.trim().is_empty()),
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };

        let stored = self.applications.insert(application)?;
        info!(
            application_id = %stored.id,
            tournament_id = %stored.tournament_id,
            team_id = %stored.team_id,
            "application submitted"
        );
        Ok(stored)
    }

    /// Accept an application into `pool`, resetting the assigned tier to the requested tier.
    ///
    /// Tier overrides are a separate [`ApplicationService::edit_assignment`] call. Approving
    /// a rejected application is allowed and drops the rejection reason.
    pub fn approve(
        &self,
        id: &ApplicationId,
        pool: &str,
    ) -> Result<Option<Application>, StoreError> {
        let approved = self.applications.modify(id.as_str(), |application| {
            if let ApplicationStatus::Rejected { reason } = &application.status {
                warn!(application_id = %application.id, %reason, "approving a rejected application");
            }
            application.status = ApplicationStatus::Approved;
            application.assigned = Assignment {
                tier: application.tier.clone(),
                pool: pool.to_string(),
            };
            true
        })?;

        match &approved {
            Some(application) => info!(
                application_id = %application.id,
                tier = %application.assigned.tier,
                pool = %application.assigned.pool,
                "application approved"
            ),
            None => debug!(application_id = %id, "approve ignored: unknown application"),
        }
        Ok(approved)
    }

    /// Reject with a reason (may be empty). Rejecting again overwrites the reason.
    pub fn reject(
        &self,
        id: &ApplicationId,
        reason: &str,
    ) -> Result<Option<Application>, StoreError> {
        let rejected = self.applications.modify(id.as_str(), |application| {
            application.status = ApplicationStatus::Rejected {
                reason: reason.to_string(),
            };
            true
        })?;

        match &rejected {
            Some(application) => info!(application_id = %application.id, "application rejected"),
            None => debug!(application_id = %id, "reject ignored: unknown application"),
        }
        Ok(rejected)
    }

    /// Merge `patch` into the assignment. Legal in any status; the status is left untouched.
    pub fn edit_assignment(
        &self,
        id: &ApplicationId,
        patch: AssignmentPatch,
    ) -> Result<Option<Application>, StoreError> {
        let edited = self
            .applications
            .modify(id.as_str(), |application| patch.apply(&mut application.assigned))?;

        if let Some(application) = &edited {
            debug!(
                application_id = %application.id,
                status = application.status.label(),
                tier = %application.assigned.tier,
                pool = %application.assigned.pool,
                "assignment edited"
            );
        }
        Ok(edited)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        self.applications.get(id.as_str())
    }

    pub fn list_by_coach(&self, coach_email: &str) -> Result<Vec<Application>, StoreError> {
        let coach_email = coach_email.trim();
        self.applications
            .list(|application| application.coach_email == coach_email)
    }

    pub fn list_by_tournament(
        &self,
        tournament_id: &TournamentId,
    ) -> Result<Vec<Application>, StoreError> {
        self.applications
            .list(|application| &application.tournament_id == tournament_id)
    }

    /// Approved teams of a tournament with their effective tier and pool.
    pub fn approved_entries(
        &self,
        tournament_id: &TournamentId,
    ) -> Result<Vec<ApprovedEntry>, StoreError> {
        Ok(self
            .list_by_tournament(tournament_id)?
            .iter()
            .filter(|application| application.is_approved())
            .map(ApprovedEntry::from)
            .collect())
    }
}

/// Reasons a submission is refused before it reaches the store.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Invalid(#[from] SubmissionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
