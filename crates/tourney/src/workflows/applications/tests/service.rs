use super::common::*;
use crate::ids::{ApplicationId, TeamId, TournamentId};
use crate::workflows::applications::{
    ApplicationServiceError, ApplicationStatus, Assignment, AssignmentPatch, SubmissionError,
};

#[test]
fn submit_creates_pending_application_with_requested_tier() {
    let (service, _) = build_service();

    let application = service
        .submit(submission("T1", "Gold"))
        .expect("submission succeeds");

    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(
        application.assigned,
        Assignment {
            tier: "Gold".to_string(),
            pool: String::new(),
        }
    );
    assert_eq!(application.pool_pref.as_deref(), Some("B"));
    assert_eq!(
        service.get(&application.id).expect("get"),
        Some(application)
    );
}

#[test]
fn submit_rejects_blank_identifiers() {
    let (service, _) = build_service();
    let mut blank_team = submission("T1", "Gold");
    blank_team.team_id = TeamId::from("  ");

    match service.submit(blank_team) {
        Err(ApplicationServiceError::Invalid(SubmissionError::MissingField("team_id"))) => {}
        other => panic!("expected missing team id, got {other:?}"),
    }

    let mut blank_coach = submission("T1", "Gold");
    blank_coach.coach_email = String::new();
    assert!(matches!(
        service.submit(blank_coach),
        Err(ApplicationServiceError::Invalid(SubmissionError::MissingField(
            "coach_email"
        )))
    ));
}

#[test]
fn approve_assigns_requested_tier_and_given_pool_then_edits_merge() {
    let (service, _) = build_service();
    let application = service.submit(submission("T1", "Gold")).expect("submit");

    let approved = service
        .approve(&application.id, "B")
        .expect("approve")
        .expect("known application");
    assert_eq!(approved.status, ApplicationStatus::Approved);
    assert_eq!(
        approved.assigned,
        Assignment {
            tier: "Gold".to_string(),
            pool: "B".to_string(),
        }
    );

    let edited = service
        .edit_assignment(
            &application.id,
            AssignmentPatch {
                tier: Some("Silver".to_string()),
                pool: None,
            },
        )
        .expect("edit")
        .expect("known application");
    assert_eq!(
        edited.assigned,
        Assignment {
            tier: "Silver".to_string(),
            pool: "B".to_string(),
        }
    );
    assert_eq!(edited.status, ApplicationStatus::Approved);
}

#[test]
fn approve_overwrites_previous_tier_override() {
    let (service, _) = build_service();
    let application = service.submit(submission("T1", "Gold")).expect("submit");
    service
        .edit_assignment(
            &application.id,
            AssignmentPatch {
                tier: Some("Bronze".to_string()),
                pool: Some("C".to_string()),
            },
        )
        .expect("edit");

    let approved = service
        .approve(&application.id, "A")
        .expect("approve")
        .expect("known application");
    assert_eq!(approved.assigned.tier, "Gold");
    assert_eq!(approved.assigned.pool, "A");
}

#[test]
fn reject_stores_reason_and_can_be_repeated() {
    let (service, _) = build_service();
    let application = service.submit(submission("T1", "Gold")).expect("submit");

    let rejected = service
        .reject(&application.id, "division full")
        .expect("reject")
        .expect("known application");
    assert_eq!(rejected.reason(), Some("division full"));

    let again = service
        .reject(&application.id, "")
        .expect("reject")
        .expect("known application");
    assert_eq!(
        again.status,
        ApplicationStatus::Rejected {
            reason: String::new()
        }
    );
}

#[test]
fn approving_a_rejected_application_clears_the_reason() {
    let (service, _) = build_service();
    let application = service.submit(submission("T1", "Gold")).expect("submit");
    service.reject(&application.id, "late").expect("reject");

    let approved = service
        .approve(&application.id, "A")
        .expect("approve")
        .expect("known application");
    assert!(approved.is_approved());
    assert_eq!(approved.reason(), None);
}

#[test]
fn unknown_ids_are_not_found_rather_than_errors() {
    let (service, _) = build_service();
    let missing = ApplicationId::from("app-missing");

    assert!(service.approve(&missing, "A").expect("approve").is_none());
    assert!(service.reject(&missing, "x").expect("reject").is_none());
    assert!(service
        .edit_assignment(&missing, AssignmentPatch::default())
        .expect("edit")
        .is_none());
    assert!(service.get(&missing).expect("get").is_none());
}

#[test]
fn listings_filter_by_coach_and_tournament() {
    let (service, _) = build_service();
    service.submit(submission("T1", "Gold")).expect("submit");
    let mut elsewhere = submission("T2", "Silver");
    elsewhere.tournament_id = TournamentId::from("river-city-cup-2025");
    elsewhere.coach_email = "other@example.com".to_string();
    service.submit(elsewhere).expect("submit");

    assert_eq!(
        service
            .list_by_coach("coach@example.com")
            .expect("list")
            .len(),
        1
    );
    let in_tournament = service.list_by_tournament(&tournament()).expect("list");
    assert_eq!(in_tournament.len(), 1);
    assert_eq!(in_tournament[0].team_id, TeamId::from("T1"));
}

#[test]
fn approved_entries_use_effective_placement() {
    let (service, _) = build_service();
    let gold = service.submit(submission("T1", "Gold")).expect("submit");
    let silver = service.submit(submission("T2", "Silver")).expect("submit");
    service.submit(submission("T3", "Gold")).expect("submit");

    service.approve(&gold.id, "A").expect("approve");
    service.approve(&silver.id, "B").expect("approve");
    service
        .edit_assignment(
            &silver.id,
            AssignmentPatch {
                tier: Some("Gold".to_string()),
                pool: None,
            },
        )
        .expect("edit");

    let entries = service.approved_entries(&tournament()).expect("entries");
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|entry| entry.tier == "Gold"));
    assert!(entries
        .iter()
        .any(|entry| entry.team_id == TeamId::from("T2") && entry.pool == "B"));
}

#[test]
fn concurrent_submissions_are_all_stored() {
    let (service, _) = build_service();

    std::thread::scope(|scope| {
        for worker in 0..16 {
            let service = service.clone();
            scope.spawn(move || {
                for n in 0..25 {
                    service
                        .submit(submission(&format!("T{worker}-{n}"), "Gold"))
                        .expect("submission succeeds");
                }
            });
        }
    });

    let stored = service.list_by_tournament(&tournament()).expect("list");
    assert_eq!(stored.len(), 16 * 25);
}
