//! Workflow integration tests against the in-memory store.

mod fixture;

use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use domain::{
    CandidateState, ErrorKind, HrState, InboxPage, InvitationDraft, MappingRequest,
    RequestStatus, Role, ScheduleDenial,
};
use fixture::Fixture;
use mapping_service_lib::service::{
    AssignmentService, AuditService, CascadeService, MappingWorkflow, MessagingService,
    ProfileService, ServiceContainer,
};

#[tokio::test]
async fn test_apply_accept_assign_then_delete_hr() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let hr = fx.hr(HrState::ProfileComplete).await;
    let other_hr = fx
        .hr(HrState::Mapped {
            admin_manager_id: admin.id,
        })
        .await;
    let candidate = fx.candidate(CandidateState::PendingAssignment).await;
    let workflow = fx.services.workflow();
    let assignments = fx.services.assignments();

    // HR applies
    let application = assert_ok!(workflow.create_application(hr.id, admin.id).await);
    assert_eq!(application.status, RequestStatus::Pending);
    assert_eq!(fx.hr_state(hr.id).await, HrState::ApplicationPending);

    // Admin accepts
    let accepted = assert_ok!(workflow.accept(application.id, admin.id).await);
    assert_eq!(accepted.status, RequestStatus::Accepted);
    assert_eq!(fx.request(application.id).await.status, RequestStatus::Accepted);
    assert_eq!(
        fx.hr_state(hr.id).await,
        HrState::Mapped {
            admin_manager_id: admin.id
        }
    );

    // Candidate assigned to the mapped HR
    assert_ok!(assignments.assign_candidate(candidate.id, hr.id).await);
    assert_eq!(
        fx.candidate_state(candidate.id).await,
        CandidateState::Assigned {
            assigned_hr_id: hr.id
        }
    );

    let owner = assert_ok!(assignments.can_schedule_interview(candidate.id, hr.id).await);
    assert!(owner.allowed);
    let stranger = assert_ok!(
        assignments
            .can_schedule_interview(candidate.id, other_hr.id)
            .await
    );
    assert!(!stranger.allowed);
    assert_eq!(stranger.denial, Some(ScheduleDenial::HrNotOwner));

    // Admin deletes the HR
    let report = assert_ok!(fx.services.cascade().delete_user(admin.id, hr.id).await);
    assert_eq!(report.released_candidates, 1);
    assert!(fx.user(hr.id).await.is_none());
    assert_eq!(
        fx.candidate_state(candidate.id).await,
        CandidateState::PendingAssignment
    );
}

#[tokio::test]
async fn test_voluntary_unmap_returns_to_profile_complete() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let hr = fx
        .hr(HrState::Mapped {
            admin_manager_id: admin.id,
        })
        .await;

    let report = assert_ok!(fx.services.workflow().unmap(hr.id).await);

    assert_eq!(report.admin_id, admin.id);
    assert_eq!(report.released_candidates, 0);
    assert_eq!(fx.hr_state(hr.id).await, HrState::ProfileComplete);
    assert_eq!(fx.user(hr.id).await.unwrap().hr_state().unwrap().admin_manager_id(), None);

    let err = assert_err!(fx.services.workflow().unmap(hr.id).await);
    assert_eq!(err.code(), "NOT_MAPPED");
}

#[tokio::test]
async fn test_unmap_releases_owned_candidates() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let hr = fx
        .hr(HrState::Mapped {
            admin_manager_id: admin.id,
        })
        .await;
    let candidate = fx
        .candidate(CandidateState::Assigned {
            assigned_hr_id: hr.id,
        })
        .await;

    let report = assert_ok!(fx.services.workflow().unmap(hr.id).await);

    assert_eq!(report.released_candidates, 1);
    assert_eq!(
        fx.candidate_state(candidate.id).await,
        CandidateState::PendingAssignment
    );
}

#[tokio::test]
async fn test_accept_closes_every_competing_interaction() {
    let fx = Fixture::new();
    let first = fx.admin().await;
    let second = fx.admin().await;
    let third = fx.admin().await;
    let hr = fx.hr(HrState::AdminRequestPending).await;

    let chosen = MappingRequest::request(first.id, hr.id);
    let competing = MappingRequest::request(second.id, hr.id);
    let outgoing = MappingRequest::application(hr.id, third.id);
    for request in [&chosen, &competing, &outgoing] {
        fx.seed_request(request).await;
    }

    assert_ok!(fx.services.workflow().accept(chosen.id, hr.id).await);

    assert_eq!(fx.request(chosen.id).await.status, RequestStatus::Accepted);
    assert_eq!(fx.request(competing.id).await.status, RequestStatus::Rejected);
    assert_eq!(fx.request(outgoing.id).await.status, RequestStatus::Cancelled);
    assert!(fx.pending_for_hr(hr.id).await.is_empty());
}

#[tokio::test]
async fn test_reject_returns_hr_to_profile_complete() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let hr = fx.hr(HrState::ProfileComplete).await;
    let workflow = fx.services.workflow();

    let request = assert_ok!(workflow.create_request(admin.id, hr.id).await);
    assert_eq!(fx.hr_state(hr.id).await, HrState::AdminRequestPending);

    let rejected = assert_ok!(workflow.reject(request.id, hr.id).await);

    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(fx.hr_state(hr.id).await, HrState::ProfileComplete);

    // Already actioned looks the same as never existing
    let err = assert_err!(workflow.reject(request.id, hr.id).await);
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_reject_keeps_status_owned_by_other_interaction() {
    let fx = Fixture::new();
    let first = fx.admin().await;
    let second = fx.admin().await;
    let hr = fx.hr(HrState::AdminRequestPending).await;

    let rejected = MappingRequest::request(first.id, hr.id);
    let remaining = MappingRequest::request(second.id, hr.id);
    fx.seed_request(&rejected).await;
    fx.seed_request(&remaining).await;

    assert_ok!(fx.services.workflow().reject(rejected.id, hr.id).await);

    assert_eq!(fx.hr_state(hr.id).await, HrState::AdminRequestPending);
    assert_eq!(fx.request(remaining.id).await.status, RequestStatus::Pending);
}

#[tokio::test]
async fn test_only_the_target_may_respond() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let other_admin = fx.admin().await;
    let hr = fx.hr(HrState::ProfileComplete).await;
    let workflow = fx.services.workflow();

    let application = assert_ok!(workflow.create_application(hr.id, admin.id).await);

    let err = assert_err!(workflow.accept(application.id, other_admin.id).await);
    assert_eq!(err.code(), "NOT_FOUND");

    // The requester is not the target either
    let err = assert_err!(workflow.accept(application.id, hr.id).await);
    assert_eq!(err.code(), "NOT_FOUND");

    let err = assert_err!(workflow.accept(Uuid::new_v4(), admin.id).await);
    assert_eq!(err.code(), "NOT_FOUND");

    assert_eq!(fx.hr_state(hr.id).await, HrState::ApplicationPending);
}

#[tokio::test]
async fn test_wrong_role_target_is_refused() {
    let fx = Fixture::new();
    let hr = fx.hr(HrState::ApplicationPending).await;
    let other_hr = fx.hr(HrState::ProfileComplete).await;

    // An application must be answered by an admin
    let misaddressed = MappingRequest::application(hr.id, other_hr.id);
    fx.seed_request(&misaddressed).await;

    let err = assert_err!(fx.services.workflow().accept(misaddressed.id, other_hr.id).await);

    assert_eq!(err.code(), "WRONG_ROLE");
    assert_eq!(fx.hr_state(hr.id).await, HrState::ApplicationPending);
}

#[tokio::test]
async fn test_application_preconditions() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let fresh_hr = fx.hr(HrState::PendingProfile).await;
    let hr = fx.hr(HrState::ProfileComplete).await;
    let mapped = fx
        .hr(HrState::Mapped {
            admin_manager_id: admin.id,
        })
        .await;
    let workflow = fx.services.workflow();

    let err = assert_err!(workflow.create_application(fresh_hr.id, admin.id).await);
    assert_eq!(err.code(), "NOT_ELIGIBLE");

    let err = assert_err!(workflow.create_application(mapped.id, admin.id).await);
    assert_eq!(err.code(), "NOT_ELIGIBLE");

    let err = assert_err!(workflow.create_application(hr.id, mapped.id).await);
    assert_eq!(err.code(), "TARGET_NOT_FOUND");

    assert_ok!(workflow.create_application(hr.id, admin.id).await);
    let err = assert_err!(workflow.create_application(hr.id, admin.id).await);
    assert_eq!(err.code(), "ALREADY_PENDING");

    // An admin cannot ask an HR that is already waiting on an application
    let err = assert_err!(workflow.create_request(admin.id, hr.id).await);
    assert_eq!(err.code(), "ALREADY_PENDING");
    assert_eq!(fx.pending_for_hr(hr.id).await.len(), 1);
}

#[tokio::test]
async fn test_request_preconditions() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let mapped = fx
        .hr(HrState::Mapped {
            admin_manager_id: admin.id,
        })
        .await;
    let candidate = fx.candidate(CandidateState::PendingResume).await;
    let workflow = fx.services.workflow();

    let err = assert_err!(workflow.create_request(admin.id, mapped.id).await);
    assert_eq!(err.code(), "ALREADY_MAPPED");

    let err = assert_err!(workflow.create_request(admin.id, candidate.id).await);
    assert_eq!(err.code(), "TARGET_NOT_FOUND");

    let err = assert_err!(workflow.create_request(mapped.id, candidate.id).await);
    assert_eq!(err.code(), "NOT_ELIGIBLE");
}

#[tokio::test]
async fn test_assignment_preconditions() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let mapped = fx
        .hr(HrState::Mapped {
            admin_manager_id: admin.id,
        })
        .await;
    let unmapped = fx.hr(HrState::ProfileComplete).await;
    let waiting = fx.candidate(CandidateState::PendingAssignment).await;
    let no_resume = fx.candidate(CandidateState::PendingResume).await;
    let assignments = fx.services.assignments();

    let err = assert_err!(assignments.assign_candidate(no_resume.id, mapped.id).await);
    assert_eq!(err.code(), "NOT_ELIGIBLE_CANDIDATE");

    let err = assert_err!(assignments.assign_candidate(waiting.id, unmapped.id).await);
    assert_eq!(err.code(), "NOT_ELIGIBLE_HR");

    let err = assert_err!(assignments.assign_candidate(waiting.id, admin.id).await);
    assert_eq!(err.code(), "NOT_ELIGIBLE_HR");

    assert_eq!(
        fx.candidate_state(waiting.id).await,
        CandidateState::PendingAssignment
    );

    // Admins may schedule any assigned candidate, nobody schedules an unassigned one
    let decision = assert_ok!(assignments.can_schedule_interview(waiting.id, admin.id).await);
    assert_eq!(decision.denial, Some(ScheduleDenial::NotAssigned));
}

#[tokio::test]
async fn test_profile_steps_feed_the_workflow() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let profiles = fx.services.profiles();

    let hr = assert_ok!(
        profiles
            .register_user("recruiter".into(), "Recruiter@Example.com".into(), Role::Hr)
            .await
    );
    assert_eq!(hr.email, "recruiter@example.com");
    assert_eq!(hr.hr_state(), Some(HrState::PendingProfile));

    let err = assert_err!(fx.services.workflow().available_admins(hr.id).await);
    assert_eq!(err.code(), "NOT_ELIGIBLE");

    let partial = assert_ok!(profiles.update_hr_profile(hr.id, Some(4), None).await);
    assert_eq!(partial.hr_state(), Some(HrState::PendingProfile));

    let complete = assert_ok!(
        profiles
            .update_hr_profile(hr.id, None, Some("resumes/r.pdf".into()))
            .await
    );
    assert_eq!(complete.hr_state(), Some(HrState::ProfileComplete));

    let admins = assert_ok!(fx.services.workflow().available_admins(hr.id).await);
    assert_eq!(admins.iter().map(|a| a.id).collect::<Vec<_>>(), vec![admin.id]);

    let candidate = assert_ok!(
        profiles
            .register_user("applicant".into(), "applicant@example.com".into(), Role::Candidate)
            .await
    );
    let candidate = assert_ok!(
        profiles
            .record_candidate_resume(candidate.id, "resumes/c.pdf".into())
            .await
    );
    assert_eq!(
        candidate.candidate_state(),
        Some(CandidateState::PendingAssignment)
    );

    let err = assert_err!(
        profiles
            .register_user("again".into(), "applicant@example.com".into(), Role::Candidate)
            .await
    );
    assert_eq!(err.code(), "CONFLICT");
}

#[tokio::test]
async fn test_pending_listings() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let first = fx.hr(HrState::ProfileComplete).await;
    let second = fx.hr(HrState::ProfileComplete).await;
    let asked = fx.hr(HrState::ProfileComplete).await;
    let workflow = fx.services.workflow();

    let a1 = assert_ok!(workflow.create_application(first.id, admin.id).await);
    let a2 = assert_ok!(workflow.create_application(second.id, admin.id).await);
    let r1 = assert_ok!(workflow.create_request(admin.id, asked.id).await);

    let applications = assert_ok!(workflow.pending_applications_for_admin(admin.id).await);
    assert_eq!(
        applications.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![a1.id, a2.id]
    );

    let requests = assert_ok!(workflow.pending_requests_for_hr(asked.id).await);
    assert_eq!(requests.iter().map(|r| r.id).collect::<Vec<_>>(), vec![r1.id]);

    let err = assert_err!(workflow.pending_requests_for_hr(admin.id).await);
    assert_eq!(err.code(), "WRONG_ROLE");
}

#[tokio::test]
async fn test_delete_user_rules() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let other_admin = fx.admin().await;
    let hr = fx.hr(HrState::ProfileComplete).await;
    let candidate = fx.candidate(CandidateState::PendingResume).await;
    let cascade = fx.services.cascade();

    let err = assert_err!(cascade.delete_user(admin.id, admin.id).await);
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err = assert_err!(cascade.delete_user(admin.id, other_admin.id).await);
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err = assert_err!(cascade.delete_user(hr.id, candidate.id).await);
    assert_eq!(err.code(), "WRONG_ROLE");

    let err = assert_err!(cascade.delete_user(admin.id, Uuid::new_v4()).await);
    assert_eq!(err.code(), "NOT_FOUND");

    // A pending HR leaves no open interaction behind
    assert_ok!(fx.services.workflow().create_request(admin.id, hr.id).await);
    let report = assert_ok!(cascade.delete_user(admin.id, hr.id).await);
    assert_eq!(report.role, Role::Hr);
    assert_eq!(report.cancelled_requests, 1);
    assert!(fx.pending_for_hr(hr.id).await.is_empty());

    let report = assert_ok!(cascade.delete_user(admin.id, candidate.id).await);
    assert_eq!(report.role, Role::Candidate);
    assert!(fx.user(candidate.id).await.is_none());
}

#[tokio::test]
async fn test_on_hr_deleted_is_idempotent() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let hr = fx
        .hr(HrState::Mapped {
            admin_manager_id: admin.id,
        })
        .await;
    for _ in 0..2 {
        fx.candidate(CandidateState::Assigned {
            assigned_hr_id: hr.id,
        })
        .await;
    }
    let cascade = fx.services.cascade();

    assert_eq!(assert_ok!(cascade.on_hr_deleted(hr.id).await), 2);
    assert_eq!(assert_ok!(cascade.on_hr_deleted(hr.id).await), 0);
}

#[tokio::test]
async fn test_audit_and_stats() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let hr = fx.hr(HrState::ProfileComplete).await;
    fx.candidate(CandidateState::PendingAssignment).await;
    let workflow = fx.services.workflow();

    let application = assert_ok!(workflow.create_application(hr.id, admin.id).await);
    assert_ok!(workflow.accept(application.id, admin.id).await);

    let report = assert_ok!(fx.services.audit().audit().await);
    assert!(report.is_clean(), "{:?}", report.violations);

    let stats = assert_ok!(fx.services.audit().stats().await);
    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.mapped_hrs, 1);
    assert_eq!(stats.assigned_candidates, 0);
    assert_eq!(stats.pending_requests, 0);

    // Candidate pointing at an HR that never existed
    fx.candidate(CandidateState::Assigned {
        assigned_hr_id: Uuid::new_v4(),
    })
    .await;
    let report = assert_ok!(fx.services.audit().audit().await);
    assert_eq!(report.violations.len(), 1);
}

#[tokio::test]
async fn test_mapped_hr_invites_candidate_who_reads_inbox() {
    let fx = Fixture::new();
    let admin = fx.admin().await;
    let hr = fx.hr(HrState::ProfileComplete).await;
    let candidate = fx.candidate(CandidateState::PendingAssignment).await;
    let messaging = fx.services.messaging();
    let invite = |content: &str| InvitationDraft {
        subject: None,
        content: content.to_string(),
    };

    // Not mapped yet
    let err = assert_err!(messaging.send_invitation(hr.id, candidate.id, invite("hi")).await);
    assert_eq!(err.code(), "NOT_MAPPED");

    let workflow = fx.services.workflow();
    let application = assert_ok!(workflow.create_application(hr.id, admin.id).await);
    assert_ok!(workflow.accept(application.id, admin.id).await);

    let first = assert_ok!(
        messaging
            .send_invitation(hr.id, candidate.id, invite("First round?"))
            .await
    );
    let second = assert_ok!(
        messaging
            .send_invitation(
                hr.id,
                candidate.id,
                InvitationDraft {
                    subject: Some("Follow-up".into()),
                    content: "Still interested?".into(),
                },
            )
            .await
    );
    assert_eq!(first.subject, "Invitation from recruiter");

    let inbox = assert_ok!(messaging.inbox(candidate.id, InboxPage::default()).await);
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().all(|message| !message.is_read()));

    // Only the candidate's own unread messages change
    let marked = assert_ok!(
        messaging
            .mark_read(candidate.id, vec![first.id, Uuid::new_v4()])
            .await
    );
    assert_eq!(marked, 1);
    assert_eq!(assert_ok!(messaging.mark_read(candidate.id, vec![first.id]).await), 0);

    let inbox = assert_ok!(messaging.inbox(candidate.id, InboxPage::default()).await);
    let unread: Vec<Uuid> = inbox
        .iter()
        .filter(|message| !message.is_read())
        .map(|message| message.id)
        .collect();
    assert_eq!(unread, vec![second.id]);

    // Once assigned the candidate can no longer be invited
    assert_ok!(
        fx.services
            .assignments()
            .assign_candidate(candidate.id, hr.id)
            .await
    );
    let err = assert_err!(
        messaging
            .send_invitation(hr.id, candidate.id, invite("Another?"))
            .await
    );
    assert_eq!(err.code(), "NOT_ELIGIBLE_CANDIDATE");

    // HRs have no inbox here
    let err = assert_err!(messaging.inbox(hr.id, InboxPage::default()).await);
    assert_eq!(err.code(), "WRONG_ROLE");
}
