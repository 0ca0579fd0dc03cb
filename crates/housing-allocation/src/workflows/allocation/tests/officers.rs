use super::common::*;
use crate::workflows::allocation::{AllocationError, FlatType, RegistrationStatus};

#[test]
fn approval_assigns_the_officer_and_consumes_a_slot() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);

    let id = engine
        .register(&user(OFFICER_B), &acacia)
        .expect("registration accepted");
    assert_eq!(
        engine.registration(&id).expect("stored").status,
        RegistrationStatus::Pending
    );
    assert_eq!(
        engine.project(&acacia).expect("project").remaining_officer_slots(),
        3
    );

    engine.approve_registration(&id).expect("approved");

    let project = engine.project(&acacia).expect("project");
    assert_eq!(project.remaining_officer_slots(), 2);
    assert!(project.officers.contains(&user(OFFICER_B)));
    assert!(engine.officer(&user(OFFICER_B)).expect("officer").handles(&acacia));
    assert_eq!(
        engine.registration(&id).expect("stored").status,
        RegistrationStatus::Approved
    );
}

#[test]
fn officer_cannot_handle_a_project_they_applied_for() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);
    engine
        .apply(&user(OFFICER_A), &acacia, FlatType::ThreeRoom)
        .expect("officer may apply as an applicant");

    assert_eq!(
        engine.register(&user(OFFICER_A), &acacia),
        Err(AllocationError::SelfConflict {
            officer: user(OFFICER_A),
            project: acacia,
        })
    );
    assert_eq!(engine.registrations().count(), 0);
}

#[test]
fn applying_after_registering_blocks_the_approval() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);
    let id = engine
        .register(&user(OFFICER_A), &acacia)
        .expect("registration accepted");
    engine
        .apply(&user(OFFICER_A), &acacia, FlatType::ThreeRoom)
        .expect("officer may apply as an applicant");

    assert_eq!(
        engine.approve_registration(&id),
        Err(AllocationError::SelfConflict {
            officer: user(OFFICER_A),
            project: acacia.clone(),
        })
    );
    assert_eq!(
        engine.registration(&id).expect("stored").status,
        RegistrationStatus::Pending
    );
    assert!(!engine.officer(&user(OFFICER_A)).expect("officer").handles(&acacia));
}

#[test]
fn overlapping_windows_block_a_second_assignment() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);
    // Shares only Mar 20 with Acacia Breeze, which still counts as overlap.
    let boundary = open_project(
        &mut engine,
        draft(
            "Boundary Heights",
            "M-BOUNDARY",
            date(2025, 3, 20),
            date(2025, 4, 30),
            1,
            1,
            2,
        ),
    );
    let later = open_project(
        &mut engine,
        draft(
            "Later Vista",
            "M-LATER",
            date(2025, 3, 21),
            date(2025, 5, 31),
            1,
            1,
            2,
        ),
    );

    approved_registration(&mut engine, OFFICER_B, &acacia);

    assert_eq!(
        engine.register(&user(OFFICER_B), &boundary),
        Err(AllocationError::OverlappingAssignment {
            holder: user(OFFICER_B),
            conflicting: acacia.clone(),
        })
    );
    engine
        .register(&user(OFFICER_B), &later)
        .expect("disjoint window is fine");
}

#[test]
fn approval_rechecks_overlap_against_assignments_granted_meanwhile() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);
    let overlapping = open_project(
        &mut engine,
        draft(
            "Cedar Point",
            "M-CEDAR",
            date(2025, 3, 1),
            date(2025, 3, 31),
            1,
            1,
            2,
        ),
    );

    let first = engine
        .register(&user(OFFICER_B), &acacia)
        .expect("first pending registration");
    let second = engine
        .register(&user(OFFICER_B), &overlapping)
        .expect("pending registrations do not conflict");

    engine.approve_registration(&first).expect("first approved");
    assert_eq!(
        engine.approve_registration(&second),
        Err(AllocationError::OverlappingAssignment {
            holder: user(OFFICER_B),
            conflicting: acacia,
        })
    );
    assert_eq!(
        engine.registration(&second).expect("stored").status,
        RegistrationStatus::Pending
    );
    assert_eq!(
        engine.project(&overlapping).expect("project").remaining_officer_slots(),
        2
    );
}

#[test]
fn full_projects_refuse_further_approvals() {
    let mut engine = engine();
    let single_slot = open_project(
        &mut engine,
        draft(
            "Single Slot Terrace",
            "M-SLOT",
            date(2025, 6, 1),
            date(2025, 6, 30),
            1,
            1,
            1,
        ),
    );

    let first = engine
        .register(&user(OFFICER_A), &single_slot)
        .expect("first registration");
    let second = engine
        .register(&user(OFFICER_B), &single_slot)
        .expect("second registration");

    engine.approve_registration(&first).expect("slot available");
    assert_eq!(
        engine.approve_registration(&second),
        Err(AllocationError::NoSlotsAvailable(single_slot.clone()))
    );

    let project = engine.project(&single_slot).expect("project");
    assert_eq!(project.remaining_officer_slots(), 0);
    assert_eq!(project.officers.len(), 1);
    assert!(!engine.officer(&user(OFFICER_B)).expect("officer").handles(&single_slot));
}

#[test]
fn decisions_only_apply_to_pending_registrations() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);
    let id = engine
        .register(&user(OFFICER_B), &acacia)
        .expect("registration accepted");

    engine.reject_registration(&id).expect("rejected");
    assert_eq!(
        engine.approve_registration(&id),
        Err(AllocationError::InvalidTransition {
            status: "rejected",
            action: "approve a registration",
        })
    );
    assert!(matches!(
        engine.reject_registration(&id),
        Err(AllocationError::InvalidTransition { status: "rejected", .. })
    ));

    // A rejected registration does not block a fresh one.
    engine
        .register(&user(OFFICER_B), &acacia)
        .expect("re-registration after rejection");
}

#[test]
fn duplicate_open_registrations_are_refused() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);
    engine
        .register(&user(OFFICER_B), &acacia)
        .expect("registration accepted");

    assert_eq!(
        engine.register(&user(OFFICER_B), &acacia),
        Err(AllocationError::DuplicateRegistration {
            officer: user(OFFICER_B),
            project: acacia,
        })
    );
}

#[test]
fn registration_views_filter_by_officer_and_manager() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);
    let other = open_project(
        &mut engine,
        draft(
            "Birch Lane",
            "M-BIRCH",
            date(2025, 8, 1),
            date(2025, 8, 31),
            1,
            1,
            2,
        ),
    );
    approved_registration(&mut engine, OFFICER_B, &acacia);
    engine
        .register(&user(OFFICER_B), &other)
        .expect("disjoint window");
    engine
        .register(&user(OFFICER_A), &other)
        .expect("officer has no application");

    assert_eq!(engine.registrations_for_officer(&user(OFFICER_B)).len(), 2);
    assert_eq!(engine.registrations_for_manager(&user("M-BIRCH")).len(), 2);
    assert_eq!(engine.registrations_for_manager(&user("M-ACACIA")).len(), 1);

    let handled: Vec<_> = engine
        .handled_projects(&user(OFFICER_B))
        .expect("known officer")
        .into_iter()
        .map(|project| project.name.clone())
        .collect();
    assert_eq!(handled, vec![acacia]);
    assert!(matches!(
        engine.handled_projects(&user("nobody")),
        Err(AllocationError::UnknownOfficer(_))
    ));
}
