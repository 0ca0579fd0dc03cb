use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use housing_allocation::config::AllocationConfig;
use housing_allocation::error::AppError;
use housing_allocation::workflows::allocation::{
    AllocationEngine, AllocationService, Applicant, FlatType, MaritalStatus, ProjectDraft,
    ProjectName, UserId, WithdrawalOutcome,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// First day the sample project accepts applications (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) opens_on: Option<NaiveDate>,
    /// Two-room units offered by the sample project.
    #[arg(long, default_value_t = 1)]
    pub(crate) units: i64,
    /// Print a machine-readable summary after the walkthrough.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct DemoSummary {
    project: ProjectName,
    units_at_start: u32,
    units_after_booking: u32,
    units_after_withdrawal: u32,
    slot_refusal: Option<String>,
}

const MARRIED_APPLICANT: &str = "T0000025A";
const SINGLE_APPLICANT: &str = "S0000036B";
const YOUNG_APPLICANT: &str = "S0000034C";
const FIRST_OFFICER: &str = "T9000001O";
const SECOND_OFFICER: &str = "T9000002O";

fn demo_engine(config: &AllocationConfig) -> Result<AllocationEngine, AppError> {
    let mut engine = AllocationEngine::new(config);
    for (id, age, status) in [
        (MARRIED_APPLICANT, 25, MaritalStatus::Married),
        (SINGLE_APPLICANT, 36, MaritalStatus::Single),
        (YOUNG_APPLICANT, 34, MaritalStatus::Single),
    ] {
        engine.add_applicant(Applicant::new(UserId::new(id), age, status))?;
    }
    engine.add_officer(UserId::new(FIRST_OFFICER))?;
    engine.add_officer(UserId::new(SECOND_OFFICER))?;
    Ok(engine)
}

fn units_left(service: &AllocationService, project: &ProjectName) -> Result<u32, AppError> {
    Ok(service
        .project(project)?
        .inventory
        .available(FlatType::TwoRoom))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AllocationConfig::from_env()?;
    let opens_on = args.opens_on.unwrap_or_else(|| Local::now().date_naive());
    let service = AllocationService::new(demo_engine(&config)?);

    println!("Housing allocation demo");
    let policy = service.read(|engine| *engine.policy());
    println!(
        "Eligibility: singles from {} (two-room only), married couples from {}",
        policy.single_minimum_age(),
        policy.married_minimum_age()
    );

    let project = service
        .create_project(ProjectDraft {
            name: "Riverside Crest".to_string(),
            neighborhood: "Punggol".to_string(),
            opens_on,
            closes_on: opens_on + Duration::days(30),
            manager: UserId::new("M1000000M"),
            officer_slots: 1,
            units: BTreeMap::from([(FlatType::TwoRoom, args.units), (FlatType::ThreeRoom, 2)]),
        })?
        .name;
    service.toggle_visibility(&project)?;
    let units_at_start = units_left(&service, &project)?;
    println!(
        "Project {} open {} -> {}, {} two-room unit(s), 1 officer slot",
        project,
        opens_on,
        opens_on + Duration::days(30),
        units_at_start
    );

    println!("\nBooking scenario");
    match service.apply(&UserId::new(YOUNG_APPLICANT), &project, FlatType::TwoRoom) {
        Ok(application) => println!("- {YOUNG_APPLICANT} applied unexpectedly ({})", application.id),
        Err(err) => println!("- {YOUNG_APPLICANT} refused: {err}"),
    }

    let applicant = UserId::new(MARRIED_APPLICANT);
    let officer = UserId::new(FIRST_OFFICER);
    let application = service.apply(&applicant, &project, FlatType::TwoRoom)?;
    println!(
        "- {} applied for {} -> {}",
        applicant,
        application.flat_type,
        application.status.label()
    );
    let application = service.decide(&application.id, true)?;
    println!("- staff decision -> {}", application.status.label());

    let registration = service.register(&officer, &project)?;
    service.decide_registration(&registration.id, true)?;
    println!("- officer {officer} now handles {project}");

    let application = match service.book(&application.id, Some(&officer)) {
        Ok(application) => application,
        Err(err) => {
            println!("- booking refused: {err}");
            return Ok(());
        }
    };
    let units_after_booking = units_left(&service, &project)?;
    println!(
        "- booked by {officer} -> {}, {units_after_booking} two-room unit(s) left",
        application.status.label()
    );
    let receipt = service.receipt(&officer, &applicant)?;
    println!(
        "  Receipt: {} ({}, {}) {} at {} / {}",
        receipt.applicant,
        receipt.age,
        receipt.marital_status.label(),
        receipt.flat_type,
        receipt.project,
        receipt.neighborhood
    );

    service.request_withdrawal(&applicant)?;
    println!("- {applicant} requested withdrawal");
    let units_after_withdrawal = match service.decide_withdrawal(&application.id, true)? {
        WithdrawalOutcome::Approved { released } => {
            let left = units_left(&service, &project)?;
            match released {
                Some(flat_type) => {
                    println!("- withdrawal approved, {flat_type} unit returned ({left} left)")
                }
                None => println!("- withdrawal approved, nothing to return"),
            }
            left
        }
        WithdrawalOutcome::Rejected => units_after_booking,
    };

    println!("\nOfficer slot scenario");
    let second = UserId::new(SECOND_OFFICER);
    let pending = service.register(&second, &project)?;
    let slot_refusal = match service.decide_registration(&pending.id, true) {
        Ok(_) => {
            println!("- {second} approved");
            None
        }
        Err(err) => {
            println!("- {second} refused: {err}");
            Some(err.kind().to_string())
        }
    };

    if args.json {
        let summary = DemoSummary {
            project,
            units_at_start,
            units_after_booking,
            units_after_withdrawal,
            slot_refusal,
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("\n{json}"),
            Err(err) => println!("\nSummary unavailable: {err}"),
        }
    }

    Ok(())
}
