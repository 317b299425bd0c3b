use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use teachteam::config::StorageConfig;
use teachteam::error::AppError;
use teachteam::workflows::accounts::{AccountService, SignInRequest, StaticCaptchaVerifier};
use teachteam::workflows::applicants::{
    Applicant, ApplicantService, ConfirmOutcome, FilterCriteria, SortKey,
};

use crate::infra::{open_store, seed_defaults};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Run against JSON files in this directory instead of a throwaway in-memory store.
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Limit the dashboard to one course code (e.g. COSC2020).
    #[arg(long)]
    pub(crate) course: Option<String>,
    /// Sort pending applicants by `course` or `availability`.
    #[arg(long)]
    pub(crate) sort: Option<SortKey>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        data_dir,
        course,
        sort,
    } = args;

    let store = open_store(&StorageConfig { data_dir })?;
    let accounts = AccountService::new(store.clone(), Arc::new(StaticCaptchaVerifier::accepting()));
    let applicants = ApplicantService::new(store);
    seed_defaults(&accounts, &applicants)?;

    let lecturer = accounts.sign_in(SignInRequest {
        email: "lecturer@teachteam.edu".to_string(),
        password: "Lecturer123!".to_string(),
    })?;
    println!("TeachTeam review demo");
    println!("Signed in as {} ({})", lecturer.email, lecturer.role);

    let everyone = applicants.dashboard(&FilterCriteria::default(), None)?;
    let picks: Vec<Applicant> = everyone.pending.iter().take(3).cloned().collect();
    for (rank, applicant) in (1_i64..).zip(&picks) {
        match applicants.confirm(applicant.id)? {
            ConfirmOutcome::Confirmed { acknowledgment } => println!("- {acknowledgment}"),
            ConfirmOutcome::AlreadyConfirmed => {
                println!("- {} was already confirmed", applicant.full_name())
            }
        }
        applicants.set_rank(applicant.id, rank)?;
    }

    let criteria = course
        .as_deref()
        .map_or_else(FilterCriteria::default, FilterCriteria::course);
    let dashboard = applicants.dashboard(&criteria, sort)?;

    println!("\nPending applicants");
    if dashboard.pending.is_empty() {
        println!("  (none)");
    }
    for applicant in &dashboard.pending {
        print_applicant(applicant);
    }

    println!("\nConfirmed applicants");
    if dashboard.confirmed.is_empty() {
        println!("  (none)");
    }
    for applicant in &dashboard.confirmed {
        print_applicant(applicant);
    }

    if let Some(message) = dashboard.message {
        println!("\n{message}");
    }

    let stats = applicants.statistics()?;
    println!("\nSelection summary");
    println!("- Most chosen: {}", stats.describe_most_chosen());
    println!("- Least chosen: {}", stats.describe_least_chosen());
    println!("- Not selected: {}", stats.not_selected.len());
    for applicant in &stats.not_selected {
        println!("  - {}", applicant.full_name());
    }

    accounts.sign_out()?;
    Ok(())
}

fn print_applicant(applicant: &Applicant) {
    let rank = applicant
        .rank
        .map(|rank| format!(" | rank {}", rank.get()))
        .unwrap_or_default();
    let course = applicant
        .course
        .course()
        .map_or_else(
            || applicant.course.to_string(),
            |course| format!("{} {}", course.code, course.name),
        );
    println!(
        "  - {} [{}] {} | {}{}",
        applicant.full_name(),
        course,
        applicant.availability.label(),
        applicant.skills,
        rank
    );
}
