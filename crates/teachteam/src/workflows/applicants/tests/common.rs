use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::store::{KeyValueStore, MemoryStore, StoreError};
use crate::workflows::accounts::{Role, SessionGate, User};
use crate::workflows::applicants::domain::{
    Applicant, ApplicantId, ApplicationSubmission, Availability, CourseCode, Rank,
};

pub(super) fn applicant(
    id: u64,
    first_name: &str,
    last_name: &str,
    course: &str,
    availability: Availability,
    skills: &str,
) -> Applicant {
    Applicant {
        id: ApplicantId(id),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        course: CourseCode::parse(course).expect("catalog course"),
        availability,
        skills: skills.to_string(),
        academic_credentials: "Bachelor of Computer Science".to_string(),
        previous_roles: None,
        is_selected: false,
        rank: None,
        comment: None,
    }
}

pub(super) fn ranked(mut applicant: Applicant, rank: i64) -> Applicant {
    applicant.rank = Some(Rank::new(rank).expect("rank in range"));
    applicant
}

/// Mixed cohort in insertion order.
pub(super) fn cohort() -> Vec<Applicant> {
    vec![
        applicant(1, "Ming", "Chen", "COSC2020", Availability::FullTime, "React, TypeScript"),
        applicant(2, "Aisha", "Rahman", "COSC1010", Availability::PartTime, "SQL, PostgreSQL"),
        applicant(3, "Lucas", "Nguyen", "COSC2020", Availability::PartTime, "Java"),
        applicant(4, "Priya", "Sharma", "COSC1010", Availability::FullTime, "Python, SQL"),
        applicant(5, "Tom", "Walker", "COSC1220", Availability::PartTime, ""),
    ]
}

pub(super) fn submission(first_name: &str, last_name: &str, course: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        course: course.to_string(),
        availability: "Part Time".to_string(),
        skills: "Rust, SQL".to_string(),
        academic_credentials: "Bachelor of IT".to_string(),
        previous_roles: Some("Lab demonstrator".to_string()),
    }
}

pub(super) fn sign_in(store: &MemoryStore, role: Role) {
    let user = User {
        email: format!("{}@teachteam.edu", role.label()),
        password: "Password1!".to_string(),
        role,
    };
    SessionGate::new(store.clone())
        .begin(&user)
        .expect("session starts");
}

/// Memory store whose writes can be switched off.
#[derive(Debug, Default, Clone)]
pub(super) struct FlakyStore {
    inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub(super) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(super) fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}
