use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications. Assigned from wall-clock milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub u64);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Course offering tutors can apply for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Course {
    pub code: &'static str,
    pub name: &'static str,
}

pub const COURSE_CATALOG: [Course; 6] = [
    Course {
        code: "COSC1010",
        name: "Database Concepts",
    },
    Course {
        code: "COSC1220",
        name: "Cloud Computing",
    },
    Course {
        code: "COSC1330",
        name: "Algorithms and Analysis",
    },
    Course {
        code: "COSC2020",
        name: "Data Structures",
    },
    Course {
        code: "COSC3030",
        name: "Full Stack Development",
    },
    Course {
        code: "COSC4040",
        name: "Artificial Intelligence",
    },
];

/// Course code guaranteed to reference an entry of [`COURSE_CATALOG`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let code = raw.trim();
        COURSE_CATALOG
            .iter()
            .find(|course| course.code == code)
            .map(|course| Self(course.code.to_string()))
            .ok_or_else(|| ValidationError::UnknownCourse(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn course(&self) -> Option<&'static Course> {
        COURSE_CATALOG.iter().find(|course| course.code == self.0)
    }
}

impl TryFrom<String> for CourseCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CourseCode> for String {
    fn from(value: CourseCode) -> Self {
        value.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared teaching availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Availability {
    PartTime,
    FullTime,
}

impl Availability {
    pub const fn label(self) -> &'static str {
        match self {
            Availability::PartTime => "Part Time",
            Availability::FullTime => "Full Time",
        }
    }
}

impl FromStr for Availability {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "part time" | "parttime" => Ok(Self::PartTime),
            "full time" | "fulltime" => Ok(Self::FullTime),
            _ => Err(ValidationError::UnknownAvailability(raw.to_string())),
        }
    }
}

impl TryFrom<String> for Availability {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Availability> for &'static str {
    fn from(value: Availability) -> Self {
        value.label()
    }
}

/// Lecturer preference, 1 (most favored) through 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rank(u8);

impl Rank {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::RankOutOfRange(value))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rank {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rank> for u8 {
    fn from(value: Rank) -> Self {
        value.0
    }
}

/// Canonical applicant record as persisted under `tutorApplications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: ApplicantId,
    pub first_name: String,
    pub last_name: String,
    pub course: CourseCode,
    pub availability: Availability,
    pub skills: String,
    pub academic_credentials: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_roles: Option<String>,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Applicant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Trimmed, non-empty comma separated skill segments.
    pub fn skill_tokens(&self) -> impl Iterator<Item = &str> {
        skill_tokens(&self.skills)
    }
}

pub(crate) fn skill_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Tutor form payload before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationSubmission {
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    pub availability: String,
    pub skills: String,
    pub academic_credentials: String,
    pub previous_roles: Option<String>,
}

/// Submission after required-field and catalog checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub first_name: String,
    pub last_name: String,
    pub course: CourseCode,
    pub availability: Availability,
    pub skills: String,
    pub academic_credentials: String,
    pub previous_roles: Option<String>,
}

impl ApplicationSubmission {
    pub fn validate(&self) -> Result<ValidatedSubmission, ValidationError> {
        let first_name = required("firstName", &self.first_name)?;
        let last_name = required("lastName", &self.last_name)?;
        let course = required("course", &self.course)?;
        let availability = required("availability", &self.availability)?;
        let skills = required("skills", &self.skills)?;
        let academic_credentials = required("academicCredentials", &self.academic_credentials)?;

        let skills = skill_tokens(skills).collect::<Vec<_>>().join(", ");
        if skills.is_empty() {
            return Err(ValidationError::MissingField("skills"));
        }

        Ok(ValidatedSubmission {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            course: CourseCode::parse(course)?,
            availability: availability.parse()?,
            skills,
            academic_credentials: academic_credentials.to_string(),
            previous_roles: self
                .previous_roles
                .as_deref()
                .map(str::trim)
                .filter(|roles| !roles.is_empty())
                .map(str::to_string),
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

/// Caller-side input problems. Reported before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unknown course code '{0}'")]
    UnknownCourse(String),
    #[error("availability must be Part Time or Full Time, got '{0}'")]
    UnknownAvailability(String),
    #[error("rank must be between 1 and 10, got {0}")]
    RankOutOfRange(i64),
}
