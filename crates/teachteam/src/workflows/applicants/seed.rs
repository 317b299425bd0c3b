use super::domain::ApplicationSubmission;

fn submission(
    first_name: &str,
    last_name: &str,
    course: &str,
    availability: &str,
    skills: &str,
    academic_credentials: &str,
    previous_roles: Option<&str>,
) -> ApplicationSubmission {
    ApplicationSubmission {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        course: course.to_string(),
        availability: availability.to_string(),
        skills: skills.to_string(),
        academic_credentials: academic_credentials.to_string(),
        previous_roles: previous_roles.map(str::to_string),
    }
}

/// Starter applications written when the tutor portal finds no saved applications.
pub fn default_applications() -> Vec<ApplicationSubmission> {
    vec![
        submission(
            "Ming",
            "Chen",
            "COSC1220",
            "Full Time",
            "React, TypeScript, AWS",
            "Master of IT",
            Some("Software Engineer"),
        ),
        submission(
            "Aisha",
            "Rahman",
            "COSC1010",
            "Part Time",
            "SQL, PostgreSQL, Data Modelling",
            "Bachelor of Computer Science",
            Some("Database Lab Demonstrator"),
        ),
        submission(
            "Lucas",
            "Nguyen",
            "COSC2020",
            "Part Time",
            "Java, Algorithms, Testing",
            "Bachelor of Software Engineering",
            None,
        ),
        submission(
            "Priya",
            "Sharma",
            "COSC4040",
            "Full Time",
            "Python, PyTorch, Machine Learning",
            "PhD candidate in Artificial Intelligence",
            Some("Research Assistant"),
        ),
        submission(
            "Tom",
            "Walker",
            "COSC3030",
            "Full Time",
            "Node.js, React, Docker",
            "Master of Computer Science",
            Some("Full Stack Developer"),
        ),
    ]
}
