use crate::models::job_role::ExperienceLevel;

/// Separator between career-path segments, e.g. "Data > Analytics".
pub const CAREER_PATH_DELIMITER: &str = " > ";

/// Five-rung title ladder for a role. Only the last career-path segment is used.
pub fn build_career_progression(
    title: &str,
    career_path: &str,
    level: ExperienceLevel,
) -> Vec<String> {
    let track = career_path
        .split(CAREER_PATH_DELIMITER)
        .last()
        .unwrap_or(career_path);

    match level {
        ExperienceLevel::Entry => vec![
            format!("Junior {title}"),
            title.to_string(),
            format!("Senior {title}"),
            format!("Lead {title}"),
            format!("{track} Manager"),
        ],
        ExperienceLevel::Mid => vec![
            title.to_string(),
            format!("Senior {title}"),
            format!("Lead {title}"),
            format!("{track} Manager"),
            format!("{track} Director"),
        ],
        ExperienceLevel::Senior => vec![
            format!("Senior {title}"),
            format!("Lead {title}"),
            format!("{track} Manager"),
            format!("{track} Director"),
            format!("{track} VP"),
        ],
    }
}
