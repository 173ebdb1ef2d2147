//! Lexical skill-gap detection.
//!
//! A required skill is covered when, after trimming and lowercasing, it is a
//! substring of some user skill or some user skill is a substring of it.
//!
//! Known defect, kept for compatibility with existing consumers: the match is
//! permissive. "java" covers "JavaScript", "c" covers "C++", "go" covers
//! "Algorithms". Embedding similarity is not consulted.

fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Required skills the user lacks, in the required list's order and casing.
pub fn analyze_skill_gaps(user_skills: &[String], required_skills: &[String]) -> Vec<String> {
    let user: Vec<String> = user_skills.iter().map(|s| normalize(s)).collect();

    required_skills
        .iter()
        .filter(|required| {
            let required = normalize(required);
            !user
                .iter()
                .any(|u| required.contains(u.as_str()) || u.contains(required.as_str()))
        })
        .cloned()
        .collect()
}

/// Fraction of required skills covered, 1.0 when nothing is required.
pub fn skill_coverage(required_count: usize, gap_count: usize) -> f32 {
    if required_count == 0 {
        return 1.0;
    }
    required_count.saturating_sub(gap_count) as f32 / required_count as f32
}
