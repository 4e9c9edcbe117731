use crate::models::{JobRecord, SearchFilters};

/// Description terms that mark a posting as remote.
pub const REMOTE_TERMS: [&str; 5] = [
    "remote",
    "віддалено",
    "дистанційно",
    "удаленно",
    "удалённо",
];

/// Narrows records to those matching every criterion that is set.
///
/// Keywords match when any of them occurs in the title or description,
/// location is a substring match, and `remote: true` looks for a remote term
/// in the description. Keywords and location are trimmed first; blank
/// keywords are ignored rather than matching every record, and a blank
/// location is treated as absent. Salary, experience level and job type are accepted but
/// not evaluated. Order is preserved and applying the same criteria twice
/// changes nothing.
pub fn filter_jobs(records: Vec<JobRecord>, criteria: &SearchFilters) -> Vec<JobRecord> {
    let keywords: Vec<String> = criteria
        .keywords
        .iter()
        .flatten()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    let location = criteria
        .location
        .as_deref()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty());
    let remote_only = criteria.remote == Some(true);

    records
        .into_iter()
        .filter(|job| keywords.is_empty() || matches_keywords(job, &keywords))
        .filter(|job| location.as_deref().is_none_or(|l| job.location.to_lowercase().contains(l)))
        .filter(|job| !remote_only || is_remote(job))
        .collect()
}

fn matches_keywords(job: &JobRecord, keywords: &[String]) -> bool {
    let title = job.title.to_lowercase();
    let description = job.description.to_lowercase();
    keywords.iter().any(|k| title.contains(k) || description.contains(k))
}

fn is_remote(job: &JobRecord) -> bool {
    let description = job.description.to_lowercase();
    REMOTE_TERMS.iter().any(|term| description.contains(term))
}
