//! Persona/job query formulation and expansion.

/// Action-seeking phrase rewritten during expansion.
pub const ACTION_PHRASE: &str = "I need to";

/// Replacement for [`ACTION_PHRASE`].
pub const ACTION_REWRITE: &str = "is looking for information on how to";

/// Appended when the job contains [`ACTION_PHRASE`].
pub const PLAN_QUALIFIER: &str =
    ". A good plan would include details on activities, dining, and logistics.";

/// Appended otherwise.
pub const GUIDE_QUALIFIER: &str = " Here is a detailed guide.";

/// The base query and the expanded form that is actually embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub query: String,
    pub expanded: String,
}

impl QueryPlan {
    /// Formulate and expand the query for a persona and job.
    pub fn new(persona: &str, job: &str) -> Self {
        let query = formulate_query(persona, job);
        let expanded = expand_query(&query);
        Self { query, expanded }
    }
}

/// `"As a {persona}, {job}"`.
pub fn formulate_query(persona: &str, job: &str) -> String {
    format!("As a {}, {}", persona, job)
}

/// Rewrite the action phrase into a descriptive clause and append a
/// qualifier hinting at the kind of content wanted.
pub fn expand_query(query: &str) -> String {
    if query.contains(ACTION_PHRASE) {
        let mut expanded = query.replace(ACTION_PHRASE, ACTION_REWRITE);
        expanded.push_str(PLAN_QUALIFIER);
        expanded
    } else {
        format!("{}{}", query, GUIDE_QUALIFIER)
    }
}
