//! Query correlation ids

use uuid::Uuid;

/// Generate a new query ID using UUID v4
///
/// Attached to the tracing span of one lookup so every log line of that
/// query (geocoding, fetches, reduction) can be grouped.
///
/// # Examples
///
/// ```
/// use fiche::logging::generate_query_id;
///
/// let query_id = generate_query_id();
/// assert!(!query_id.is_empty());
/// ```
pub fn generate_query_id() -> String {
    Uuid::new_v4().to_string()
}
