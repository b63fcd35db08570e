//! Field-default policy for parsed literature records.
//!
//! Every best-effort fallback the parser applies ("N/A", "Unknown",
//! empty string) lives in this one table, keyed by record field name.

pub const FIELD_DEFAULTS: &[(&str, &str)] = &[
    ("title", "N/A"),
    ("journal", "N/A"),
    ("pub_date", "N/A"),
    ("grants", "Unknown"),
    ("coi_statement", "Unknown"),
    ("authors_short", ""),
    ("authors_full", ""),
    ("affiliation", ""),
    ("issn", ""),
    ("doi", ""),
    ("pub_types", ""),
    ("mesh_terms", ""),
    ("pmc_id", ""),
    ("abstract", ""),
];

/// The fallback value for a record field. Unknown field names default to
/// the empty string.
pub fn default_for(field: &str) -> &'static str {
    FIELD_DEFAULTS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, value)| *value)
        .unwrap_or("")
}
