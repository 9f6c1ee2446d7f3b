//! U.S. state name normalization.
//!
//! The two datasets disagree on how they spell states (postal codes in one,
//! full names in the other, inconsistent casing in both). Every state value
//! passes through [`normalize_state`] before it becomes a grouping key.

/// Postal code and canonical name for each state, DC and inhabited territory.
static STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
    ("PR", "Puerto Rico"),
    ("GU", "Guam"),
    ("VI", "U.S. Virgin Islands"),
    ("AS", "American Samoa"),
    ("MP", "Northern Mariana Islands"),
];

/// Spellings seen in the wild that are neither a postal code nor a canonical name.
static ALIASES: &[(&str, &str)] = &[
    ("D.C.", "District of Columbia"),
    ("Washington D.C.", "District of Columbia"),
    ("Washington, D.C.", "District of Columbia"),
    ("Washington DC", "District of Columbia"),
    ("Virgin Islands", "U.S. Virgin Islands"),
];

/// Normalizes a raw state value into its canonical full name.
///
/// Postal codes and full names are matched case-insensitively. Unknown
/// values are passed through with surrounding whitespace trimmed and inner
/// runs collapsed. Returns `None` for a blank value.
pub fn normalize_state(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }

    let canonical = STATES
        .iter()
        .find(|(code, name)| {
            code.eq_ignore_ascii_case(&collapsed) || name.eq_ignore_ascii_case(&collapsed)
        })
        .map(|(_, name)| *name)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(&collapsed))
                .map(|(_, name)| *name)
        });

    Some(canonical.map(str::to_string).unwrap_or(collapsed))
}
