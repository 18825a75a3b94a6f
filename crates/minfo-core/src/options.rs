//! Option names understood by the MediaInfo option channel.
//!
//! The channel is a generic key/value call: some names set session
//! toggles, others return computed output.

// ---------------------------------------------------------------------------
// Computed outputs
// ---------------------------------------------------------------------------

/// Flattened field catalog, one section per stream kind.
pub const FIELD_CATALOG: &str = "Info_Parameters_CSV";

pub const VERSION: &str = "Info_Version";

// ---------------------------------------------------------------------------
// Session toggles
// ---------------------------------------------------------------------------

/// Full-detail mode (`"1"` / `""`).
pub const COMPLETE: &str = "Complete";

pub const PARSE_UNKNOWN_EXTENSIONS: &str = "ParseUnknownExtensions";

/// Translation table text for formatted reports.
pub const LANGUAGE: &str = "Language";

/// Report output template, or a built-in format name.
pub const INFORM: &str = "Inform";

/// Character set of the narrow-string API.
pub const CHARSET: &str = "CharSet";

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

/// Friendly name for [`INFORM`] when used to set a custom template.
pub const REPORT_TEMPLATE: &str = "ReportTemplate";

/// Map a caller-facing option name to the library's name.
pub fn resolve_alias(name: &str) -> &str {
    match name {
        REPORT_TEMPLATE => INFORM,
        other => other,
    }
}

/// Suffix of the read-only twin of a setter option (`Complete_Get`).
pub const GET_SUFFIX: &str = "_Get";

/// Name to query for the current value of `name`.
///
/// Setters treat an empty value as a write, so their current value is
/// read through `<name>_Get`. `Info_*` names are computed outputs and
/// are queried as they are.
pub fn getter(name: &str) -> String {
    if name.starts_with("Info_") || name.ends_with(GET_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, GET_SUFFIX)
    }
}

pub fn flag(enabled: bool) -> &'static str {
    if enabled {
        "1"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_template_maps_to_inform() {
        assert_eq!(resolve_alias("ReportTemplate"), "Inform");
        assert_eq!(resolve_alias("Complete"), "Complete");
    }

    #[test]
    fn getter_names() {
        assert_eq!(getter("Complete"), "Complete_Get");
        assert_eq!(getter("Inform_Get"), "Inform_Get");
        assert_eq!(getter(VERSION), VERSION);
        assert_eq!(getter(FIELD_CATALOG), FIELD_CATALOG);
    }
}
