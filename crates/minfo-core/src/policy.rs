//! Normalization policy: which pre-formatted variant replaces a field.
//!
//! The table is configuration data. Duration-like fields read their
//! third string variant (`HH:MM:SS.mmm`); identifiers, bit rates,
//! languages and bit depths read the bare `/String` rendering.

/// Selects a textual rendering of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `<field>/String<n>`
    Numbered(u8),
    /// `<field>/String`
    Bare,
}

impl Variant {
    /// Name of the field to request instead of `base`.
    pub fn field_name(self, base: &str) -> String {
        match self {
            Variant::Numbered(n) => format!("{}/String{}", base, n),
            Variant::Bare => format!("{}/String", base),
        }
    }
}

const STANDARD_TABLE: &[(&str, Variant)] = &[
    ("Duration", Variant::Numbered(3)),
    ("Delay", Variant::Numbered(3)),
    ("Video_Delay", Variant::Numbered(3)),
    ("Source_Duration", Variant::Numbered(3)),
    ("Duration_FirstFrame", Variant::Numbered(3)),
    ("Duration_LastFrame", Variant::Numbered(3)),
    ("ID", Variant::Bare),
    ("UniqueID", Variant::Bare),
    ("BitRate", Variant::Bare),
    ("BitRate_Minimum", Variant::Bare),
    ("BitRate_Nominal", Variant::Bare),
    ("BitRate_Maximum", Variant::Bare),
    ("OverallBitRate", Variant::Bare),
    ("OverallBitRate_Minimum", Variant::Bare),
    ("OverallBitRate_Nominal", Variant::Bare),
    ("OverallBitRate_Maximum", Variant::Bare),
    ("Language", Variant::Bare),
    ("BitDepth", Variant::Bare),
];

/// Field name → variant lookup. Immutable.
#[derive(Debug, Clone, Copy)]
pub struct NormalizationPolicy {
    table: &'static [(&'static str, Variant)],
}

impl NormalizationPolicy {
    pub const fn new(table: &'static [(&'static str, Variant)]) -> Self {
        Self { table }
    }

    pub fn resolve(&self, field: &str) -> Option<Variant> {
        self.table
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, variant)| *variant)
    }
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self::new(STANDARD_TABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_standard_entries() {
        let policy = NormalizationPolicy::default();
        assert_eq!(policy.resolve("Duration"), Some(Variant::Numbered(3)));
        assert_eq!(policy.resolve("BitRate"), Some(Variant::Bare));
        assert_eq!(policy.resolve("Format"), None);
        // Exact match only.
        assert_eq!(policy.resolve("duration"), None);
    }

    #[test]
    fn variant_field_names() {
        assert_eq!(Variant::Numbered(3).field_name("Duration"), "Duration/String3");
        assert_eq!(Variant::Bare.field_name("Language"), "Language/String");
    }
}
