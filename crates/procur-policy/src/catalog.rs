use std::collections::BTreeMap;

/// Canonical facts about one compliance framework: its known aliases, a region
/// it is most associated with, and whether missing it blocks a deal outright.
#[derive(Debug, Clone)]
pub struct ComplianceFrameworkEntry {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub region_hint: Option<&'static str>,
    pub blocking_if_missing: bool,
}

/// Fixed catalog of recognized compliance frameworks (§4.D). Aliases absorb the
/// spelling variance intake text tends to produce ("soc 2 type ii", "iso-27001").
pub fn catalog() -> &'static [ComplianceFrameworkEntry] {
    &[
        ComplianceFrameworkEntry {
            canonical: "soc2",
            aliases: &["soc 2", "soc2 type ii", "soc 2 type ii", "soc2_type_2"],
            region_hint: Some("us"),
            blocking_if_missing: true,
        },
        ComplianceFrameworkEntry {
            canonical: "iso27001",
            aliases: &["iso 27001", "iso-27001", "iso/iec 27001"],
            region_hint: Some("eu"),
            blocking_if_missing: true,
        },
        ComplianceFrameworkEntry {
            canonical: "gdpr",
            aliases: &["general data protection regulation"],
            region_hint: Some("eu"),
            blocking_if_missing: true,
        },
        ComplianceFrameworkEntry {
            canonical: "hipaa",
            aliases: &["health insurance portability and accountability act"],
            region_hint: Some("us"),
            blocking_if_missing: true,
        },
        ComplianceFrameworkEntry {
            canonical: "fedramp",
            aliases: &["fed ramp", "fed-ramp"],
            region_hint: Some("us"),
            blocking_if_missing: true,
        },
        ComplianceFrameworkEntry {
            canonical: "pci-dss",
            aliases: &["pci dss", "pcidss", "pci"],
            region_hint: None,
            blocking_if_missing: true,
        },
        ComplianceFrameworkEntry {
            canonical: "ccpa",
            aliases: &["california consumer privacy act"],
            region_hint: Some("us"),
            blocking_if_missing: false,
        },
    ]
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['_', '/'], " ")
}

/// Maps free-form input to a canonical framework identifier. Unrecognized input
/// normalizes to itself rather than failing, so callers can still build a finding
/// for a framework the catalog has never heard of.
pub fn normalize_identifier(raw: &str) -> String {
    let normalized = normalize(raw);
    for entry in catalog() {
        if entry.canonical == normalized {
            return entry.canonical.to_string();
        }
        if entry.aliases.iter().any(|alias| normalize(alias) == normalized) {
            return entry.canonical.to_string();
        }
    }
    normalized
}

/// Looks up catalog metadata for a (possibly already-normalized) framework id.
/// Returns `None` for frameworks the catalog doesn't recognize; callers treat
/// that as a non-blocking "unknown framework" finding (§4.D ADDED behavior).
pub fn lookup_compliance(identifier: &str) -> Option<&'static ComplianceFrameworkEntry> {
    let normalized = normalize_identifier(identifier);
    catalog().iter().find(|entry| entry.canonical == normalized)
}

/// Builds a lookup table keyed by canonical id, useful to callers who need to
/// check several requirements against one vendor's certification set at once.
pub fn catalog_by_canonical() -> BTreeMap<&'static str, &'static ComplianceFrameworkEntry> {
    catalog().iter().map(|entry| (entry.canonical, entry)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_normalizes_to_canonical() {
        assert_eq!(normalize_identifier("SOC 2 Type II"), "soc2");
        assert_eq!(normalize_identifier("iso-27001"), "iso27001");
    }

    #[test]
    fn unknown_framework_normalizes_but_has_no_catalog_entry() {
        assert_eq!(normalize_identifier("made_up_framework"), "made up framework");
        assert!(lookup_compliance("made_up_framework").is_none());
    }
}
