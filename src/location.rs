use crate::models::{
    CandidateProfile, CompatibilityVerdict, LocationRestriction, RestrictionLevel, SearchResult,
};

// Region rules: any phrase hit pins the named region and forces a high
// restriction level.
const REGION_RULES: &[(&[&str], &str)] = &[
    (&["us only", "united states only"], "United States"),
    (&["eu only", "europe only"], "European Union"),
];

// "north america" needs a separate "only" somewhere in the same item to
// count as a restriction rather than a plain office location.
const NORTH_AMERICA_PHRASE: &str = "north america";

// Time-zone rules: marker phrases mapped to the requirement they imply.
// Only consulted when the item also talks about time-zone overlap/hours.
const TIMEZONE_RULES: &[(&[&str], &str)] = &[
    (&["est", "edt"], "Eastern Time (ET)"),
    (&["pst", "pdt"], "Pacific Time (PT)"),
    (&["cet", "central european"], "Central European Time (CET)"),
];

fn push_region(restriction: &mut LocationRestriction, region: &str) {
    if !restriction.restricted_to.iter().any(|r| r == region) {
        restriction.restricted_to.push(region.to_string());
    }
    restriction.has_restrictions = true;
    restriction.restriction_level = restriction.restriction_level.max(RestrictionLevel::High);
}

fn scan_item(text: &str, restriction: &mut LocationRestriction) {
    let text = text.to_lowercase();

    for (phrases, region) in REGION_RULES {
        if phrases.iter().any(|p| text.contains(p)) {
            push_region(restriction, region);
        }
    }
    if text.contains(NORTH_AMERICA_PHRASE) && text.contains("only") {
        push_region(restriction, "North America");
    }

    let mentions_overlap =
        text.contains("time zone") && (text.contains("overlap") || text.contains("hours"));
    if mentions_overlap {
        for (markers, zone) in TIMEZONE_RULES {
            if markers.iter().any(|m| text.contains(m)) {
                restriction.has_restrictions = true;
                restriction.time_zone_requirement = Some(zone.to_string());
                // at least medium, never downgrading an existing high
                restriction.restriction_level =
                    restriction.restriction_level.max(RestrictionLevel::Medium);
            }
        }
    }
}

/// Scan each research item independently for hiring-location constraints.
/// Items without extractable text are skipped; the level only ever
/// escalates as evidence accumulates.
pub fn extract_restrictions(results: &[SearchResult]) -> LocationRestriction {
    let mut restriction = LocationRestriction::default();

    for result in results {
        match result {
            SearchResult::Answer { text, .. } => scan_item(text, &mut restriction),
            SearchResult::Raw(_) => {
                eprintln!("Warning: skipping unrecognized research item during location scan");
            }
            SearchResult::Empty => {}
        }
    }

    restriction.description = if restriction.has_restrictions {
        let mut parts = Vec::new();
        if !restriction.restricted_to.is_empty() {
            parts.push(format!(
                "Restricted to: {}",
                restriction.restricted_to.join(", ")
            ));
        }
        if !restriction.excluded_regions.is_empty() {
            parts.push(format!(
                "Excluded regions: {}",
                restriction.excluded_regions.join(", ")
            ));
        }
        if let Some(zone) = &restriction.time_zone_requirement {
            parts.push(format!("Time zone requirements: {}", zone));
        }
        parts.join(" | ")
    } else {
        "No location restrictions found.".to_string()
    };

    restriction
}

/// Compare a restriction record against the candidate's declared location
/// and time zone. The warning carries the marker prefix only on an actual
/// mismatch; an undeterminable comparison stays compatible but says so.
pub fn check_compatibility(
    restriction: &LocationRestriction,
    candidate: Option<&CandidateProfile>,
) -> CompatibilityVerdict {
    let compatible = CompatibilityVerdict {
        is_compatible: true,
        warning: String::new(),
    };

    if !restriction.has_restrictions {
        return compatible;
    }
    let Some(candidate) = candidate else {
        return compatible;
    };

    let location = candidate.personal_information.location.as_deref();
    let time_zone = candidate.personal_information.time_zone.as_deref();

    if location.is_none() && time_zone.is_none() {
        return CompatibilityVerdict {
            is_compatible: true,
            warning: "Compatibility could not be determined: no candidate location or time zone on file.".to_string(),
        };
    }

    let location_lower = location.unwrap_or("").to_lowercase();
    let mut reasons = Vec::new();

    for region in &restriction.restricted_to {
        if !location_lower.contains(&region.to_lowercase()) {
            reasons.push(format!(
                "hiring is restricted to {} but candidate location is {}",
                region,
                location.unwrap_or("unknown")
            ));
        }
    }

    for region in &restriction.excluded_regions {
        if location_lower.contains(&region.to_lowercase()) {
            reasons.push(format!(
                "candidate location {} falls in excluded region {}",
                location.unwrap_or("unknown"),
                region
            ));
        }
    }

    if let (Some(required), Some(zone)) = (&restriction.time_zone_requirement, time_zone) {
        let required_lower = required.to_lowercase();
        let zone_lower = zone.to_lowercase();
        let matches =
            required_lower.contains(&zone_lower) || zone_lower.contains(&required_lower);
        if !matches {
            reasons.push(format!(
                "requires {} but candidate time zone is {}",
                required, zone
            ));
        }
    }

    if reasons.is_empty() {
        compatible
    } else {
        CompatibilityVerdict {
            is_compatible: false,
            warning: format!("LOCATION COMPATIBILITY WARNING: {}", reasons.join("; ")),
        }
    }
}
