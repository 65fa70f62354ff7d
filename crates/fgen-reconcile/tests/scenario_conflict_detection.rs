use fgen_reconcile::*;

fn set(items: &[&str]) -> FeatureSet {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn scenario_stricter_scanned_version_warns_and_keeps_declaration() {
    let r = merge_scan_results(
        &set(&["mphealth-3.0"]),
        &set(&["mphealth-2.0"]),
        &FeatureSet::new(),
    );

    assert_eq!(r.conflicts.len(), 1, "exactly one conflict expected");
    assert_eq!(r.conflicts[0].scanned_feature, "mphealth-3.0");
    assert_eq!(r.conflicts[0].declared_version, "2.0");
    assert!(
        !r.missing.iter().any(|f| f.starts_with("mphealth")),
        "existing mphealth declaration must not be overridden"
    );
}

#[test]
fn scenario_existing_or_planned_version_at_least_scanned_is_untouched() {
    let existing = set(&["mphealth-3.0", "cdi-2.0"]);
    let planned = set(&["mpmetrics-3.0"]);
    let scanned = set(&["mphealth-2.0", "mphealth-3.0", "mpmetrics-2.3", "cdi-2.0"]);

    let r = merge_scan_results(&scanned, &existing, &planned);

    assert!(r.conflicts.is_empty());
    assert_eq!(r.missing, planned);
}

#[test]
fn scenario_new_scanned_feature_added_unchanged() {
    let r = merge_scan_results(&set(&["mpmetrics-2.3"]), &FeatureSet::new(), &FeatureSet::new());
    assert_eq!(r.missing, set(&["mpmetrics-2.3"]));
    assert!(r.conflicts.is_empty());
}
