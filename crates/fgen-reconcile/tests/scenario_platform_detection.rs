use fgen_reconcile::*;
use fgen_schemas::DependencyRef;

#[test]
fn scenario_compile_scope_umbrella_does_not_set_ee_level() {
    let deps = vec![
        DependencyRef::new("io.openliberty.features", "javaee-8.0", "21.0.0.3", "compile", "esa"),
        DependencyRef::new("jakarta.platform", "jakarta.jakartaee-api", "8.0.0", "compile", "pom"),
    ];
    assert_eq!(detect_ee_level(&deps), None);
}

#[test]
fn scenario_provided_esa_feeds_both_platform_and_features() {
    let deps = vec![DependencyRef::new(
        "io.openliberty.features",
        "mpconfig-1.4",
        "21.0.0.3",
        "provided",
        "esa",
    )];

    let platform = detect_platform(&deps);
    assert_eq!(platform.mp, MpLevel::Mp3);

    let all_visible: FeatureSet = ["mpconfig-1.4".to_string()].into_iter().collect();
    let planned = plan_from_dependencies(&deps, &all_visible, &FeatureSet::new(), CaseMode::Exact);
    assert!(planned.contains("mpconfig-1.4"));
}

#[test]
fn scenario_mp_table_lookup_for_fault_tolerance() {
    assert_eq!(mp_component_level("mpfaulttolerance-2.1"), 3);
}

#[test]
fn scenario_no_signal_defaults_forward() {
    let deps = vec![DependencyRef::new("org.example", "app-lib", "1.0", "provided", "jar")];
    let platform = detect_platform(&deps);
    assert_eq!(platform.ee, None);
    assert_eq!(platform.mp, MpLevel::LATEST);
}
