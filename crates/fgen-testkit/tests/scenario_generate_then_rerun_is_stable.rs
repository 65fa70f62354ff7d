use anyhow::Result;
use std::path::PathBuf;

use fgen_reconcile::{FeatureReconciler, NoScanner, ReconcileInputs, ScanStatus};
use fgen_testkit::{compile, esa, feature_set, FeatureSet, InMemoryServer, StaticCatalog};

const OL: &str = "io.openliberty.features";

#[test]
fn scenario_generate_then_rerun_is_stable() -> Result<()> {
    let deps = vec![
        esa(OL, "servlet-4.0", "21.0.0.3"),
        esa(OL, "hidden-1.0", "21.0.0.3"),
        compile("com.acme", "util", "1.0"),
    ];
    let inputs = ReconcileInputs {
        dependencies: &deps,
        classes_dirs: &[],
    };

    let server = InMemoryServer::with_declared(feature_set(&["jsp-2.3"]));
    let catalog = StaticCatalog(feature_set(&["servlet-4.0", "jsp-2.3"]));
    let reconciler = FeatureReconciler::new(&server, &catalog, &NoScanner);

    // First run: the visible dependency feature is declared.
    let first = reconciler.generate(&inputs, &mut server.writer())?;
    assert_eq!(first.result.missing, feature_set(&["servlet-4.0"]));
    assert_eq!(first.result.scan, ScanStatus::Skipped);
    assert!(first.written.is_some());
    assert_eq!(server.generated(), Some(feature_set(&["servlet-4.0"])));

    // Rerun with unchanged inputs: the previous output is retracted first, so
    // the same declaration is produced again.
    let second = reconciler.generate(&inputs, &mut server.writer())?;
    assert_eq!(second.result, first.result);
    assert_eq!(server.generated(), Some(feature_set(&["servlet-4.0"])));
    assert_eq!(server.calls(), vec!["retract", "write", "retract", "write"]);

    Ok(())
}

#[test]
fn scenario_user_declaration_makes_generated_file_obsolete() -> Result<()> {
    let deps = vec![esa(OL, "servlet-4.0", "21.0.0.3")];
    let inputs = ReconcileInputs {
        dependencies: &deps,
        classes_dirs: &[],
    };

    let server = InMemoryServer::with_declared(FeatureSet::new())
        .with_generated(feature_set(&["servlet-4.0"]));
    server.declare("servlet-4.0");
    let catalog = StaticCatalog(feature_set(&["servlet-4.0"]));
    let reconciler = FeatureReconciler::new(&server, &catalog, &NoScanner);

    let out = reconciler.generate(&inputs, &mut server.writer())?;
    assert!(out.result.is_satisfied());
    assert_eq!(out.written, None);
    assert_eq!(server.generated(), None, "stale generated declaration is gone");
    assert_eq!(server.calls(), vec!["retract"]);

    Ok(())
}

#[test]
fn scenario_reconcile_alone_writes_nothing() -> Result<()> {
    let deps = vec![esa(OL, "servlet-4.0", "21.0.0.3")];
    let dirs = vec![PathBuf::from("/app/target/classes")];
    let server = InMemoryServer::default();
    let catalog = StaticCatalog(feature_set(&["servlet-4.0"]));
    let reconciler = FeatureReconciler::new(&server, &catalog, &NoScanner);

    let r = reconciler.reconcile(&ReconcileInputs {
        dependencies: &deps,
        classes_dirs: &dirs,
    })?;
    assert_eq!(r.missing, feature_set(&["servlet-4.0"]));
    assert!(matches!(r.scan, ScanStatus::Unavailable { .. }));
    assert!(server.calls().is_empty());
    assert_eq!(server.generated(), None);
    Ok(())
}
