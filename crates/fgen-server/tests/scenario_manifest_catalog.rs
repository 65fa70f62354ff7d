use anyhow::Result;
use std::fs;
use tempfile::tempdir;

use fgen_reconcile::VisibleFeatureCatalog;
use fgen_server::{ListCatalog, ManifestCatalog};

fn manifest(symbolic: &str, short: Option<&str>) -> String {
    let mut m = format!("Manifest-Version: 1.0\nSubsystem-SymbolicName: {symbolic}\n");
    if let Some(s) = short {
        m.push_str(&format!("IBM-ShortName: {s}\n"));
    }
    m
}

#[test]
fn scenario_manifest_catalog_lists_public_core_and_user_features() -> Result<()> {
    let tmp = tempdir()?;
    let install = tmp.path().join("wlp");
    let user = install.join("usr");
    let core = install.join("lib/features");
    let ext = user.join("extension/lib/features");
    fs::create_dir_all(&core)?;
    fs::create_dir_all(&ext)?;

    fs::write(
        core.join("servlet.mf"),
        manifest("com.ibm.websphere.appserver.servlet-4.0; visibility:=public", Some("servlet-4.0")),
    )?;
    fs::write(
        core.join("internal.mf"),
        manifest("com.ibm.ws.internal-1.0; visibility:=private", Some("internal-1.0")),
    )?;
    fs::write(
        ext.join("custom.mf"),
        manifest("acme.custom-1.0; visibility:=public", Some("usr:custom-1.0")),
    )?;
    fs::write(core.join("readme.txt"), "not a manifest")?;

    let catalog = ManifestCatalog::for_installation(&install, Some(user.as_path()));
    let got: Vec<String> = catalog.visible_features().into_iter().collect();
    assert_eq!(got, vec!["servlet-4.0", "usr:custom-1.0"]);
    Ok(())
}

#[test]
fn scenario_missing_installation_has_no_visible_features() {
    let catalog = ManifestCatalog::for_installation(std::path::Path::new("/nonexistent/wlp"), None);
    assert!(catalog.visible_features().is_empty());
}

#[test]
fn scenario_list_catalog_from_file() -> Result<()> {
    let tmp = tempdir()?;
    let list = tmp.path().join("visible.txt");
    fs::write(&list, "servlet-4.0\njsp-2.3\n")?;
    let c = ListCatalog::from_file(&list)?;
    assert_eq!(c.visible_features().len(), 2);

    assert!(ListCatalog::from_file(&tmp.path().join("absent.txt")).is_err());
    Ok(())
}
