//! `fgen generate`: wire config to collaborators and run the reconciler.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use fgen_config::{GeneratorConfig, UnusedKeyPolicy};
use fgen_reconcile::{
    CaseMode, FeatureReconciler, FeatureScanner, NoScanner, ReconcileInputs, ReconcileOptions,
    ReconciliationResult, VisibleFeatureCatalog,
};
use fgen_scanner::ProcessScanner;
use fgen_server::{DropinWriter, ListCatalog, ManifestCatalog, ServerXmlInventory};

use super::{existing_classes_dirs, init_tracing, join, load_project, project_base};

pub struct GenerateArgs<'a> {
    pub project: &'a str,
    pub config_paths: &'a [String],
    pub report: Option<&'a str>,
    pub dry_run: bool,
    pub strict_config: bool,
}

#[derive(Serialize)]
struct GenerateReport<'a> {
    generated_at_utc: String,
    config_hash: &'a str,
    dry_run: bool,
    written: Option<&'a PathBuf>,
    result: &'a ReconciliationResult,
}

fn catalog_for(cfg: &GeneratorConfig) -> Result<Box<dyn VisibleFeatureCatalog>> {
    if let Some(list) = &cfg.features.visible_list {
        return Ok(Box::new(ListCatalog::from_file(list)?));
    }
    match &cfg.server.install_dir {
        Some(install) => Ok(Box::new(ManifestCatalog::for_installation(
            install,
            cfg.user_dir().as_deref(),
        ))),
        None => bail!(
            "CONFIG_MISSING: one of /server/install_dir or /features/visible_list is required"
        ),
    }
}

fn scanner_for(cfg: &GeneratorConfig) -> Box<dyn FeatureScanner> {
    match &cfg.scanner.command {
        Some(cmd) => Box::new(ProcessScanner::new(cmd).with_args(cfg.scanner.args.clone())),
        None => Box::new(NoScanner),
    }
}

pub fn run(args: GenerateArgs<'_>) -> Result<()> {
    let path_refs: Vec<&str> = args.config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = fgen_config::load_layered_yaml(&path_refs)?;
    let cfg = loaded.generator()?;

    init_tracing(&cfg.logging.filter);

    let policy = if args.strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let unused = fgen_config::report_unused_keys(&loaded.config_json, policy)?;
    for key in &unused.unused_leaf_pointers {
        warn!(key = %key, "config key is not used by the generator");
    }

    let model = load_project(args.project)?;
    let base = project_base(args.project)?;
    let classes_dirs = existing_classes_dirs(&model, &base);

    let server_dir = cfg.server_dir()?;
    let mut inventory = ServerXmlInventory::new(&server_dir)?;
    if args.dry_run {
        // A dry run never retracts, so the last generated file must not count as declared.
        inventory = inventory.excluding_generated();
    }
    let catalog = catalog_for(&cfg)?;
    let scanner = scanner_for(&cfg);

    let options = ReconcileOptions {
        case: if cfg.features.case_insensitive_visibility {
            CaseMode::Insensitive
        } else {
            CaseMode::Exact
        },
        locale: cfg.scanner.locale.clone(),
    };
    let reconciler =
        FeatureReconciler::new(&inventory, catalog.as_ref(), scanner.as_ref()).with_options(options);

    let inputs = ReconcileInputs {
        dependencies: &model.dependencies,
        classes_dirs: &classes_dirs,
    };

    let (result, written) = if args.dry_run {
        (reconciler.reconcile(&inputs)?, None)
    } else {
        let mut writer = DropinWriter::new(cfg.config_dir()?, &server_dir, cfg.server_xml()?);
        let outcome = reconciler.generate(&inputs, &mut writer)?;
        (outcome.result, outcome.written)
    };

    if result.is_satisfied() {
        info!("no additional features generated");
    }

    println!("config_hash={}", loaded.config_hash);
    println!("ee_level={}", result.platform.ee.map(|e| e.as_str()).unwrap_or("none"));
    println!("mp_level={}", result.platform.mp);
    println!("missing={}", join(&result.missing));
    println!("conflicts={}", result.conflicts.len());
    for c in &result.conflicts {
        println!("conflict={}", c);
    }
    match &written {
        Some(p) => println!("written={}", p.display()),
        None => println!("written=none"),
    }

    if let Some(report_path) = args.report {
        let report = GenerateReport {
            generated_at_utc: Utc::now().to_rfc3339(),
            config_hash: &loaded.config_hash,
            dry_run: args.dry_run,
            written: written.as_ref(),
            result: &result,
        };
        let json = serde_json::to_string_pretty(&report).context("serialize report failed")?;
        fs::write(report_path, json)
            .with_context(|| format!("write report failed: {}", report_path))?;
    }

    Ok(())
}
