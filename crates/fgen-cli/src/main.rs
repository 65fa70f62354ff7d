use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fgen")]
#[command(about = "Generate the server features an application needs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile project dependencies and scanner output against the server
    /// configuration, then write the missing features.
    Generate {
        /// Project descriptor (JSON)
        #[arg(long)]
        project: String,

        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Write a JSON report of the reconciliation here
        #[arg(long)]
        report: Option<String>,

        /// Compute the result without touching the server configuration
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Fail when the config contains keys the generator does not read
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },

    /// Print the EE / MicroProfile levels a project targets
    Detect {
        /// Project descriptor (JSON)
        #[arg(long)]
        project: String,
    },

    /// Look up the MicroProfile level that first ships a feature
    MpLevel {
        /// Feature id, e.g. mpHealth-2.0
        feature: String,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> environment -> local...)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent when absent.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Generate {
            project,
            config_paths,
            report,
            dry_run,
            strict_config,
        } => commands::generate::run(commands::generate::GenerateArgs {
            project: &project,
            config_paths: &config_paths,
            report: report.as_deref(),
            dry_run,
            strict_config,
        })?,

        Commands::Detect { project } => {
            commands::init_tracing("info");
            let model = commands::load_project(&project)?;
            let platform = fgen_reconcile::detect_platform(&model.dependencies);
            let features = fgen_reconcile::extract::features_from_dependencies(&model.dependencies);
            println!(
                "ee_level={}",
                platform.ee.map(|e| e.as_str()).unwrap_or("none")
            );
            println!("mp_level={}", platform.mp);
            println!("dependency_features={}", commands::join(&features));
        }

        Commands::MpLevel { feature } => {
            let level = fgen_reconcile::mp_component_level(&feature);
            println!("feature={}", feature);
            println!("mp_level={}", level);
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = fgen_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}
