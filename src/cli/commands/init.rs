//! `aegis init` command - Initialize a new Aegis project

use console::style;
use miette::{IntoDiagnostic, Result};
use rust_embed::RustEmbed;
use std::fs;
use std::path::PathBuf;

use crate::core::project::Project;

/// Demo dataset seeded by `--samples`, one YAML file per record
#[derive(RustEmbed)]
#[folder = "assets/samples/"]
struct SampleData;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    pub path: Option<PathBuf>,

    /// Seed the registers with a sample dataset
    #[arg(long)]
    pub samples: bool,

    /// Reinitialize even if an Aegis project already exists
    #[arg(long)]
    pub force: bool,
}

/// Run the init command
pub fn run(args: InitArgs) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&path).into_diagnostic()?;

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    }
    .map_err(|e| miette::miette!("{}", e))?;

    if args.samples {
        let mut seeded = 0;
        for rel in SampleData::iter() {
            let Some(file) = SampleData::get(rel.as_ref()) else {
                continue;
            };
            let dest = project.root().join(rel.as_ref());
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).into_diagnostic()?;
            }
            fs::write(&dest, file.data.as_ref()).into_diagnostic()?;
            seeded += 1;
        }
        println!(
            "{} Initialized Aegis project at {} ({} sample record(s))",
            style("✓").green(),
            project.root().display(),
            seeded
        );
    } else {
        println!(
            "{} Initialized Aegis project at {}",
            style("✓").green(),
            project.root().display()
        );
    }

    println!();
    println!("Next steps:");
    println!("  aegis risk new --title \"...\"    create your first risk");
    println!("  aegis status                    see the posture dashboard");

    Ok(())
}
