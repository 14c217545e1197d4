//! CLI command implementations

pub mod completions;
pub mod ctrl;
pub mod incident;
pub mod init;
pub mod poam;
pub mod policy;
pub mod report;
pub mod risk;
pub mod search;
pub mod status;
pub mod validate;

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::project::Project;

/// Resolve the project from --project or by walking up from the cwd
pub(crate) fn open_project(global: &GlobalOpts) -> Result<Project> {
    let result = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    result.map_err(|e| miette::miette!("{}", e))
}

/// Today's date in local time, the "now" used by all overdue checks
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
