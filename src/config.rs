use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::directory::EmployeeDirectory;

/// Settings shared by every command: where records live and who can be rated.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Directory holding the stored feedback files
    #[arg(long, global = true, env = "FEEDBACK_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// CSV file with the employee table (id,name,number)
    #[arg(
        long = "employees",
        global = true,
        env = "FEEDBACK_EMPLOYEES",
        default_value = "employees.csv"
    )]
    pub employees_path: PathBuf,

    /// Ratings at or below this value keep their reason in the CSV export
    #[arg(
        long,
        global = true,
        env = "FEEDBACK_LOW_RATING_THRESHOLD",
        default_value_t = 3
    )]
    pub low_rating_threshold: i64,
}

impl AppConfig {
    pub fn load_directory(&self) -> anyhow::Result<EmployeeDirectory> {
        EmployeeDirectory::from_csv_path(&self.employees_path).with_context(|| {
            format!(
                "failed to load employee table from {}",
                self.employees_path.display()
            )
        })
    }
}
