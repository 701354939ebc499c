use std::fs::{self, File};
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::archive;
use crate::config::AppConfig;
use crate::directory::EmployeeDirectory;
use crate::error::{FeedbackError, Result};
use crate::models::{Evaluator, FeedbackSubmission, StoredFeedback, StoredRecordHandle};
use crate::tabular;

const RECORD_EXTENSION: &str = "json";
const TABULAR_EXTENSION: &str = "csv";

/// File-backed feedback storage: one JSON record and one CSV export per
/// evaluator per day, all in a single flat directory.
#[derive(Debug)]
pub struct FeedbackStore {
    data_dir: PathBuf,
    directory: EmployeeDirectory,
    low_rating_threshold: i64,
}

impl FeedbackStore {
    pub fn open(config: &AppConfig, directory: EmployeeDirectory) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        debug!(data_dir = %config.data_dir.display(), "feedback store ready");

        Ok(Self {
            data_dir: config.data_dir.clone(),
            directory,
            low_rating_threshold: config.low_rating_threshold,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn directory(&self) -> &EmployeeDirectory {
        &self.directory
    }

    pub fn store(&self, submission: &FeedbackSubmission) -> Result<StoredRecordHandle> {
        self.store_on(submission, Utc::now().date_naive())
    }

    /// Persist a submission under the name it gets on `date`. An earlier
    /// submission by the same evaluator on the same day is overwritten.
    pub fn store_on(
        &self,
        submission: &FeedbackSubmission,
        date: NaiveDate,
    ) -> Result<StoredRecordHandle> {
        submission.validate()?;

        let base_name = base_name(&submission.evaluator, date);
        let json_path = self
            .data_dir
            .join(format!("{base_name}.{RECORD_EXTENSION}"));
        let csv_path = self
            .data_dir
            .join(format!("{base_name}.{TABULAR_EXTENSION}"));

        let record = serde_json::to_string_pretty(submission)?;
        fs::write(&json_path, record)?;

        let rows = tabular::build_rows(submission, &self.directory, self.low_rating_threshold);
        fs::write(&csv_path, tabular::render_csv(&rows)?)?;

        info!(
            filename = %format!("{base_name}.{RECORD_EXTENSION}"),
            rows = rows.len(),
            "feedback saved"
        );

        Ok(StoredRecordHandle {
            base_name,
            json_path,
            csv_path,
        })
    }

    /// Load every stored record, ordered by filename.
    ///
    /// A single unreadable record fails the whole listing; no partial
    /// results are returned.
    pub fn list_all(&self) -> Result<Vec<StoredFeedback>> {
        let mut filenames = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_record =
                path.extension().and_then(|ext| ext.to_str()) == Some(RECORD_EXTENSION);
            if !is_record || !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                filenames.push(name.to_string());
            }
        }
        filenames.sort();

        let mut records = Vec::with_capacity(filenames.len());
        for filename in filenames {
            let data = read_record(&self.data_dir.join(&filename)).map_err(|source| {
                FeedbackError::CorruptRecord {
                    filename: filename.clone(),
                    source: Box::new(source),
                }
            })?;
            records.push(StoredFeedback { filename, data });
        }

        Ok(records)
    }

    /// Zip the whole storage directory into an anonymous temp file and hand
    /// it back rewound, ready to be streamed.
    pub fn export_all(&self) -> Result<File> {
        let mut spool = tempfile::tempfile()?;
        let count = archive::write_archive(&self.data_dir, &mut spool)?;
        spool.seek(SeekFrom::Start(0))?;
        info!(files = count, "feedback archive built");
        Ok(spool)
    }
}

fn read_record(path: &Path) -> Result<FeedbackSubmission> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// `feedback_<name>_<number>_<YYYY-MM-DD>` with each whitespace run in the
/// name replaced by a single underscore.
pub fn base_name(evaluator: &Evaluator, date: NaiveDate) -> String {
    let mut name = String::with_capacity(evaluator.name.len());
    let mut in_whitespace = false;
    for ch in evaluator.name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                name.push('_');
            }
            in_whitespace = true;
        } else {
            name.push(ch);
            in_whitespace = false;
        }
    }
    format!(
        "feedback_{}_{}_{}",
        name,
        evaluator.number,
        date.format("%Y-%m-%d")
    )
}
