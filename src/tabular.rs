use std::cmp::Ordering;

use crate::directory::EmployeeDirectory;
use crate::error::{FeedbackError, Result};
use crate::models::FeedbackSubmission;

pub const HEADER: [&str; 7] = [
    "Employee Name",
    "Employee Number",
    "Rating",
    "Reason",
    "Evaluator",
    "Evaluator Number",
    "Timestamp",
];

pub const MISSING_REASON: &str = "No reason provided";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    pub employee_name: String,
    pub employee_number: i64,
    pub rating: i64,
    pub reason: String,
    pub evaluator_name: String,
    pub evaluator_number: i64,
    pub timestamp: String,
}

/// Flatten a submission into one row per rated employee.
///
/// Keys in canonical decimal form (no sign, no leading zero) come first in
/// ascending order, then every other key lexicographically.
pub fn build_rows(
    submission: &FeedbackSubmission,
    directory: &EmployeeDirectory,
    low_rating_threshold: i64,
) -> Vec<TabularRow> {
    let mut entries: Vec<(&String, &i64)> = submission.ratings.iter().collect();
    entries.sort_by(|(a, _), (b, _)| compare_keys(a, b));

    entries
        .into_iter()
        .map(|(key, &rating)| {
            let employee = directory.lookup(key);
            let reason = if rating <= low_rating_threshold {
                submission
                    .reason_for(key)
                    .unwrap_or(MISSING_REASON)
                    .to_string()
            } else {
                String::new()
            };

            TabularRow {
                employee_name: employee.name,
                employee_number: employee.number,
                rating,
                reason,
                evaluator_name: submission.evaluator.name.clone(),
                evaluator_number: submission.evaluator.number,
                timestamp: submission.completed_at.clone(),
            }
        })
        .collect()
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    match (index_key(a), index_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn index_key(key: &str) -> Option<u32> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if !canonical {
        return None;
    }
    key.parse::<u32>().ok().filter(|&index| index != u32::MAX)
}

pub fn render_csv(rows: &[TabularRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for row in rows {
        writer.write_record([
            row.employee_name.clone(),
            row.employee_number.to_string(),
            row.rating.to_string(),
            row.reason.clone(),
            row.evaluator_name.clone(),
            row.evaluator_number.to_string(),
            row.timestamp.clone(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| FeedbackError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| {
        FeedbackError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Evaluator};
    use std::collections::BTreeMap;

    fn directory() -> EmployeeDirectory {
        EmployeeDirectory::from_employees(vec![
            Employee {
                id: 1,
                name: "John Smith".to_string(),
                number: 1,
            },
            Employee {
                id: 2,
                name: "Jane Johnson".to_string(),
                number: 2,
            },
            Employee {
                id: 10,
                name: "Emily Martinez".to_string(),
                number: 10,
            },
        ])
        .unwrap()
    }

    fn submission(ratings: &[(&str, i64)], reasons: &[(&str, &str)]) -> FeedbackSubmission {
        FeedbackSubmission {
            evaluator: Evaluator::new("Ann Lee", 5),
            ratings: ratings
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
            reasons: Some(
                reasons
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            completed_at: "2024-01-01T00:00:00Z".to_string(),
            extra: Default::default(),
        }
    }

    #[test]
    fn one_row_per_rating_in_id_order() {
        let rows = build_rows(
            &submission(&[("10", 4), ("2", 5), ("1", 1), ("x", 5)], &[]),
            &directory(),
            3,
        );
        let names: Vec<&str> = rows.iter().map(|r| r.employee_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["John Smith", "Jane Johnson", "Emily Martinez", "Unknown"]
        );
        assert_eq!(rows[3].employee_number, 0);
    }

    #[test]
    fn signed_and_zero_padded_keys_sort_as_text() {
        let rows = build_rows(
            &submission(&[("+1", 5), ("01", 5), ("2", 5), ("10", 5)], &[]),
            &directory(),
            3,
        );
        let names: Vec<&str> = rows.iter().map(|r| r.employee_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Jane Johnson", "Emily Martinez", "John Smith", "John Smith"]
        );
        assert_eq!(index_key("+1"), None);
        assert_eq!(index_key("01"), None);
        assert_eq!(index_key("0"), Some(0));
        assert_eq!(index_key("10"), Some(10));
    }

    #[test]
    fn reasons_only_kept_for_low_ratings() {
        let rows = build_rows(
            &submission(&[("1", 3), ("2", 4)], &[("2", "great work")]),
            &directory(),
            3,
        );
        assert_eq!(rows[0].reason, MISSING_REASON);
        assert_eq!(rows[1].reason, "");
    }

    #[test]
    fn empty_reason_counts_as_missing() {
        let rows = build_rows(&submission(&[("1", 2)], &[("1", "")]), &directory(), 3);
        assert_eq!(rows[0].reason, MISSING_REASON);
    }

    #[test]
    fn threshold_is_configurable() {
        let rows = build_rows(
            &submission(&[("1", 4)], &[("1", "needs focus")]),
            &directory(),
            4,
        );
        assert_eq!(rows[0].reason, "needs focus");
    }

    #[test]
    fn quotes_and_commas_survive_a_csv_reader() {
        let rows = build_rows(
            &submission(&[("1", 2)], &[("1", "said \"later\", twice")]),
            &directory(),
            3,
        );
        let text = render_csv(&rows).unwrap();
        assert!(text.contains("\"said \"\"later\"\", twice\""));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        assert_eq!(headers, HEADER.map(str::to_string).to_vec());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][3], "said \"later\", twice");
        assert_eq!(&records[0][6], "2024-01-01T00:00:00Z");
    }
}
