use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::error::{FeedbackError, Result};
use crate::models::Employee;

pub const UNKNOWN_EMPLOYEE_NAME: &str = "Unknown";

/// Read-only table of the employees that can be rated.
#[derive(Debug, Clone, Default)]
pub struct EmployeeDirectory {
    employees: BTreeMap<i64, Employee>,
}

impl EmployeeDirectory {
    pub fn from_employees(employees: Vec<Employee>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for employee in employees {
            let id = employee.id;
            if table.insert(id, employee).is_some() {
                return Err(FeedbackError::Directory(format!(
                    "employee id {id} appears more than once"
                )));
            }
        }
        Ok(Self { employees: table })
    }

    /// Load the table from a CSV file with an `id,name,number` header.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut employees = Vec::new();

        for result in reader.deserialize::<Employee>() {
            employees.push(result?);
        }

        let directory = Self::from_employees(employees)?;
        debug!(
            path = %path.display(),
            count = directory.len(),
            "employee directory loaded"
        );
        Ok(directory)
    }

    /// Resolve a ratings key. Keys that are not numeric or not in the table
    /// resolve to the `Unknown` placeholder.
    pub fn lookup(&self, key: &str) -> Employee {
        match key.trim().parse::<i64>() {
            Ok(id) => self.lookup_id(id),
            Err(_) => unknown_employee(),
        }
    }

    pub fn lookup_id(&self, id: i64) -> Employee {
        self.employees
            .get(&id)
            .cloned()
            .unwrap_or_else(unknown_employee)
    }

    pub fn employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

fn unknown_employee() -> Employee {
    Employee {
        id: 0,
        name: UNKNOWN_EMPLOYEE_NAME.to_string(),
        number: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn employee(id: i64, name: &str, number: i64) -> Employee {
        Employee {
            id,
            name: name.to_string(),
            number,
        }
    }

    #[test]
    fn lookup_matches_string_keys() {
        let directory = EmployeeDirectory::from_employees(vec![
            employee(1, "John Smith", 1),
            employee(7, "Chris Miller", 70),
        ])
        .unwrap();

        assert_eq!(directory.lookup("7").name, "Chris Miller");
        assert_eq!(directory.lookup(" 7 ").number, 70);
        assert_eq!(directory.lookup_id(1).name, "John Smith");
    }

    #[test]
    fn missing_ids_resolve_to_unknown() {
        let directory =
            EmployeeDirectory::from_employees(vec![employee(1, "John Smith", 1)]).unwrap();

        for key in ["2", "abc", ""] {
            let found = directory.lookup(key);
            assert_eq!(found.name, "Unknown");
            assert_eq!(found.number, 0);
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = EmployeeDirectory::from_employees(vec![
            employee(3, "Mike Williams", 3),
            employee(3, "Someone Else", 3),
        ]);
        assert!(matches!(result, Err(FeedbackError::Directory(_))));
    }

    #[test]
    fn loads_table_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name,number").unwrap();
        writeln!(file, "1,John Smith,1").unwrap();
        writeln!(file, "74,\"Shette, Vilas\",740").unwrap();
        file.flush().unwrap();

        let directory = EmployeeDirectory::from_csv_path(file.path()).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.lookup("74").name, "Shette, Vilas");
        assert_eq!(directory.lookup("74").number, 740);
        let ids: Vec<i64> = directory.employees().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 74]);
    }

    #[test]
    fn shipped_table_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("employees.csv");
        let directory = EmployeeDirectory::from_csv_path(&path).unwrap();
        assert_eq!(directory.len(), 30);
        assert_eq!(directory.lookup("1").name, "John Smith");
    }
}
