//! Employee model and related types.
//!
//! This module defines the Employee struct and the SiteEmployee mapping
//! that links a time-and-attendance employee to the site-local codes used on
//! transaction scans.

use serde::{Deserialize, Serialize};

/// Job code reported for LTL drivers.
pub const DRIVER_JOB_CODE: &str = "DRIVER";

/// Job code reported for every other LTL employee.
pub const DOCKWORKER_JOB_CODE: &str = "DOCKWORKER";

/// A site-local employee code owned by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteEmployee {
    /// The site the code is valid at.
    pub site_code: String,
    /// The code printed on transaction scans.
    pub site_employee_code: String,
}

/// Represents an employee known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// The employee number.
    pub number: String,
    /// The time-and-attendance code used on time sheets.
    pub tna_employee_code: String,
    /// The employee's full name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// The employee's job code (e.g. "DRIVER").
    #[serde(default)]
    pub job_code: Option<String>,
    /// The salary class code.
    #[serde(default)]
    pub salary_class_code: Option<String>,
    /// The employee's line supervisor.
    #[serde(default)]
    pub supervisor_full_name: Option<String>,
    /// Whether the employee's work is measured against labor rates.
    #[serde(default = "default_true")]
    pub is_transactional: bool,
    /// Whether the employee works part time.
    #[serde(default)]
    pub is_part_time: bool,
    /// Site-local codes owned by the employee.
    #[serde(default)]
    pub site_employees: Vec<SiteEmployee>,
}

fn default_true() -> bool {
    true
}

impl Employee {
    /// Returns the employee's site-local codes at `site_code`.
    ///
    /// # Examples
    ///
    /// ```
    /// use efficiency_engine::models::{Employee, SiteEmployee};
    ///
    /// let employee = Employee {
    ///     number: "1001".to_string(),
    ///     tna_employee_code: "T1001".to_string(),
    ///     full_name: None,
    ///     job_code: None,
    ///     salary_class_code: None,
    ///     supervisor_full_name: None,
    ///     is_transactional: true,
    ///     is_part_time: false,
    ///     site_employees: vec![
    ///         SiteEmployee { site_code: "DC01".to_string(), site_employee_code: "E100".to_string() },
    ///         SiteEmployee { site_code: "DC02".to_string(), site_employee_code: "X9".to_string() },
    ///     ],
    /// };
    /// assert_eq!(employee.site_employee_codes("dc01"), vec!["E100".to_string()]);
    /// ```
    pub fn site_employee_codes(&self, site_code: &str) -> Vec<String> {
        self.site_employees
            .iter()
            .filter(|s| s.site_code.eq_ignore_ascii_case(site_code))
            .map(|s| s.site_employee_code.clone())
            .collect()
    }

    /// Returns true if any of the employee's codes at `site_code` is in `codes`.
    pub fn owns_any_code(&self, site_code: &str, codes: &[String]) -> bool {
        self.site_employee_codes(site_code)
            .iter()
            .any(|own| codes.iter().any(|c| c.eq_ignore_ascii_case(own)))
    }

    /// Returns true if `code` is the employee's time-and-attendance code.
    pub fn has_tna_code(&self, code: &str) -> bool {
        self.tna_employee_code.eq_ignore_ascii_case(code)
    }
}
