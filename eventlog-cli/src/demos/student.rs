//! Student grade tracker demo.

use eventlog::{log_debug, log_error, log_info, log_warn, EventLogger, LogManager};
use thiserror::Error;

pub const LOGGER_NAME: &str = "student";

/// Valid grade range, inclusive.
pub const GRADE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudentError {
    #[error("no grades recorded for {0}")]
    NoGrades(String),
}

/// A student with a list of grades.
#[derive(Debug, Clone)]
pub struct Student {
    log: EventLogger,
    name: String,
    age: u32,
    grades: Vec<f64>,
    average: f64,
}

impl Student {
    pub fn new(manager: &LogManager, name: impl Into<String>, age: u32) -> Self {
        let name = name.into();
        let log = manager.logger(LOGGER_NAME);
        log_info!(log, "Creating new student: {} aged {}", name, age);
        Self {
            log,
            name,
            age,
            grades: Vec::new(),
            average: 0.0,
        }
    }

    /// Record a grade. Grades outside [`GRADE_RANGE`] are logged at `Warn`
    /// and not recorded; returns whether the grade was kept.
    pub fn add_grade(&mut self, grade: f64) -> bool {
        log_info!(self.log, "Adding grade {} for student {}", grade, self.name);
        if !GRADE_RANGE.contains(&grade) {
            log_warn!(
                self.log,
                "Grade {} outside the valid range (0-10) for {}",
                grade,
                self.name
            );
            return false;
        }
        self.grades.push(grade);
        true
    }

    /// Average of the recorded grades.
    ///
    /// # Errors
    ///
    /// [`StudentError::NoGrades`] when nothing was recorded; an `Error`
    /// record is emitted first.
    pub fn calculate_average(&mut self) -> Result<f64, StudentError> {
        log_info!(self.log, "Calculating average for student {}", self.name);
        if self.grades.is_empty() {
            log_error!(self.log, "No grades available to calculate the average");
            return Err(StudentError::NoGrades(self.name.clone()));
        }

        self.average = self.grades.iter().sum::<f64>() / self.grades.len() as f64;
        log_info!(self.log, "Average for {}: {}", self.name, self.average);
        Ok(self.average)
    }

    pub fn show_info(&self) {
        log_debug!(self.log, "Showing student information");
        log_info!(
            self.log,
            "Student: {}, Age: {}, Average: {}",
            self.name,
            self.age,
            self.average
        );
    }

    /// The demo sequence: three grades, the average, then a summary.
    pub fn run_activities(&mut self) -> Result<(), StudentError> {
        log_debug!(self.log, "Student starting activities");
        for grade in [8.5, 9.0, 7.5] {
            self.add_grade(grade);
        }
        self.calculate_average()?;
        self.show_info();
        log_debug!(self.log, "Student finishing activities");
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn grades(&self) -> &[f64] {
        &self.grades
    }
}
