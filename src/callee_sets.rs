//! Distinct callee names compared across the two collections

use crate::log::Log;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalleeSets {
    pub only_in_passing: BTreeSet<String>,
    pub only_in_failing: BTreeSet<String>,
    pub union: BTreeSet<String>,
    pub intersection: BTreeSet<String>,
}

fn distinct_callees(logs: &[Log]) -> BTreeSet<String> {
    logs.iter()
        .flat_map(|log| log.callees())
        .map(str::to_string)
        .collect()
}

impl CalleeSets {
    pub fn from_logs(passing: &[Log], failing: &[Log]) -> Self {
        let passing = distinct_callees(passing);
        let failing = distinct_callees(failing);

        Self {
            only_in_passing: passing.difference(&failing).cloned().collect(),
            only_in_failing: failing.difference(&passing).cloned().collect(),
            union: passing.union(&failing).cloned().collect(),
            intersection: passing.intersection(&failing).cloned().collect(),
        }
    }

    /// Sectioned listing: `[Intersect]`, `[Union]`, `[Failing]`, `[Passing]`
    pub fn to_report_string(&self) -> String {
        let sections = [
            ("Intersect", &self.intersection),
            ("Union", &self.union),
            ("Failing", &self.only_in_failing),
            ("Passing", &self.only_in_passing),
        ];

        let mut report = String::new();
        for (title, names) in sections {
            report.push_str(&format!("[{}]\n", title));
            for name in names {
                report.push_str(name);
                report.push('\n');
            }
            report.push('\n');
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::log_of;

    #[test]
    fn test_from_logs() {
        let passing = vec![log_of("p1", true, &[("M", "A", 1, ""), ("M", "B", 1, "")])];
        let failing = vec![
            log_of("f1", false, &[("M", "B", 1, "")]),
            log_of("f2", false, &[("M", "C", 1, "")]),
        ];

        let sets = CalleeSets::from_logs(&passing, &failing);
        let names = |s: &BTreeSet<String>| s.iter().cloned().collect::<Vec<_>>();
        assert_eq!(names(&sets.only_in_passing), vec!["A"]);
        assert_eq!(names(&sets.only_in_failing), vec!["C"]);
        assert_eq!(names(&sets.intersection), vec!["B"]);
        assert_eq!(names(&sets.union), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_report_string_sections() {
        let passing = vec![log_of("p1", true, &[("M", "A", 1, "")])];
        let sets = CalleeSets::from_logs(&passing, &[]);
        let text = sets.to_report_string();

        assert_eq!(text, "[Intersect]\n\n[Union]\nA\n\n[Failing]\n\n[Passing]\nA\n\n");
    }
}
