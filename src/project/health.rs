//! Project health score: a fixed deduction per missing essential.

use serde::Serialize;

use super::error::ProjectResult;
use super::scan::{Inventory, LargeFile, ScanOptions, project_root, scan};

const README_NAMES: &[&str] = &["README.md", "README.rst", "README.txt", "README"];
/// Test files per code file, in percent, below which the ratio is flagged.
pub const MIN_TEST_RATIO: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthLevel {
    NeedsImprovement,
    Fair,
    Good,
    Excellent,
}

impl HealthLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Self::Excellent,
            75..90 => Self::Good,
            60..75 => Self::Fair,
            _ => Self::NeedsImprovement,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Performance {
    pub total_bytes: u64,
    pub large_files: Vec<LargeFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub score: u32,
    pub level: HealthLevel,
    pub total_files: usize,
    pub code_files: usize,
    pub test_files: usize,
    pub config_files: usize,
    pub test_ratio: f64,
    pub issues: Vec<String>,
    /// Empty when recommendations were not requested.
    pub recommendations: Vec<String>,
    pub performance: Option<Performance>,
}

/// Score an inventory. Deductions are independent and the score never
/// goes below zero.
pub fn assess(inv: &Inventory, has_readme: bool, has_git: bool) -> (u32, Vec<String>, Vec<String>) {
    let mut score: u32 = 100;
    let mut issues = Vec::new();
    let mut recs = Vec::new();
    let mut deduct = |points: u32, issue: String, rec: Option<&str>| {
        score = score.saturating_sub(points);
        issues.push(issue);
        if let Some(rec) = rec {
            recs.push(rec.to_string());
        }
    };

    if !has_readme {
        deduct(
            15,
            "Missing README file".into(),
            Some("Add a README.md file to document your project"),
        );
    }
    if !has_git {
        deduct(
            10,
            "No Git repository detected".into(),
            Some("Initialize a Git repository for version control"),
        );
    }
    if inv.dependency_files.is_empty() {
        deduct(
            20,
            "No dependency management files found".into(),
            Some("Add dependency management (Cargo.toml, package.json, requirements.txt, ...)"),
        );
    }
    if inv.test_files.is_empty() {
        deduct(
            15,
            "No test files detected".into(),
            Some("Add unit tests to improve code reliability"),
        );
    }
    if inv.config_files.is_empty() {
        deduct(
            10,
            "Limited configuration files".into(),
            Some("Add configuration files for linting and formatting"),
        );
    }
    let ratio = inv.test_ratio();
    if ratio < MIN_TEST_RATIO {
        deduct(10, format!("Low test coverage ratio ({:.1}%)", ratio), None);
    }
    if !inv.large_files.is_empty() {
        deduct(
            5,
            format!("{} large files detected", inv.large_files.len()),
            Some("Consider splitting large files or using Git LFS"),
        );
    }
    (score, issues, recs)
}

pub fn health_check(
    path: &str,
    include_recommendations: bool,
    check_performance: bool,
) -> ProjectResult<HealthReport> {
    let root = project_root(path)?;
    let inv = scan(&root, ScanOptions::default());
    let has_readme = README_NAMES.iter().any(|name| root.join(name).exists());
    let has_git = root.join(".git").exists();
    let (score, issues, recommendations) = assess(&inv, has_readme, has_git);

    tracing::info!(root = %root.display(), score, "Checked project health");
    Ok(HealthReport {
        score,
        level: HealthLevel::from_score(score),
        total_files: inv.total_files,
        code_files: inv.code_files(),
        test_files: inv.test_files.len(),
        config_files: inv.config_files.len(),
        test_ratio: inv.test_ratio(),
        issues,
        recommendations: if include_recommendations {
            recommendations
        } else {
            Vec::new()
        },
        performance: check_performance.then(|| Performance {
            total_bytes: inv.total_bytes,
            large_files: inv.large_files.clone(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_follow_thresholds() {
        assert_eq!(HealthLevel::from_score(100), HealthLevel::Excellent);
        assert_eq!(HealthLevel::from_score(90), HealthLevel::Excellent);
        assert_eq!(HealthLevel::from_score(89), HealthLevel::Good);
        assert_eq!(HealthLevel::from_score(75), HealthLevel::Good);
        assert_eq!(HealthLevel::from_score(60), HealthLevel::Fair);
        assert_eq!(HealthLevel::from_score(59), HealthLevel::NeedsImprovement);
        assert_eq!(HealthLevel::NeedsImprovement.as_str(), "Needs Improvement");
    }

    #[test]
    fn empty_inventory_loses_every_deduction_but_large_files() {
        let (score, issues, recs) = assess(&Inventory::default(), false, false);
        assert_eq!(score, 100 - 15 - 10 - 20 - 15 - 10 - 10);
        assert_eq!(issues.len(), 6);
        assert_eq!(recs.len(), 5);
    }
}
