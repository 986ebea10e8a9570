use crate::error::OutputError;
use crate::simulation::SimulationReport;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryReport {
    pub timestamp: String,
    pub map: String,
    pub seed: u64,
    pub threads: usize,
    pub agents: usize,
    pub rounds: usize,
    pub ticks: u64,
    pub duration_sec: f64,
    pub requests: usize,
    pub superseded: usize,
    pub outcomes: BTreeMap<String, usize>,
    pub success_rate: f64,
    pub mean_cost: f64,
    pub mean_expansions: f64,
    pub mean_attempts: f64,
}

/// Run metadata not carried by the report itself
#[derive(Debug, Clone)]
pub struct SummaryContext<'a> {
    pub map: &'a Path,
    pub seed: u64,
    pub threads: usize,
}

/// Write `summary.json` and `summary.md` into `report_dir`, returning their paths
pub fn write_summary(
    report_dir: &Path,
    report: &SimulationReport,
    context: &SummaryContext<'_>,
) -> Result<(PathBuf, PathBuf), OutputError> {
    fs::create_dir_all(report_dir).map_err(OutputError::CreateDir)?;

    let summary = build_summary(report, context);

    let json_path = report_dir.join("summary.json");
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&json_path, json).map_err(OutputError::WriteReport)?;

    let md_path = report_dir.join("summary.md");
    let md = build_summary_markdown(&summary);
    fs::write(&md_path, md).map_err(OutputError::WriteReport)?;

    Ok((json_path, md_path))
}

pub fn build_summary(report: &SimulationReport, context: &SummaryContext<'_>) -> SummaryReport {
    let requests = report.requests();
    let successes = report.successes();
    let per_success = |total: f64| {
        if successes == 0 {
            0.0
        } else {
            total / successes as f64
        }
    };

    SummaryReport {
        timestamp: Utc::now().to_rfc3339(),
        map: context.map.display().to_string(),
        seed: context.seed,
        threads: context.threads,
        agents: report.agents,
        rounds: report.rounds,
        ticks: report.ticks,
        duration_sec: report.duration.as_secs_f64(),
        requests,
        superseded: report.superseded,
        outcomes: report.outcomes.clone(),
        success_rate: if requests == 0 {
            0.0
        } else {
            successes as f64 / requests as f64
        },
        mean_cost: per_success(report.total_cost),
        mean_expansions: per_success(report.total_expansions as f64),
        mean_attempts: per_success(report.total_attempts as f64),
    }
}

pub fn build_summary_markdown(summary: &SummaryReport) -> String {
    let mut md = String::new();

    md.push_str("# gridplan Simulation Summary\n\n");
    md.push_str(&format!("**Generated:** {}\n", summary.timestamp));
    md.push_str(&format!("**Map:** {}\n", summary.map));
    md.push_str(&format!(
        "**Agents:** {} over {} rounds ({} worker threads, seed {})\n",
        summary.agents, summary.rounds, summary.threads, summary.seed
    ));
    md.push_str(&format!(
        "**Duration:** {:.1}s, {} ticks\n\n",
        summary.duration_sec, summary.ticks
    ));

    md.push_str("## Outcomes\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    for (outcome, count) in &summary.outcomes {
        md.push_str(&format!("| {} | {} |\n", outcome, count));
    }
    md.push_str(&format!("| superseded | {} |\n\n", summary.superseded));

    md.push_str("## Paths\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!(
        "| Success rate | {:.1}% |\n",
        summary.success_rate * 100.0
    ));
    md.push_str(&format!("| Mean cost | {:.2} |\n", summary.mean_cost));
    md.push_str(&format!(
        "| Mean expansions | {:.1} |\n",
        summary.mean_expansions
    ));
    md.push_str(&format!("| Mean attempts | {:.2} |\n", summary.mean_attempts));

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn report() -> SimulationReport {
        let mut outcomes = BTreeMap::new();
        outcomes.insert("success".to_string(), 3);
        outcomes.insert("no_path".to_string(), 1);
        SimulationReport {
            agents: 2,
            rounds: 2,
            ticks: 9,
            outcomes,
            superseded: 1,
            total_cost: 12.0,
            total_expansions: 30,
            total_attempts: 3,
            duration: Duration::from_millis(250),
        }
    }

    fn context(map: &Path) -> SummaryContext<'_> {
        SummaryContext {
            map,
            seed: 42,
            threads: 2,
        }
    }

    #[test]
    fn test_build_summary_averages_over_successes() {
        let map = PathBuf::from("maps/arena.txt");
        let summary = build_summary(&report(), &context(&map));

        assert_eq!(summary.requests, 4);
        assert_eq!(summary.success_rate, 0.75);
        assert_eq!(summary.mean_cost, 4.0);
        assert_eq!(summary.mean_expansions, 10.0);
        assert_eq!(summary.mean_attempts, 1.0);
        assert_eq!(summary.map, "maps/arena.txt");
    }

    #[test]
    fn test_empty_report_has_zero_rates() {
        let map = PathBuf::from("empty.txt");
        let summary = build_summary(&SimulationReport::default(), &context(&map));
        assert_eq!(summary.requests, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.mean_cost, 0.0);
    }

    #[test]
    fn test_write_summary_files() {
        let dir = tempfile::tempdir().unwrap();
        let report_dir = dir.path().join("reports");
        let map = PathBuf::from("arena.txt");

        let (json_path, md_path) = write_summary(&report_dir, &report(), &context(&map)).unwrap();

        let json: SummaryReport =
            serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(json.outcomes.get("success"), Some(&3));

        let md = fs::read_to_string(md_path).unwrap();
        assert!(md.contains("| no_path | 1 |"));
        assert!(md.contains("| superseded | 1 |"));
        assert!(md.contains("| Success rate | 75.0% |"));
    }
}
