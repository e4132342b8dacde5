//! Console and JSON rendering of a [`RunReport`].

use std::fmt::Write;

use crate::checks::status::{RunReport, Status};

const HEADERS: [&str; 3] = ["API", "Requirement", "Status"];

/// Pretty-printed JSON of the whole report.
pub fn render_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Plain text table, one row per requirement, followed by the failure causes.
pub fn render_table(report: &RunReport) -> String {
    let rows: Vec<[String; 3]> = report
        .endpoints
        .iter()
        .flat_map(|endpoint| {
            endpoint.validation.iter().map(move |entry| {
                let status = match (&endpoint.skipped, entry.status) {
                    (Some(_), Status::Success) => "Skipped".to_string(),
                    (_, status) => status.to_string(),
                };
                [endpoint.api.name().to_string(), entry.requirement.name().to_string(), status]
            })
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let separator = format!(
        "+{}+",
        widths.iter().map(|w| "-".repeat(w + 2)).collect::<Vec<_>>().join("+")
    );
    let line = |cells: [&str; 3]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!(" {:<width$} ", cell, width = width))
            .collect();
        format!("|{}|", padded.join("|"))
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Run {} on {}/{}",
        report.run_id, report.network.blockchain, report.network.network
    );
    let _ = writeln!(out, "{}", separator);
    let _ = writeln!(out, "{}", line(HEADERS));
    let _ = writeln!(out, "{}", separator);
    for row in &rows {
        let _ = writeln!(out, "{}", line([row[0].as_str(), row[1].as_str(), row[2].as_str()]));
    }
    let _ = writeln!(out, "{}", separator);

    for endpoint in &report.endpoints {
        if let Some(reason) = &endpoint.skipped {
            let _ = writeln!(out, "{} skipped: {}", endpoint.api, reason);
        }
    }

    let failures: Vec<_> = report
        .endpoints
        .iter()
        .flat_map(|endpoint| endpoint.findings.iter().map(move |f| (endpoint.api, f)))
        .collect();
    if failures.is_empty() {
        let _ = writeln!(out, "All requirements passed");
    } else {
        let _ = writeln!(out, "{} requirement(s) failed:", report.failure_count());
        for (api, finding) in failures {
            let _ = writeln!(out, "  {} {}: {}", api, finding.requirement.name(), finding.cause);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::status::{
        AccountCoinsRequirement, BlockRequirement, Validation,
    };
    use crate::fetcher::types::NetworkIdentifier;
    use uuid::Uuid;

    fn report() -> RunReport {
        let mut block = Validation::<BlockRequirement>::new();
        block.set_failure(BlockRequirement::DefaultTip, "index 3 below tip 4");
        let mut coins = Validation::<AccountCoinsRequirement>::new();
        coins.skip("account based chain");

        RunReport {
            run_id: Uuid::nil(),
            network: NetworkIdentifier::new("sweet", "sweeter"),
            endpoints: vec![coins.finish(), block.finish()],
        }
    }

    #[test]
    fn test_table_lists_every_requirement() {
        let table = render_table(&report());

        assert!(table.starts_with("Run 00000000-0000-0000-0000-000000000000 on sweet/sweeter"));
        assert!(table.contains("| /block "));
        assert!(table.contains(" idempotent "));
        assert!(table.contains(" Skipped "));
        assert!(table.contains("/account/coins skipped: account based chain"));
        assert!(table.contains("1 requirement(s) failed:"));
        assert!(table.contains("  /block default_tip: index 3 below tip 4"));

        let widths: Vec<usize> = table.lines().filter(|l| l.starts_with('|')).map(str::len).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&report()).unwrap()).unwrap();

        assert_eq!(json["network"]["blockchain"], "sweet");
        assert_eq!(json["endpoints"][1]["api"], "block");
        assert_eq!(json["endpoints"][1]["validation"][1]["requirement"], "default_tip");
        assert_eq!(json["endpoints"][1]["validation"][1]["status"], "failure");
        assert_eq!(json["endpoints"][0]["skipped"], "account based chain");
    }
}
