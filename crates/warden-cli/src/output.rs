//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use warden_audit::ChainReport;
use warden_domain::{BatchReport, ItemResult, ItemStatus, RiskTier};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format one item result.
    pub fn format_item(&self, item: &ItemResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(item)?),
            OutputFormat::Quiet => Ok(quiet_line(item)),
            OutputFormat::Table => Ok(self.format_item_table(item)),
        }
    }

    /// Format a batch report.
    pub fn format_report(&self, report: &BatchReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => {
                let lines: Vec<String> = report.items.iter().map(quiet_line).collect();
                Ok(lines.join("\n"))
            }
            OutputFormat::Table => Ok(self.format_report_table(report)),
        }
    }

    /// Format an audit chain report.
    pub fn format_chain(&self, report: &ChainReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => Ok(report.last_hash.clone()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Lines", "Intents", "Outcomes", "Last hash"]);
                builder.push_record([
                    report.lines.to_string(),
                    report.intents.to_string(),
                    report.outcomes.to_string(),
                    report.last_hash.clone(),
                ]);
                let table = styled(builder);
                Ok(format!("{}\n{}", table, self.success("Audit chain intact")))
            }
        }
    }

    fn format_item_table(&self, item: &ItemResult) -> String {
        let mut rows: Vec<(&str, String)> = vec![
            ("Threat", item.threat_id.clone()),
            ("Status", item.status.to_string()),
        ];
        if let Some(tier) = item.tier {
            rows.push(("Tier", tier.to_string()));
        }
        if !item.triggers.is_empty() {
            rows.push(("Triggers", triggers(item)));
        }
        if let Some(model) = &item.model {
            rows.push(("Model", model.clone()));
        }
        if let Some(decision) = &item.decision {
            rows.push(("Confirmed", yes_no(decision.confirmed).to_string()));
            rows.push(("Required", yes_no(decision.required).to_string()));
            if let Some(actor) = &decision.actor {
                rows.push(("Actor", actor.clone()));
            }
        }
        if let Some(execution) = &item.execution {
            rows.push(("Execution", execution.state.to_string()));
            rows.push(("Exit code", exit_code(item)));
            rows.push(("Duration", format!("{} ms", execution.duration_ms)));
        }

        let mut builder = Builder::default();
        builder.push_record(["Field".to_string(), "Value".to_string()]);
        for (field, value) in rows {
            builder.push_record([field.to_string(), value]);
        }

        let mut out = styled(builder);
        if let Some(recommendation) = &item.recommendation {
            out.push_str("\n\nRecommendation:\n");
            out.push_str(recommendation);
        }
        if let Some(execution) = &item.execution {
            push_stream(&mut out, "stdout", &execution.stdout, execution.stdout_truncated);
            push_stream(&mut out, "stderr", &execution.stderr, execution.stderr_truncated);
        }
        out.push_str("\n\n");
        out.push_str(&self.status_line(item));
        out
    }

    fn format_report_table(&self, report: &BatchReport) -> String {
        if report.items.is_empty() {
            return self.warning("No threats in batch.");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Threat", "Status", "Tier", "Confirmed", "Exit", "Detail"]);

        for (i, item) in report.items.iter().enumerate() {
            let confirmed = item
                .decision
                .as_ref()
                .map(|d| yes_no(d.confirmed))
                .unwrap_or("-");
            let detail = item
                .error
                .clone()
                .unwrap_or_else(|| triggers(item));
            builder.push_record([
                (i + 1).to_string(),
                item.threat_id.clone(),
                item.status.as_str().to_string(),
                item.tier.map(|t| t.as_str()).unwrap_or("-").to_string(),
                confirmed.to_string(),
                exit_code(item),
                truncate(&detail, 60),
            ]);
        }

        let summary = if report.counts.failed > 0 || report.counts.timed_out > 0 {
            self.warning(&report.summary())
        } else {
            self.info(&report.summary())
        };
        format!("{}\n{}", styled(builder), summary)
    }

    /// One colored line describing an item's outcome.
    pub fn status_line(&self, item: &ItemResult) -> String {
        match item.status {
            ItemStatus::Executed => self.success(&item.summary),
            ItemStatus::ClassificationOnly => self.info(&item.summary),
            ItemStatus::SkippedNotConfirmed if item.tier == Some(RiskTier::Destructive) => {
                self.warning(&item.summary)
            }
            ItemStatus::SkippedNotConfirmed => self.info(&item.summary),
            _ => self.error(&item.summary),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn quiet_line(item: &ItemResult) -> String {
    format!("{} {}", item.threat_id, item.status)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn triggers(item: &ItemResult) -> String {
    item.triggers
        .iter()
        .map(|t| format!("{} ({})", t.token, t.category.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn exit_code(item: &ItemResult) -> String {
    item.execution
        .as_ref()
        .and_then(|e| e.exit_code)
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn push_stream(out: &mut String, name: &str, text: &str, truncated: bool) {
    if text.is_empty() {
        return;
    }
    out.push_str(&format!("\n\n{}{}:\n", name, if truncated { " (truncated)" } else { "" }));
    out.push_str(text.trim_end());
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::{
        ConfirmationDecision, ExecutionResult, PayloadKind, Recommendation, RiskAssessment,
        RiskCategory, RiskTrigger, TerminalState,
    };

    fn executed_item() -> ItemResult {
        let rec = Recommendation::new("t1", "kill -9 4242", PayloadKind::Advice, "mock");
        let assessment = RiskAssessment::from_triggers(vec![RiskTrigger {
            token: "kill".into(),
            category: RiskCategory::TerminateProcess,
            fragment: "kill".into(),
        }]);
        let decision = ConfirmationDecision {
            confirmed: true,
            required: true,
            source: None,
            actor: Some("analyst".into()),
            decided_at: 1,
        };
        let execution = ExecutionResult {
            state: TerminalState::Completed,
            exit_code: Some(0),
            stdout: "terminated\n".into(),
            stderr: String::new(),
            stdout_truncated: false,
            stderr_truncated: false,
            duration_ms: 12,
            detail: None,
        };
        ItemResult::assessed(&rec, &assessment, &decision, ItemStatus::Executed, Some(execution))
    }

    #[test]
    fn test_item_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_item(&executed_item()).unwrap();
        assert!(output.contains("Threat"));
        assert!(output.contains("destructive"));
        assert!(output.contains("kill (terminate_process)"));
        assert!(output.contains("terminated"));
        assert!(output.contains("✓ t1"));
    }

    #[test]
    fn test_item_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_item(&executed_item()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["status"], "executed");
    }

    #[test]
    fn test_quiet_report() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let failed = ItemResult::failed("row-3", ItemStatus::InvalidRecord, "threat_id must not be empty");
        let report = BatchReport::new(vec![executed_item(), failed], 0, 1);
        let output = formatter.format_report(&report).unwrap();
        assert_eq!(output, "t1 executed\nrow-3 invalid_record");
    }

    #[test]
    fn test_report_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let failed = ItemResult::failed("row-3", ItemStatus::InvalidRecord, "threat_id must not be empty");
        let report = BatchReport::new(vec![executed_item(), failed], 0, 1);
        let output = formatter.format_report(&report).unwrap();
        assert!(output.contains("Confirmed"));
        assert!(output.contains("row-3"));
        assert!(output.contains("2 item(s)"));
    }

    #[test]
    fn test_empty_report() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_report(&BatchReport::new(vec![], 0, 0)).unwrap();
        assert!(output.contains("No threats"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
