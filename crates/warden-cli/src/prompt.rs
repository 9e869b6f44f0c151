//! Interactive confirmation on the terminal.

use async_trait::async_trait;
use std::io::{self, BufRead, Write};
use tracing::warn;
use warden_domain::{
    ConfirmationSignal, ConfirmationSource, Confirmer, Recommendation, RiskAssessment,
    ThreatRecord,
};

/// Asks the operator on stderr/stdin before anything executes.
///
/// Only `y` or `yes` confirms. An empty line, any other answer, or a
/// closed stdin is a refusal.
#[derive(Debug, Clone)]
pub struct InteractiveConfirmer {
    actor: String,
}

impl InteractiveConfirmer {
    /// Create a confirmer attributed to the current user.
    pub fn new() -> Self {
        Self {
            actor: current_user(),
        }
    }

    /// The actor recorded in the audit trail.
    pub fn actor(&self) -> &str {
        &self.actor
    }
}

impl Default for InteractiveConfirmer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Confirmer for InteractiveConfirmer {
    async fn confirm(
        &self,
        record: &ThreatRecord,
        recommendation: &Recommendation,
        assessment: &RiskAssessment,
    ) -> Option<ConfirmationSignal> {
        let mut banner = format!(
            "\nThreat: {}\nRisk tier: {}\n",
            record.id(),
            assessment.tier
        );
        for trigger in &assessment.triggers {
            banner.push_str(&format!("  - {} ({}): {}\n", trigger.token, trigger.category, trigger.fragment));
        }
        banner.push_str("\nRecommendation:\n");
        banner.push_str(recommendation.payload());
        banner.push_str("\n\nExecute? [y/N] ");

        let answer = tokio::task::spawn_blocking(move || read_answer(&banner)).await;
        match answer {
            Ok(Ok(line)) => Some(ConfirmationSignal::new(
                parse_answer(&line),
                ConfirmationSource::Interactive,
                self.actor.clone(),
            )),
            Ok(Err(e)) => {
                warn!(error = %e, "Could not read confirmation; treating as unconfirmed");
                None
            }
            Err(e) => {
                warn!(error = %e, "Confirmation prompt failed; treating as unconfirmed");
                None
            }
        }
    }
}

fn read_answer(banner: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    stderr.write_all(banner.as_bytes())?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Whether a prompt answer confirms.
pub fn parse_answer(line: &str) -> bool {
    let answer = line.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Name recorded as the actor for local confirmations.
pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "local-user".to_string())
}
