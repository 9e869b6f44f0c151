//! LLM prompt construction for remediation requests

use warden_domain::{RunMode, ThreatRecord};

const SYSTEM_PROMPT: &str = "You are a cybersecurity assistant specialized in AV/EDR.";

const EXECUTE_INSTRUCTIONS: &str = "Provide a remediation for this threat as a single \
fenced code block (```sh ... ```) that can be run as-is on the affected host. \
Return only the code block, with no explanation before or after it. \
Do not use sudo or any other privilege escalation.";

const ADVISE_INSTRUCTIONS: &str = "Provide a concise recommendation that includes \
what to do, why it matters, and if it is destructive \
(mention 'delete', 'remove', 'kill', etc.). \
Return the recommendation in a single paragraph.";

/// A system/user prompt pair for a chat-style model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    /// System role message
    pub system: String,
    /// User role message
    pub user: String,
}

/// Builds prompts from threat records
pub struct PromptBuilder<'a> {
    record: &'a ThreatRecord,
    mode: RunMode,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(record: &'a ThreatRecord, mode: RunMode) -> Self {
        Self { record, mode }
    }

    /// Build the complete prompt
    pub fn build(&self) -> ChatPrompt {
        let threat_json = serde_json::to_string_pretty(self.record)
            .unwrap_or_else(|_| format!("{{\"threat_id\": \"{}\"}}", self.record.id()));

        let instructions = match self.mode {
            RunMode::Execute => EXECUTE_INSTRUCTIONS,
            RunMode::Advise => ADVISE_INSTRUCTIONS,
        };

        ChatPrompt {
            system: SYSTEM_PROMPT.to_string(),
            user: format!("Threat Data:\n{}\n\n{}", threat_json, instructions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ThreatRecord {
        ThreatRecord::new("malware-001")
            .unwrap()
            .with_path(Some("/tmp/x".into()))
            .with_fingerprint(Some("aaaa".into()))
    }

    #[test]
    fn test_prompt_contains_threat_json() {
        let record = record();
        let prompt = PromptBuilder::new(&record, RunMode::Execute).build();
        assert!(prompt.system.contains("AV/EDR"));
        assert!(prompt.user.starts_with("Threat Data:\n"));
        assert!(prompt.user.contains("\"threat_id\": \"malware-001\""));
        assert!(prompt.user.contains("\"file_path\": \"/tmp/x\""));
    }

    #[test]
    fn test_execute_mode_asks_for_one_block() {
        let record = record();
        let prompt = PromptBuilder::new(&record, RunMode::Execute).build();
        assert!(prompt.user.contains("single fenced code block"));
    }

    #[test]
    fn test_advise_mode_asks_for_paragraph() {
        let record = record();
        let prompt = PromptBuilder::new(&record, RunMode::Advise).build();
        assert!(prompt.user.contains("single paragraph"));
        assert!(!prompt.user.contains("fenced code block"));
    }
}
