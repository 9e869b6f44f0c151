//! Risk module - classification output

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk tier assigned to a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// No risk indicator matched
    Benign,

    /// At least one risk indicator matched
    Destructive,
}

impl RiskTier {
    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Benign => "benign",
            RiskTier::Destructive => "destructive",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family of destructive behaviour a rule detects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    /// Killing or stopping processes
    TerminateProcess,
    /// Deleting, wiping or overwriting files
    DeleteFile,
    /// Formatting or repartitioning disks
    FormatDisk,
    /// Changing ownership, ACLs or permission bits
    ModifyPermissions,
    /// Moving data off the host
    NetworkExfiltration,
    /// Moving, renaming, encrypting or quarantining files
    AlterFile,
    /// Services, registry, boot configuration
    SystemConfiguration,
}

impl RiskCategory {
    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::TerminateProcess => "terminate_process",
            RiskCategory::DeleteFile => "delete_file",
            RiskCategory::FormatDisk => "format_disk",
            RiskCategory::ModifyPermissions => "modify_permissions",
            RiskCategory::NetworkExfiltration => "network_exfiltration",
            RiskCategory::AlterFile => "alter_file",
            RiskCategory::SystemConfiguration => "system_configuration",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule that matched a recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskTrigger {
    /// The rule token that matched
    pub token: String,

    /// Category of the rule
    pub category: RiskCategory,

    /// The fragment of recommendation text that matched
    pub fragment: String,
}

/// Result of classifying a recommendation
///
/// Derived deterministically from the recommendation text. It is
/// recomputed for every run and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Assigned tier
    pub tier: RiskTier,

    /// Matched triggers, in rule-table order (empty for benign)
    pub triggers: Vec<RiskTrigger>,
}

impl RiskAssessment {
    /// Build an assessment from the matched triggers
    ///
    /// Any trigger makes the assessment destructive.
    pub fn from_triggers(triggers: Vec<RiskTrigger>) -> Self {
        let tier = if triggers.is_empty() {
            RiskTier::Benign
        } else {
            RiskTier::Destructive
        };
        Self { tier, triggers }
    }

    /// Whether the tier is destructive
    pub fn is_destructive(&self) -> bool {
        self.tier == RiskTier::Destructive
    }

    /// Distinct categories among the triggers, sorted
    pub fn categories(&self) -> Vec<RiskCategory> {
        let mut categories: Vec<RiskCategory> =
            self.triggers.iter().map(|t| t.category).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}
