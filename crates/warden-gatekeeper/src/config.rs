//! Gatekeeper configuration

use crate::rules::{RiskRule, RiskRuleSet};
use crate::{ConfirmationPolicy, GatekeeperError};
use serde::{Deserialize, Serialize};

/// Configuration for classification and confirmation
///
/// ```toml
/// [gate]
/// policy = "always"
/// replace_default_rules = false
///
/// [[gate.rules]]
/// token = "vssadmin"
/// category = "system_configuration"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Which runs need explicit confirmation
    pub policy: ConfirmationPolicy,

    /// Extra rules, appended to the built-in table
    pub rules: Vec<RiskRule>,

    /// Use only `rules`, dropping the built-in table
    pub replace_default_rules: bool,
}

impl GateConfig {
    /// Create a configuration that only requires confirmation for destructive runs
    pub fn destructive_only() -> Self {
        Self {
            policy: ConfirmationPolicy::DestructiveOnly,
            ..Default::default()
        }
    }

    /// Build the effective rule table
    ///
    /// # Errors
    ///
    /// Returns `GatekeeperError::InvalidRule` if a configured token is
    /// empty after normalization.
    pub fn rule_set(&self) -> Result<RiskRuleSet, GatekeeperError> {
        let mut set = if self.replace_default_rules {
            RiskRuleSet::empty()
        } else {
            RiskRuleSet::default()
        };
        for rule in &self.rules {
            set.push(RiskRule::new(&rule.token, rule.category, rule.mode)?);
        }
        Ok(set)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let set = self.rule_set().map_err(|e| format!("gate: {}", e))?;
        if set.is_empty() {
            return Err("gate: rule table is empty".to_string());
        }
        Ok(())
    }
}
