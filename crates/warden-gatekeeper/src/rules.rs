//! Risk rule table
//!
//! The table is plain data: each rule is a token, the category it flags,
//! and how the token is matched. The built-in table can be extended or
//! replaced from TOML without touching the classifier.
//!
//! ```toml
//! [[rules]]
//! token = "vssadmin"
//! category = "system_configuration"
//!
//! [[rules]]
//! token = "sc"
//! category = "system_configuration"
//! mode = "word"
//!
//! [[rules]]
//! token = "type nul"
//! category = "delete_file"
//! mode = "phrase"
//! ```

use crate::GatekeeperError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use warden_domain::RiskCategory;

/// How a rule token is compared against recommendation text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Token appears anywhere inside a whitespace-delimited chunk once
    /// punctuation is stripped (`Remove-Item` contains `remove`)
    #[default]
    Contains,

    /// Token equals one alphanumeric word (`rm` in `rm -rf`, not in `arm`)
    Word,

    /// Token is a sequence of words that must appear consecutively,
    /// across whitespace and punctuation (`cp /dev/null` is `cp dev null`)
    Phrase,

    /// Output redirection that truncates a file (`> /etc/passwd`).
    /// Redirections to `/dev/null`, `nul` or a file descriptor (`>&2`) and
    /// appends (`>>`) do not match. The token is only a label.
    Redirect,
}

/// One entry of the rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRule {
    /// Normalized token: lowercase, alphanumeric only
    pub token: String,

    /// Category reported when the rule matches
    pub category: RiskCategory,

    /// Matching mode
    #[serde(default)]
    pub mode: MatchMode,
}

impl RiskRule {
    /// Create a rule, normalizing the token
    ///
    /// # Errors
    ///
    /// Returns `GatekeeperError::InvalidRule` if the token has no
    /// alphanumeric characters.
    pub fn new(
        token: &str,
        category: RiskCategory,
        mode: MatchMode,
    ) -> Result<Self, GatekeeperError> {
        let normalized = normalize_token(token, mode);
        if normalized.is_empty() {
            return Err(GatekeeperError::InvalidRule(format!(
                "token '{}' has no alphanumeric characters",
                token
            )));
        }
        Ok(Self {
            token: normalized,
            category,
            mode,
        })
    }
}

/// Lowercase and drop everything that is not alphanumeric
pub(crate) fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lowercase alphanumeric words, in order
pub(crate) fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Normalize a token for its matching mode
pub(crate) fn normalize_token(token: &str, mode: MatchMode) -> String {
    match mode {
        MatchMode::Phrase => words(token).join(" "),
        _ => normalize(token),
    }
}

use MatchMode::{Contains, Phrase, Redirect, Word};
use RiskCategory::*;

const DEFAULT_RULES: &[(&str, RiskCategory, MatchMode)] = &[
    // Process termination
    ("kill", TerminateProcess, Contains),
    ("terminate", TerminateProcess, Contains),
    ("stopprocess", TerminateProcess, Contains),
    // File deletion and wiping
    ("delete", DeleteFile, Contains),
    ("remove", DeleteFile, Contains),
    ("erase", DeleteFile, Contains),
    ("unlink", DeleteFile, Contains),
    ("rmtree", DeleteFile, Contains),
    ("rmdir", DeleteFile, Contains),
    ("shred", DeleteFile, Contains),
    ("wipe", DeleteFile, Contains),
    ("purge", DeleteFile, Contains),
    ("truncate", DeleteFile, Contains),
    ("overwrite", DeleteFile, Contains),
    ("destroy", DeleteFile, Contains),
    ("uninstall", DeleteFile, Contains),
    ("rm", DeleteFile, Word),
    ("del", DeleteFile, Word),
    ("rd", DeleteFile, Word),
    ("srm", DeleteFile, Word),
    ("rmsync", DeleteFile, Contains),
    ("rimraf", DeleteFile, Contains),
    ("cp dev null", DeleteFile, Phrase),
    ("copy nul", DeleteFile, Phrase),
    ("redirect", DeleteFile, Redirect),
    // Disk formatting
    ("mkfs", FormatDisk, Contains),
    ("diskpart", FormatDisk, Contains),
    ("fdisk", FormatDisk, Contains),
    ("wipefs", FormatDisk, Contains),
    ("formatvolume", FormatDisk, Contains),
    ("cleardisk", FormatDisk, Contains),
    ("format", FormatDisk, Word),
    ("dd", FormatDisk, Word),
    ("parted", FormatDisk, Word),
    // Permission changes
    ("chmod", ModifyPermissions, Contains),
    ("chown", ModifyPermissions, Contains),
    ("chgrp", ModifyPermissions, Contains),
    ("chattr", ModifyPermissions, Contains),
    ("icacls", ModifyPermissions, Contains),
    ("cacls", ModifyPermissions, Contains),
    ("takeown", ModifyPermissions, Contains),
    ("setfacl", ModifyPermissions, Contains),
    ("setacl", ModifyPermissions, Contains),
    ("attrib", ModifyPermissions, Word),
    // Data leaving the host
    ("exfiltrat", NetworkExfiltration, Contains),
    ("netcat", NetworkExfiltration, Contains),
    ("invokewebrequest", NetworkExfiltration, Contains),
    ("requestspost", NetworkExfiltration, Contains),
    ("requestsput", NetworkExfiltration, Contains),
    ("invokerestmethod", NetworkExfiltration, Contains),
    ("uploadfile", NetworkExfiltration, Contains),
    ("curl", NetworkExfiltration, Word),
    ("wget", NetworkExfiltration, Word),
    ("nc", NetworkExfiltration, Word),
    ("ncat", NetworkExfiltration, Word),
    ("scp", NetworkExfiltration, Word),
    ("sftp", NetworkExfiltration, Word),
    ("ftp", NetworkExfiltration, Word),
    ("tftp", NetworkExfiltration, Word),
    ("rsync", NetworkExfiltration, Word),
    // File alteration
    ("encrypt", AlterFile, Contains),
    ("quarantine", AlterFile, Contains),
    ("rename", AlterFile, Contains),
    ("moveitem", AlterFile, Contains),
    ("mv", AlterFile, Word),
    ("move", AlterFile, Word),
    ("ren", AlterFile, Word),
    // System configuration
    ("shutdown", SystemConfiguration, Contains),
    ("reboot", SystemConfiguration, Contains),
    ("stopservice", SystemConfiguration, Contains),
    ("systemctl", SystemConfiguration, Contains),
    ("crontab", SystemConfiguration, Contains),
    ("iptables", SystemConfiguration, Contains),
    ("netsh", SystemConfiguration, Contains),
    ("bcdedit", SystemConfiguration, Contains),
    ("schtasks", SystemConfiguration, Contains),
    ("setitemproperty", SystemConfiguration, Contains),
    ("regedit", SystemConfiguration, Contains),
    ("reg", SystemConfiguration, Word),
];

/// Ordered rule table
///
/// Order matters only for reporting: triggers come back in table order,
/// which keeps classifier output stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRuleSet {
    /// Rules, in evaluation order
    #[serde(default)]
    pub rules: Vec<RiskRule>,
}

impl Default for RiskRuleSet {
    fn default() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(token, category, mode)| RiskRule {
                token: (*token).to_string(),
                category: *category,
                mode: *mode,
            })
            .collect();
        Self { rules }
    }
}

impl RiskRuleSet {
    /// An empty table
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Parse a rule table from TOML (`[[rules]]` entries)
    ///
    /// Tokens are normalized the same way as rules built in code.
    pub fn from_toml_str(content: &str) -> Result<Self, GatekeeperError> {
        let parsed: RiskRuleSet = toml::from_str(content)?;
        let mut set = RiskRuleSet::empty();
        for rule in parsed.rules {
            set.push(RiskRule::new(&rule.token, rule.category, rule.mode)?);
        }
        Ok(set)
    }

    /// Load a rule table from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GatekeeperError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Append a rule, skipping exact duplicates
    pub fn push(&mut self, rule: RiskRule) {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
    }

    /// Append every rule of another table
    pub fn extend(&mut self, other: RiskRuleSet) {
        for rule in other.rules {
            self.push(rule);
        }
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over the rules in order
    pub fn iter(&self) -> impl Iterator<Item = &RiskRule> {
        self.rules.iter()
    }
}
