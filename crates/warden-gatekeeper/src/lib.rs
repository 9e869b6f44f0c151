//! Warden Gatekeeper
//!
//! Decides whether a recommendation may run.
//!
//! The Gatekeeper provides:
//! - A configurable risk rule table (`RiskRuleSet`)
//! - A pure, deterministic classifier (`Classifier`)
//! - A per-run confirmation gate that defaults to "not confirmed"
//!   (`ConfirmationGate`)
//!
//! # Examples
//!
//! ```
//! use warden_gatekeeper::{Classifier, ConfirmationGate, GateConfig};
//! use warden_domain::{ConfirmationSignal, ConfirmationSource, PayloadKind, Recommendation};
//!
//! let config = GateConfig::default();
//! let classifier = Classifier::new(config.rule_set().unwrap());
//!
//! let rec = Recommendation::new("t1", "rm -f /tmp/x", PayloadKind::Advice, "mock");
//! let assessment = classifier.classify(&rec);
//! assert!(assessment.is_destructive());
//!
//! let mut gate = ConfirmationGate::new(config.policy);
//! let signal = ConfirmationSignal::new(true, ConfirmationSource::Interactive, "analyst");
//! assert!(gate.resolve(&assessment, Some(signal)).unwrap().permits_execution());
//! ```

#![warn(missing_docs)]

mod classifier;
mod config;
mod error;
mod gate;
pub mod rules;

pub use classifier::Classifier;
pub use config::GateConfig;
pub use error::GatekeeperError;
pub use gate::{ConfirmationGate, ConfirmationPolicy, GateState};
pub use rules::{MatchMode, RiskRule, RiskRuleSet};
