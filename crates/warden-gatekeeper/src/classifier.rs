//! Destructive-action classifier
//!
//! Classification is a pure function of the recommendation text and the
//! rule table: no I/O, no clock, no model call. The same text always
//! yields the same assessment.

use crate::rules::{normalize, words, MatchMode, RiskRuleSet};
use tracing::debug;
use warden_domain::{Recommendation, RiskAssessment, RiskTrigger};

/// One whitespace-delimited piece of the recommendation
struct Chunk<'a> {
    original: &'a str,
    compact: String,
    words: Vec<String>,
}

impl<'a> Chunk<'a> {
    fn new(original: &'a str) -> Self {
        Self {
            original,
            compact: normalize(original),
            words: words(original),
        }
    }

    fn matches(&self, token: &str, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Contains => self.compact.contains(token),
            MatchMode::Word => self.words.iter().any(|w| w == token),
            MatchMode::Phrase | MatchMode::Redirect => false,
        }
    }
}

/// First run of chunks whose words spell out the phrase
fn find_phrase(chunks: &[Chunk<'_>], phrase: &str) -> Option<String> {
    let wanted: Vec<&str> = phrase.split(' ').collect();
    if wanted.is_empty() {
        return None;
    }

    let flat: Vec<(&str, usize)> = chunks
        .iter()
        .enumerate()
        .flat_map(|(i, chunk)| chunk.words.iter().map(move |w| (w.as_str(), i)))
        .collect();

    flat.windows(wanted.len())
        .find(|window| window.iter().map(|(w, _)| *w).eq(wanted.iter().copied()))
        .map(|window| {
            let first = window[0].1;
            let last = window[window.len() - 1].1;
            chunks[first..=last]
                .iter()
                .map(|c| c.original)
                .collect::<Vec<_>>()
                .join(" ")
        })
}

/// First `>` redirection that truncates a real file
///
/// Returns the redirection and its target, e.g. `> /etc/passwd`.
fn find_truncating_redirect(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c != '>' {
            continue;
        }
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        // `>>` appends; `->`, `=>`, `>=` and `<>` are not redirections
        if matches!(prev, Some('>' | '-' | '=' | '<')) || matches!(next, Some('>' | '=')) {
            continue;
        }

        let mut j = i + 1;
        if next == Some('|') {
            j += 1;
        }
        while chars.get(j).is_some_and(|c| *c == ' ' || *c == '\t') {
            j += 1;
        }
        if chars.get(j) == Some(&'&') {
            continue;
        }
        let start = j;
        while chars
            .get(j)
            .is_some_and(|c| !c.is_whitespace() && !matches!(c, ';' | '&' | '|' | ')'))
        {
            j += 1;
        }

        let target: String = chars[start..j]
            .iter()
            .filter(|c| !matches!(c, '\'' | '"'))
            .collect();
        let lower = target.to_lowercase();
        if target.is_empty()
            || lower == "/dev/null"
            || lower == "nul"
            || lower == "$null"
            || target.parse::<f64>().is_ok()
        {
            continue;
        }

        return Some(chars[i..j].iter().collect());
    }
    None
}

/// Assigns a risk tier to recommendations
///
/// # Examples
///
/// ```
/// use warden_gatekeeper::Classifier;
/// use warden_domain::{PayloadKind, Recommendation, RiskTier};
///
/// let classifier = Classifier::default();
/// let rec = Recommendation::new("t1", "Terminate the process", PayloadKind::Advice, "mock");
/// assert_eq!(classifier.classify(&rec).tier, RiskTier::Destructive);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: RiskRuleSet,
}

impl Classifier {
    /// Create a classifier over a rule table
    pub fn new(rules: RiskRuleSet) -> Self {
        Self { rules }
    }

    /// The active rule table
    pub fn rules(&self) -> &RiskRuleSet {
        &self.rules
    }

    /// Classify a recommendation
    pub fn classify(&self, recommendation: &Recommendation) -> RiskAssessment {
        let assessment = self.classify_text(recommendation.payload());
        debug!(
            threat_id = recommendation.threat_id(),
            tier = %assessment.tier,
            triggers = assessment.triggers.len(),
            "Classified recommendation"
        );
        assessment
    }

    /// Classify raw text
    ///
    /// Each rule contributes at most one trigger, its first match in the
    /// text. Triggers are reported in rule-table order.
    pub fn classify_text(&self, text: &str) -> RiskAssessment {
        let chunks: Vec<Chunk<'_>> = text.split_whitespace().map(Chunk::new).collect();

        let triggers = self
            .rules
            .iter()
            .filter_map(|rule| {
                let fragment = match rule.mode {
                    MatchMode::Contains | MatchMode::Word => chunks
                        .iter()
                        .find(|chunk| chunk.matches(&rule.token, rule.mode))
                        .map(|chunk| chunk.original.to_string()),
                    MatchMode::Phrase => find_phrase(&chunks, &rule.token),
                    MatchMode::Redirect => find_truncating_redirect(text),
                }?;
                Some(RiskTrigger {
                    token: rule.token.clone(),
                    category: rule.category,
                    fragment,
                })
            })
            .collect();

        RiskAssessment::from_triggers(triggers)
    }
}
