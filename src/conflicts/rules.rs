//! Keyword tables and pairwise text rules

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::document::ConstraintKind;

use super::ConflictKind;

/// (affirmative, opposing) phrases, lowercase, space separated
const ANTONYMS: &[(&str, &str)] = &[
    ("always", "never"),
    ("must", "must not"),
    ("must", "cannot"),
    ("must", "never"),
    ("allow", "deny"),
    ("allow", "forbid"),
    ("allow", "prohibit"),
    ("allowed", "forbidden"),
    ("allowed", "prohibited"),
    ("allows", "denies"),
    ("require", "forbid"),
    ("required", "forbidden"),
    ("enable", "disable"),
    ("enabled", "disabled"),
    ("include", "exclude"),
    ("mutable", "immutable"),
    ("public", "private"),
    ("synchronous", "asynchronous"),
    ("encrypted", "plaintext"),
    ("online", "offline"),
    ("stateless", "stateful"),
    ("centralized", "decentralized"),
];

const RESOURCES: &[&str] = &[
    "memory",
    "cpu",
    "latency",
    "bandwidth",
    "storage",
    "disk",
    "connection",
    "connections",
    "thread",
    "threads",
    "timeout",
    "throughput",
    "requests",
    "budget",
    "cost",
    "quota",
    "rate",
];

const SIMULTANEOUS: &[&str] = &[
    "simultaneous",
    "simultaneously",
    "concurrent",
    "concurrently",
    "parallel",
    "at the same time",
];

const SEQUENTIAL: &[&str] = &[
    "sequential",
    "sequentially",
    "serial",
    "serially",
    "in sequence",
    "one at a time",
    "strictly ordered",
];

const OPERATIONS: &[&str] = &[
    "read", "reads", "write", "writes", "update", "updates", "delete", "deletes", "deploy",
    "deploys", "deployment", "migrate", "migration", "sync", "commit", "commits", "process",
    "processing", "validate", "validation", "build", "builds", "load", "save", "upload",
    "download", "send", "index", "indexing",
];

const GLOBAL_SCOPE: &[&str] = &[
    "global",
    "globally",
    "all",
    "every",
    "everywhere",
    "system wide",
    "universal",
    "universally",
    "entire",
];

const LOCAL_SCOPE: &[&str] = &[
    "local",
    "locally",
    "only",
    "specific",
    "single",
    "per",
    "scoped",
    "isolated",
    "individual",
];

const STOPWORDS: &[&str] = &[
    "that", "this", "with", "from", "have", "has", "been", "were", "will", "shall", "should",
    "must", "into", "when", "then", "than", "they", "them", "their", "there", "which", "while",
    "each", "every", "only", "also", "more", "less", "most", "least", "over", "under", "within",
    "without", "after", "before", "about", "never", "always", "cannot", "allow", "allowed",
    "allows", "deny", "denies", "forbid", "forbidden", "prohibit", "prohibited", "require",
    "required", "requires", "enable", "enabled", "disable", "disabled", "include", "exclude",
];

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("Invalid regex pattern"));

/// A constraint prepared for pairwise comparison
pub(super) struct Statement<'a> {
    pub document: &'a str,
    pub id: &'a str,
    pub category: &'a str,
    pub kind: ConstraintKind,
    tokens: Vec<String>,
    significant: BTreeSet<String>,
    numbers: BTreeSet<String>,
}

impl<'a> Statement<'a> {
    pub fn new(
        document: &'a str,
        id: &'a str,
        category: &'a str,
        kind: ConstraintKind,
        text: &'a str,
    ) -> Self {
        let lower = text.to_lowercase();
        let tokens: Vec<String> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        let significant = tokens
            .iter()
            .filter(|t| t.len() >= 4 && !STOPWORDS.contains(&t.as_str()))
            .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
            .cloned()
            .collect();
        let numbers = NUMBER
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect();

        Self {
            document,
            id,
            category,
            kind,
            tokens,
            significant,
            numbers,
        }
    }

    /// Whole-word (or whole-phrase) containment
    fn has(&self, phrase: &str) -> bool {
        let words: Vec<&str> = phrase.split(' ').collect();
        self.tokens
            .windows(words.len())
            .any(|window| window.iter().zip(&words).all(|(t, w)| t == w))
    }

    fn has_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.has(p))
    }

    fn shared_significant(&self, other: &Statement<'_>) -> usize {
        self.significant.intersection(&other.significant).count()
    }
}

/// Every rule that fires for the pair, with a human-readable reason
pub(super) fn check_pair(
    a: &Statement<'_>,
    b: &Statement<'_>,
    same_document: bool,
) -> Vec<(ConflictKind, String)> {
    let mut found = Vec::new();

    if let Some(reason) = contradictory_invariants(a, b) {
        found.push((ConflictKind::ContradictoryInvariants, reason));
    }
    if let Some(reason) = resource_conflict(a, b) {
        found.push((ConflictKind::ResourceConflict, reason));
    }
    if let Some(reason) = temporal_conflict(a, b) {
        found.push((ConflictKind::TemporalConflict, reason));
    }
    if let Some(reason) = scope_conflict(a, b, same_document) {
        found.push((ConflictKind::ScopeConflict, reason));
    }

    found
}

fn opposes(a: &Statement<'_>, b: &Statement<'_>, affirmative: &str, opposing: &str) -> bool {
    a.has(affirmative) && !a.has(opposing) && b.has(opposing)
}

fn contradictory_invariants(a: &Statement<'_>, b: &Statement<'_>) -> Option<String> {
    if a.kind != ConstraintKind::Invariant || b.kind != ConstraintKind::Invariant {
        return None;
    }
    let (affirmative, opposing) = ANTONYMS
        .iter()
        .find(|(pos, neg)| opposes(a, b, pos, neg) || opposes(b, a, pos, neg))?;

    let shared = a.shared_significant(b);
    if shared < 2 {
        return None;
    }
    Some(format!(
        "'{affirmative}' versus '{opposing}' over {shared} shared terms"
    ))
}

fn resource_conflict(a: &Statement<'_>, b: &Statement<'_>) -> Option<String> {
    let resource = RESOURCES.iter().find(|r| a.has(r) && b.has(r))?;

    if a.numbers.is_empty() || b.numbers.is_empty() || a.numbers == b.numbers {
        return None;
    }
    let thresholds: BTreeSet<&String> = a.numbers.union(&b.numbers).collect();
    if thresholds.len() < 2 {
        return None;
    }
    let listed: Vec<&str> = thresholds.iter().map(|n| n.as_str()).collect();
    Some(format!(
        "competing {resource} thresholds: {}",
        listed.join(", ")
    ))
}

fn temporal_conflict(a: &Statement<'_>, b: &Statement<'_>) -> Option<String> {
    let split = (a.has_any(SIMULTANEOUS) && b.has_any(SEQUENTIAL))
        || (a.has_any(SEQUENTIAL) && b.has_any(SIMULTANEOUS));
    if !split {
        return None;
    }
    let operation = OPERATIONS.iter().find(|op| a.has(op) && b.has(op))?;
    Some(format!(
        "'{operation}' required both concurrently and in sequence"
    ))
}

fn scope_conflict(a: &Statement<'_>, b: &Statement<'_>, same_document: bool) -> Option<String> {
    if same_document && a.category == b.category {
        return None;
    }
    let split = (a.has_any(GLOBAL_SCOPE) && b.has_any(LOCAL_SCOPE))
        || (a.has_any(LOCAL_SCOPE) && b.has_any(GLOBAL_SCOPE));
    if !split || a.shared_significant(b) == 0 {
        return None;
    }
    Some(format!(
        "global versus local scope across '{}' and '{}'",
        a.category, b.category
    ))
}
