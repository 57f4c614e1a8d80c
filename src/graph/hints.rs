//! Extra dependency edges mined from free-text ordering annotations.
//!
//! Prose like "B1 before T1" is brittle to parse, so the builder only
//! consults a [`HintExtractor`] when one is installed explicitly.

use regex::Regex;

use crate::document::DependencyChain;

/// An inferred edge: `dependent` depends on `dependency`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyHint {
    pub dependent: String,
    pub dependency: String,
}

impl DependencyHint {
    pub fn new(dependent: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            dependent: dependent.into(),
            dependency: dependency.into(),
        }
    }
}

/// Source of extra dependency edges for the graph builder.
///
/// Implementations may return ids that do not exist in the graph; the
/// builder discards those.
pub trait HintExtractor {
    fn extract(&self, chain: &DependencyChain) -> Vec<DependencyHint>;
}

/// Regex miner for legacy `dependency_chain` strings.
///
/// Recognized shapes:
/// - `A -> B -> C`, `A before B`, `A then B`: each later id depends on the previous
/// - `A blocks B`: B depends on A
/// - `A requires B`, `A depends on B`, `A after B`: A depends on B
pub struct LegacyChainExtractor {
    id: Regex,
    ordering: Regex,
    blocks: Regex,
    requires: Regex,
}

const ID_PATTERN: &str = r"[A-Za-z][A-Za-z_-]*\d+[A-Za-z0-9_-]*";

impl LegacyChainExtractor {
    pub fn new() -> Self {
        Self {
            id: Regex::new(&format!(r"\b{ID_PATTERN}\b")).expect("Invalid regex pattern"),
            ordering: Regex::new(r"\s*(?:->|→|=>|\bbefore\b|\bthen\b)\s*")
                .expect("Invalid regex pattern"),
            blocks: Regex::new(&format!(r"\b({ID_PATTERN})\s+blocks\s+({ID_PATTERN})\b"))
                .expect("Invalid regex pattern"),
            requires: Regex::new(&format!(
                r"\b({ID_PATTERN})\s+(?:requires|depends\s+on|needs|after)\s+({ID_PATTERN})\b"
            ))
            .expect("Invalid regex pattern"),
        }
    }

    fn ordering_hints(&self, text: &str, hints: &mut Vec<DependencyHint>) {
        let ids: Vec<&str> = self
            .ordering
            .split(text)
            .filter_map(|part| self.id.find(part).map(|m| m.as_str()))
            .collect();

        if ids.len() < 2 {
            return;
        }
        for pair in ids.windows(2) {
            hints.push(DependencyHint::new(pair[1], pair[0]));
        }
    }

    fn extract_text(&self, text: &str, hints: &mut Vec<DependencyHint>) {
        self.ordering_hints(text, hints);

        for caps in self.blocks.captures_iter(text) {
            hints.push(DependencyHint::new(&caps[2], &caps[1]));
        }
        for caps in self.requires.captures_iter(text) {
            hints.push(DependencyHint::new(&caps[1], &caps[2]));
        }
    }
}

impl Default for LegacyChainExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HintExtractor for LegacyChainExtractor {
    fn extract(&self, chain: &DependencyChain) -> Vec<DependencyHint> {
        let mut hints = Vec::new();
        for text in chain.sequential.iter().chain(chain.blocking.iter()) {
            self.extract_text(text, &mut hints);
        }
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(sequential: &[&str], blocking: &[&str]) -> DependencyChain {
        DependencyChain {
            sequential: sequential.iter().map(|s| s.to_string()).collect(),
            blocking: blocking.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_arrow_chain() {
        let hints = LegacyChainExtractor::new().extract(&chain(&["B1 -> T1 -> RT1"], &[]));
        assert_eq!(
            hints,
            vec![DependencyHint::new("T1", "B1"), DependencyHint::new("RT1", "T1")]
        );
    }

    #[test]
    fn test_before_phrase() {
        let hints =
            LegacyChainExtractor::new().extract(&chain(&["B1 must be settled before T1"], &[]));
        assert_eq!(hints, vec![DependencyHint::new("T1", "B1")]);
    }

    #[test]
    fn test_blocks_phrase() {
        let hints = LegacyChainExtractor::new().extract(&chain(&[], &["RT1 blocks RT2"]));
        assert_eq!(hints, vec![DependencyHint::new("RT2", "RT1")]);
    }

    #[test]
    fn test_requires_phrase() {
        let hints =
            LegacyChainExtractor::new().extract(&chain(&[], &["T2 depends on B1", "T3 requires T2"]));
        assert_eq!(
            hints,
            vec![DependencyHint::new("T2", "B1"), DependencyHint::new("T3", "T2")]
        );
    }

    #[test]
    fn test_prose_without_ids_yields_nothing() {
        let hints = LegacyChainExtractor::new()
            .extract(&chain(&["Authentication before authorization"], &["nothing blocks us"]));
        assert!(hints.is_empty());
    }

    #[test]
    fn test_beforehand_is_not_a_separator() {
        let hints = LegacyChainExtractor::new().extract(&chain(&["B1 beforehand B2"], &[]));
        assert!(hints.is_empty());
    }
}
