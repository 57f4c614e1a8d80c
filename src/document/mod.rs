//! Requirements document loading
//!
//! Documents are YAML or JSON files, or markdown files carrying a fenced
//! ```yaml block. Validation happens upstream; this module only deserializes.

mod extraction;
mod types;

pub use extraction::extract_yaml_block;
pub use types::{
    Artifact, Constraint, ConstraintKind, DependencyChain, RequiredTruth, RequirementsDocument,
    Tension, VerificationOutcome, VerificationSummary,
};

use std::path::Path;

use crate::error::{Result, WeftError};

/// Load a requirements document from disk
pub fn load_document(path: &Path) -> Result<RequirementsDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| WeftError::io(path, e))?;

    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));

    if is_markdown {
        let Some(yaml) = extract_yaml_block(&content) else {
            tracing::warn!(
                path = %path.display(),
                "no ```yaml block in markdown document, treating it as empty"
            );
            return Ok(RequirementsDocument::default());
        };
        parse_document(&yaml)
    } else {
        parse_document(&content)
    }
}

/// Parse document content. JSON is accepted as a YAML subset.
pub fn parse_document(content: &str) -> Result<RequirementsDocument> {
    if content.trim().is_empty() {
        return Ok(RequirementsDocument::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_logs::capture_warnings;
    use tempfile::TempDir;

    #[test]
    fn test_parse_yaml_document() {
        let yaml = r#"
feature: auth
phase: specification
constraints:
  business:
    - id: B1
      type: invariant
      statement: "Sessions must expire after inactivity"
  technical:
    - id: T1
      type: boundary
      statement: "Tokens are stored server side"
      depends_on: [B1]
tensions:
  - id: TN1
    type: trade_off
    between: [B1, T1]
    status: open
    description: "Expiry versus convenience"
required_truths:
  - id: RT1
    statement: "Expired sessions are rejected"
    status: PARTIAL
    priority: 1
    maps_to_constraints: [B1]
artifacts:
  - path: src/session.rs
    type: code
    satisfies: [RT1]
    status: generated
"#;
        let doc = parse_document(yaml).unwrap();

        assert_eq!(doc.feature, "auth");
        assert_eq!(doc.constraint_count(), 2);
        assert_eq!(doc.constraints["business"][0].kind, ConstraintKind::Invariant);
        assert_eq!(doc.constraints["technical"][0].depends_on, vec!["B1"]);
        assert_eq!(doc.tensions[0].between, vec!["B1", "T1"]);
        assert_eq!(doc.required_truths[0].priority, Some(1));
        assert_eq!(doc.artifacts[0].satisfies, vec!["RT1"]);
        assert!(doc.dependency_chain.is_none());
    }

    #[test]
    fn test_parse_json_document() {
        let json = r#"{"feature": "billing", "phase": "design", "tensions": []}"#;
        let doc = parse_document(json).unwrap();
        assert_eq!(doc.feature, "billing");
        assert_eq!(doc.phase, "design");
    }

    #[test]
    fn test_unknown_constraint_type_is_other() {
        let yaml = r#"
constraints:
  misc:
    - id: X1
      type: preference
      statement: "Prefer dark mode"
"#;
        let doc = parse_document(yaml).unwrap();
        assert_eq!(doc.constraints["misc"][0].kind, ConstraintKind::Other);
    }

    #[test]
    fn test_empty_content_is_empty_document() {
        let doc = parse_document("   \n").unwrap();
        assert_eq!(doc.constraint_count(), 0);
        assert!(doc.tensions.is_empty());
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(parse_document("this is: not: valid: yaml:::").is_err());
    }

    #[test]
    fn test_verification_summary() {
        let yaml = r#"
verification:
  overall_passed: true
  items:
    B1: passed
    B2: failed
"#;
        let doc = parse_document(yaml).unwrap();
        let verification = doc.verification.unwrap();
        assert_eq!(verification.overall_passed, Some(true));
        assert_eq!(verification.items["B2"], VerificationOutcome::Failed);
    }

    #[test]
    fn test_markdown_without_yaml_block_warns() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.md");
        std::fs::write(&path, "# Release notes\n\n```rust\nfn main() {}\n```\n").unwrap();

        let (doc, logs) = capture_warnings(|| load_document(&path));

        assert_eq!(doc.unwrap().constraint_count(), 0);
        assert!(logs.contains("no ```yaml block"), "{logs}");
        assert!(logs.contains("notes.md"), "{logs}");
    }

    #[test]
    fn test_markdown_with_yaml_block_is_quiet() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("auth.md");
        std::fs::write(&path, "# Auth\n\n```yaml\nfeature: auth\n```\n").unwrap();

        let (doc, logs) = capture_warnings(|| load_document(&path));

        assert_eq!(doc.unwrap().feature, "auth");
        assert!(logs.is_empty(), "{logs}");
    }
}
