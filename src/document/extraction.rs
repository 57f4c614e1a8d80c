//! Fenced YAML extraction from markdown requirement documents

/// Extract the body of the first ```yaml fence in a markdown document.
///
/// Fences of any length (```, ````, ...) are supported; the block ends at
/// the next fence with the same number of backticks.
pub fn extract_yaml_block(content: &str) -> Option<String> {
    let (yaml_start, fence_len) = find_yaml_fence(content)?;
    let body_start = yaml_start + fence_len + "yaml".len();

    let closing_fence = "`".repeat(fence_len);
    let body_len = content[body_start..].find(&closing_fence)?;

    Some(content[body_start..body_start + body_len].trim().to_string())
}

/// Find the start of a YAML code fence and return (position, fence_length)
fn find_yaml_fence(content: &str) -> Option<(usize, usize)> {
    let mut pos = 0;
    while pos < content.len() {
        let backtick_start = content[pos..].find('`')?;
        let abs_start = pos + backtick_start;
        let fence_len = content[abs_start..]
            .chars()
            .take_while(|&c| c == '`')
            .count();

        if fence_len >= 3 && content[abs_start + fence_len..].starts_with("yaml") {
            return Some((abs_start, fence_len));
        }
        pos = abs_start + fence_len.max(1);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_yaml_block() {
        let content = r#"
# Feature: auth

Prose about the feature.

```yaml
feature: auth
constraints: {}
```
"#;
        let yaml = extract_yaml_block(content).unwrap();
        assert!(yaml.starts_with("feature: auth"));
        assert!(!yaml.contains("```"));
    }

    #[test]
    fn test_extract_skips_other_fences() {
        let content = "```rust\nfn main() {}\n```\n\n```yaml\nfeature: x\n```\n";
        assert_eq!(extract_yaml_block(content).unwrap(), "feature: x");
    }

    #[test]
    fn test_extract_long_fence() {
        let content = "````yaml\nfeature: x\nnote: \"```\"\n````\n";
        let yaml = extract_yaml_block(content).unwrap();
        assert!(yaml.contains("note"));
    }

    #[test]
    fn test_extract_no_block() {
        assert!(extract_yaml_block("# Nothing here").is_none());
        assert!(extract_yaml_block("```yaml\nunterminated").is_none());
    }
}
