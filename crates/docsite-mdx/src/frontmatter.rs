//! Frontmatter extraction and serialization.

use serde_yaml::{Mapping, Value};

/// Delimiter line that opens and closes a frontmatter block.
const DELIMITER: &str = "---";

/// YAML frontmatter of a markdown/MDX document.
///
/// Always a mapping. A document without a frontmatter block has an empty one.
/// Key order is preserved, so rewriting a document only touches the keys that
/// were changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter(Mapping);

impl Frontmatter {
    /// Create an empty frontmatter mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the YAML between the delimiters.
    pub fn from_yaml(yaml: &str) -> Result<Self, FrontmatterError> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

        match value {
            Value::Mapping(mapping) => Ok(Self(mapping)),
            Value::Null => Ok(Self::new()),
            _ => Err(FrontmatterError::NotAMapping),
        }
    }

    /// Serialize the mapping back to YAML, without delimiters.
    pub fn to_yaml(&self) -> Result<String, FrontmatterError> {
        if self.0.is_empty() {
            return Ok(String::new());
        }

        serde_yaml::to_string(&self.0).map_err(|e| FrontmatterError::Serialize(e.to_string()))
    }

    /// Look up a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a value that is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Insert or replace a value. Existing keys keep their position.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(Value::String(key.to_string()), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Split a document source into its frontmatter and body.
///
/// The block only opens when the very first line is `---`, and closes at the
/// next line that is exactly `---`. The returned body starts right after the
/// closing delimiter's line break and is otherwise untouched.
pub fn split_frontmatter(source: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    let Some(after_open) = strip_delimiter_line(source) else {
        return Ok((Frontmatter::new(), source));
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok((Frontmatter::from_yaml(yaml)?, body));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unclosed)
}

fn strip_delimiter_line(source: &str) -> Option<&str> {
    let rest = source.strip_prefix(DELIMITER)?;
    rest.strip_prefix('\n')
        .or_else(|| rest.strip_prefix("\r\n"))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter must be a YAML mapping")]
    NotAMapping,

    #[error("Failed to serialize frontmatter: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_valid_frontmatter() {
        let source = r#"---
title: Button
description: A clickable button component
order: 1
---

# Button Component
"#;

        let (fm, body) = split_frontmatter(source).unwrap();

        assert_eq!(fm.get_str("title"), Some("Button"));
        assert_eq!(
            fm.get_str("description"),
            Some("A clickable button component")
        );
        assert_eq!(fm.get("order").and_then(Value::as_i64), Some(1));
        assert_eq!(body, "\n# Button Component\n");
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, body) = split_frontmatter(source).unwrap();

        assert!(fm.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn delimiter_must_be_first_line() {
        let source = "\n---\ntitle: Test\n---\nBody";

        let (fm, body) = split_frontmatter(source).unwrap();

        assert!(fm.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn handles_empty_block() {
        let (fm, body) = split_frontmatter("---\n---\nBody\n").unwrap();

        assert!(fm.is_empty());
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn accepts_crlf_delimiters() {
        let source = "---\r\ntitle: Test\r\n---\r\nBody\r\n";

        let (fm, body) = split_frontmatter(source).unwrap();

        assert_eq!(fm.get_str("title"), Some("Test"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn closing_delimiter_at_end_of_input() {
        let (fm, body) = split_frontmatter("---\ntitle: Test\n---").unwrap();

        assert_eq!(fm.get_str("title"), Some("Test"));
        assert_eq!(body, "");
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        let result = split_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = split_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn errors_on_non_mapping_yaml() {
        let result = split_frontmatter("---\n- one\n- two\n---\n");

        assert!(matches!(result, Err(FrontmatterError::NotAMapping)));
    }

    #[test]
    fn set_keeps_key_order() {
        let source = "---\ntitle: A\nog_image: /old.png\nsidebar_order: 3\n---\n";
        let (mut fm, _) = split_frontmatter(source).unwrap();

        fm.set("og_image", "/og-images/a.png");
        fm.set("description", "new");

        assert_eq!(
            fm.to_yaml().unwrap(),
            "title: A\nog_image: /og-images/a.png\nsidebar_order: 3\ndescription: new\n"
        );
    }
}
