//! Code keyword context shared between code samples.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

/// Keyword category holding the user's projects.
pub const PROJECT: &str = "PROJECT";

/// A single substitutable choice, e.g. one project with its DSN and org.
///
/// Values are kept as JSON so numeric ids such as `PROJECT_ID` load as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordChoice(BTreeMap<String, Value>);

impl KeywordChoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// String value of a keyword.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Raw value of a keyword, whatever its JSON type.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Organization this choice belongs to.
    pub fn org_slug(&self) -> Option<&str> {
        self.get("ORG_SLUG")
    }

    /// Human readable label, falling back to `org / project`.
    pub fn title(&self) -> String {
        if let Some(title) = self.get("title") {
            return title.to_string();
        }

        match (self.org_slug(), self.get("PROJECT_SLUG")) {
            (Some(org), Some(project)) => format!("{org} / {project}"),
            (Some(org), None) => org.to_string(),
            (None, Some(project)) => project.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// The signed in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct User {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub name: Option<String>,
}

/// All keyword choices known for the current visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeKeywords {
    /// Projects the user has access to
    #[serde(rename = "PROJECT", default)]
    pub project: Vec<KeywordChoice>,

    /// Present when the user is signed in
    #[serde(rename = "USER", default)]
    pub user: Option<User>,
}

/// Errors that can occur when loading keywords.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Invalid code keywords: {0}")]
    InvalidJson(String),
}

impl CodeKeywords {
    /// Keywords shown to signed out visitors.
    pub fn placeholder() -> Self {
        Self {
            project: vec![KeywordChoice::new()
                .with("ORG_SLUG", "example-org")
                .with("PROJECT_SLUG", "example-project")
                .with("PROJECT_ID", 0)
                .with(
                    "PUBLIC_DSN",
                    "https://examplePublicKey@o0.ingest.sentry.io/0",
                )],
            user: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ContextError> {
        serde_json::from_str(json).map_err(|e| ContextError::InvalidJson(e.to_string()))
    }

    /// Choices for a keyword category. Unknown categories have none.
    pub fn choices(&self, category: &str) -> &[KeywordChoice] {
        match category {
            PROJECT => &self.project,
            _ => &[],
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Organizations of `choices`, deduplicated in order of first appearance.
pub fn org_slugs(choices: &[KeywordChoice]) -> Vec<String> {
    let mut orgs: Vec<String> = Vec::new();
    for org in choices.iter().filter_map(KeywordChoice::org_slug) {
        if !orgs.iter().any(|o| o == org) {
            orgs.push(org.to_string());
        }
    }
    orgs
}

/// Category -> index of the selected choice.
pub type KeywordSelection = BTreeMap<String, usize>;

/// Keyword selection shared by every code sample on a page.
///
/// Cloning yields another handle to the same selection. Writes are
/// last-writer-wins and every subscriber sees the latest value.
#[derive(Debug, Clone)]
pub struct SharedKeywordSelection {
    tx: Arc<watch::Sender<KeywordSelection>>,
}

impl Default for SharedKeywordSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedKeywordSelection {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(KeywordSelection::new());
        Self { tx: Arc::new(tx) }
    }

    /// Selected index for a category, `0` when nothing was selected yet.
    pub fn get(&self, category: &str) -> usize {
        self.tx.borrow().get(category).copied().unwrap_or(0)
    }

    pub fn set(&self, category: &str, index: usize) {
        self.tx.send_modify(|selection| {
            selection.insert(category.to_string(), index);
        });
    }

    /// Watch the selection for changes.
    pub fn subscribe(&self) -> watch::Receiver<KeywordSelection> {
        self.tx.subscribe()
    }
}

/// Everything a keyword-aware component needs, passed in by its owner.
#[derive(Debug, Clone, Default)]
pub struct CodeContext {
    pub keywords: CodeKeywords,
    pub shared_selection: SharedKeywordSelection,
}

impl CodeContext {
    pub fn new(keywords: CodeKeywords) -> Self {
        Self {
            keywords,
            shared_selection: SharedKeywordSelection::new(),
        }
    }

    /// Currently selected choice of a category.
    pub fn selected(&self, category: &str) -> Option<&KeywordChoice> {
        self.keywords
            .choices(category)
            .get(self.shared_selection.get(category))
    }
}
