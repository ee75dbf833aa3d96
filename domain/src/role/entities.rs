//! Role definitions

use crate::core::model::Model;
use crate::core::query::Query;
use serde::{Deserialize, Serialize};

/// Unique identifier for a consultation role
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        RoleId::new(s)
    }
}

/// A consultant profile (Value Object)
///
/// Immutable once built. The reasoning itself happens in the LLM behind
/// [`RoleAgent::model`]; this type only carries what is needed to prompt it
/// and to decide whether it is relevant for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAgent {
    pub id: RoleId,
    /// Human-readable specialty, e.g. "Security Reviewer"
    pub title: String,
    /// Lowercase keywords describing what this role is good at
    pub capabilities: Vec<String>,
    /// System prompt establishing the role's perspective
    pub system_prompt: String,
    /// Model this role is invoked with; `None` uses the gateway default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
}

impl RoleAgent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: RoleId::new(id),
            title: title.into(),
            capabilities: Vec::new(),
            system_prompt: system_prompt.into(),
            model: None,
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities
            .into_iter()
            .map(|c| c.into().to_lowercase())
            .collect();
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Confidence in [0, 1] that this role is relevant for `query`.
    ///
    /// Fraction of capability tags appearing among the query's keywords
    /// (a tag matches a keyword when the keyword starts with it, so
    /// "secure" matches "security"). Roles without tags score 0.
    pub fn can_handle(&self, query: &Query) -> f64 {
        if self.capabilities.is_empty() {
            return 0.0;
        }
        let keywords = query.keywords();
        let hits = self
            .capabilities
            .iter()
            .filter(|cap| keywords.iter().any(|k| k.starts_with(cap.as_str())))
            .count();
        hits as f64 / self.capabilities.len() as f64
    }
}
