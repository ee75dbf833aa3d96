//! Query value object

use serde::{Deserialize, Serialize};

/// A query put to a consultation (Value Object)
///
/// Always non-empty after trimming; use [`Query::try_new`] to validate input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    content: String,
}

impl Query {
    /// Try to create a new query, returning None if it is blank
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the query content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Lowercased alphanumeric words of the query, used for role matching
    pub fn keywords(&self) -> Vec<String> {
        crate::core::string::normalize(&self.content)
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for Query {
    type Error = crate::core::error::DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Query::try_new(s).ok_or_else(|| {
            crate::core::error::DomainError::InvalidQuery("query cannot be empty".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_rejected() {
        assert!(Query::try_new("   ").is_none());
        assert!(Query::try_from("").is_err());
    }

    #[test]
    fn test_keywords() {
        let q = Query::try_new("Is Postgres fast enough? Latency, please!").unwrap();
        assert_eq!(
            q.keywords(),
            vec!["is", "postgres", "fast", "enough", "latency", "please"]
        );
    }
}
