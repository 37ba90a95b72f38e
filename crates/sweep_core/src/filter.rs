//! Exclude filters applied to scanned resources before deletion.
//!
//! A resource is excluded from a run if **any** filter in the exclude list
//! matches it. Filters are pure predicates and are read-only during
//! deletion.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{SweepError, SweepResult};
use crate::resource::Resource;

/// A compiled regular expression that (de)serializes as its source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilterPattern(Regex);

impl FilterPattern {
    pub fn new(pattern: &str) -> SweepResult<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| SweepError::InvalidFilter(format!("{}: {}", pattern, e)))
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for FilterPattern {
    type Error = SweepError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<FilterPattern> for String {
    fn from(pattern: FilterPattern) -> Self {
        pattern.0.as_str().to_string()
    }
}

impl PartialEq for FilterPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Predicate over a scanned resource.
///
/// Leaf variants look at a named property when `property` is set, and at
/// the resource name otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Applies `filters` (OR'ed) only to resources of `resource_type`
    TypeScoped {
        resource_type: String,
        filters: Vec<Filter>,
    },
    /// Regular expression search
    Regex {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        property: Option<String>,
        pattern: FilterPattern,
    },
    /// Substring match
    Contains {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        property: Option<String>,
        value: String,
    },
    /// Exact value; without a property this also matches the resource id
    Exact {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        property: Option<String>,
        value: String,
    },
}

impl Filter {
    pub fn regex(pattern: &str) -> SweepResult<Self> {
        Ok(Self::Regex {
            property: None,
            pattern: FilterPattern::new(pattern)?,
        })
    }

    pub fn property_regex(property: impl Into<String>, pattern: &str) -> SweepResult<Self> {
        Ok(Self::Regex {
            property: Some(property.into()),
            pattern: FilterPattern::new(pattern)?,
        })
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self::Contains {
            property: None,
            value: value.into(),
        }
    }

    pub fn property_contains(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Contains {
            property: Some(property.into()),
            value: value.into(),
        }
    }

    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact {
            property: None,
            value: value.into(),
        }
    }

    pub fn property_exact(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Exact {
            property: Some(property.into()),
            value: value.into(),
        }
    }

    pub fn type_scoped(resource_type: impl Into<String>, filters: Vec<Filter>) -> Self {
        Self::TypeScoped {
            resource_type: resource_type.into(),
            filters,
        }
    }

    /// Check whether the filter matches a resource.
    pub fn matches(&self, resource: &Resource) -> bool {
        match self {
            Filter::TypeScoped {
                resource_type,
                filters,
            } => {
                resource.resource_type == *resource_type
                    && filters.iter().any(|f| f.matches(resource))
            }
            Filter::Regex { property, pattern } => {
                target(resource, property).is_some_and(|v| pattern.is_match(v))
            }
            Filter::Contains { property, value } => {
                target(resource, property).is_some_and(|v| v.contains(value.as_str()))
            }
            Filter::Exact {
                property: None,
                value,
            } => resource.name == *value || resource.id.matches(value),
            Filter::Exact {
                property: Some(key),
                value,
            } => resource.property(key) == Some(value.as_str()),
        }
    }
}

fn target<'a>(resource: &'a Resource, property: &Option<String>) -> Option<&'a str> {
    match property {
        Some(key) => resource.property(key),
        None => Some(resource.name.as_str()),
    }
}

/// Check whether any filter in an exclude list matches a resource.
pub fn is_excluded(excludes: &[Filter], resource: &Resource) -> bool {
    excludes.iter().any(|f| f.matches(resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceId;

    fn bucket(name: &str) -> Resource {
        Resource::new(name, "s3-bucket").with_property("env", "prod-eu")
    }

    #[test]
    fn test_regex_on_name_and_property() {
        assert!(Filter::regex("^logs-").unwrap().matches(&bucket("logs-2024")));
        assert!(!Filter::regex("^logs-").unwrap().matches(&bucket("app-logs")));
        assert!(Filter::property_regex("env", "^prod")
            .unwrap()
            .matches(&bucket("anything")));
        assert!(!Filter::property_regex("owner", ".*")
            .unwrap()
            .matches(&bucket("anything")));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let err = Filter::regex("(unclosed").unwrap_err();
        assert!(matches!(err, SweepError::InvalidFilter(_)));
    }

    #[test]
    fn test_contains_and_exact() {
        let r = bucket("terraform-state");
        assert!(Filter::contains("state").matches(&r));
        assert!(Filter::property_contains("env", "eu").matches(&r));
        assert!(Filter::exact("terraform-state").matches(&r));
        assert!(!Filter::exact("terraform").matches(&r));
        assert!(Filter::property_exact("env", "prod-eu").matches(&r));
        assert!(!Filter::property_exact("env", "prod").matches(&r));
    }

    #[test]
    fn test_exact_matches_regional_id() {
        let key = Resource::new(ResourceId::regional("alias/app", "us-east-1"), "kms-key")
            .with_name("app key");
        assert!(Filter::exact("alias/app:us-east-1").matches(&key));
        assert!(Filter::exact("alias/app").matches(&key));
        assert!(!Filter::exact("alias/app:eu-west-1").matches(&key));
    }

    #[test]
    fn test_type_scoped_only_applies_to_its_type() {
        let filter = Filter::type_scoped(
            "s3-bucket",
            vec![Filter::exact("nope"), Filter::contains("keep")],
        );

        assert!(filter.matches(&bucket("keep-me")));
        assert!(!filter.matches(&bucket("drop-me")));
        assert!(!filter.matches(&Resource::new("keep-me", "iam-role")));
    }

    #[test]
    fn test_is_excluded_any_semantics() {
        let excludes = vec![Filter::exact("a"), Filter::contains("zz")];
        assert!(is_excluded(&excludes, &bucket("a")));
        assert!(is_excluded(&excludes, &bucket("fizz")));
        assert!(!is_excluded(&excludes, &bucket("b")));
        assert!(!is_excluded(&[], &bucket("a")));
    }

    #[test]
    fn test_filter_deserialize() {
        let json = r#"[
            {"type": "exact", "value": "prod-vpc"},
            {"type": "type_scoped", "resource_type": "s3-bucket", "filters": [
                {"type": "regex", "property": "env", "pattern": "^prod"}
            ]}
        ]"#;
        let filters: Vec<Filter> = serde_json::from_str(json).unwrap();
        assert_eq!(filters.len(), 2);
        assert!(is_excluded(&filters, &bucket("whatever")));
    }

    #[test]
    fn test_filter_deserialize_rejects_bad_pattern() {
        let json = r#"{"type": "regex", "pattern": "[a-"}"#;
        assert!(serde_json::from_str::<Filter>(json).is_err());
    }
}
