//! Resource data model.
//!
//! A [`Resource`] is an immutable record of one discovered cloud object.
//! Resources are produced fresh by a scan and never persisted; a cleanup
//! run works on a snapshot keyed by [`ResourceId`].
//!
//! Two relations drive deletion ordering:
//!
//! - **depends_on**: resources that must keep existing while this one
//!   exists (a stack that uses a role depends on the role).
//! - **contains**: resources owned by this one and removed along with it
//!   (a stack contains the resources it manages).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Identifies a resource across scan and deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    /// Globally unique name (bucket names, role names, stack ARNs)
    Named(String),
    /// Name that is only unique within a region
    Regional { name: String, region: String },
}

impl ResourceId {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn regional(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self::Regional {
            name: name.into(),
            region: region.into(),
        }
    }

    /// Name part of the identifier.
    pub fn name(&self) -> &str {
        match self {
            ResourceId::Named(name) => name,
            ResourceId::Regional { name, .. } => name,
        }
    }

    /// Canonical raw form (`name` or `name:region`).
    pub fn raw_id(&self) -> String {
        match self {
            ResourceId::Named(name) => name.clone(),
            ResourceId::Regional { name, region } => format!("{}:{}", name, region),
        }
    }

    /// Check whether a raw string from a filter or the command line refers
    /// to this identifier.
    ///
    /// Regional identifiers also match on their bare name.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            ResourceId::Named(name) => name == raw,
            ResourceId::Regional { name, region } => {
                name == raw
                    || raw
                        .split_once(':')
                        .is_some_and(|(n, r)| n == name && r == region)
            }
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceId::Named(name) => write!(f, "{}", name),
            ResourceId::Regional { name, region } => write!(f, "{} ({})", name, region),
        }
    }
}

impl From<&str> for ResourceId {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// One discovered cloud object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub resource_type: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub depends_on: HashSet<ResourceId>,
    #[serde(default)]
    pub contains: HashSet<ResourceId>,
}

impl Resource {
    /// Create a resource without relations or properties.
    ///
    /// The display name defaults to the identifier's name.
    pub fn new(id: impl Into<ResourceId>, resource_type: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.name().to_string(),
            id,
            resource_type: resource_type.into(),
            properties: HashMap::new(),
            depends_on: HashSet::new(),
            contains: HashSet::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn depends_on(mut self, id: impl Into<ResourceId>) -> Self {
        self.depends_on.insert(id.into());
        self
    }

    pub fn contains(mut self, id: impl Into<ResourceId>) -> Self {
        self.contains.insert(id.into());
        self
    }

    /// Get a property value.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|s| s.as_str())
    }

    /// Whether the resource has neither dependencies nor contents.
    pub fn is_standalone(&self) -> bool {
        self.depends_on.is_empty() && self.contains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_id_matches() {
        let id = ResourceId::named("my-bucket");
        assert!(id.matches("my-bucket"));
        assert!(!id.matches("my-bucket:us-east-1"));
        assert!(!id.matches("other"));
    }

    #[test]
    fn test_regional_id_matches() {
        let id = ResourceId::regional("my-key", "eu-west-1");
        assert!(id.matches("my-key"));
        assert!(id.matches("my-key:eu-west-1"));
        assert!(!id.matches("my-key:us-east-1"));
        assert_eq!(id.raw_id(), "my-key:eu-west-1");
        assert_eq!(id.to_string(), "my-key (eu-west-1)");
    }

    #[test]
    fn test_regional_ids_distinct_by_region() {
        let a = ResourceId::regional("key", "us-east-1");
        let b = ResourceId::regional("key", "us-west-2");
        assert_ne!(a, b);

        let set: HashSet<_> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_resource_builder() {
        let stack = Resource::new("stack", "cloudformation-stack")
            .with_property("env", "dev")
            .depends_on("role")
            .contains("bucket");

        assert_eq!(stack.name, "stack");
        assert_eq!(stack.property("env"), Some("dev"));
        assert!(stack.depends_on.contains(&ResourceId::named("role")));
        assert!(stack.contains.contains(&ResourceId::named("bucket")));
        assert!(!stack.is_standalone());
        assert!(Resource::new("lonely", "s3-bucket").is_standalone());
    }

    #[test]
    fn test_resource_id_deserialize_untagged() {
        let named: ResourceId = serde_json::from_str(r#""role""#).unwrap();
        assert_eq!(named, ResourceId::named("role"));

        let regional: ResourceId =
            serde_json::from_str(r#"{"name": "key", "region": "us-east-1"}"#).unwrap();
        assert_eq!(regional, ResourceId::regional("key", "us-east-1"));
    }
}
