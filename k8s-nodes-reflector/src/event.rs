use std::fmt;

/// Opaque marker of a point in the control plane's change history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourceVersion(String);

impl ResourceVersion {
    pub fn new(version: impl ToString) -> Self {
        Self(version.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ResourceVersion {
    fn from(version: String) -> Self {
        Self(version)
    }
}

impl From<&str> for ResourceVersion {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a full list: every object plus the version to start watching from.
#[derive(Clone, Debug)]
pub struct Listing<K> {
    pub items: Vec<K>,
    pub resource_version: ResourceVersion,
}

impl<K> Listing<K> {
    pub fn new(items: Vec<K>, resource_version: impl Into<ResourceVersion>) -> Self {
        let resource_version = resource_version.into();
        Self {
            items,
            resource_version,
        }
    }
}

/// A single change delivered by a watch. Every variant but `Bookmark` carries the full object.
#[derive(Clone, Debug, PartialEq)]
pub enum WatchEvent<K> {
    Added(K),
    Modified(K),
    Deleted(K),
    /// Progress marker with no object attached.
    Bookmark(ResourceVersion),
}

impl<K> WatchEvent<K> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Added(_) => "Added",
            Self::Modified(_) => "Modified",
            Self::Deleted(_) => "Deleted",
            Self::Bookmark(_) => "Bookmark",
        }
    }
}
