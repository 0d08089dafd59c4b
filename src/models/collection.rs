//! Policy collection types
//!
//! A collection is addressed by its path segment on the Policy Service
//! (e.g. `/namingPolicies/`). The known collections are listed in the order
//! a full restore walks them, so that referenced objects exist before the
//! policies that link to them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A policy collection, identified by its type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CollectionType {
    ModuleCredentials,
    Endpoints,
    Validators,
    NamingSequences,
    NamingPolicies,
    PropertySets,
    IpamPolicies,
    DnsPolicies,
    MicrosoftAdPolicies,
    AnsibleTowerPolicies,
    ScriptingPolicies,
    ServicenowCmdbPolicies,
    VraPolicies,
    /// A collection this build does not know about, kept verbatim
    Other(String),
}

/// Endpoint type used for `endpoints` links owned by these collections
const ENDPOINT_TYPE_TABLE: &[(&str, &str)] = &[
    ("microsoftADPolicies", "microsoft"),
    ("ansibleTowerPolicies", "ansible_tower"),
    ("servicenowCMDBPolicies", "servicenow"),
];

impl CollectionType {
    /// All known collections in restore order
    pub const KNOWN: [CollectionType; 13] = [
        CollectionType::ModuleCredentials,
        CollectionType::Endpoints,
        CollectionType::Validators,
        CollectionType::NamingSequences,
        CollectionType::NamingPolicies,
        CollectionType::PropertySets,
        CollectionType::IpamPolicies,
        CollectionType::DnsPolicies,
        CollectionType::MicrosoftAdPolicies,
        CollectionType::AnsibleTowerPolicies,
        CollectionType::ScriptingPolicies,
        CollectionType::ServicenowCmdbPolicies,
        CollectionType::VraPolicies,
    ];

    /// The path segment / type tag of this collection
    pub fn as_str(&self) -> &str {
        match self {
            Self::ModuleCredentials => "moduleCredentials",
            Self::Endpoints => "endpoints",
            Self::Validators => "validators",
            Self::NamingSequences => "namingSequences",
            Self::NamingPolicies => "namingPolicies",
            Self::PropertySets => "propertySets",
            Self::IpamPolicies => "ipamPolicies",
            Self::DnsPolicies => "dnsPolicies",
            Self::MicrosoftAdPolicies => "microsoftADPolicies",
            Self::AnsibleTowerPolicies => "ansibleTowerPolicies",
            Self::ScriptingPolicies => "scriptingPolicies",
            Self::ServicenowCmdbPolicies => "servicenowCMDBPolicies",
            Self::VraPolicies => "vraPolicies",
            Self::Other(tag) => tag,
        }
    }

    /// Fixed endpoint type for `endpoints` links owned by this collection
    ///
    /// Collections outside the table take the endpoint type from the owning
    /// document's own `type` field instead.
    pub fn endpoint_type(&self) -> Option<&'static str> {
        let tag = self.as_str();
        ENDPOINT_TYPE_TABLE
            .iter()
            .find(|(owner, _)| *owner == tag)
            .map(|(_, endpoint_type)| *endpoint_type)
    }

    /// Whether restored objects of this collection carry a secret
    pub fn holds_secrets(&self) -> bool {
        matches!(self, Self::ModuleCredentials)
    }

    /// Path of the collection listing, relative to the API root
    pub fn list_path(&self) -> String {
        format!("/{}/", self.as_str())
    }

    /// Path of a single object, relative to the API root
    pub fn object_path(&self, id: &str) -> String {
        format!("/{}/{}/", self.as_str(), id)
    }
}

impl FromStr for CollectionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let known = Self::KNOWN.iter().find(|c| c.as_str() == s).cloned();
        Ok(known.unwrap_or_else(|| Self::Other(s.to_string())))
    }
}

impl TryFrom<String> for CollectionType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() || value.contains('/') {
            return Err(format!("invalid collection type: {:?}", value));
        }
        let parsed: Result<Self, std::convert::Infallible> = value.parse();
        Ok(parsed.unwrap_or_else(|never| match never {}))
    }
}

impl From<CollectionType> for String {
    fn from(value: CollectionType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
