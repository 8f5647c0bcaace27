//! Newtype domain identifiers.
//!
//! Every tracker concept that has an identity is represented as a distinct
//! newtype wrapping a primitive. This prevents accidentally passing a
//! [`ProjectId`] where a [`WorkspaceId`] is expected even though both are
//! strings under the hood.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — tracker-assigned integers
// ---------------------------------------------------------------------------

/// The tracker-assigned `ObjectID` of a remote object.
///
/// Assigned by the remote service on creation; this layer never invents one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Reads an identifier out of a JSON value.
    ///
    /// Accepts non-negative integers and strings holding one (some endpoints
    /// quote large ids). Anything else yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self),
            Value::String(s) => s.trim().parse().ok().map(Self),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed (type names / configured ids)
// ---------------------------------------------------------------------------

string_id! {
    /// A tracker object type name as understood by the remote query API
    /// (e.g. `"testfolder"`, `"testcase"`, `"user"`).
    ObjectType
}

string_id! {
    /// Identifies a workspace. Rendered as `/workspace/{id}` in a scope block.
    WorkspaceId
}

string_id! {
    /// Identifies a project. Rendered as `/project/{id}` in a scope block.
    ProjectId
}

string_id! {
    /// Identifies a test folder whose test cases can be listed.
    TestFolderId
}

const ATTACHMENT_CONTENT: &str = "attachmentcontent";

impl ObjectType {
    /// The `user` type.
    pub fn user() -> Self {
        Self("user".to_owned())
    }

    /// The `testfolder` type.
    pub fn test_folder() -> Self {
        Self("testfolder".to_owned())
    }

    /// The `testcase` type.
    pub fn test_case() -> Self {
        Self("testcase".to_owned())
    }

    /// The `attachmentcontent` type (base64 attachment payloads).
    pub fn attachment_content() -> Self {
        Self(ATTACHMENT_CONTENT.to_owned())
    }

    /// Returns `true` for types whose create payload must never be logged.
    ///
    /// Type names are case-insensitive on the remote side, so the comparison
    /// is too.
    pub fn has_opaque_payload(&self) -> bool {
        self.0.eq_ignore_ascii_case(ATTACHMENT_CONTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_string_ids_are_rejected() {
        assert!(WorkspaceId::new("").is_none());
        assert!(ObjectType::new("").is_none());
        assert_eq!(ProjectId::new("17").unwrap().as_str(), "17");
    }

    #[test]
    fn object_id_reads_numbers_and_numeric_strings() {
        assert_eq!(ObjectId::from_json(&json!(42)), Some(ObjectId::new(42)));
        assert_eq!(ObjectId::from_json(&json!("77")), Some(ObjectId::new(77)));
        assert_eq!(ObjectId::from_json(&json!("abc")), None);
        assert_eq!(ObjectId::from_json(&json!(-3)), None);
        assert_eq!(ObjectId::from_json(&Value::Null), None);
    }

    #[test]
    fn attachment_content_is_matched_case_insensitively() {
        assert!(ObjectType::new("AttachmentContent").unwrap().has_opaque_payload());
        assert!(ObjectType::attachment_content().has_opaque_payload());
        assert!(!ObjectType::test_folder().has_opaque_payload());
    }
}
