//! Persistence intents and their wire verbs.

use std::fmt;

use reqwest::Method;

/// What the caller wants done to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Create,
    Read,
    Update,
    Delete,
    Patch,
}

impl Intent {
    /// Fixed intent-to-verb table.
    pub fn method(self) -> Method {
        match self {
            Intent::Create => Method::POST,
            Intent::Read => Method::GET,
            Intent::Update => Method::PUT,
            Intent::Delete => Method::DELETE,
            Intent::Patch => Method::PATCH,
        }
    }

    /// Whether the payload travels in the request body (otherwise the query string).
    pub fn sends_body(self) -> bool {
        matches!(self, Intent::Create | Intent::Update | Intent::Patch)
    }

    /// Whether the resource's own representation is the default payload.
    pub fn serializes_resource(self) -> bool {
        matches!(self, Intent::Create | Intent::Update)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Create => "create",
            Intent::Read => "read",
            Intent::Update => "update",
            Intent::Delete => "delete",
            Intent::Patch => "patch",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
