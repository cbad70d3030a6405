//! Identifier returned by create/update calls.

/// Prefix marking identifiers the client made up itself.
pub const PROVISIONAL_PREFIX: &str = "temp_";

/// Identifier of a record on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    /// Identifier reported by the server.
    Confirmed(String),
    /// Locally generated stand-in used when a successful response carried no
    /// readable identifier.
    Provisional(String),
}

impl RecordId {
    /// Generates a fresh provisional identifier.
    #[must_use]
    pub fn provisional() -> Self {
        Self::Provisional(format!("{PROVISIONAL_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Confirmed(id) | Self::Provisional(id) => id,
        }
    }

    /// Returns true if the server never confirmed this identifier.
    #[must_use]
    pub const fn is_provisional(&self) -> bool {
        matches!(self, Self::Provisional(_))
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
