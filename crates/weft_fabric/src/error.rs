//! Error types for device construction and loading.

/// Errors that can occur when building or loading a device description.
#[derive(Debug, thiserror::Error)]
pub enum FabricError {
    /// An I/O error occurred while reading the description file.
    #[error("failed to read device description: {0}")]
    Io(#[from] std::io::Error),

    /// The description could not be parsed.
    #[error("failed to parse device description: {0}")]
    Parse(String),

    /// Two sites share a name.
    #[error("duplicate site '{0}'")]
    DuplicateSite(String),

    /// Two interconnect nodes share a name.
    #[error("duplicate node '{0}'")]
    DuplicateNode(String),

    /// Two I/O sites claim the same package pin.
    #[error("package pin '{0}' is bonded to more than one site")]
    DuplicatePackagePin(String),

    /// A reference names a site that does not exist.
    #[error("unknown site '{0}'")]
    UnknownSite(String),

    /// A reference names a node that does not exist.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// A site uses a type with no definition.
    #[error("no definition for site type {0}")]
    MissingSiteType(String),
}
