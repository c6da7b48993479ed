//! Error types for XML comparison operations


/// Result type for XML comparison operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all XML comparison operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// XML parsing failed
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Node access error
    #[error("Node access error: {0}")]
    NodeAccess(String),

    /// Reading an XML source failed
    #[error("I/O error while reading {location}: {source}")]
    SourceRead {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// A document locator could not be used
    #[error("Unusable document locator: {0}")]
    Locator(String),

    /// Fetching a remote document failed
    #[error("Unable to fetch {locator}: {message}")]
    Fetch { locator: String, message: String },

    /// Object to XML mapping failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The shared comparison configuration could not be read or written
    #[error("Engine configuration error: {0}")]
    EngineConfig(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new XML parsing error
    pub fn xml_parse<S: Into<String>>(msg: S) -> Self {
        Error::XmlParse(msg.into())
    }

    /// Create a new node access error
    pub fn node_access<S: Into<String>>(msg: S) -> Self {
        Error::NodeAccess(msg.into())
    }

    /// Create a new source read error for the given location
    pub fn source_read<S: Into<String>>(location: S, source: std::io::Error) -> Self {
        Error::SourceRead {
            location: location.into(),
            source,
        }
    }

    /// Create a new locator error
    pub fn locator<S: Into<String>>(msg: S) -> Self {
        Error::Locator(msg.into())
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Error::Serialization(msg.into())
    }

    /// Create a new engine configuration error
    pub fn engine_config<S: Into<String>>(msg: S) -> Self {
        Error::EngineConfig(msg.into())
    }
}
