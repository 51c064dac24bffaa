use thiserror::Error;

/// Conditions that abort a single operation resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no layout found for endpoint: {0}")]
    MissingFolder(String),

    #[error("method {method} not found for endpoint {endpoint}")]
    MissingMethod { method: String, endpoint: String },

    #[error("no file for method {method} in endpoint {endpoint}")]
    MissingMethodFile { method: String, endpoint: String },

    #[error("schema nesting deeper than {limit} levels at {schema}")]
    DepthLimitExceeded { limit: usize, schema: String },

    #[error("resolution touched more than {limit} files")]
    FileLimitExceeded { limit: usize },

    #[error("resolution expanded more than {limit} schemas")]
    ExpansionLimitExceeded { limit: usize },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while building a project index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("root document not found under {0}")]
    MissingRootDocument(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// A companion document that could not be read as expected.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("malformed companion document: {0}")]
    MalformedDocument(String),
}

/// Anything the boundary service can report back instead of a description.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("unknown HTTP method: {0}")]
    InvalidMethod(String),

    #[error("project not found: {0}")]
    UnknownProject(String),
}
