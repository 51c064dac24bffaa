use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::operation::HttpMethod;
use crate::store::FileRegistry;

/// How an endpoint's methods are laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointLayout {
    /// One file holding every method as a top-level key.
    Flat {
        file: String,
        methods: Vec<HttpMethod>,
    },
    /// One file per method in a folder named after the endpoint.
    Split { files: IndexMap<HttpMethod, String> },
}

/// One indexed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    /// API path from the root document, when the endpoint is listed there.
    pub api_path: Option<String>,
    /// Reference text or folder the endpoint was found through.
    pub file_ref: String,
    pub layout: EndpointLayout,
}

impl Endpoint {
    pub fn methods(&self) -> Vec<HttpMethod> {
        match &self.layout {
            EndpointLayout::Flat { methods, .. } => methods.clone(),
            EndpointLayout::Split { files } => files.keys().copied().collect(),
        }
    }

    /// API path, or one derived from the endpoint name (`users_id` -> `/users/id`).
    pub fn url(&self) -> String {
        match &self.api_path {
            Some(path) => path.clone(),
            None => format!("/{}", self.name.replace('_', "/")),
        }
    }
}

/// Everything a resolution needs to know about one project.
#[derive(Debug, Clone, Default)]
pub struct ProjectIndex {
    /// Registry-path prefix of the project directory (may be empty).
    pub root: String,
    /// Registry path of the root document.
    pub root_document: String,
    pub registry: FileRegistry,
    pub endpoints: IndexMap<String, Endpoint>,
}

impl ProjectIndex {
    /// Look an endpoint up by name, API path, or the reference it was
    /// indexed from.
    pub fn find_endpoint(&self, key: &str) -> Option<&Endpoint> {
        if let Some(endpoint) = self.endpoints.get(key) {
            return Some(endpoint);
        }
        let trimmed = key.trim_start_matches("./");
        self.endpoints.values().find(|e| {
            e.api_path.as_deref() == Some(key) || e.file_ref.trim_start_matches("./") == trimmed
        })
    }
}

/// A discovered project, as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name: String,
    pub root_path: String,
    /// Path of the root document relative to the discovery base.
    pub root_document: String,
    pub file_count: usize,
}

/// An indexed endpoint, as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSummary {
    pub name: String,
    pub api_path: String,
    pub file_path: String,
    pub methods: Vec<String>,
}

impl From<&Endpoint> for EndpointSummary {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            name: endpoint.name.clone(),
            api_path: endpoint.url(),
            file_path: endpoint.file_ref.clone(),
            methods: endpoint
                .methods()
                .iter()
                .map(|m| m.key().to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(name: &str, api_path: Option<&str>, file_ref: &str) -> Endpoint {
        Endpoint {
            name: name.to_string(),
            api_path: api_path.map(str::to_string),
            file_ref: file_ref.to_string(),
            layout: EndpointLayout::Flat {
                file: format!("p/{}", file_ref.trim_start_matches("./")),
                methods: vec![HttpMethod::Get],
            },
        }
    }

    #[test]
    fn test_url_falls_back_to_name() {
        assert_eq!(flat("users_id", None, "x").url(), "/users/id");
        assert_eq!(flat("users", Some("/v1/users"), "x").url(), "/v1/users");
    }

    #[test]
    fn test_find_endpoint_by_any_key() {
        let mut index = ProjectIndex::default();
        let endpoint = flat("users", Some("/users"), "./paths/users.yaml");
        index.endpoints.insert(endpoint.name.clone(), endpoint);

        assert!(index.find_endpoint("users").is_some());
        assert!(index.find_endpoint("/users").is_some());
        assert!(index.find_endpoint("paths/users.yaml").is_some());
        assert!(index.find_endpoint("./paths/users.yaml").is_some());
        assert!(index.find_endpoint("orders").is_none());
    }

    #[test]
    fn test_split_methods_follow_file_map() {
        let mut files = IndexMap::new();
        files.insert(HttpMethod::Post, "p/paths/users/post.yaml".to_string());
        files.insert(HttpMethod::Get, "p/paths/users/get.yaml".to_string());
        let endpoint = Endpoint {
            name: "users".into(),
            api_path: None,
            file_ref: "paths/users".into(),
            layout: EndpointLayout::Split { files },
        };
        assert_eq!(endpoint.methods(), vec![HttpMethod::Post, HttpMethod::Get]);
        let summary = EndpointSummary::from(&endpoint);
        assert_eq!(summary.methods, vec!["post", "get"]);
        assert_eq!(summary.api_path, "/users");
    }
}
