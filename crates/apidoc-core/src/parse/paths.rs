use indexmap::IndexMap;

use super::scan::{Document, Token, block_end, extract_ref};

/// Extract the `API path -> file reference` mapping from the `paths` section
/// of a root document.
///
/// A path key opens a binding that the next `$ref` below it fills; when more
/// than one `$ref` appears before the next path key the last one wins. A
/// `$ref` written on the path line itself (`/a: { $ref: ./a.yaml }`) is
/// recorded immediately and closes the binding.
pub fn resolve_paths(root_document: &str) -> IndexMap<String, String> {
    let doc = Document::parse(root_document);
    let lines = doc.lines();
    let mut result = IndexMap::new();

    let Some(start) = lines.iter().position(|l| l.key() == Some("paths")) else {
        log::debug!("no paths section in root document");
        return result;
    };
    let end = block_end(lines, start);

    let mut current: Option<&str> = None;
    for line in &lines[start + 1..end] {
        match &line.token {
            Token::Open(key) if key.starts_with('/') => current = Some(key.as_str()),
            Token::Pair(key, value) if key.starts_with('/') => match extract_ref(value) {
                Some(target) => {
                    result.insert(key.clone(), target.to_string());
                    current = None;
                }
                None => current = Some(key.as_str()),
            },
            Token::Pair(key, value) if key == "$ref" => {
                if let Some(path) = current {
                    result.insert(path.to_string(), value.clone());
                }
            }
            _ => {}
        }
    }

    log::debug!("resolved {} path references", result.len());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_path() {
        let paths = resolve_paths("paths:\n  /a:\n    $ref: './x.yaml'\n");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths["/a"], "./x.yaml");
    }

    #[test]
    fn test_path_without_ref_is_skipped() {
        let text = "paths:\n  /a:\n    get:\n      summary: inline\n  /b:\n    $ref: paths/b.yaml\n";
        let paths = resolve_paths(text);
        assert!(!paths.contains_key("/a"));
        assert_eq!(paths["/b"], "paths/b.yaml");
    }

    #[test]
    fn test_inline_ref_on_path_line() {
        let paths = resolve_paths("paths:\n  /a: { $ref: './a.yaml' }\n  /b:\n    $ref: ./b.yaml\n");
        assert_eq!(paths["/a"], "./a.yaml");
        assert_eq!(paths["/b"], "./b.yaml");
    }

    #[test]
    fn test_section_ends_at_parent_indent() {
        let text = "openapi: 3.0.0\npaths:\n  # users\n\n  /users:\n    $ref: paths/users.yaml\ncomponents:\n  /fake:\n    $ref: nope.yaml\n";
        let paths = resolve_paths(text);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths["/users"], "paths/users.yaml");
    }

    #[test]
    fn test_last_ref_wins_and_order_is_kept() {
        let text = "paths:\n  /z:\n    $ref: first.yaml\n    $ref: second.yaml\n  /a:\n    $ref: a.yaml\n";
        let paths = resolve_paths(text);
        assert_eq!(paths["/z"], "second.yaml");
        let keys: Vec<_> = paths.keys().cloned().collect();
        assert_eq!(keys, vec!["/z", "/a"]);
    }

    #[test]
    fn test_no_paths_section() {
        assert!(resolve_paths("openapi: 3.0.0\n").is_empty());
    }
}
