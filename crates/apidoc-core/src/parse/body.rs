use super::scan::{Block, Token, extract_ref};

/// A declared response status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDecl {
    pub code: String,
    pub description: String,
    pub schema_ref: Option<String>,
}

/// The schema `$ref` under `requestBody`, if any.
pub fn request_schema_ref(block: Block<'_>) -> Option<String> {
    let (line, body) = block.get("requestBody")?;
    match &line.token {
        Token::Pair(_, value) => extract_ref(value),
        _ => body.find_ref(),
    }
    .map(str::to_string)
}

fn is_status_code(key: &str) -> bool {
    key.len() == 3 && key.bytes().all(|b| b.is_ascii_digit())
}

/// Three-digit status codes under `responses`, in declaration order.
/// Missing descriptions read as `OK`.
pub fn parse_responses(block: Block<'_>) -> Vec<ResponseDecl> {
    let Some(responses) = block.child("responses") else {
        return Vec::new();
    };
    responses
        .children()
        .filter_map(|(line, body)| {
            let code = line.key().filter(|k| is_status_code(k))?;
            let schema_ref = match &line.token {
                Token::Pair(_, value) => extract_ref(value),
                _ => body.find_ref(),
            };
            Some(ResponseDecl {
                code: code.to_string(),
                description: body.value("description").unwrap_or("OK").to_string(),
                schema_ref: schema_ref.map(str::to_string),
            })
        })
        .collect()
}
