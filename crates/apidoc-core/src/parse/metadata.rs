use super::scan::Block;

/// Operation-level metadata read from a method block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub tag: Option<String>,
    pub summary: Option<String>,
    pub operation_id: Option<String>,
    pub request_body_required: bool,
}

/// Read `tags[0]`, `summary`, `operationId` and `requestBody.required`.
pub fn parse_metadata(block: Block<'_>) -> Metadata {
    let request_body_required = block
        .child("requestBody")
        .and_then(|body| body.value("required"))
        .is_some_and(|v| v == "true");

    Metadata {
        tag: block.list("tags").into_iter().next(),
        summary: block.value("summary").map(str::to_string),
        operation_id: block.value("operationId").map(str::to_string),
        request_body_required,
    }
}
