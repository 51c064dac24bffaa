use super::scan::Block;
use crate::model::Parameter;

/// One entry of a `parameters` list.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterDecl {
    Inline(Parameter),
    /// `- $ref: ...` pointing at a parameter document.
    Ref(String),
}

/// Entries of the block's `parameters` list, in declaration order. Items
/// without a `name` or `$ref` are skipped.
pub fn parse_parameters(block: Block<'_>) -> Vec<ParameterDecl> {
    let Some(list) = block.child("parameters") else {
        return Vec::new();
    };
    list.items()
        .filter_map(|item| {
            if item.value("name").is_none() {
                return item.value("$ref").map(|r| ParameterDecl::Ref(r.to_string()));
            }
            parse_parameter(item).map(ParameterDecl::Inline)
        })
        .collect()
}

/// A parameter mapping. Location defaults to `query`, type to `string`.
pub fn parse_parameter(block: Block<'_>) -> Option<Parameter> {
    let name = block.value("name")?;
    let schema = block.child("schema");
    let from_schema = |key: &str| schema.and_then(|s| s.value(key));

    Some(Parameter {
        name: name.to_string(),
        location: block.value("in").unwrap_or("query").to_string(),
        required: block.value("required") == Some("true"),
        param_type: from_schema("type")
            .or_else(|| block.value("type"))
            .unwrap_or("string")
            .to_string(),
        format: from_schema("format")
            .or_else(|| block.value("format"))
            .map(str::to_string),
        description: block.value("description").map(str::to_string),
        example: block
            .value("example")
            .or_else(|| from_schema("example"))
            .map(str::to_string),
    })
}
