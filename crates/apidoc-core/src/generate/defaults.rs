use super::example::example_json;
use crate::config::DefaultsConfig;
use crate::model::{ErrorResponse, Field, OperationDescription, for_each_field_mut};

/// Fill the generated parts of a description: field sources, error
/// responses, examples and the algorithm narrative.
pub fn apply_defaults(desc: &mut OperationDescription, defaults: &DefaultsConfig) {
    for_each_field_mut(&mut desc.request_fields, &mut |field| {
        field.source = Some(defaults.source.clone());
    });
    desc.error_responses = error_responses(&desc.request_fields);
    desc.example_request = example_json(&desc.request_fields);
    desc.example_response = desc
        .response_schemas
        .first()
        .map(|schema| example_json(&schema.fields));
    desc.algorithm = default_algorithm(desc, &defaults.request_schema);
}

/// `400` when any top-level field is required, then `404` and `500`.
pub fn error_responses(request_fields: &[Field]) -> Vec<ErrorResponse> {
    let required: Vec<&str> = request_fields
        .iter()
        .filter(|f| f.depth == 0 && f.required)
        .map(|f| f.name.as_str())
        .collect();

    let mut errors = Vec::with_capacity(3);
    if !required.is_empty() {
        errors.push(ErrorResponse::new(
            "400",
            format!("Required parameter not provided ({})", required.join(", ")),
        ));
    }
    errors.push(ErrorResponse::new("404", "Resource not found"));
    errors.push(ErrorResponse::new("500", "Internal server error"));
    errors
}

/// Step-by-step narrative naming each top-level request field.
pub fn default_algorithm(desc: &OperationDescription, fallback_schema: &str) -> String {
    let schema = desc
        .request_schema_name
        .as_deref()
        .unwrap_or(fallback_schema);
    let code = desc
        .responses
        .keys()
        .next()
        .map(String::as_str)
        .unwrap_or("200");

    let mut lines = vec![format!("INPUT: {schema} from client\n")];
    lines.extend(
        desc.request_fields
            .iter()
            .filter(|f| f.depth == 0)
            .enumerate()
            .map(|(i, f)| format!("STEP {}: {} - used directly", i + 1, f.name)),
    );
    lines.push(format!("\nOUTPUT: {code} OK"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::model::{ResponseSchema, ResponseSummary};

    fn request_field(name: &str, required: bool, depth: usize) -> Field {
        let mut f = Field::new(name, depth);
        f.field_type = Some("string".into());
        f.required = required;
        f
    }

    #[test]
    fn test_error_responses() {
        let mut address = request_field("address", false, 0);
        address.children = vec![request_field("city", true, 1)];
        let fields = vec![
            request_field("email", true, 0),
            address,
            request_field("name", true, 0),
        ];
        let errors = error_responses(&fields);
        let codes: Vec<_> = errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["400", "404", "500"]);
        assert_eq!(
            errors[0].description,
            "Required parameter not provided (email, name)"
        );

        let errors = error_responses(&[request_field("q", false, 0)]);
        let codes: Vec<_> = errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["404", "500"]);
    }

    #[test]
    fn test_apply_defaults() {
        let mut address = request_field("address", true, 0);
        address.children = vec![request_field("city", false, 1)];
        let mut desc = OperationDescription {
            request_schema_name: Some("CreateUser".into()),
            request_fields: vec![request_field("email", true, 0), address],
            responses: IndexMap::from([(
                "201".to_string(),
                ResponseSummary {
                    description: "Created".into(),
                },
            )]),
            response_schemas: vec![ResponseSchema {
                code: "201".into(),
                description: "Created".into(),
                schema_name: "User".into(),
                fields: vec![request_field("id", true, 0)],
            }],
            ..Default::default()
        };
        apply_defaults(&mut desc, &DefaultsConfig::default());

        assert_eq!(desc.request_fields[0].source.as_deref(), Some("Direct input"));
        assert_eq!(
            desc.request_fields[1].children[0].source.as_deref(),
            Some("Direct input")
        );
        assert_eq!(desc.error_responses.len(), 3);
        assert_eq!(desc.example_response.as_deref(), Some("{\n  \"id\": \"string_value\"\n}"));
        insta::assert_snapshot!(desc.algorithm, @r"
        INPUT: CreateUser from client

        STEP 1: email - used directly
        STEP 2: address - used directly

        OUTPUT: 201 OK
        ");
    }

    #[test]
    fn test_algorithm_reports_first_declared_code() {
        let mut desc = OperationDescription::default();
        for code in ["204", "404"] {
            desc.responses.insert(
                code.to_string(),
                ResponseSummary {
                    description: "x".into(),
                },
            );
        }
        assert!(default_algorithm(&desc, "RequestDto").ends_with("OUTPUT: 204 OK"));
    }

    #[test]
    fn test_algorithm_without_request() {
        let desc = OperationDescription::default();
        assert_eq!(
            default_algorithm(&desc, "RequestDto"),
            "INPUT: RequestDto from client\n\n\nOUTPUT: 200 OK"
        );
        let mut desc = desc;
        apply_defaults(&mut desc, &DefaultsConfig::default());
        assert_eq!(desc.example_request, "{}");
        assert_eq!(desc.example_response, None);
    }
}
