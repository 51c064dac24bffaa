mod common;

use std::sync::Arc;

use apidoc_core::config::{ApidocConfig, Limits};
use apidoc_core::index::{find_root_document, index_project};
use apidoc_core::model::{Field, HttpMethod, OperationDescription};
use apidoc_core::{MemoryStore, ProjectSession, ResolveError};

async fn open_shop(extra: &[(&str, &str)], config: ApidocConfig) -> ProjectSession {
    let store = MemoryStore::from_files(common::SHOP.iter().chain(extra).copied());
    let registry = store.registry();
    let root_document =
        find_root_document("shop", &registry).expect("shop should have a root document");
    let index = index_project("shop", &root_document, registry, &store)
        .await
        .expect("shop should index");
    ProjectSession::new(index, Arc::new(store), config)
}

async fn resolve(endpoint: &str, method: Option<HttpMethod>) -> OperationDescription {
    open_shop(&[], ApidocConfig::default())
        .await
        .resolve(endpoint, method)
        .await
        .expect("should resolve")
}

fn names(fields: &[Field]) -> Vec<&str> {
    fields.iter().map(|f| f.name.as_str()).collect()
}

fn field<'a>(fields: &'a [Field], name: &str) -> &'a Field {
    fields
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("missing field {name}"))
}

#[tokio::test]
async fn resolve_create_user_end_to_end() {
    let desc = resolve("users", Some(HttpMethod::Post)).await;

    assert_eq!(desc.method, "POST");
    assert_eq!(desc.url, "/users");
    assert_eq!(desc.tag.as_deref(), Some("Users"));
    assert_eq!(desc.summary.as_deref(), Some("Create user"));
    assert_eq!(desc.operation_id.as_deref(), Some("createUser"));
    assert!(desc.request_body_required);
    assert!(desc.parameters.is_empty());
    assert!(desc.unresolved_refs.is_empty());

    // Request tree
    assert_eq!(desc.request_schema_name.as_deref(), Some("CreateUser"));
    assert_eq!(
        names(&desc.request_fields),
        vec!["email", "age", "address", "tags", "referrer"]
    );
    let email = field(&desc.request_fields, "email");
    assert!(email.required);
    assert_eq!(email.format.as_deref(), Some("email"));
    assert_eq!(email.source.as_deref(), Some("Signup form"));

    let age = field(&desc.request_fields, "age");
    assert!(!age.required);
    assert_eq!(age.source.as_deref(), Some("Direct input"));

    let address = field(&desc.request_fields, "address");
    assert!(address.required);
    assert_eq!(address.ref_name.as_deref(), Some("Address"));
    assert_eq!(address.field_type.as_deref(), Some("object"));
    assert_eq!(address.source.as_deref(), Some("Direct input"));
    let city = field(&address.children, "city");
    assert_eq!(city.depth, 1);
    assert!(city.required);
    assert_eq!(city.source.as_deref(), Some("Geo service"));

    assert!(field(&desc.request_fields, "tags").is_array);

    let referrer = field(&desc.request_fields, "referrer");
    assert_eq!(referrer.ref_name.as_deref(), Some("User"));
    assert_eq!(
        names(&referrer.children),
        vec!["id", "email", "createdAt", "manager", "address"]
    );
    let manager = field(&referrer.children, "manager");
    assert_eq!(manager.ref_name.as_deref(), Some("User"));
    assert!(manager.children.is_empty());
    let nested_city = field(&field(&referrer.children, "address").children, "city");
    assert_eq!(nested_city.depth, 2);

    // Responses
    let codes: Vec<_> = desc.responses.keys().map(String::as_str).collect();
    assert_eq!(codes, vec!["201", "400"]);
    assert_eq!(desc.responses["201"].description, "Created");
    assert_eq!(desc.response_schemas.len(), 2);
    assert_eq!(desc.response_schemas[0].schema_name, "User");
    assert_eq!(desc.response_schemas[1].schema_name, "Error");
    assert_eq!(names(&desc.response_schemas[1].fields), vec!["code", "message"]);

    // Generated defaults
    let error_codes: Vec<_> = desc.error_responses.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(error_codes, vec!["400", "404", "500"]);
    assert_eq!(
        desc.error_responses[0].description,
        "Required parameter not provided (email, address)"
    );
    insta::assert_snapshot!(desc.example_response.as_deref().unwrap_or_default(), @r#"
    {
      "id": 100000,
      "email": "string_value",
      "createdAt": "2024-01-15T10:30:00Z",
      "manager": {},
      "address": {
        "city": "Berlin",
        "zip": "string_value"
      }
    }
    "#);

    // Companion document
    assert_eq!(desc.example_request, "{\n  \"email\": \"grace@example.com\"\n}");
    assert_eq!(desc.algorithm, "1. Validate email\n2. Look up city\n3. Store user");
    assert_eq!(desc.notes.as_deref(), Some("Emails are unique."));
    assert_eq!(desc.dependencies.len(), 1);
    assert_eq!(desc.dependencies[0].name, "geo-service");
    assert_eq!(desc.dependencies[0].url, "/geo/cities");
}

#[tokio::test]
async fn resolve_defaults_to_first_method() {
    let desc = resolve("users", None).await;
    assert_eq!(desc.method, "GET");
    assert_eq!(desc.operation_id.as_deref(), Some("listUsers"));

    let params: Vec<_> = desc.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["limit", "q"]);
    assert_eq!(desc.parameters[0].param_type, "integer");
    assert_eq!(desc.parameters[0].example.as_deref(), Some("20"));
    assert_eq!(desc.parameters[1].location, "query");

    assert_eq!(desc.request_schema_name, None);
    assert!(desc.request_fields.is_empty());
    assert_eq!(desc.example_request, "{}");
    assert_eq!(
        desc.algorithm,
        "INPUT: RequestDto from client\n\n\nOUTPUT: 200 OK"
    );
    assert_eq!(desc.notes, None);
}

#[tokio::test]
async fn unresolved_refs_are_reported_not_fatal() {
    let desc = resolve("users", Some(HttpMethod::Get)).await;
    let page = &desc.response_schemas[0];
    assert_eq!(page.schema_name, "UserPage");

    let items = field(&page.fields, "items");
    assert!(items.is_array);
    assert_eq!(items.ref_name.as_deref(), Some("User"));
    assert_eq!(field(&items.children, "id").depth, 1);

    let cursor = field(&page.fields, "cursor");
    assert_eq!(cursor.ref_name.as_deref(), Some("Cursor"));
    assert!(cursor.children.is_empty());
    assert_eq!(desc.unresolved_refs, vec!["./Cursor.yaml"]);
}

#[tokio::test]
async fn resolve_by_api_path_with_file_name_fallback() {
    let desc = resolve("/users/{id}", None).await;
    assert_eq!(desc.url, "/users/{id}");
    assert_eq!(desc.parameters[0].name, "id");
    assert!(desc.parameters[0].required);
    assert_eq!(desc.parameters[0].format.as_deref(), Some("int64"));

    let not_found = &desc.response_schemas[1];
    assert_eq!(not_found.code, "404");
    assert_eq!(names(&not_found.fields), vec!["code", "message"]);
    assert!(desc.unresolved_refs.is_empty());
}

#[tokio::test]
async fn resolve_split_layout() {
    let desc = resolve("orders", None).await;
    assert_eq!(desc.method, "GET");
    assert_eq!(desc.url, "/orders");
    assert_eq!(desc.tag.as_deref(), Some("Orders"));
    assert_eq!(desc.responses["200"].description, "OK");
    assert!(desc.response_schemas.is_empty());
    assert_eq!(desc.example_response, None);
}

#[tokio::test]
async fn missing_endpoint_and_methods_are_fatal() {
    let session = open_shop(&[], ApidocConfig::default()).await;

    let err = session.resolve("carts", None).await.unwrap_err();
    assert!(matches!(err, ResolveError::MissingFolder(ref e) if e == "carts"));

    let err = session
        .resolve("users", Some(HttpMethod::Put))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::MissingMethod { ref method, .. } if method == "put"));

    let err = session
        .resolve("orders", Some(HttpMethod::Post))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::MissingMethodFile { .. }));
}

#[tokio::test]
async fn depth_limit_aborts_resolution() {
    let config = ApidocConfig {
        limits: Limits {
            max_depth: 1,
            ..Limits::default()
        },
        ..ApidocConfig::default()
    };
    let session = open_shop(&[], config).await;
    let err = session
        .resolve("users", Some(HttpMethod::Post))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::DepthLimitExceeded { limit: 1, .. }));
}

#[tokio::test]
async fn malformed_companion_is_ignored() {
    let broken = "### Algorithm\n\n```\nnever closed\n";
    let session = open_shop(
        &[("shop/paths/users_read.md", broken)],
        ApidocConfig::default(),
    )
    .await;
    let desc = session
        .resolve("users", Some(HttpMethod::Get))
        .await
        .expect("should resolve despite the broken document");
    assert!(desc.algorithm.starts_with("INPUT: RequestDto"));
}

#[tokio::test]
async fn concurrent_resolutions_each_complete() {
    let session = Arc::new(open_shop(&[], ApidocConfig::default()).await);
    let (create, get) = tokio::join!(
        session.resolve("users", Some(HttpMethod::Post)),
        session.resolve("users_id", None),
    );
    let create = create.expect("create should resolve");
    let get = get.expect("get should resolve");
    assert_eq!(create.operation_id.as_deref(), Some("createUser"));
    assert_eq!(get.operation_id.as_deref(), Some("getUser"));
}

#[tokio::test]
async fn repeated_resolution_is_stable() {
    let session = open_shop(&[], ApidocConfig::default()).await;
    let first = session
        .resolve("users", Some(HttpMethod::Post))
        .await
        .expect("should resolve");
    let second = session
        .resolve("users", Some(HttpMethod::Post))
        .await
        .expect("should resolve");
    assert_eq!(first, second);
}

#[tokio::test]
async fn algorithm_reports_first_declared_status() {
    let desc = resolve("users_id", Some(HttpMethod::Delete)).await;
    let codes: Vec<_> = desc.responses.keys().map(String::as_str).collect();
    assert_eq!(codes, vec!["204"]);
    assert!(desc.response_schemas.is_empty());
    assert_eq!(desc.example_response, None);
    assert_eq!(
        desc.algorithm,
        "INPUT: RequestDto from client\n\n\nOUTPUT: 204 OK"
    );
}

const CATALOG_ROOT: &str = "\
openapi: 3.0.3
paths:
  /items:
    $ref: './paths/items.yaml'
";

const CATALOG_ITEMS: &str = "\
get:
  summary: Get item
  parameters:
    - name: id
      in: query
      required: true
      schema:
        type: integer
  responses:
    '200':
      description: The item
      content:
        application/json:
          schema:
            $ref: '../schemas/Item.yaml'
post:
  summary: Create item
  responses:
    '201':
      description: Created
";

const CATALOG_ITEM: &str = "\
type: object
properties:
  id:
    type: integer
  name:
    type: string
";

#[tokio::test]
async fn flat_get_with_query_parameter_and_response_schema() {
    let store = MemoryStore::from_files([
        ("catalog/openapi.yaml", CATALOG_ROOT),
        ("catalog/paths/items.yaml", CATALOG_ITEMS),
        ("catalog/schemas/Item.yaml", CATALOG_ITEM),
    ]);
    let registry = store.registry();
    let index = index_project("catalog", "catalog/openapi.yaml", registry, &store)
        .await
        .expect("catalog should index");
    let session = ProjectSession::new(index, Arc::new(store), ApidocConfig::default());

    let desc = session
        .resolve("items", Some(HttpMethod::Get))
        .await
        .expect("should resolve");

    assert_eq!(desc.url, "/items");
    assert_eq!(desc.parameters.len(), 1);
    let id = &desc.parameters[0];
    assert_eq!(id.name, "id");
    assert_eq!(id.location, "query");
    assert!(id.required);
    assert_eq!(id.param_type, "integer");

    assert!(desc.request_fields.is_empty());
    assert_eq!(desc.response_schemas.len(), 1);
    assert_eq!(names(&desc.response_schemas[0].fields), vec!["id", "name"]);
    assert_eq!(
        desc.example_response.as_deref(),
        Some("{\n  \"id\": 12345,\n  \"name\": \"string_value\"\n}")
    );
    assert!(desc.algorithm.ends_with("OUTPUT: 200 OK"));
}

#[tokio::test]
async fn schema_less_first_response_sets_output_code() {
    let store = MemoryStore::from_files([
        ("catalog/openapi.yaml", CATALOG_ROOT),
        ("catalog/paths/items.yaml", CATALOG_ITEMS),
        ("catalog/schemas/Item.yaml", CATALOG_ITEM),
    ]);
    let registry = store.registry();
    let index = index_project("catalog", "catalog/openapi.yaml", registry, &store)
        .await
        .expect("catalog should index");
    let session = ProjectSession::new(index, Arc::new(store), ApidocConfig::default());

    let desc = session
        .resolve("items", Some(HttpMethod::Post))
        .await
        .expect("should resolve");
    assert!(desc.response_schemas.is_empty());
    assert!(desc.algorithm.ends_with("OUTPUT: 201 OK"));
}
