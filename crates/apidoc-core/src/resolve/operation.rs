use super::context::{Loaded, Resolution};
use super::refs::schema_name;
use super::tree::{Branch, build_tree};
use crate::config::ApidocConfig;
use crate::error::ResolveError;
use crate::generate::apply_defaults;
use crate::model::{
    Endpoint, EndpointLayout, Field, HttpMethod, OperationDescription, Parameter, ProjectIndex,
    ResponseSchema, ResponseSummary, count_fields,
};
use crate::parse::{
    Block, Document, ParameterDecl, extract_method, parse_metadata, parse_parameter,
    parse_parameters, parse_responses, request_schema_ref,
};
use crate::readme;
use crate::store::ContentStore;

/// Resolves one (endpoint, method) pair of an indexed project.
pub struct OperationResolver<'a> {
    index: &'a ProjectIndex,
    store: &'a dyn ContentStore,
    config: &'a ApidocConfig,
}

impl<'a> OperationResolver<'a> {
    pub fn new(
        index: &'a ProjectIndex,
        store: &'a dyn ContentStore,
        config: &'a ApidocConfig,
    ) -> Self {
        Self {
            index,
            store,
            config,
        }
    }

    /// Build the full description of `method` on `endpoint` (name, API path
    /// or file reference). Without a method, the endpoint's first one is used.
    pub async fn resolve(
        &self,
        endpoint: &str,
        method: Option<HttpMethod>,
    ) -> Result<OperationDescription, ResolveError> {
        let found = self
            .index
            .find_endpoint(endpoint)
            .ok_or_else(|| ResolveError::MissingFolder(endpoint.to_string()))?;
        let method = match method.or_else(|| found.methods().first().copied()) {
            Some(method) => method,
            None => {
                return Err(ResolveError::MissingMethod {
                    method: "(none)".to_string(),
                    endpoint: found.name.clone(),
                });
            }
        };
        log::debug!("resolving {} {}", method.as_str(), found.name);

        let cx = Resolution::new(self.index, self.store, self.config.limits);
        let block = self.method_block(&cx, found, method).await?;
        let doc = Document::parse(&block.content);
        let root = doc.root();

        let meta = parse_metadata(root);
        let mut desc = OperationDescription {
            method: method.as_str().to_string(),
            url: found.url(),
            tag: meta.tag,
            summary: meta.summary,
            operation_id: meta.operation_id,
            request_body_required: meta.request_body_required,
            ..Default::default()
        };

        desc.parameters = self.parameters(&cx, root, &block.path).await?;

        if let Some(reference) = request_schema_ref(root) {
            let name = schema_name(&reference);
            desc.request_fields = expand_schema_ref(&cx, &reference, &name, &block.path).await?;
            desc.request_schema_name = Some(name);
        }

        for response in parse_responses(root) {
            if let Some(reference) = &response.schema_ref {
                let name = schema_name(reference);
                let fields = expand_schema_ref(&cx, reference, &name, &block.path).await?;
                desc.response_schemas.push(ResponseSchema {
                    code: response.code.clone(),
                    description: response.description.clone(),
                    schema_name: name,
                    fields,
                });
            }
            desc.responses.insert(
                response.code,
                ResponseSummary {
                    description: response.description,
                },
            );
        }

        apply_defaults(&mut desc, &self.config.defaults);
        self.overlay_companion(found, method, &mut desc).await;
        desc.unresolved_refs = cx.unresolved();

        log::info!(
            "resolved {} {}: {} request fields, {} responses, {} files read, {} schemas expanded",
            desc.method,
            desc.url,
            count_fields(&desc.request_fields),
            desc.responses.len(),
            cx.files_touched(),
            cx.expansions()
        );
        if cx.fallbacks() > 0 {
            log::info!(
                "{} {}: {} references located by file name",
                desc.method,
                desc.url,
                cx.fallbacks()
            );
        }
        Ok(desc)
    }

    /// The method's block, re-based to column 0, and the file it came from.
    /// A block consisting only of `$ref` is replaced by its target.
    async fn method_block(
        &self,
        cx: &Resolution<'_>,
        endpoint: &Endpoint,
        method: HttpMethod,
    ) -> Result<Loaded, ResolveError> {
        let missing_method = || ResolveError::MissingMethod {
            method: method.key().to_string(),
            endpoint: endpoint.name.clone(),
        };

        let loaded = match &endpoint.layout {
            EndpointLayout::Flat { file, .. } => {
                let handle = self.index.registry.get(file).ok_or_else(missing_method)?;
                let content = cx.read(file, handle).await?;
                let block = extract_method(&content, method.key()).ok_or_else(missing_method)?;
                Loaded {
                    path: file.clone(),
                    content: block,
                }
            }
            EndpointLayout::Split { files } => {
                let file = files
                    .get(&method)
                    .ok_or_else(|| ResolveError::MissingMethodFile {
                        method: method.key().to_string(),
                        endpoint: endpoint.name.clone(),
                    })?;
                let handle = self.index.registry.get(file).ok_or_else(|| {
                    ResolveError::MissingMethodFile {
                        method: method.key().to_string(),
                        endpoint: endpoint.name.clone(),
                    }
                })?;
                Loaded {
                    path: file.clone(),
                    content: cx.read(file, handle).await?,
                }
            }
        };

        let reference = {
            let doc = Document::parse(&loaded.content);
            let root = doc.root();
            match root.children().count() {
                1 => root.value("$ref").map(str::to_string),
                _ => None,
            }
        };
        match reference {
            Some(reference) => Ok(cx.load_ref(&reference, &loaded.path).await?.unwrap_or(loaded)),
            None => Ok(loaded),
        }
    }

    async fn parameters(
        &self,
        cx: &Resolution<'_>,
        root: Block<'_>,
        path: &str,
    ) -> Result<Vec<Parameter>, ResolveError> {
        let mut parameters = Vec::new();
        for decl in parse_parameters(root) {
            match decl {
                ParameterDecl::Inline(parameter) => parameters.push(parameter),
                ParameterDecl::Ref(reference) => {
                    let Some(loaded) = cx.load_ref(&reference, path).await? else {
                        continue;
                    };
                    let doc = Document::parse(&loaded.content);
                    match parse_parameter(doc.root()) {
                        Some(parameter) => parameters.push(parameter),
                        None => log::warn!("{} is not a parameter document", loaded.path),
                    }
                }
            }
        }
        Ok(parameters)
    }

    async fn overlay_companion(
        &self,
        endpoint: &Endpoint,
        method: HttpMethod,
        desc: &mut OperationDescription,
    ) {
        let suffix = &self.config.companion.suffix;
        let found = readme::companion_paths(endpoint, method, suffix)
            .into_iter()
            .find_map(|path| {
                let handle = self.index.registry.get(&path)?.clone();
                Some((path, handle))
            });
        let Some((path, handle)) = found else {
            return;
        };
        match self.store.read(&handle).await {
            Ok(content) => {
                log::debug!("merging companion document {path}");
                readme::overlay(&content, &path, desc);
            }
            Err(e) => log::warn!("cannot read companion document {path}: {e}"),
        }
    }
}

/// Load `reference` and expand it with `name` already in flight.
async fn expand_schema_ref(
    cx: &Resolution<'_>,
    reference: &str,
    name: &str,
    from: &str,
) -> Result<Vec<Field>, ResolveError> {
    let Some(loaded) = cx.load_ref(reference, from).await? else {
        return Ok(Vec::new());
    };
    cx.begin_expansion()?;
    let tree = build_tree(cx, loaded.content, Branch::root(name, &loaded.path)).await?;
    if let Some(alias) = &tree.name {
        log::debug!("{name} is an alias of {alias}");
    }
    Ok(tree.fields)
}
