use super::parse::ExistingDocument;
use crate::model::{OperationDescription, for_each_field_mut};

/// Overlay hand-authored material onto a freshly computed description.
///
/// Sources apply to every request field whose bare name matches, at any
/// depth. Dependencies, algorithm, notes and examples replace the generated
/// values wholesale when the document has them.
pub fn merge_existing(existing: &ExistingDocument, desc: &mut OperationDescription) {
    if !existing.field_sources.is_empty() {
        for_each_field_mut(&mut desc.request_fields, &mut |field| {
            if let Some(source) = existing.field_sources.get(&field.name) {
                field.source = Some(source.clone());
            }
        });
    }
    if !existing.dependencies.is_empty() {
        desc.dependencies = existing.dependencies.clone();
    }
    if let Some(algorithm) = &existing.algorithm {
        desc.algorithm = algorithm.clone();
    }
    if let Some(notes) = &existing.notes {
        desc.notes = Some(notes.clone());
    }
    if let Some(example) = &existing.example_request {
        desc.example_request = example.clone();
    }
    if let Some(example) = &existing.example_response {
        desc.example_response = Some(example.clone());
    }
}
