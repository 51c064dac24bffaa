use super::scan::{indent_of, is_blank_or_comment, strip_indent};
use crate::model::HttpMethod;

fn is_method_line(line: &str, method: &str) -> bool {
    line.strip_prefix(method)
        .is_some_and(|rest| rest.trim_start().starts_with(':'))
}

/// Methods declared at column 0 of a flat path file.
pub fn detect_methods(content: &str) -> Vec<HttpMethod> {
    HttpMethod::ALL
        .into_iter()
        .filter(|m| content.lines().any(|line| is_method_line(line, m.key())))
        .collect()
}

/// Slice one method's block out of a flat multi-method file and re-base it to
/// column 0, so it reads exactly like a dedicated per-method file.
///
/// Returns `None` when the method key is absent and `Some("")` when it is
/// present with an empty body.
pub fn extract_method(content: &str, method: &str) -> Option<String> {
    let method = method.to_ascii_lowercase();
    let mut lines = content.lines();
    lines.find(|line| is_method_line(line, &method))?;

    let captured: Vec<&str> = lines
        .take_while(|line| indent_of(line) > 0 || is_blank_or_comment(line))
        .collect();

    let base = captured
        .iter()
        .find(|line| !is_blank_or_comment(line))
        .map(|line| indent_of(line))
        .unwrap_or(0);

    // Lines indented less than the first keep their content.
    let rebased: Vec<&str> = captured
        .iter()
        .map(|line| strip_indent(line, base))
        .collect();

    let block = rebased.join("\n");
    if block.trim().is_empty() {
        return Some(String::new());
    }
    Some(block)
}
