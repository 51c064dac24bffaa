use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::MergeError;
use crate::model::Dependency;

/// Hand-authored material recovered from a companion document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingDocument {
    /// Bare field name -> source annotation from the request body table.
    pub field_sources: IndexMap<String, String>,
    pub dependencies: Vec<Dependency>,
    pub algorithm: Option<String>,
    pub notes: Option<String>,
    pub example_request: Option<String>,
    pub example_response: Option<String>,
}

static REQUEST_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^###\s+Request Body\s*$").unwrap());
static SUBSECTION_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{2,3}\s").unwrap());
static SECTION_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^##\s").unwrap());
static DEPENDENCIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^##\s+(?:4|5)\.\s+External Dependencies\s*$").unwrap()
});
static DEPENDENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^###\s+(?:4|5)\.\d+\s+`([^`]+)`\s+(?:—|-)\s+(.+?)\s*$").unwrap()
});
static INPUT_PARAMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^####\s+Input Parameters\s*$").unwrap());
static OUTPUT_PARAMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^####\s+Response Parameters\s*$").unwrap());
static ALGORITHM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)###\s+Algorithm\s*\n\s*```[^\n]*\n(.*?)```").unwrap()
});
static NOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^##\s+(?:7|9)\.\s+Notes\s*$").unwrap());
static REQUEST_EXAMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)###\s+Request Example\s*\n\s*```json\s*\n(.*?)```").unwrap()
});
static RESPONSE_EXAMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)###\s+Response Example\s*\n\s*```json\s*\n(.*?)```").unwrap()
});

const NONE_SENTINEL: &str = "None.";
const TREE_GLYPHS: &[char] = &['│', '├', '└', '─', ' '];

/// Text after `heading` up to the next match of `end` (or the end of input).
fn section<'a>(content: &'a str, heading: &Regex, end: &Regex) -> Option<&'a str> {
    let found = heading.find(content)?;
    let body = &content[found.end()..];
    let stop = end.find(body).map_or(body.len(), |m| m.start());
    Some(&body[..stop])
}

fn is_separator_row(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('|')
        && line.contains('-')
        && line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

fn split_cells(row: &str) -> Vec<String> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(|c| c.trim().to_string()).collect()
}

/// Data rows of the first table in `text`, as raw lines.
fn table_rows(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    let Some(sep) = lines.iter().position(|l| is_separator_row(l)) else {
        return Vec::new();
    };
    if sep == 0 || !lines[sep - 1].trim_start().starts_with('|') {
        return Vec::new();
    }
    lines[sep + 1..]
        .iter()
        .take_while(|l| l.trim_start().starts_with('|'))
        .map(|l| l.trim())
        .collect()
}

/// Bare name from a rendered field cell such as `` ├─ `address.city` ``.
fn bare_name(cell: &str) -> String {
    let name = cell.replace('`', "");
    let name = name.trim_start_matches(TREE_GLYPHS).trim();
    let name = name.rsplit('.').next().unwrap_or(name);
    name.trim_end_matches("[]").to_string()
}

fn parse_field_sources(content: &str) -> IndexMap<String, String> {
    let mut sources = IndexMap::new();
    let Some(text) = section(content, &REQUEST_BODY, &SUBSECTION_END) else {
        return sources;
    };
    for row in table_rows(text) {
        let cells = split_cells(row);
        if cells.len() < 2 {
            continue;
        }
        let name = bare_name(&cells[0]);
        let source = cells[cells.len() - 1].as_str();
        if name.is_empty() || source.is_empty() || source == "—" || source == "-" {
            continue;
        }
        sources.insert(name, source.to_string());
    }
    sources
}

fn raw_table_after(text: &str, heading: &Regex) -> String {
    let Some(found) = heading.find(text) else {
        return String::new();
    };
    table_rows(&text[found.end()..]).join("\n")
}

fn parse_dependency(name: &str, description: &str, body: &str) -> Dependency {
    let mut dep = Dependency {
        name: name.to_string(),
        description: description.to_string(),
        ..Default::default()
    };
    for line in body.lines().filter(|l| l.trim_start().starts_with('|')) {
        let cells = split_cells(line);
        let [label, value, ..] = cells.as_slice() else {
            continue;
        };
        match label.as_str() {
            "**Method**" => dep.method = value.replace('`', ""),
            "**URL**" => dep.url = value.replace('`', ""),
            "**When**" => dep.when = value.clone(),
            _ => {}
        }
    }
    dep.input_params = raw_table_after(body, &INPUT_PARAMS);
    dep.output_fields = raw_table_after(body, &OUTPUT_PARAMS);
    dep
}

fn parse_dependencies(content: &str) -> Vec<Dependency> {
    let Some(text) = section(content, &DEPENDENCIES, &SECTION_END) else {
        return Vec::new();
    };
    let headings: Vec<_> = DEPENDENCY.captures_iter(text).collect();
    if headings.is_empty() {
        return Vec::new();
    }

    headings
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let end = headings
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            Some(parse_dependency(
                caps.get(1)?.as_str(),
                caps.get(2)?.as_str(),
                &text[whole.end()..end],
            ))
        })
        .collect()
}

fn capture_trimmed(re: &Regex, content: &str) -> Option<String> {
    let text = re.captures(content)?.get(1)?.as_str().trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_notes(content: &str) -> Option<String> {
    let found = NOTES.find(content)?;
    let notes = content[found.end()..].trim();
    if notes.is_empty() || notes == NONE_SENTINEL {
        return None;
    }
    Some(notes.to_string())
}

/// Recover hand-authored material from a companion document.
///
/// Fails only when the document is structurally broken (an unterminated
/// code fence); missing sections are simply absent from the result.
pub fn parse_existing(content: &str) -> Result<ExistingDocument, MergeError> {
    let fences = content
        .lines()
        .filter(|l| l.trim_start().starts_with("```"))
        .count();
    if fences % 2 != 0 {
        return Err(MergeError::MalformedDocument(
            "unterminated code block".to_string(),
        ));
    }

    Ok(ExistingDocument {
        field_sources: parse_field_sources(content),
        dependencies: parse_dependencies(content),
        algorithm: capture_trimmed(&ALGORITHM, content),
        notes: parse_notes(content),
        example_request: capture_trimmed(&REQUEST_EXAMPLE, content),
        example_response: capture_trimmed(&RESPONSE_EXAMPLE, content),
    })
}
