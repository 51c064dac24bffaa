//! Line scanner for the block-style YAML subset OpenAPI files are written in.
//!
//! Each significant line becomes a [`Line`] carrying its indentation and a
//! [`Token`]. List items are split into an [`Token::Item`] marker followed by
//! the item's content on a synthetic line two columns deeper, so a sequence of
//! mappings nests exactly like an ordinary block. [`Block`] views answer
//! structural questions ("the children of `responses`", "the first `$ref`
//! under `requestBody`") with one rule: a block ends at the first line whose
//! indentation is not greater than its parent's.

/// Scanned content of one significant line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `- ` list item marker; the item's content follows on deeper lines.
    Item,
    /// `key:` with nothing after the colon; opens a nested block.
    Open(String),
    /// `key: value`, with quotes and trailing comments removed.
    Pair(String, String),
    /// A bare scalar such as the `id` in `- id`.
    Scalar(String),
}

/// A scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based source line number.
    pub number: usize,
    /// Column of the token.
    pub indent: usize,
    pub token: Token,
}

impl Line {
    /// The mapping key on this line, if any.
    pub fn key(&self) -> Option<&str> {
        match &self.token {
            Token::Open(key) | Token::Pair(key, _) => Some(key),
            _ => None,
        }
    }
}

/// Number of leading ASCII spaces and tabs. Other whitespace counts as
/// content, so the result is always a char boundary.
pub fn indent_of(line: &str) -> usize {
    line.bytes().take_while(|b| matches!(b, b' ' | b'\t')).count()
}

/// `line` with at most `columns` leading indentation bytes removed.
pub fn strip_indent(line: &str, columns: usize) -> &str {
    &line[indent_of(line).min(columns)..]
}

/// True for lines that never affect structure.
pub fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// A scanned document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    lines: Vec<Line>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        Self { lines: scan(text) }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn root(&self) -> Block<'_> {
        Block { lines: &self.lines }
    }
}

/// Scan `text` into significant lines.
pub fn scan(text: &str) -> Vec<Line> {
    let raw: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < raw.len() {
        let line = raw[i];
        let number = i + 1;
        i += 1;
        if is_blank_or_comment(line) {
            continue;
        }

        let mut column = indent_of(line);
        let mut body = line[column..].trim();

        // Peel `- ` markers; the content sits at the column after the dash.
        while body == "-" || body.starts_with("- ") {
            out.push(Line {
                number,
                indent: column,
                token: Token::Item,
            });
            let rest = &body[1..];
            let content = rest.trim_start();
            column += 1 + (rest.len() - content.len());
            body = content;
        }
        if body.is_empty() || body.starts_with('#') {
            continue;
        }

        let token = match split_key(body) {
            Some((key, rest)) => {
                let value = clean_value(rest);
                if value.is_empty() {
                    Token::Open(key.to_string())
                } else if is_block_indicator(value) {
                    let (text, next) = block_scalar(&raw, i, column, value);
                    i = next;
                    Token::Pair(key.to_string(), text)
                } else {
                    Token::Pair(key.to_string(), value.to_string())
                }
            }
            None => Token::Scalar(clean_value(body).to_string()),
        };
        out.push(Line {
            number,
            indent: column,
            token,
        });
    }

    out
}

/// Split `key: rest` / `key:`; `None` when the text is not a mapping entry.
fn split_key(body: &str) -> Option<(&str, &str)> {
    let first = body.chars().next()?;
    if first == '\'' || first == '"' {
        let close = body[1..].find(first)? + 1;
        let after = body[close + 1..].trim_start();
        let rest = after.strip_prefix(':')?;
        if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
            return None;
        }
        return Some((&body[1..close], rest.trim()));
    }
    if first == '{' || first == '[' {
        return None;
    }

    let bytes = body.as_bytes();
    for (idx, b) in bytes.iter().enumerate() {
        if *b != b':' {
            continue;
        }
        let next = bytes.get(idx + 1);
        if next.is_none() || matches!(next, Some(b' ' | b'\t')) {
            let key = body[..idx].trim_end();
            if key.is_empty() {
                return None;
            }
            return Some((key, body[idx + 1..].trim()));
        }
    }
    None
}

/// Strip surrounding quotes or a trailing ` #` comment.
fn clean_value(value: &str) -> &str {
    let value = value.trim();
    if value.starts_with('#') {
        return "";
    }
    if let Some(first) = value.chars().next().filter(|c| *c == '\'' || *c == '"') {
        if let Some(close) = value[1..].find(first) {
            return &value[1..close + 1];
        }
        return value;
    }
    match value.find(" #") {
        Some(idx) => value[..idx].trim_end(),
        None => value,
    }
}

fn is_block_indicator(value: &str) -> bool {
    matches!(value, "|" | ">" | "|-" | ">-" | "|+" | ">+")
}

/// Collect a `|` / `>` scalar starting at raw line `start`. Returns the text
/// and the index of the first raw line after it.
fn block_scalar(raw: &[&str], start: usize, parent: usize, indicator: &str) -> (String, usize) {
    let mut end = start;
    while end < raw.len() {
        let line = raw[end];
        if !line.trim().is_empty() && indent_of(line) <= parent {
            break;
        }
        end += 1;
    }

    let body = &raw[start..end];
    let strip = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);
    let parts: Vec<&str> = body
        .iter()
        .map(|l| strip_indent(l, strip))
        .collect();

    let separator = if indicator.starts_with('>') { " " } else { "\n" };
    let text = parts
        .iter()
        .map(|p| p.trim_end())
        .collect::<Vec<_>>()
        .join(separator);
    (text.trim_end().to_string(), end)
}

/// Items of a simple flow sequence such as `[id, 'name']`.
pub fn flow_items(value: &str) -> Option<Vec<String>> {
    let inner = value.trim().strip_prefix('[')?.strip_suffix(']')?;
    Some(
        inner
            .split(',')
            .map(clean_value)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// The target of a `$ref:` appearing anywhere in `text`, e.g. inside
/// `{ $ref: './users.yaml' }`.
pub fn extract_ref(text: &str) -> Option<&str> {
    let idx = text.find("$ref:")?;
    let rest = text[idx + 5..].trim_start();
    let rest = rest.trim_start_matches(['\'', '"']);
    let end = rest
        .find(|c: char| c.is_whitespace() || matches!(c, '\'' | '"' | '}' | ','))
        .unwrap_or(rest.len());
    let target = &rest[..end];
    (!target.is_empty()).then_some(target)
}

/// A contiguous run of scanned lines whose first line sets the base indent.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    lines: &'a [Line],
}

impl<'a> Block<'a> {
    pub fn new(lines: &'a [Line]) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &'a [Line] {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Direct children, each paired with its nested body.
    pub fn children(&self) -> Children<'a> {
        Children {
            lines: self.lines,
            pos: 0,
        }
    }

    /// The direct child keyed `key`.
    pub fn get(&self, key: &str) -> Option<(&'a Line, Block<'a>)> {
        self.children().find(|(line, _)| line.key() == Some(key))
    }

    /// Scalar value of the direct child `key`.
    pub fn value(&self, key: &str) -> Option<&'a str> {
        match self.get(key)? {
            (
                Line {
                    token: Token::Pair(_, value),
                    ..
                },
                _,
            ) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Nested body of the direct child `key`.
    pub fn child(&self, key: &str) -> Option<Block<'a>> {
        self.get(key).map(|(_, body)| body)
    }

    /// Bodies of the direct list items.
    pub fn items(&self) -> impl Iterator<Item = Block<'a>> + 'a {
        self.children()
            .filter(|(line, _)| line.token == Token::Item)
            .map(|(_, body)| body)
    }

    /// The bare scalar this block consists of, as in the body of `- id`.
    pub fn scalar(&self) -> Option<&'a str> {
        match self.lines.first().map(|l| &l.token) {
            Some(Token::Scalar(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Values of the sequence under `key`, block or flow style.
    pub fn list(&self, key: &str) -> Vec<String> {
        let Some((line, body)) = self.get(key) else {
            return Vec::new();
        };
        if let Token::Pair(_, value) = &line.token {
            return flow_items(value).unwrap_or_default();
        }
        body.items()
            .filter_map(|item| item.scalar().map(str::to_string))
            .collect()
    }

    /// First `$ref` target anywhere in the block.
    pub fn find_ref(&self) -> Option<&'a str> {
        self.lines.iter().find_map(|line| match &line.token {
            Token::Pair(key, value) if key == "$ref" => Some(value.as_str()),
            Token::Pair(_, value) => extract_ref(value),
            _ => None,
        })
    }
}

/// Iterator over the direct children of a [`Block`].
pub struct Children<'a> {
    lines: &'a [Line],
    pos: usize,
}

impl<'a> Iterator for Children<'a> {
    type Item = (&'a Line, Block<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.get(self.pos)?;
        let start = self.pos + 1;
        let end = block_end(self.lines, self.pos);
        self.pos = end;
        Some((line, Block::new(&self.lines[start..end])))
    }
}

/// Index one past the body of the line at `idx`: the body runs until a line
/// indented no deeper than the opener. A mapping key may carry a sequence at
/// its own column (`tags:` followed by `- pets`); those items belong to it.
pub fn block_end(lines: &[Line], idx: usize) -> usize {
    let opener = &lines[idx];
    let base = opener.indent;
    let start = idx + 1;
    let compact = opener.key().is_some()
        && lines
            .get(start)
            .is_some_and(|l| l.token == Token::Item && l.indent == base);

    let mut end = start;
    while let Some(line) = lines.get(end) {
        let nested = line.indent > base;
        let sibling_item = compact && line.token == Token::Item && line.indent == base;
        if !(nested || sibling_item) {
            break;
        }
        end += 1;
    }
    end
}
