//! Path Locator
//!
//! Maps a dotted diagnostic path such as `services.web.ports` back onto the
//! source text by following block indentation. Works for block-style YAML
//! and for pretty-printed JSON; flow collections resolve to their parent key.
//!
//! Columns are byte offsets into the line. LSP positions count UTF-16 code
//! units; convert with [`utf16_column`].

/// A 0-based single-line span in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub line: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl SourceSpan {
    pub fn new(line: usize, start_col: usize, end_col: usize) -> Self {
        Self {
            line,
            start_col,
            end_col,
        }
    }
}

/// Locate the deepest resolvable segment of `path` in `text`.
///
/// Keys may contain dots themselves (a service called `api.v1`), so at each
/// level the longest run of segments naming a key in the current block wins.
/// Returns `None` when not even the first segment can be found.
pub fn locate_path(text: &str, path: &str) -> Option<SourceSpan> {
    let lines: Vec<&str> = text.lines().collect();
    let segments: Vec<&str> = path.split('.').collect();
    let mut found = None;
    let mut start = 0;
    let mut end = lines.len();
    let mut parent_indent: Option<usize> = None;
    let mut next = 0;

    while next < segments.len() {
        let hit = (next + 1..=segments.len()).rev().find_map(|stop| {
            let key = segments[next..stop].join(".");
            find_key(&lines[start..end], &key, parent_indent).map(|hit| (stop, hit))
        });
        let Some((stop, (offset, span))) = hit else {
            break;
        };
        let line = start + offset;
        found = Some(SourceSpan { line, ..span });
        parent_indent = Some(span.start_col);
        start = line + 1;
        end = block_end(&lines, start, span.start_col);
        next = stop;
    }

    found
}

/// UTF-16 column of byte offset `byte_col` in `line`.
///
/// Offsets inside a character snap back to its start; offsets past the end
/// of the line keep their overshoot.
pub fn utf16_column(line: &str, byte_col: usize) -> u32 {
    let mut end = byte_col.min(line.len());
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    let overshoot = byte_col.saturating_sub(line.len());
    (line[..end].encode_utf16().count() + overshoot) as u32
}

/// Byte offset of UTF-16 column `utf16_col` in `line`, clamped to its end
pub fn byte_column(line: &str, utf16_col: usize) -> usize {
    let mut units = 0;
    for (idx, c) in line.char_indices() {
        if units >= utf16_col {
            return idx;
        }
        units += c.len_utf16();
    }
    line.len()
}

/// Byte offset of the `char_col`-th character of `line`; past the end,
/// each missing character counts as one byte
pub fn char_to_byte_column(line: &str, char_col: usize) -> usize {
    match line.char_indices().nth(char_col) {
        Some((idx, _)) => idx,
        None => line.len() + char_col.saturating_sub(line.chars().count()),
    }
}

/// Line range of every top-level entry under the `services` key:
/// `(name, key span, last line of the entry)`
pub fn service_spans(text: &str) -> Vec<(String, SourceSpan, usize)> {
    let lines: Vec<&str> = text.lines().collect();
    let Some(services) = locate_path(text, "services") else {
        return Vec::new();
    };

    let block_start = services.line + 1;
    let block_stop = block_end(&lines, block_start, services.start_col);
    let block = &lines[block_start..block_stop];
    let Some(child_indent) = first_key_indent(block, Some(services.start_col)) else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    for (offset, line) in block.iter().enumerate() {
        if indent_of(line) != child_indent {
            continue;
        }
        if let Some((name, len)) = key_of(line.trim_start()) {
            let line_idx = block_start + offset;
            let last = last_content_line(&lines, line_idx, block_end(&lines, line_idx + 1, child_indent));
            spans.push((
                name.to_string(),
                SourceSpan::new(line_idx, child_indent, child_indent + len),
                last,
            ));
        }
    }
    spans
}

fn find_key(lines: &[&str], key: &str, parent_indent: Option<usize>) -> Option<(usize, SourceSpan)> {
    let child_indent = first_key_indent(lines, parent_indent)?;
    lines.iter().enumerate().find_map(|(offset, line)| {
        if indent_of(line) != child_indent {
            return None;
        }
        let (name, len) = key_of(line.trim_start())?;
        (name == key).then(|| (offset, SourceSpan::new(offset, child_indent, child_indent + len)))
    })
}

/// Indentation of the first key line nested deeper than `parent_indent`
fn first_key_indent(lines: &[&str], parent_indent: Option<usize>) -> Option<usize> {
    lines
        .iter()
        .filter(|line| parent_indent.is_none_or(|parent| indent_of(line) > parent))
        .find(|line| key_of(line.trim_start()).is_some())
        .map(|line| indent_of(line))
}

/// Index one past the last line of the block opened above `start`
fn block_end(lines: &[&str], start: usize, indent: usize) -> usize {
    (start..lines.len())
        .find(|&i| is_content(lines[i]) && indent_of(lines[i]) <= indent)
        .unwrap_or(lines.len())
}

fn last_content_line(lines: &[&str], first: usize, stop: usize) -> usize {
    (first..stop).rev().find(|&i| is_content(lines[i])).unwrap_or(first)
}

fn is_content(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#') && !matches!(trimmed, "}" | "}," | "]" | "],")
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count()
}

/// Key name and its source length when `trimmed` starts a mapping entry
fn key_of(trimmed: &str) -> Option<(&str, usize)> {
    if trimmed.starts_with('#') || trimmed.starts_with('-') {
        return None;
    }

    if let Some(quote) = trimmed.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let close = trimmed[1..].find(quote)? + 1;
        let rest = trimmed[close + 1..].trim_start();
        return rest
            .starts_with(':')
            .then(|| (&trimmed[1..close], close + 1));
    }

    let colon = trimmed
        .match_indices(':')
        .map(|(i, _)| i)
        .find(|&i| trimmed[i + 1..].is_empty() || trimmed[i + 1..].starts_with([' ', '\t']))?;
    let name = trimmed[..colon].trim_end();
    (!name.is_empty()).then_some((name, name.len()))
}
