use serde::Serialize;

/// A heading as it was actually rendered: anchor id, visible text and level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub id: String,
    pub text: String,
    pub level: u8,
}

impl Heading {
    pub fn new(id: impl Into<String>, text: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level,
        }
    }
}

/// Parse an ATX heading line (`^(#{1,6})\s+(.+)$`) into `(level, title)`.
///
/// The title is trimmed; a line with only whitespace after the `#` run is not
/// a heading.
pub fn parse_heading_line(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let title = rest.trim();
    if title.is_empty() {
        return None;
    }
    Some((hashes as u8, title))
}

/// Whether a line opens or closes a fenced code block.
pub fn is_fence(line: &str) -> bool {
    line.trim().starts_with("```")
}
