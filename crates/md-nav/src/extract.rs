use html5gum::{Token, Tokenizer};

use crate::heading::Heading;

/// Deepest heading level tracked for navigation unless configured otherwise.
pub const DEFAULT_MAX_LEVEL: u8 = 4;

/// A heading element as found in the HTML, before id filtering.
#[derive(Debug)]
struct RawHeading {
    id: Option<String>,
    text: String,
    level: u8,
}

fn heading_level(tag: &[u8], max_level: u8) -> Option<u8> {
    match tag {
        [b'h', d @ b'1'..=b'6'] => {
            let level = d - b'0';
            (level <= max_level).then_some(level)
        }
        _ => None,
    }
}

fn scan(html: &str, max_level: u8) -> Vec<RawHeading> {
    let mut found = Vec::new();
    let mut open: Option<RawHeading> = None;

    for token in Tokenizer::new(html) {
        let token = match token {
            Ok(token) => token,
            Err(err) => match err {},
        };
        match token {
            Token::StartTag(start) => {
                if open.is_some() {
                    continue;
                }
                if let Some(level) = heading_level(start.name.as_slice(), max_level) {
                    let id = start
                        .attributes
                        .get(b"id".as_slice())
                        .map(|v| String::from_utf8_lossy(v).trim().to_string())
                        .filter(|v| !v.is_empty());
                    open = Some(RawHeading {
                        id,
                        text: String::new(),
                        level,
                    });
                }
            }
            Token::String(s) => {
                if let Some(h) = open.as_mut() {
                    h.text.push_str(&String::from_utf8_lossy(&s));
                }
            }
            Token::EndTag(end) => {
                let closes = open
                    .as_ref()
                    .is_some_and(|h| heading_level(end.name.as_slice(), 6) == Some(h.level));
                if closes {
                    if let Some(mut h) = open.take() {
                        h.text = h.text.split_whitespace().collect::<Vec<_>>().join(" ");
                        found.push(h);
                    }
                }
            }
            Token::Error(err) => log::warn!("HTML parsing error while extracting headings: {err}"),
            _ => {}
        }
    }

    found
}

/// Collect the `h1`–`h4` headings of rendered HTML in document order.
///
/// Headings without an `id` cannot be linked to and are skipped.
pub fn extract_headings(html: &str) -> Vec<Heading> {
    extract_headings_upto(html, DEFAULT_MAX_LEVEL)
}

/// [`extract_headings`] with a configurable deepest level.
pub fn extract_headings_upto(html: &str, max_level: u8) -> Vec<Heading> {
    scan(html, max_level)
        .into_iter()
        .filter_map(|h| match h.id {
            Some(id) => Some(Heading::new(id, h.text, h.level)),
            None => {
                log::debug!("skipping heading without id: {:?}", h.text);
                None
            }
        })
        .collect()
}

/// Extract headings only once rendering has committed them.
///
/// Returns `None` ("not ready") when there is no heading element yet or the
/// first one has no `id`.
pub fn try_extract(html: &str, max_level: u8) -> Option<Vec<Heading>> {
    let raw = scan(html, max_level);
    match raw.first() {
        None => None,
        Some(first) if first.id.is_none() => None,
        Some(_) => Some(extract_headings_upto(html, max_level)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchState {
    Observing,
    Resolved(Vec<Heading>),
    Disconnected,
}

/// Waits for the rendering layer to commit headings.
///
/// Extraction is attempted immediately; if the headings are not there yet the
/// watch stays subscribed and retries on every render-committed event. The
/// first successful extraction disconnects it, and later events are ignored.
#[derive(Debug, Clone)]
pub struct HeadingWatch {
    max_level: u8,
    state: WatchState,
}

impl HeadingWatch {
    /// Start watching. `current` is whatever the container holds right now.
    pub fn observe(current: Option<&str>, max_level: u8) -> Self {
        let mut watch = Self {
            max_level,
            state: WatchState::Observing,
        };
        if let Some(html) = current {
            watch.notify_rendered(html);
        }
        watch
    }

    /// Render-committed event. Returns the headings when this event resolved
    /// the watch.
    pub fn notify_rendered(&mut self, html: &str) -> Option<&[Heading]> {
        if self.state != WatchState::Observing {
            return None;
        }
        let headings = try_extract(html, self.max_level)?;
        log::debug!("headings ready: {} found", headings.len());
        self.state = WatchState::Resolved(headings);
        self.headings()
    }

    /// Tear down the subscription without waiting for headings.
    pub fn disconnect(&mut self) {
        if self.state == WatchState::Observing {
            self.state = WatchState::Disconnected;
        }
    }

    /// Whether the watch is still subscribed to render events.
    pub fn is_observing(&self) -> bool {
        self.state == WatchState::Observing
    }

    pub fn headings(&self) -> Option<&[Heading]> {
        match &self.state {
            WatchState::Resolved(h) => Some(h),
            _ => None,
        }
    }

    pub fn into_headings(self) -> Option<Vec<Heading>> {
        match self.state {
            WatchState::Resolved(h) => Some(h),
            _ => None,
        }
    }
}
