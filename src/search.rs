//! Text search, with an optional per-contact context view.
//!
//! [`search`] returns the matching rows. [`context_search`] prints every hit
//! surrounded by the messages before and after it in the same conversation,
//! with the query highlighted:
//!
//! ```text
//! Mom
//! 2019.07.04 08:01:12 PM 📢 are you coming to the party tonight
//! 2019.07.04 08:03:40 PM 💬 yes! it's going to be a frabjous party, I can't
//!                            wait to see everyone
//! ```
//!
//! Queries are literal text, not patterns.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;

use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::message::{CONTACT_FIELD, Message, MessageTable};

/// ANSI sequence opening a highlight (yellow background).
pub const HIGHLIGHT_START: &str = "\u{1b}[43m";
/// ANSI sequence closing a highlight.
pub const HIGHLIGHT_END: &str = "\u{1b}[0m";

/// Settings for [`context_search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Match case exactly (default: false)
    pub case_sensitive: bool,
    /// Messages shown before and after each hit (default: 5)
    pub radius: usize,
    /// Maximum line width when wrapping (default: 90)
    pub width: usize,
    /// Indent of continuation lines (default: 27)
    pub indent: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            radius: 5,
            width: 90,
            indent: 27,
        }
    }
}

impl SearchOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets case sensitivity.
    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Sets the context radius.
    #[must_use]
    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the wrap width.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the continuation indent.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

fn matcher(query: &str, case_sensitive: bool) -> Result<Regex> {
    Ok(RegexBuilder::new(&regex::escape(query))
        .case_insensitive(!case_sensitive)
        .build()?)
}

/// Keeps messages whose text contains `query`.
///
/// Messages without text never match.
///
/// ```
/// use amat::search::search;
/// use amat::{RawRecord, pipeline::load};
/// use chrono::{TimeZone, Utc};
///
/// # fn main() -> amat::Result<()> {
/// let t = Utc.with_ymd_and_hms(2019, 7, 4, 20, 0, 0).unwrap();
/// let table = load(&[RawRecord::new("1", t).with_text("frabjous party")], None, "UTC")?;
///
/// assert_eq!(search(&table, "Frabjous", false)?.len(), 1);
/// assert_eq!(search(&table, "Frabjous", true)?.len(), 0);
/// # Ok(())
/// # }
/// ```
pub fn search(table: &MessageTable, query: &str, case_sensitive: bool) -> Result<MessageTable> {
    let re = matcher(query, case_sensitive)?;
    let hits = table.derive(
        table
            .iter()
            .filter(|m| m.text.as_deref().is_some_and(|t| re.is_match(t)))
            .cloned()
            .collect(),
    );
    tracing::debug!(query, case_sensitive, hits = hits.len(), "Searched text");
    Ok(hits)
}

/// Wraps every occurrence of `query` in `text` with the highlight sequences.
///
/// ```
/// use amat::search::{HIGHLIGHT_END, HIGHLIGHT_START, highlight};
///
/// let out = highlight("Frabjous day, frabjous!", "frabjous", false).unwrap();
/// assert_eq!(
///     out,
///     format!("{0}Frabjous{1} day, {0}frabjous{1}!", HIGHLIGHT_START, HIGHLIGHT_END)
/// );
/// ```
pub fn highlight(text: &str, query: &str, case_sensitive: bool) -> Result<String> {
    if query.is_empty() {
        return Ok(text.to_string());
    }
    let re = matcher(query, case_sensitive)?;
    Ok(highlight_with(&re, text))
}

fn highlight_with(re: &Regex, text: &str) -> String {
    re.replace_all(text, |caps: &regex::Captures<'_>| {
        format!("{}{}{}", HIGHLIGHT_START, &caps[0], HIGHLIGHT_END)
    })
    .into_owned()
}

/// The messages around one search hit in its contact's timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextWindow {
    /// Contact whose timeline the window comes from
    pub contact: String,
    /// Position of the hit in the timeline
    pub hit: usize,
    /// First timeline position shown
    pub start: usize,
    /// Last timeline position shown (inclusive)
    pub end: usize,
    /// Timeline messages `start..=end`
    pub messages: Vec<Message>,
}

/// Computes the context window of every search hit, in table order.
///
/// A contact's timeline is every message with that contact, ordered by
/// `date_local` (ties keep table order). The hit is located by the first
/// timeline entry with the same `date_local`, and the window spans
/// `max(0, i - radius)..=min(len - 1, i + radius)`.
///
/// # Errors
///
/// Returns [`AmatError::UnknownField`](crate::AmatError::UnknownField) if the
/// table was loaded without an identity map.
pub fn context_windows(
    table: &MessageTable,
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<ContextWindow>> {
    table.require_field(CONTACT_FIELD)?;
    let hits = search(table, query, options.case_sensitive)?;

    let mut timelines: HashMap<&str, Vec<&Message>> = HashMap::new();
    let mut windows = Vec::with_capacity(hits.len());

    for hit in &hits {
        let contact = hit.contact().unwrap_or_default();
        let timeline = timelines.entry(contact).or_insert_with(|| {
            let mut timeline: Vec<&Message> =
                table.iter().filter(|m| m.contact() == Some(contact)).collect();
            timeline.sort_by_key(|m| m.date_local);
            timeline
        });

        let Some(i) = timeline.iter().position(|m| m.date_local == hit.date_local) else {
            continue;
        };
        let start = i.saturating_sub(options.radius);
        let end = (i + options.radius).min(timeline.len() - 1);

        windows.push(ContextWindow {
            contact: contact.to_string(),
            hit: i,
            start,
            end,
            messages: timeline[start..=end].iter().map(|m| (*m).clone()).collect(),
        });
    }

    Ok(windows)
}

/// Writes every hit with its surrounding conversation.
///
/// Each window is printed as the contact name, then one line per message
/// (`<timestamp> <ioicon> <text>`, query highlighted, wrapped to
/// `options.width` with continuation lines indented by `options.indent`),
/// then a blank line.
///
/// ```
/// use amat::search::{SearchOptions, context_search};
/// use amat::{IdentityMap, RawRecord, pipeline::load};
/// use chrono::{TimeZone, Utc};
///
/// # fn main() -> amat::Result<()> {
/// let t = Utc.with_ymd_and_hms(2019, 7, 4, 20, 0, 0).unwrap();
/// let ids = IdentityMap::from_yaml_str("1: Mom")?;
/// let table = load(&[RawRecord::new("1", t).with_text("frabjous party")], Some(&ids), "UTC")?;
///
/// let mut out = Vec::new();
/// context_search(&table, "frabjous", &SearchOptions::new().with_radius(3), &mut out)?;
/// let out = String::from_utf8(out).unwrap();
/// assert!(out.starts_with("Mom\n2019.07.04 08:00:00 PM 📢 "));
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails when the table has no `contact` field or the writer fails.
pub fn context_search<W: Write + ?Sized>(
    table: &MessageTable,
    query: &str,
    options: &SearchOptions,
    writer: &mut W,
) -> Result<()> {
    let windows = context_windows(table, query, options)?;
    let re = matcher(query, options.case_sensitive)?;

    for window in &windows {
        writeln!(writer, "{}", window.contact)?;
        for message in &window.messages {
            let text = if query.is_empty() {
                message.text().to_string()
            } else {
                highlight_with(&re, message.text())
            };
            let line = format!("{} {} {}", message.timestamp, message.ioicon(), text);
            for wrapped in wrap(&line, options.width, options.indent) {
                writeln!(writer, "{}", wrapped)?;
            }
        }
        writeln!(writer)?;
    }

    tracing::debug!(query, windows = windows.len(), "Printed context search");
    Ok(())
}

/// Greedy word wrap. Escape sequences take no width, whitespace runs
/// collapse to one space, and words longer than a line are split.
fn wrap(text: &str, width: usize, indent: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut used = 0;

    for word in text.split_whitespace() {
        let mut word = Cow::Borrowed(word);
        loop {
            let available = if lines.is_empty() {
                width
            } else {
                width.saturating_sub(indent)
            }
            .max(1);
            let len = visible_width(&word);
            let needed = if used == 0 { len } else { used + 1 + len };

            if needed <= available {
                if used > 0 {
                    line.push(' ');
                    used += 1;
                }
                line.push_str(&word);
                used += len;
                break;
            }
            if used > 0 {
                lines.push(std::mem::take(&mut line));
                used = 0;
                continue;
            }
            let (head, tail) = split_visible(&word, available);
            if visible_width(tail) == 0 {
                // trailing escapes stay on the line they close
                lines.push(word.into_owned());
                break;
            }
            let mut head = head.to_string();
            let tail = if highlight_open(&head) {
                // close the highlight at the break and reopen it after the indent
                head.push_str(HIGHLIGHT_END);
                format!("{}{}", HIGHLIGHT_START, tail)
            } else {
                tail.to_string()
            };
            lines.push(head);
            word = Cow::Owned(tail);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    let pad = " ".repeat(indent);
    lines
        .into_iter()
        .enumerate()
        .map(|(i, l)| if i == 0 { l } else { format!("{}{}", pad, l) })
        .collect()
}

/// Whether `s` starts a highlight it does not end.
fn highlight_open(s: &str) -> bool {
    s.rfind(HIGHLIGHT_START) > s.rfind(HIGHLIGHT_END)
}

/// Characters that take up space on a terminal, skipping ANSI escapes.
fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\u{1b}' {
            in_escape = true;
        } else if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else {
            width += 1;
        }
    }
    width
}

/// Splits after `n` visible characters.
fn split_visible(s: &str, n: usize) -> (&str, &str) {
    let mut seen = 0;
    let mut in_escape = false;
    for (i, c) in s.char_indices() {
        if c == '\u{1b}' {
            in_escape = true;
            continue;
        }
        if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
            continue;
        }
        if seen == n {
            return s.split_at(i);
        }
        seen += 1;
    }
    (s, "")
}
