//! Telegram MarkdownV2 formatting for arbitrage payloads.
//!
//! A JSON object becomes one bold-labelled line per field, in payload order.
//! Numeric fields whose key mentions `percent` render as `x.xx%`. Otherwise a
//! key mentioning `price` or `profit` renders as `$x.xx`, so
//! `profit_percentage` is a percentage. Valid JSON that is not an object is
//! shown verbatim in a code block.
//!
//! Messages are cut to Telegram's length limit. An object loses its trailing
//! fields first and the cut is marked with an escaped ellipsis.

use serde_json::Value;

use crate::domain::ChannelEvent;
use crate::port::outbound::formatter::{FormatError, MessageFormatter};

const TITLE: &str = "🚨 *Arbitrage Opportunity Detected\\!*";
const FALLBACK_TITLE: &str = "🚨 *Opportunity*";

/// Telegram rejects longer messages, counted in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;
const ELLIPSIS: &str = "\\.\\.\\.";

/// Formats payloads for Telegram's MarkdownV2 parse mode.
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MessageFormatter for MarkdownFormatter {
    fn format(&self, event: &ChannelEvent) -> Result<String, FormatError> {
        let value: Value = serde_json::from_str(event.payload())?;

        let Value::Object(fields) = value else {
            return Ok(format_code_block(&value));
        };

        // Room for the ellipsis line is always kept back.
        let budget = MAX_MESSAGE_LEN - text_len(ELLIPSIS) - 1;
        let mut message = format!("{TITLE}\n\n");
        for (key, value) in &fields {
            let label = format!("*{}:* ", escape_markdown(&title_case(&key.replace('_', " "))));
            let value = escape_markdown(&format_value(key, value));
            let used = text_len(&message);
            if used + text_len(&label) + text_len(&value) + 1 <= budget {
                message.push_str(&format!("{label}{value}\n"));
                continue;
            }

            let room = budget.saturating_sub(used + text_len(&label));
            if room > 0 {
                message.push_str(&label);
                message.push_str(truncate_escaped(&value, room));
            }
            message.push_str(ELLIPSIS);
            message.push('\n');
            break;
        }
        Ok(message)
    }
}

fn format_value(key: &str, value: &Value) -> String {
    match value {
        Value::Number(number) => {
            let key = key.to_lowercase();
            match number.as_f64() {
                Some(amount) if key.contains("percent") => format!("{amount:.2}%"),
                Some(amount) if key.contains("price") || key.contains("profit") => {
                    format!("${amount:.2}")
                }
                _ => number.to_string(),
            }
        }
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn format_code_block(value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    let body = pretty.replace('\\', "\\\\").replace('`', "\\`");

    let frame = text_len(&format!("{FALLBACK_TITLE}\n\n```json\n\n```"));
    if frame + text_len(&body) <= MAX_MESSAGE_LEN {
        return format!("{FALLBACK_TITLE}\n\n```json\n{body}\n```");
    }
    let room = MAX_MESSAGE_LEN.saturating_sub(frame + "\n...".len());
    format!(
        "{FALLBACK_TITLE}\n\n```json\n{}\n...\n```",
        truncate_escaped(&body, room)
    )
}

fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Longest prefix of escaped `text` within `max_len` UTF-16 units.
///
/// A backslash and the character it escapes are never split.
fn truncate_escaped(text: &str, max_len: usize) -> &str {
    let mut used = 0;
    let mut end = 0;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        let mut width = c.len_utf16();
        let mut next_end = end + c.len_utf8();
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                width += escaped.len_utf16();
                next_end += escaped.len_utf8();
            }
        }
        if used + width > max_len {
            break;
        }
        used += width;
        end = next_end;
    }
    &text[..end]
}

/// Uppercase the first letter of every word, lowercase the rest.
///
/// Any non-letter starts a new word, so `usd/btc` becomes `Usd/Btc`.
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }
    result
}

/// Escape the characters MarkdownV2 treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let special_chars = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
        '\\',
    ];
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        if special_chars.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}
