//! Lenient JSON extraction from model output
//!
//! Local models wrap JSON in prose, code fences, or chat-template tokens.
//! Parsing uses a 3-tier fallback strategy and degrades to `None` (with a
//! warning) instead of failing the chat call.

use crate::logging::{log_debug, log_warn};

use serde_json::Value;

/// Response parser with fallback strategies
pub struct ResponseParser;

impl ResponseParser {
    /// Parse LLM output into a JSON object or array
    ///
    /// 1. Try direct JSON parse
    /// 2. Clean known artifacts and retry
    /// 3. Extract a balanced `{...}`, or failing that `[...]`, from mixed content
    ///
    /// Returns `None` when no structured value can be recovered.
    pub fn parse_llm_output(raw: &str) -> Option<Value> {
        log_debug!(
            content_length = raw.len(),
            "Parsing LLM output for structured JSON"
        );

        if let Some(value) = Self::parse_structured(raw) {
            return Some(value);
        }

        let cleaned = Self::clean_artifacts(raw);
        if cleaned != raw {
            if let Some(value) = Self::parse_structured(&cleaned) {
                log_debug!("Parsed JSON after artifact cleaning");
                return Some(value);
            }
        }

        if let Some(value) = Self::extract_structured(&cleaned) {
            log_debug!("Parsed JSON extracted from mixed content");
            return Some(value);
        }

        let preview = raw.chars().take(200).collect::<String>();
        log_warn!(
            content_preview = %preview,
            "Failed to parse JSON from LLM response"
        );
        None
    }

    /// Only objects and arrays count as structured output
    fn parse_structured(text: &str) -> Option<Value> {
        serde_json::from_str::<Value>(text)
            .ok()
            .filter(|v| v.is_object() || v.is_array())
    }

    /// Clean known artifacts from LLM responses
    fn clean_artifacts(content: &str) -> String {
        let cleaned = content
            .replace("<|channel|>", "")
            .replace("```json", "")
            .replace("```JSON", "")
            .replace("```", "")
            .replace("<|end|>", "")
            .replace("<|start|>", "");

        cleaned
            .trim()
            .chars()
            .filter(|c| !c.is_control() || c.is_whitespace())
            .collect()
    }

    /// Extract a structured value from mixed content
    ///
    /// Every top-level balanced `{...}` or `[...]` that parses is a
    /// candidate. The first object wins; otherwise the first array. Spans
    /// that fail to parse (like `[note]`) are skipped one opener at a time.
    fn extract_structured(content: &str) -> Option<Value> {
        let mut first_array = None;
        let mut offset = 0;

        while let Some(found) = content[offset..].find(|c: char| c == '{' || c == '[') {
            let start = offset + found;
            let tail = &content[start..];
            let parsed = Self::find_balanced_end(tail)
                .and_then(|end| Some((end, Self::parse_structured(&tail[..end])?)));

            match parsed {
                Some((_, value)) if value.is_object() => return Some(value),
                Some((end, value)) => {
                    first_array.get_or_insert(value);
                    offset = start + end;
                }
                // Openers are ASCII, so one byte on is still a char boundary.
                None => offset = start + 1,
            }
        }

        first_array
    }

    /// Byte length of the balanced value at the start of `text`
    fn find_balanced_end(text: &str) -> Option<usize> {
        let mut chars = text.char_indices();
        let (open, close) = match chars.next()? {
            (_, '{') => ('{', '}'),
            (_, '[') => ('[', ']'),
            _ => return None,
        };

        let mut depth = 1usize;
        let mut in_string = false;
        let mut escaped = false;

        for (idx, ch) in chars {
            if in_string {
                match ch {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            match ch {
                '"' => in_string = true,
                c if c == open => depth += 1,
                c if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(idx + ch.len_utf8());
                    }
                }
                _ => {}
            }
        }

        None
    }
}
