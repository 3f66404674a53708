//! In-band tool-call directives: `[TOOL_CALL:<name>:<params>]`.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

static DIRECTIVE_RE: OnceLock<Regex> = OnceLock::new();

fn directive_re() -> &'static Regex {
    DIRECTIVE_RE.get_or_init(|| {
        Regex::new(r"\[TOOL_CALL:([^:]+):([^\]]+)\]").expect("directive pattern is valid")
    })
}

/// A directive found in model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Tool name, whitespace-trimmed.
    pub tool_name: String,
    /// Undecoded parameter text, whitespace-trimmed.
    pub raw_parameters: String,
    /// The exact matched substring, brackets included.
    pub original_span: String,
    /// Byte range of `original_span` in the parsed text.
    pub range: Range<usize>,
}

/// Find every directive in `text`, left to right.
///
/// Malformed or overlapping brackets simply do not match; an empty result is
/// the common case for a final answer.
pub fn parse_tool_calls(text: &str) -> Vec<ToolCall> {
    directive_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ToolCall {
                tool_name: caps[1].trim().to_string(),
                raw_parameters: caps[2].trim().to_string(),
                original_span: whole.as_str().to_string(),
                range: whole.range(),
            })
        })
        .collect()
}

/// Remove every call's span from `text`, keeping everything else in place.
///
/// `calls` must come from [`parse_tool_calls`] on the same `text`.
pub fn strip_tool_calls(text: &str, calls: &[ToolCall]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for call in calls {
        let in_place = text.get(call.range.clone()) == Some(call.original_span.as_str());
        if call.range.start < cursor || !in_place {
            continue;
        }
        out.push_str(&text[cursor..call.range.start]);
        cursor = call.range.end;
    }
    out.push_str(&text[cursor..]);
    out
}
