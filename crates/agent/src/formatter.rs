//! Final answer normalization.
//!
//! Whatever prose the model produced is re-emitted as a bullet list under a
//! fixed heading, so every reply renders the same way in the client.

pub const ANSWER_HEADING: &str = "### Answer";

const EMPTY_PLACEHOLDER: &str = "No response.";

/// Normalize a raw final answer into `### Answer` + bullet list markdown.
pub fn format_final_response(raw: &str) -> String {
    let text = unescape(raw);
    let text = text.trim();

    let items: Vec<String> = if text.contains('\n') {
        text.lines()
            .map(|line| strip_bullet(line.trim()).trim())
            .filter(|line| !line.is_empty() && *line != ANSWER_HEADING)
            .map(str::to_string)
            .collect()
    } else {
        split_sentences(text)
    };

    if items.is_empty() {
        return format!("{ANSWER_HEADING}\n- {EMPTY_PLACEHOLDER}");
    }

    let mut out = String::from(ANSWER_HEADING);
    for item in items {
        out.push_str("\n- ");
        out.push_str(&item);
    }
    out
}

/// Literal `\n` and `\t` sequences some models emit instead of whitespace.
fn unescape(raw: &str) -> String {
    raw.replace("\\n", "\n").replace("\\t", "\t")
}

/// Remove one leading `-`, `*`, `•`, `+`, `1.` or `1)` marker.
fn strip_bullet(line: &str) -> &str {
    if let Some(rest) = line
        .strip_prefix(['-', '*', '•', '+'])
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    {
        return rest;
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(after) = rest
            .strip_prefix(['.', ')'])
            .filter(|after| after.is_empty() || after.starts_with(char::is_whitespace))
        {
            return after;
        }
    }
    line
}

/// Split at `.`, `!` or `?` followed by whitespace and an uppercase letter or digit.
fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for (i, &(idx, c)) in chars.iter().enumerate() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }
        if j == i + 1 || j >= chars.len() {
            continue;
        }
        let next = chars[j].1;
        if next.is_uppercase() || next.is_ascii_digit() {
            let end = idx + c.len_utf8();
            sentences.push(text[start..end].trim().to_string());
            start = chars[j].0;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences.retain(|s| !s.is_empty());
    sentences
}
