//! Balanced-brace scanner.
//!
//! Finds top-level `{...}` substrings in free text. Braces inside JSON
//! string literals (including escaped quotes) do not count toward depth,
//! so `{"q":"a } b"}` is one object, not a truncated one.

/// Iterator over top-level balanced `{...}` slices, in order of appearance.
///
/// An opening brace that is never closed is skipped and scanning resumes
/// right after it, so stray braces in prose do not hide a later object.
pub struct BraceScanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> BraceScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

/// Byte index of the brace closing the object that opens at `start`.
fn matching_close(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

impl<'a> Iterator for BraceScanner<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            let start = self.pos + self.text[self.pos..].find('{')?;
            match matching_close(bytes, start) {
                Some(end) => {
                    self.pos = end + 1;
                    // `{` and `}` are ASCII, so both ends are char boundaries
                    return Some(&self.text[start..=end]);
                }
                None => self.pos = start + 1,
            }
        }
        None
    }
}

/// The first top-level balanced object in `text`, if any.
pub fn first_object(text: &str) -> Option<&str> {
    BraceScanner::new(text).next()
}
