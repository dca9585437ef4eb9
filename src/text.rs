/// Text Utilities Module
///
/// Word wrapping, padding and repetition used by the table renderer.
/// Lengths are measured in characters (Unicode scalar values), not bytes.
/// These helpers take `&str`; a missing value is handled by the caller with
/// `Option::map`, so a `None` stays `None`.
use std::borrow::Cow;

/// Line separator inserted by `wrap` when the caller passes none.
pub const LINE_SEPARATOR: &str = "\n";

const SPACE: char = ' ';

/// Wraps `input` so that no line is longer than `wrap_length`, when possible.
///
/// Breaks happen at the last space at or before the limit. A word longer than
/// the limit is cut at the limit when `wrap_long_words` is set; otherwise it is
/// left whole and the break moves to the next space after it. Leading spaces
/// of the first line are kept; spaces at a break are consumed.
pub fn wrap(input: &str, wrap_length: usize, new_line: Option<&str>, wrap_long_words: bool) -> String {
    let new_line = new_line.unwrap_or(LINE_SEPARATOR);
    let wrap_length = wrap_length.max(1);
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();

    let mut wrapped = String::with_capacity(input.len() + 32);
    let mut offset = 0;

    while len - offset > wrap_length {
        if chars[offset] == SPACE {
            offset += 1;
            continue;
        }

        let limit = offset + wrap_length;
        if let Some(pos) = chars[offset..=limit].iter().rposition(|&c| c == SPACE) {
            let at = offset + pos;
            wrapped.extend(&chars[offset..at]);
            wrapped.push_str(new_line);
            offset = at + 1;
        } else if wrap_long_words {
            wrapped.extend(&chars[offset..limit]);
            wrapped.push_str(new_line);
            offset = limit;
        } else if let Some(pos) = chars[limit..].iter().position(|&c| c == SPACE) {
            let at = limit + pos;
            wrapped.extend(&chars[offset..at]);
            wrapped.push_str(new_line);
            offset = at + 1;
        } else {
            wrapped.extend(&chars[offset..]);
            offset = len;
        }
    }

    wrapped.extend(&chars[offset..]);
    wrapped
}

/// Right-pads `input` with spaces to `size` characters.
pub fn right_pad(input: &str, size: usize) -> Cow<'_, str> {
    right_pad_with(input, size, " ")
}

/// Right-pads `input` to `size` characters with `pad`, repeated and cut to fit.
/// An empty `pad` means a space. Content already `size` wide or wider is returned as is.
pub fn right_pad_with<'a>(input: &'a str, size: usize, pad: &str) -> Cow<'a, str> {
    let pads = size.saturating_sub(input.chars().count());
    if pads == 0 {
        return Cow::Borrowed(input);
    }
    let mut padded = String::with_capacity(input.len() + pads);
    padded.push_str(input);
    padded.push_str(&fill(pad, pads));
    Cow::Owned(padded)
}

/// Left-pads `input` with spaces to `size` characters.
pub fn left_pad(input: &str, size: usize) -> Cow<'_, str> {
    left_pad_with(input, size, " ")
}

/// Left-pads `input` to `size` characters, the mirror of `right_pad_with`.
pub fn left_pad_with<'a>(input: &'a str, size: usize, pad: &str) -> Cow<'a, str> {
    let pads = size.saturating_sub(input.chars().count());
    if pads == 0 {
        return Cow::Borrowed(input);
    }
    let mut padded = fill(pad, pads);
    padded.push_str(input);
    Cow::Owned(padded)
}

/// Builds `count` copies of `unit`. Zero or negative counts give an empty string.
///
/// # Panics
///
/// Panics when the result would be longer than `usize::MAX` bytes, as
/// `str::repeat` does.
pub fn repeat(unit: &str, count: i64) -> String {
    if count <= 0 || unit.is_empty() {
        return String::new();
    }
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    let Some(total) = unit.len().checked_mul(count) else {
        panic!("repeat: {} copies of a {}-byte unit overflow usize", count, unit.len());
    };

    let mut chars = unit.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => std::iter::repeat(ch).take(count).collect(),
        _ => {
            let mut buf = String::with_capacity(total);
            for _ in 0..count {
                buf.push_str(unit);
            }
            buf
        }
    }
}

/// Exactly `width` characters of `pad` repeated; an empty pad means spaces.
fn fill(pad: &str, width: usize) -> String {
    let pad = if pad.is_empty() { " " } else { pad };
    if pad.chars().count() == 1 {
        return repeat(pad, width as i64);
    }
    pad.chars().cycle().take(width).collect()
}

/// Display width of `input`, in characters.
pub fn char_len(input: &str) -> usize {
    input.chars().count()
}
