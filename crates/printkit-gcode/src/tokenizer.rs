//! Line splitting and numeric field extraction
//!
//! Every later stage reads G-code through these helpers: the parser, the
//! print-time estimator, filament accounting and the leveling rewriter.

/// Which part of a line a field scan may look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanScope {
    /// Only the text before the first `;`
    #[default]
    Code,
    /// The whole line, comments included
    WholeLine,
}

/// Split raw text into trimmed lines.
///
/// Splits on `\n` only; trimming removes any `\r`. The final segment is
/// yielded even when the text does not end with a newline.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(str::trim)
}

/// Text before the first `;` comment marker
pub fn code_portion(line: &str) -> &str {
    match line.find(';') {
        Some(index) => &line[..index],
        None => line,
    }
}

/// First number that directly follows `marker` in the code part of `line`.
///
/// `first_number_after("X", "G1 X12.5 Y-3 F900")` is `Some(12.5)`.
pub fn first_number_after(marker: &str, line: &str) -> Option<f64> {
    first_number_after_in(marker, line, ScanScope::Code)
}

/// First number that directly follows `marker` within `scope`.
///
/// An occurrence of the marker that is followed by anything other than a
/// signed decimal literal (another letter, whitespace, end of line) is not a
/// match and scanning continues with the next occurrence. Markers that start
/// with `;` live in comments, so they always scan the whole line.
pub fn first_number_after_in(marker: &str, line: &str, scope: ScanScope) -> Option<f64> {
    if marker.is_empty() {
        return None;
    }

    let haystack = if scope == ScanScope::WholeLine || marker.starts_with(';') {
        line
    } else {
        code_portion(line)
    };

    let mut search_from = 0;
    while let Some(found) = haystack[search_from..].find(marker) {
        let value_start = search_from + found + marker.len();
        if let Some(value) = parse_number_prefix(&haystack[value_start..]) {
            return Some(value);
        }
        search_from = value_start;
    }

    None
}

/// Parse `[+-]?digits[.digits]` at the start of `text`.
fn parse_number_prefix(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }

    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return None;
    }
    text[..end].parse().ok()
}

/// Leading command letter and its numeric sub-code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandCode {
    /// First non-space character of the line (`G`, `M`, `T`, `;`, ...)
    pub letter: char,
    /// Digits directly after the letter; `G01` and `G1` both give 1
    pub number: Option<u32>,
}

impl CommandCode {
    /// Whether this is a `G0`/`G1` linear move
    pub fn is_linear_move(&self) -> bool {
        self.letter == 'G' && matches!(self.number, Some(0) | Some(1))
    }

    /// Whether this is `G<number>`
    pub fn is_g(&self, number: u32) -> bool {
        self.letter == 'G' && self.number == Some(number)
    }
}

/// Read the command letter and sub-code of a line
pub fn command_code(line: &str) -> Option<CommandCode> {
    let line = line.trim_start();
    let letter = line.chars().next()?;
    let rest = &line[letter.len_utf8()..];
    let digit_count = rest.bytes().take_while(u8::is_ascii_digit).count();
    let number = rest[..digit_count].parse().ok();
    Some(CommandCode { letter, number })
}

/// Axis and feed words present on a motion line
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveFields {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub e: Option<f64>,
    pub f: Option<f64>,
}

impl MoveFields {
    /// Scan the code part of a line for X, Y, Z, E and F words
    pub fn scan(line: &str) -> Self {
        let code = code_portion(line);
        Self {
            x: first_number_after("X", code),
            y: first_number_after("Y", code),
            z: first_number_after("Z", code),
            e: first_number_after("E", code),
            f: first_number_after("F", code),
        }
    }

    /// Whether an X or Y word is present
    pub fn has_xy(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    /// Whether any of X, Y or Z is present
    pub fn has_axis(&self) -> bool {
        self.has_xy() || self.z.is_some()
    }
}
