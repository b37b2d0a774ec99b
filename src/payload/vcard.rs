//! vCard (2.1, 3.0, 4.0) contact card parsing
//!
//! Only the first card in a payload is read. Unknown properties are
//! skipped, binary (`ENCODING=b`/`BASE64`) values are ignored, and
//! quoted-printable values from 2.1 cards are decoded as UTF-8.

use crate::error::ContactParseError;
use crate::models::{ContactRecord, Labeled, PostalAddress, StructuredName};

/// Structured-contact marker
pub const VCARD_MARKER: &str = "BEGIN:VCARD";

const SUPPORTED_VERSIONS: [&str; 3] = ["2.1", "3.0", "4.0"];
const ENCODING_WORDS: [&str; 5] = ["quoted-printable", "base64", "b", "8bit", "7bit"];

/// Whether `text` carries the structured-contact marker
pub fn contains_vcard(text: &str) -> bool {
    text.contains(VCARD_MARKER)
}

#[derive(Debug)]
struct Param {
    name: Option<String>,
    values: Vec<String>,
}

#[derive(Debug)]
struct ContentLine {
    number: usize,
    name: String,
    params: Vec<Param>,
    value: String,
}

impl ContentLine {
    fn param<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |p| p.name.as_deref() == Some(name))
            .flat_map(|p| p.values.iter().map(String::as_str))
    }

    fn has_encoding(&self, encoding: &str) -> bool {
        let explicit = self.param("ENCODING").any(|v| v.eq_ignore_ascii_case(encoding));
        let bare = self
            .params
            .iter()
            .filter(|p| p.name.is_none())
            .flat_map(|p| p.values.iter())
            .any(|v| v.eq_ignore_ascii_case(encoding));
        explicit || bare
    }

    fn is_binary(&self) -> bool {
        self.has_encoding("b") || self.has_encoding("base64")
    }

    fn labels(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|p| p.name.is_none() || p.name.as_deref() == Some("TYPE"))
            .flat_map(|p| p.values.iter())
            .flat_map(|v| v.split(','))
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty() && !ENCODING_WORDS.contains(&v.as_str()))
            .collect()
    }

    fn decoded_value(&self) -> Result<String, ContactParseError> {
        if self.has_encoding("quoted-printable") {
            decode_quoted_printable(&self.value)
                .ok_or(ContactParseError::InvalidQuotedPrintable { line: self.number })
        } else {
            Ok(self.value.clone())
        }
    }
}

/// Join folded lines; returns `(first physical line number, logical line)`
fn unfold(text: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some((_, prev)) = lines.last_mut() {
            if line.starts_with(' ') || line.starts_with('\t') {
                prev.push_str(&line[1..]);
                continue;
            }
            // Quoted-printable soft line break
            if prev.ends_with('=') && prev.to_ascii_uppercase().contains("QUOTED-PRINTABLE") {
                prev.pop();
                prev.push_str(line);
                continue;
            }
        }
        lines.push((idx + 1, line.to_string()));
    }
    lines
}

/// Split on `sep` outside double quotes
fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == sep && !in_quotes => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_content_line(number: usize, line: &str) -> Result<ContentLine, ContactParseError> {
    let malformed = ContactParseError::MalformedLine { line: number };

    let mut in_quotes = false;
    let colon = line
        .char_indices()
        .find(|&(_, c)| {
            if c == '"' {
                in_quotes = !in_quotes;
            }
            c == ':' && !in_quotes
        })
        .map(|(i, _)| i)
        .ok_or_else(|| malformed.clone())?;

    let (head, value) = (&line[..colon], &line[colon + 1..]);
    let mut segments = split_unquoted(head, ';').into_iter();
    let qualified = segments.next().unwrap_or_default().trim();
    let name = qualified.rsplit('.').next().unwrap_or_default();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(malformed);
    }

    let params = segments
        .filter(|s| !s.trim().is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((k, v)) => Param {
                name: Some(k.trim().to_ascii_uppercase()),
                values: split_unquoted(v, ',')
                    .into_iter()
                    .map(|v| v.trim().trim_matches('"').to_string())
                    .collect(),
            },
            None => Param {
                name: None,
                values: vec![segment.trim().to_string()],
            },
        })
        .collect();

    Ok(ContentLine {
        number,
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Split a structured value on unescaped `;`, unescaping each component
fn structured(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ';' {
            parts.push(unescape(&current));
            current.clear();
        } else {
            current.push(c);
        }
    }
    if escaped {
        current.push('\\');
    }
    parts.push(unescape(&current));
    parts
}

fn component(parts: &[String], idx: usize) -> String {
    parts.get(idx).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn decode_quoted_printable(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'=' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        if i + 1 == bytes.len() {
            break;
        }
        let hex = value.get(i + 1..i + 3)?;
        out.push(u8::from_str_radix(hex, 16).ok()?);
        i += 3;
    }
    Some(String::from_utf8_lossy(&out).into_owned())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn apply(record: &mut ContactRecord, line: &ContentLine) -> Result<(), ContactParseError> {
    if line.is_binary() {
        return Ok(());
    }
    let value = line.decoded_value()?;
    match line.name.as_str() {
        "VERSION" => {
            let version = value.trim();
            if !SUPPORTED_VERSIONS.contains(&version) {
                return Err(ContactParseError::UnsupportedVersion(version.to_string()));
            }
        }
        "FN" => record.formatted_name = non_empty(unescape(&value)),
        "N" => {
            let parts = structured(&value);
            let name = StructuredName {
                family: component(&parts, 0),
                given: component(&parts, 1),
                additional: component(&parts, 2),
                prefix: component(&parts, 3),
                suffix: component(&parts, 4),
            };
            record.name = (!name.is_empty()).then_some(name);
        }
        "ORG" => {
            let parts: Vec<String> = structured(&value)
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
            if let Some((org, rest)) = parts.split_first() {
                record.organization = Some(org.clone());
                record.department = (!rest.is_empty()).then(|| rest.join(", "));
            }
        }
        "TITLE" => record.job_title = non_empty(unescape(&value)),
        "BDAY" => record.birthday = non_empty(unescape(&value)),
        "NOTE" => record.note = non_empty(unescape(&value)),
        "TEL" => {
            let raw = unescape(&value);
            let number = raw.strip_prefix("tel:").unwrap_or(&raw).to_string();
            if let Some(number) = non_empty(number) {
                record.phones.push(Labeled::with_labels(number, line.labels()));
            }
        }
        "EMAIL" => {
            if let Some(email) = non_empty(unescape(&value)) {
                record.emails.push(Labeled::with_labels(email, line.labels()));
            }
        }
        "URL" => {
            if let Some(url) = non_empty(unescape(&value)) {
                record.urls.push(Labeled::with_labels(url, line.labels()));
            }
        }
        "ADR" => {
            let parts = structured(&value);
            let address = PostalAddress {
                po_box: component(&parts, 0),
                extended: component(&parts, 1),
                street: component(&parts, 2),
                locality: component(&parts, 3),
                region: component(&parts, 4),
                postal_code: component(&parts, 5),
                country: component(&parts, 6),
            };
            if address != PostalAddress::default() {
                record.addresses.push(Labeled::with_labels(address, line.labels()));
            }
        }
        _ => {}
    }
    Ok(())
}

fn is_delimiter(line: &str, kind: &str) -> bool {
    match line.trim().split_once(':') {
        Some((name, value)) => {
            name.trim().eq_ignore_ascii_case(kind) && value.trim().eq_ignore_ascii_case("VCARD")
        }
        None => false,
    }
}

/// Parse the first vCard in `text`
pub fn parse_vcard(text: &str) -> Result<ContactRecord, ContactParseError> {
    let lines = unfold(text);
    let begin = lines
        .iter()
        .position(|(_, line)| is_delimiter(line, "BEGIN"))
        .ok_or(ContactParseError::MissingBegin)?;

    let mut record = ContactRecord::default();
    let mut depth = 0usize;
    for (number, line) in &lines[begin + 1..] {
        if line.trim().is_empty() {
            continue;
        }
        // Embedded cards (2.1 AGENT) are skipped whole
        if is_delimiter(line, "BEGIN") {
            depth += 1;
            continue;
        }
        if is_delimiter(line, "END") {
            if depth == 0 {
                if record.is_empty() {
                    return Err(ContactParseError::NoContactFields);
                }
                return Ok(record);
            }
            depth -= 1;
            continue;
        }
        if depth > 0 {
            continue;
        }
        let content = parse_content_line(*number, line)?;
        apply(&mut record, &content)?;
    }
    Err(ContactParseError::MissingEnd)
}
