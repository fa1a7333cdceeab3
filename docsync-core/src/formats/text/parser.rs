//! Plain text parsing (text → model)
//!
//! Line-oriented. Each line is trimmed, its inner whitespace runs collapse to
//! one space (the same normal form markup import produces), and it is then
//! classified, first match wins:
//!
//! 1. blank: paragraph break
//! 2. `#`, `##` or `###` followed by whitespace: heading
//! 3. `-`, `•` or `*` followed by whitespace: list item; consecutive bullet
//!    lines join one list, blank lines between them are skipped
//! 4. anything else: appended to the open paragraph
//!
//! Parsing never fails; every input maps to some document.

use crate::model::nodes::{collapse_whitespace, DocumentJson, DocumentSection, HeadingLevel};

/// Parse plain text into a document.
pub fn parse_text(source: &str) -> DocumentJson {
    let lines: Vec<String> = source
        .lines()
        .map(|line| collapse_whitespace(line.trim()))
        .collect();
    let mut sections = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].as_str();

        if line.is_empty() {
            flush_paragraph(&mut paragraph, &mut sections);
            i += 1;
            continue;
        }

        if let Some((level, content)) = heading_line(line) {
            flush_paragraph(&mut paragraph, &mut sections);
            sections.push(DocumentSection::heading(level, content));
            i += 1;
            continue;
        }

        if let Some(first) = bullet_line(line) {
            flush_paragraph(&mut paragraph, &mut sections);
            let mut items = vec![first.to_string()];
            let mut next = i + 1;
            loop {
                while next < lines.len() && lines[next].is_empty() {
                    next += 1;
                }
                match lines.get(next).and_then(|line| bullet_line(line)) {
                    Some(item) => {
                        items.push(item.to_string());
                        next += 1;
                    }
                    None => break,
                }
            }
            sections.push(DocumentSection::list(items));
            i = next;
            continue;
        }

        paragraph.push(line);
        i += 1;
    }

    flush_paragraph(&mut paragraph, &mut sections);
    DocumentJson::new(sections)
}

fn flush_paragraph(buffer: &mut Vec<&str>, sections: &mut Vec<DocumentSection>) {
    if buffer.is_empty() {
        return;
    }
    let content = buffer.join("\n");
    buffer.clear();
    let content = content.trim();
    if !content.is_empty() {
        sections.push(DocumentSection::paragraph(content));
    }
}

/// `#{1,3}` followed by whitespace. Returns the level and the trimmed rest.
fn heading_line(line: &str) -> Option<(HeadingLevel, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    let level = HeadingLevel::new(u8::try_from(hashes).ok()?)?;
    let rest = &line[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let content = rest.trim();
    (!content.is_empty()).then_some((level, content))
}

/// `-`, `•` or `*` followed by whitespace. Returns the trimmed item text.
fn bullet_line(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let marker = chars.next()?;
    if !matches!(marker, '-' | '•' | '*') {
        return None;
    }
    let rest = chars.as_str();
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let item = rest.trim();
    (!item.is_empty()).then_some(item)
}
