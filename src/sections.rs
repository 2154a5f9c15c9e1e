//! Section filtering over markdown headers
//!
//! A section is a header line (`#`-prefixed) plus everything up to the next
//! header. Filtering matches lowercase keywords as substrings of the header
//! text; an include list takes precedence over an exclude list.

/// Parse a comma-separated section list into trimmed lowercase keywords.
pub fn parse_sections(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) => s
            .split(',')
            .map(|part| part.trim().to_lowercase())
            .filter(|part| !part.is_empty())
            .collect(),
        None => Vec::new(),
    }
}

/// Filter markdown content by section.
///
/// With a non-empty `include` list, a section survives iff its header text
/// contains at least one include keyword. Otherwise, with a non-empty
/// `exclude` list, a section survives iff its header text contains none of
/// the exclude keywords. The decision made at a header line applies to the
/// header itself and to every line until the next header. Content before the
/// first header (or in a document with no headers at all) always survives.
pub fn filter_sections(content: &str, include: &[String], exclude: &[String]) -> String {
    let mut include_current = true;
    let mut kept: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.starts_with('#') {
            let header_text = line.trim_start_matches('#').trim().to_lowercase();

            include_current = if !include.is_empty() {
                include.iter().any(|keyword| header_text.contains(keyword.as_str()))
            } else if !exclude.is_empty() {
                !exclude.iter().any(|keyword| header_text.contains(keyword.as_str()))
            } else {
                true
            };
        }

        if include_current {
            kept.push(line);
        }
    }

    kept.join("\n")
}
