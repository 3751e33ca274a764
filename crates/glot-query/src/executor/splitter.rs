//! Statement splitting
//!
//! Splits multi-statement SQL on terminator boundaries while respecting
//! string literals, quoted identifiers, comments, and dollar-quoted bodies,
//! so a CREATE FUNCTION with semicolons inside its body stays one statement.

/// Split a multi-statement SQL string into individual statements
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut string_char = '"';
    let mut in_line_comment = false;
    let mut in_block_comment = false;
    let mut dollar_tag: Option<String> = None;
    let chars: Vec<char> = sql.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        let c = chars[i];
        let next = if i + 1 < len {
            Some(chars[i + 1])
        } else {
            None
        };

        // Inside a dollar-quoted body only the matching delimiter matters
        if let Some(tag) = dollar_tag.clone() {
            if c == '$' && delimiter_at(&chars, i, &tag) {
                current.push_str(&tag);
                i += tag.chars().count();
                dollar_tag = None;
            } else {
                current.push(c);
                i += 1;
            }
            continue;
        }

        // Handle line comments
        if !in_string && !in_block_comment && c == '-' && next == Some('-') {
            in_line_comment = true;
            current.push(c);
            i += 1;
            continue;
        }

        if in_line_comment {
            current.push(c);
            if c == '\n' {
                in_line_comment = false;
            }
            i += 1;
            continue;
        }

        // Handle block comments
        if !in_string && !in_line_comment && c == '/' && next == Some('*') {
            in_block_comment = true;
            current.push(c);
            i += 1;
            continue;
        }

        if in_block_comment {
            current.push(c);
            if c == '*' && next == Some('/') {
                current.push(chars[i + 1]);
                in_block_comment = false;
                i += 2;
                continue;
            }
            i += 1;
            continue;
        }

        // Handle string literals
        if !in_string && (c == '\'' || c == '"') {
            in_string = true;
            string_char = c;
            current.push(c);
            i += 1;
            continue;
        }

        if in_string {
            current.push(c);
            if c == string_char {
                // Check for escaped quote (doubled)
                if next == Some(string_char) {
                    current.push(chars[i + 1]);
                    i += 2;
                    continue;
                }
                in_string = false;
            }
            i += 1;
            continue;
        }

        // Dollar-quote opener ($$ or $tag$)
        if c == '$' {
            if let Some(tag) = read_dollar_delimiter(&chars, i) {
                current.push_str(&tag);
                i += tag.chars().count();
                dollar_tag = Some(tag);
                continue;
            }
        }

        // Handle statement separator
        if c == ';' {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                statements.push(trimmed.to_string());
            }
            current.clear();
            i += 1;
            continue;
        }

        current.push(c);
        i += 1;
    }

    // Don't forget the last statement (without trailing semicolon)
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }

    statements
}

/// Try to read a dollar-quote delimiter starting at `start`.
///
/// Returns the full delimiter including both `$` markers. A `$` followed by
/// a digit is a positional parameter, not a delimiter.
fn read_dollar_delimiter(chars: &[char], start: usize) -> Option<String> {
    let mut end = start + 1;
    while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
        end += 1;
    }
    if end >= chars.len() || chars[end] != '$' {
        return None;
    }
    if let Some(first) = chars.get(start + 1) {
        if first.is_ascii_digit() {
            return None;
        }
    }
    Some(chars[start..=end].iter().collect())
}

fn delimiter_at(chars: &[char], start: usize, delimiter: &str) -> bool {
    let delimiter_chars: Vec<char> = delimiter.chars().collect();
    if start + delimiter_chars.len() > chars.len() {
        return false;
    }
    chars[start..start + delimiter_chars.len()] == delimiter_chars[..]
}
