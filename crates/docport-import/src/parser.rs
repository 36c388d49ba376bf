//! Permissive CSV reader for relational table exports
//!
//! One record per line. A field ends at a comma or a tab that is not inside
//! double quotes, so comma- and tab-delimited exports parse with the same
//! code. Malformed quoting never fails: an unterminated quote swallows the
//! rest of the line into the current field.

/// One data line keyed by the header's column names.
///
/// Cells that were empty after trimming are stored as `None`, which is how
/// the transformer tells "no value" apart from real content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    cells: Vec<(String, Option<String>)>,
}

impl Row {
    /// Build a row from `(column, value)` pairs, normalizing blank values
    /// the same way the parser does.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.and_then(|v| normalize(v.as_ref()))))
            .collect();
        Self { cells }
    }

    /// Value of `column`, or `None` when the column is absent or blank
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Parse a whole CSV document into rows.
///
/// The first non-blank line is the header. Fewer than two non-blank lines
/// yields an empty vector rather than an error.
pub fn parse_csv(text: &str) -> Vec<Row> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let header: Vec<String> = split_fields(header_line)
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();

    lines
        .map(|line| {
            let mut values = split_fields(line).into_iter();
            let cells = header
                .iter()
                .map(|name| (name.clone(), values.next().and_then(|v| normalize(&v))))
                .collect();
            Row { cells }
        })
        .collect()
}

/// Split one line into raw (untrimmed) fields.
///
/// Quotes are dropped from the output; `""` inside a quoted field is a
/// literal quote.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            },
            '"' => in_quotes = !in_quotes,
            ',' | '\t' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
