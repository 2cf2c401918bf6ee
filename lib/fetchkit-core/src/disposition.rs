//! `Content-Disposition` filename extraction.
//!
//! Matches the first `filename...=value` directive, where the value is either
//! a quoted string (single or double quotes, closed by the same quote on the
//! same line) or everything up to the next `;` or newline. All quote
//! characters are removed from the result.

/// Extracts the save-as filename from a `Content-Disposition` header value.
///
/// Returns `None` when the header has no `filename=` directive or the
/// directive's value is empty once quotes are removed.
///
/// ```
/// use fetchkit_core::filename_from_disposition;
///
/// assert_eq!(
///     filename_from_disposition(r#"attachment; filename="report.csv""#).as_deref(),
///     Some("report.csv")
/// );
/// assert_eq!(filename_from_disposition("inline"), None);
/// ```
#[must_use]
pub fn filename_from_disposition(header: &str) -> Option<String> {
    if !header.contains("filename=") {
        return None;
    }

    let value = header
        .match_indices("filename")
        .find_map(|(start, keyword)| directive_value(header.get(start + keyword.len()..)?))?;

    let filename: String = value.chars().filter(|c| !matches!(c, '\'' | '"')).collect();
    (!filename.is_empty()).then_some(filename)
}

/// Given the text right after a `filename` keyword, returns the raw value if
/// the keyword starts a directive.
fn directive_value(rest: &str) -> Option<&str> {
    // Parameter-name suffix such as `*`, up to the `=`.
    let stop = rest.find([';', '=', '\n'])?;
    let after_eq = rest.get(stop..)?.strip_prefix('=')?;

    Some(quoted(after_eq).unwrap_or_else(|| unquoted(after_eq)))
}

fn quoted(value: &str) -> Option<&str> {
    let quote = value.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    let body = value.get(1..)?;
    let line = body.split('\n').next().unwrap_or_default();
    let close = line.find(quote)?;
    value.get(..close + 2)
}

fn unquoted(value: &str) -> &str {
    let end = value.find([';', '\n']).unwrap_or(value.len());
    value.get(..end).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_quoted() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="report.csv""#).as_deref(),
            Some("report.csv")
        );
    }

    #[test]
    fn single_quoted_with_semicolon_inside() {
        assert_eq!(
            filename_from_disposition("attachment; filename='a;b.txt'; size=3").as_deref(),
            Some("a;b.txt")
        );
    }

    #[test]
    fn unquoted_stops_at_semicolon() {
        assert_eq!(
            filename_from_disposition("attachment; filename=export.jsonl; size=10").as_deref(),
            Some("export.jsonl")
        );
    }

    #[test]
    fn unterminated_quote_falls_back_to_unquoted() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="broken.csv"#).as_deref(),
            Some("broken.csv")
        );
    }

    #[test]
    fn extended_parameter_only_is_ignored() {
        assert_eq!(
            filename_from_disposition("attachment; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"),
            None
        );
    }

    #[test]
    fn first_directive_wins() {
        assert_eq!(
            filename_from_disposition(
                r#"attachment; filename*=UTF-8''data.csv; filename="data.csv""#
            )
            .as_deref(),
            Some("UTF-8data.csv")
        );
    }

    #[test]
    fn keyword_without_equals_is_skipped() {
        assert_eq!(
            filename_from_disposition("attachment; filenames; filename=x.zip").as_deref(),
            Some("x.zip")
        );
    }

    #[test]
    fn empty_value_is_none() {
        assert_eq!(filename_from_disposition(r#"attachment; filename="""#), None);
        assert_eq!(filename_from_disposition("attachment; filename=;"), None);
    }

    #[test]
    fn no_directive() {
        assert_eq!(filename_from_disposition("attachment"), None);
    }
}
