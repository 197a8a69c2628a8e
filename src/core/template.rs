//! Delivery branch name templates.
//!
//! Templates use `%t` (ticket) and `%d` (description) placeholders, e.g. the
//! default `%t_%d` with ticket `T1` and description `fix` yields `T1_fix`.

/// Placeholder table: marker and the record field it reads.
const REPLACERS: [(&str, &str); 2] = [("%t", "ticket"), ("%d", "description")];

/// Expand a delivery branch template against record fields.
///
/// Returns `Err(field)` naming the first referenced field with no value; the
/// caller decides how loudly to report that.
pub fn expand(
    template: &str,
    ticket: Option<&str>,
    description: Option<&str>,
) -> Result<String, &'static str> {
    let mut expanded = template.to_string();
    for (marker, field) in REPLACERS {
        if !template.contains(marker) {
            continue;
        }
        let value = match field {
            "ticket" => ticket,
            _ => description,
        };
        match value {
            Some(value) if !value.is_empty() => expanded = expanded.replace(marker, value),
            _ => return Err(field),
        }
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_ticket_and_description() {
        let branch = expand("%t_%d", Some("T1"), Some("fix")).expect("expand");
        assert_eq!(branch, "T1_fix");
    }

    #[test]
    fn missing_ticket_names_the_field() {
        let err = expand("%t_%d", None, Some("fix")).expect_err("missing ticket");
        assert_eq!(err, "ticket");
    }

    #[test]
    fn empty_description_counts_as_missing() {
        let err = expand("%d", None, Some("")).expect_err("empty description");
        assert_eq!(err, "description");
    }

    #[test]
    fn template_without_markers_passes_through() {
        let branch = expand("review", None, None).expect("expand");
        assert_eq!(branch, "review");
    }
}
