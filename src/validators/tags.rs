//! `tag=value; tag=value` list parsing shared by DMARC and BIMI.

/// Splits a tag-list record into `(lowercase tag, trimmed value)` pairs.
///
/// Empty segments and segments without `=` are skipped.
pub(crate) fn parse_tags(record: &str) -> Vec<(String, String)> {
    record
        .split(';')
        .filter_map(|part| {
            let (tag, value) = part.split_once('=')?;
            let tag = tag.trim();
            if tag.is_empty() {
                return None;
            }
            Some((tag.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// Value of the first occurrence of `tag`.
pub(crate) fn tag_value<'a>(tags: &'a [(String, String)], tag: &str) -> Option<&'a str> {
    tags.iter()
        .find(|(t, _)| t == tag)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags("v=BIMI1; L=https://example.com/logo.svg;; a=");
        assert_eq!(
            tags,
            vec![
                ("v".to_string(), "BIMI1".to_string()),
                ("l".to_string(), "https://example.com/logo.svg".to_string()),
                ("a".to_string(), String::new()),
            ]
        );
        assert_eq!(tag_value(&tags, "a"), Some(""));
        assert_eq!(tag_value(&tags, "x"), None);
    }

    #[test]
    fn test_value_may_contain_equals() {
        let tags = parse_tags("rua=mailto:a@example.com?x=y");
        assert_eq!(tag_value(&tags, "rua"), Some("mailto:a@example.com?x=y"));
    }
}
