//! Route template normalization.
//!
//! Routing layers write path parameters as `:name` segments. OpenAPI expects `{name}`.

/// Marker the routing layer puts in front of a parameter segment.
pub const PARAMETER_MARKER: char = ':';

/// Converts a route template into OpenAPI path syntax.
///
/// Each `/`-separated segment that starts with [`PARAMETER_MARKER`] and carries a name is
/// rewritten to `{name}`. All other segments, including ones already in brace form, pass
/// through unchanged, so the function is idempotent.
pub fn normalize(template: &str) -> String {
    template
        .split('/')
        .map(|segment| match segment.strip_prefix(PARAMETER_MARKER) {
            Some(name) if !name.is_empty() => format!("{{{}}}", name),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns the `{name}` placeholders of a normalized path in order of appearance.
pub fn placeholders(path: &str) -> Vec<String> {
    path.split('/')
        .filter_map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_marker_segments() {
        assert_eq!(
            normalize("/departments/:department_id/employees/:id"),
            "/departments/{department_id}/employees/{id}"
        );
    }

    #[test]
    fn test_normalize_brace_style_passes_through() {
        assert_eq!(normalize("/users/{id}/posts/{post_id}"), "/users/{id}/posts/{post_id}");
    }

    #[test]
    fn test_normalize_no_params() {
        assert_eq!(normalize("/employees/custom-get"), "/employees/custom-get");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("/"), "/");
    }

    #[test]
    fn test_normalize_malformed_segments() {
        assert_eq!(normalize("/a/:/b"), "/a/:/b");
        assert_eq!(normalize("/a/x:y"), "/a/x:y");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let templates = [
            "/employees/:id",
            "/:a/:b/c",
            "/a/:/b",
            "/{x}/:y",
            "relative/:path",
            "//double//:slash",
        ];
        for template in templates {
            let once = normalize(template);
            assert_eq!(normalize(&once), once, "not idempotent for {}", template);
        }
    }

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(
            placeholders("/departments/{department_id}/employees/{id}"),
            vec!["department_id".to_string(), "id".to_string()]
        );
        assert!(placeholders("/employees").is_empty());
        assert!(placeholders("/a/{}").is_empty());
    }
}
