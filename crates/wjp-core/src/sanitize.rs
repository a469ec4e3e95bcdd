//! Name sanitization: turns arbitrary display names into metric-path-safe
//! segments.
//!
//! Every function here is total. An empty name becomes the literal
//! [`NULL_NAME`] so that the surrounding metric name stays well formed.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use tracing::warn;

/// Segment used in place of an empty name.
pub const NULL_NAME: &str = "null";

/// Errors from percent-decoding a name. Never surfaced to callers of
/// [`decode_if_encoded`], which falls back to the original string.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("incomplete percent escape at byte {position}")]
    MalformedEscape { position: usize },

    #[error("decoded bytes are not UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Lowercases and replaces every character outside `[a-z0-9/_-]` with `_`.
///
/// Used for segments that must not introduce extra path levels (job, stage
/// and branch names).
pub fn sanitize_category(name: &str) -> String {
    sanitize_with(name, |c| {
        matches!(c, 'a'..='z' | '0'..='9' | '/' | '_' | '-')
    })
}

/// Like [`sanitize_category`] but keeps `.`, for names whose dots are meant
/// as hierarchy (metric prefixes, test names).
pub fn sanitize_full_category(name: &str) -> String {
    sanitize_with(name, |c| {
        matches!(c, 'a'..='z' | '0'..='9' | '/' | '_' | '-' | '.')
    })
}

/// Sanitizes a test name, flattening parameterized suffixes.
///
/// `pkg.Class.method[case1][case2]` becomes `pkg.class.method.case1.case2`:
/// brackets turn into separators, runs of dots collapse and the trailing
/// separator left by the closing `]` is dropped.
pub fn sanitize_test_category(name: &str) -> String {
    if !name.ends_with(']') {
        return sanitize_full_category(name);
    }

    let mut linear = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c == '[' || c == ']' { '.' } else { c };
        if c == '.' && linear.ends_with('.') {
            continue;
        }
        linear.push(c);
    }
    let linear = linear.strip_suffix('.').unwrap_or(&linear);

    sanitize_full_category(linear)
}

/// Sanitizes a timed-step name: decodes, then keeps only `[a-z0-9_-]`.
pub fn sanitize_step_category(name: &str) -> String {
    if name.is_empty() {
        tracing::debug!("timed step has no metric name");
        return NULL_NAME.to_string();
    }
    let decoded = decode_if_encoded(name);
    sanitize_with(&decoded, |c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-'))
}

/// The metric segment for a job: decoded full name, then [`sanitize_category`].
pub fn job_category(full_name: &str) -> String {
    sanitize_category(&decode_if_encoded(full_name))
}

/// Best-effort percent-decoding (form encoding: `+` is a space).
///
/// Names without `%` are returned untouched. When decoding fails the original
/// string is returned and a warning is logged.
pub fn decode_if_encoded(name: &str) -> Cow<'_, str> {
    if !name.contains('%') {
        return Cow::Borrowed(name);
    }
    match form_decode(name) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(err) => {
            warn!(name, error = %err, "unable to decode name, using it as is");
            Cow::Borrowed(name)
        }
    }
}

fn form_decode(name: &str) -> Result<String, DecodeError> {
    let bytes = name.as_bytes();
    for (position, _) in name.match_indices('%') {
        let escape = bytes.get(position + 1..position + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(DecodeError::MalformedEscape { position });
        }
    }

    let spaced = name.replace('+', " ");
    let decoded = percent_decode_str(&spaced).decode_utf8()?;
    Ok(decoded.into_owned())
}

fn sanitize_with(name: &str, allowed: impl Fn(char) -> bool) -> String {
    if name.is_empty() {
        return NULL_NAME.to_string();
    }
    name.to_lowercase()
        .chars()
        .map(|c| if allowed(c) { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn category_lowercases_and_replaces() {
        assert_eq!(sanitize_category("Test Job"), "test_job");
        assert_eq!(sanitize_category("test-job3"), "test-job3");
        assert_eq!(sanitize_category("folder/My.Job"), "folder/my_job");
    }

    #[test]
    fn empty_name_is_null_sentinel() {
        assert_eq!(sanitize_category(""), "null");
        assert_eq!(sanitize_full_category(""), "null");
        assert_eq!(sanitize_test_category(""), "null");
        assert_eq!(sanitize_step_category(""), "null");
    }

    #[test]
    fn full_category_keeps_dots() {
        assert_eq!(sanitize_full_category("WJP.Job"), "wjp.job");
        assert_eq!(sanitize_full_category("a b.c"), "a_b.c");
    }

    #[test]
    fn test_category_flattens_parameters() {
        assert_eq!(
            sanitize_test_category("test.java.Foo.bar[case1][case2]"),
            "test.java.foo.bar.case1.case2"
        );
        assert_eq!(
            sanitize_test_category("pkg.Suite.check[0]"),
            "pkg.suite.check.0"
        );
    }

    #[test]
    fn test_category_without_suffix_is_full_category() {
        assert_eq!(
            sanitize_test_category("test.java.com.vmware.devops.wavefront.testingSendingMetricsFailedTest"),
            "test.java.com.vmware.devops.wavefront.testingsendingmetricsfailedtest"
        );
        // Only a trailing ']' triggers flattening.
        assert_eq!(sanitize_test_category("a[b]c"), "a_b_c");
    }

    #[test]
    fn test_category_collapses_existing_dot_runs() {
        assert_eq!(sanitize_test_category("a..b[x]"), "a.b.x");
    }

    #[test]
    fn step_category_drops_slashes_and_dots() {
        assert_eq!(sanitize_step_category("metricName1"), "metricname1");
        assert_eq!(sanitize_step_category("deploy/prod.eu"), "deploy_prod_eu");
    }

    #[test]
    fn decode_passes_plain_names_through() {
        assert!(matches!(decode_if_encoded("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn decode_handles_percent_and_plus() {
        assert_eq!(decode_if_encoded("my%20job"), "my job");
        assert_eq!(decode_if_encoded("a+b%2Fc"), "a b/c");
        assert_eq!(decode_if_encoded("caf%C3%A9"), "café");
    }

    #[test]
    fn decode_failure_falls_back_to_original() {
        assert_eq!(decode_if_encoded("100%"), "100%");
        assert_eq!(decode_if_encoded("bad%zzescape"), "bad%zzescape");
        assert_eq!(decode_if_encoded("bad%FFutf8"), "bad%FFutf8");
    }

    #[test]
    fn job_category_decodes_then_sanitizes() {
        assert_eq!(job_category("Folder%2FTest%20Job"), "folder/test_job");
    }

    proptest! {
        #[test]
        fn category_is_idempotent(name in ".*") {
            let once = sanitize_category(&name);
            prop_assert_eq!(sanitize_category(&once), once);
        }

        #[test]
        fn full_category_is_idempotent(name in ".*") {
            let once = sanitize_full_category(&name);
            prop_assert_eq!(sanitize_full_category(&once), once);
        }

        #[test]
        fn category_output_stays_in_charset(name in ".*") {
            let out = sanitize_category(&name);
            prop_assert!(!out.is_empty());
            prop_assert!(out.chars().all(|c| matches!(c, 'a'..='z' | '0'..='9' | '/' | '_' | '-')));
        }

        #[test]
        fn test_category_never_ends_with_separator(base in "[a-z]{1,8}", cases in proptest::collection::vec("[a-z0-9]{1,4}", 1..4)) {
            let name = format!("{base}{}", cases.iter().map(|c| format!("[{c}]")).collect::<String>());
            let out = sanitize_test_category(&name);
            prop_assert!(!out.ends_with('.'));
            prop_assert!(!out.contains(".."));
        }
    }
}
