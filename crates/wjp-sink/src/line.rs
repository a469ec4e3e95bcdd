//! Wavefront data format encoder.
//!
//! One record per line:
//!
//! ```text
//! "<name>" <value> <timestamp> source="<source>" "<key>"="<value>" ...
//! ```
//!
//! Names keep `[A-Za-z0-9-_./~]`, tag keys keep `[A-Za-z0-9-_.]`; any other
//! character becomes `-`. Quoted strings escape `"` and newlines.

use std::fmt::Write;

use wjp_core::MetricRecord;

/// Encodes a record as one line, without the trailing newline.
pub fn encode_line(record: &MetricRecord) -> String {
    let mut line = String::with_capacity(64 + record.name.len());
    line.push('"');
    line.push_str(&sanitize_name(&record.name));
    line.push('"');
    // Writing to a String cannot fail.
    let _ = write!(line, " {:?} {}", record.value, record.timestamp_ms);
    line.push_str(" source=");
    push_quoted(&mut line, &record.source);
    for (key, value) in record.tags.iter() {
        line.push_str(" \"");
        line.push_str(&sanitize_tag_key(key));
        line.push_str("\"=");
        push_quoted(&mut line, value);
    }
    line
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '/' | '~' => c,
            _ => '-',
        })
        .collect()
}

fn sanitize_tag_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '-',
        })
        .collect()
}

fn push_quoted(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use wjp_core::TagSet;

    #[test]
    fn encodes_stage_record() {
        let tags = TagSet::new()
            .with("Status", "SUCCESS")
            .with("Build Number", "12");
        let record = MetricRecord::new(
            "wjp.job.test_pipeline.stage.testing_stage1",
            1000.0,
            1_700_000_000_000,
            "ci-host",
            tags,
        );
        insta::assert_snapshot!(
            encode_line(&record),
            @r#""wjp.job.test_pipeline.stage.testing_stage1" 1000.0 1700000000000 source="ci-host" "Status"="SUCCESS" "Build-Number"="12""#
        );
    }

    #[test]
    fn replaces_unsupported_characters() {
        let tags = TagSet::new().with("p_my param!", "say \"hi\"\nbye");
        let record = MetricRecord::new("wjp.job.a b:c", 1.5, 0, "h", tags);
        insta::assert_snapshot!(
            encode_line(&record),
            @r#""wjp.job.a-b-c" 1.5 0 source="h" "p_my-param-"="say \"hi\"\nbye""#
        );
    }

    #[test]
    fn keeps_slashes_and_tilde_in_names() {
        let record = MetricRecord::new("~wjp.job.folder/job", 2.0, 5, "h", TagSet::new());
        assert_eq!(encode_line(&record), r#""~wjp.job.folder/job" 2.0 5 source="h""#);
    }
}
