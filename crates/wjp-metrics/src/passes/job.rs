//! Whole-run duration metric: `<prefix>.<job>`.

use wjp_core::MetricRecord;

use super::RunContext;

/// The run's total duration, tagged with its result, build number and any
/// admitted parameters.
pub fn job_record(ctx: &RunContext<'_>) -> MetricRecord {
    let mut tags = ctx
        .builder
        .status_tags(ctx.run.result.as_str(), &ctx.run.build_id);
    ctx.add_parameter_tags(&mut tags);
    ctx.builder.build(&ctx.job, ctx.run.duration_ms as f64, tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MetricRecordBuilder;
    use crate::config::MetricsConfig;
    use wjp_core::{Parameter, RunResult, RunSummary};

    fn run() -> RunSummary {
        RunSummary {
            job_full_name: "Test Job".into(),
            build_id: "1".into(),
            duration_ms: 3000,
            result: RunResult::Success,
            parameters: Vec::new(),
        }
    }

    #[test]
    fn renders_job_metric() {
        let config = MetricsConfig {
            proxy_hostname: "localhost".into(),
            ..Default::default()
        };
        let builder = MetricRecordBuilder::from_config(&config, 0);
        let run = run();
        let ctx = RunContext::new(&run, &builder, &config, None);
        insta::assert_snapshot!(
            job_record(&ctx).to_string(),
            @"wjp.job.test_job 3000.0 source=localhost Status=SUCCESS Build-Number=1"
        );
    }

    #[test]
    fn parameter_tags_are_capped() {
        let config = MetricsConfig {
            enable_parameters_for_all_jobs: true,
            ..Default::default()
        };
        let builder = MetricRecordBuilder::from_config(&config, 0);
        let mut run = run();
        run.parameters = (0..25)
            .map(|i| Parameter::new(&format!("param{i}"), "x"))
            .collect();
        let ctx = RunContext::new(&run, &builder, &config, None);

        let record = job_record(&ctx);
        assert_eq!(record.tags.len(), 12);
        assert_eq!(record.tags.get("p_param9"), Some("x"));
        assert!(!record.tags.contains_key("p_param10"));
    }

    #[test]
    fn encoded_folder_names_are_decoded() {
        let config = MetricsConfig::default();
        let builder = MetricRecordBuilder::from_config(&config, 0);
        let mut run = run();
        run.job_full_name = "Team%20A/Nightly%20Build".into();
        run.result = RunResult::Unstable;
        let ctx = RunContext::new(&run, &builder, &config, None);

        let record = job_record(&ctx);
        assert_eq!(record.name, "wjp.job.team_a/nightly_build");
        assert_eq!(record.tags.get("Status"), Some("UNSTABLE"));
    }
}
