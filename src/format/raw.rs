//! Pipe-delimited lines for scripts. No header and no totals.

use super::{duration_ms, FormattableRun, RunsFormatter};
use crate::runs::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct RawFormatter;

impl RunsFormatter for RawFormatter {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn needs_method_details(&self) -> bool {
        false
    }

    fn format_runs(&self, runs: &[FormattableRun]) -> Result<String> {
        let mut out = String::new();

        for run in runs.iter().filter(|run| !run.lost) {
            let duration = duration_ms(&run.start_time, &run.end_time);
            let run_log = run.run_log_url();
            let tags = run.tags.join(",");
            let fields = [
                run.name.as_str(),
                run.status.as_str(),
                run.result.as_str(),
                run.queued_time.as_str(),
                run.start_time.as_str(),
                run.end_time.as_str(),
                duration.as_str(),
                run.test_name.as_str(),
                run.requestor.as_str(),
                run.bundle.as_str(),
                run.group.as_str(),
                run_log.as_str(),
                tags.as_str(),
            ];
            out.push_str(&fields.join("|"));
            out.push('\n');
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{finished_run, API_SERVER_URL};
    use super::*;

    #[test]
    fn test_single_run_line() {
        let got = RawFormatter.format_runs(&[finished_run()]).unwrap();
        assert_eq!(
            got,
            format!(
                "U456|Finished|Passed|2023-05-10T06:00:13.043037Z|2023-05-10T06:00:36.159003Z|\
                 2023-05-10T06:02:53.823338Z|137664|myTestPackage.MyTestName|unitTesting|myBundleId|\
                 dummyGroup|{}/ras/runs/xxx876xxx/runlog|\n",
                API_SERVER_URL
            )
        );
    }

    #[test]
    fn test_no_header_totals_or_lost_runs() {
        let tagged = FormattableRun {
            name: "U457".to_string(),
            tags: vec!["core".to_string(), "anothertag".to_string()],
            ..finished_run()
        };
        let lost = FormattableRun {
            name: "U458".to_string(),
            lost: true,
            ..finished_run()
        };

        let got = RawFormatter.format_runs(&[tagged, lost]).unwrap();
        assert_eq!(got.lines().count(), 1);
        assert!(got.starts_with("U457|"));
        assert!(got.ends_with("|core,anothertag\n"));
        assert!(!got.contains("Total:"));
        assert_eq!(RawFormatter.format_runs(&[]).unwrap(), "");
    }
}
