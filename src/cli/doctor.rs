//! `dm doctor` command implementation.

use super::Context;
use crate::doctor::{Doctor, Report, Status, UreqProbe};
use crate::error::Result;
use crate::paths;
use std::env;
use std::io::{self, Write};

/// Run the doctor command. Returns 1 if any check failed.
///
/// The configuration is loaded here rather than up front, so a broken
/// config is reported as a failed check instead of aborting.
///
/// # Errors
///
/// Returns an error if the report cannot be written.
pub fn run(profile: Option<String>, no_cache: bool, json: bool) -> Result<i32> {
    let loaded = Context::load(profile, no_cache).map(|ctx| ctx.loaded.config);
    let home = paths::dm_home();
    let probe = UreqProbe::new();
    let env = |name: &str| env::var(name).ok();

    let report = Doctor {
        home: &home,
        probe: &probe,
        env: &env,
    }
    .run(&loaded);

    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_report(&mut out, &report)?;
    }

    Ok(i32::from(report.has_failures()))
}

/// Print a report as aligned text with a summary line.
pub(crate) fn write_report<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    let width = report
        .checks
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);

    for check in &report.checks {
        writeln!(
            out,
            "[{:>4}] {:<width$}  {}",
            check.status.label(),
            check.name,
            check.detail
        )?;
    }
    writeln!(
        out,
        "\n{} ok, {} warning(s), {} failure(s)",
        report.count(Status::Ok),
        report.count(Status::Warn),
        report.count(Status::Fail)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctor::Check;

    #[test]
    fn report_text_has_summary() {
        let report = Report {
            checks: vec![
                Check {
                    name: "home".to_string(),
                    status: Status::Ok,
                    detail: "/h is writable".to_string(),
                },
                Check {
                    name: "agent".to_string(),
                    status: Status::Fail,
                    detail: "OPENAI_API_KEY is not set".to_string(),
                },
            ],
        };
        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("[  ok] home   /h is writable"));
        assert!(text.contains("[FAIL] agent  OPENAI_API_KEY is not set"));
        assert!(text.ends_with("1 ok, 0 warning(s), 1 failure(s)\n"));
    }
}
