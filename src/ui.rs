use crate::scenario::{RunReport, ScenarioParams};

// Console reporting for the CLI shell. The core only returns counts; how they
// are surfaced to the operator is decided here.

pub fn banner(name: &str, params: &ScenarioParams) {
    log::info!(
        "{name} | target {} | source {} | format {:?}",
        params.target,
        params.src_ip,
        params.format,
    );
}

pub fn summary(name: &str, report: &RunReport) {
    if report.sent == report.attempted {
        log::info!("{name}: transmitted {}/{} records", report.sent, report.attempted);
    } else {
        log::warn!(
            "{name}: transmitted only {}/{} records",
            report.sent,
            report.attempted
        );
    }
}
