use serde::Deserialize;
use std::time::Duration;

/// Detection thresholds of the IDS under test. These belong to the system
/// under test, not to the generator: scenarios only need to land strictly
/// above or strictly below them by a safe margin.
#[derive(Deserialize, Debug, Clone)]
pub struct Detection {
    /// Distinct ports within the short window that trigger a fast scan alert
    pub fast_scan_ports: usize,
    pub fast_scan_window_secs: u64,
    /// Distinct ports within the long window that trigger a slow scan alert
    pub slow_scan_ports: usize,
    pub slow_scan_window_mins: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Scenario {
    /// How far above/below a threshold the scenarios land. Never zero, so a
    /// run never sits exactly at a threshold where clock skew could flip the
    /// outcome.
    pub threshold_margin: usize,
    /// Source identities for the sub-scenarios of a composite run, distinct
    /// from the main one so per-source counts cannot cross-contaminate.
    pub baseline_src_ip: String,
    pub allow_src_ip: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Profile {
    pub detection: Detection,
    pub scenario: Scenario,
}

impl Profile {
    /// Distinct ports emitted by the fast scan, strictly above the threshold.
    pub fn fast_scan_count(&self) -> usize {
        self.detection.fast_scan_ports + self.scenario.threshold_margin
    }

    /// Distinct ports emitted by the slow scan, strictly above the threshold.
    pub fn slow_scan_count(&self) -> usize {
        self.detection.slow_scan_ports + self.scenario.threshold_margin
    }

    /// Distinct ports emitted by the baseline scenario, strictly below the
    /// fast scan threshold.
    pub fn baseline_count(&self) -> usize {
        self.detection.fast_scan_ports - 2 * self.scenario.threshold_margin
    }

    pub fn fast_scan_window(&self) -> Duration {
        Duration::from_secs(self.detection.fast_scan_window_secs)
    }

    pub fn slow_scan_window(&self) -> Duration {
        Duration::from_secs(self.detection.slow_scan_window_mins * 60)
    }
}

impl Default for Profile {
    fn default() -> Self {
        import_profile(include_str!("../profiles/default.toml"))
    }
}

/// Parse a detection profile. Ill-formed profiles are a configuration error
/// and fail before anything is transmitted.
pub fn import_profile(profile: &str) -> Profile {
    let profile: Profile = toml::from_str(profile).expect("Ill-formed profile file");
    assert!(
        profile.scenario.threshold_margin >= 1,
        "threshold_margin must be at least 1"
    );
    assert!(
        profile.detection.fast_scan_ports > 2 * profile.scenario.threshold_margin,
        "fast_scan_ports must exceed twice the threshold margin"
    );
    profile
}
