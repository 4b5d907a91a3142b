use crate::config::Profile;
use crate::dispatch::Dispatcher;
use crate::record;
use crate::structs::*;

use rand::seq::index;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::error::Error;
use std::thread;
use std::time::Duration;

/// Commonly-targeted ports, the candidate pool for the short scans.
pub const COMMON_PORTS: [u16; 42] = [
    21, 22, 23, 25, 53, 80, 110, 135, 139, 143, 443, 445, 993, 995, 1433, 1521, 3306, 3389, 5432,
    5900, 6379, 8080, 8443, 8888, 9090, 9200, 27017, 27018, 4444, 4445, 6666, 7777, 2222, 2121,
    3000, 4000, 5000, 5001, 7000, 8000, 9000, 9001,
];

/// Everyday services probed by the allow-traffic scenario.
const ALLOW_PORTS: [(u16, &str); 4] = [(80, "HTTP"), (443, "HTTPS"), (53, "DNS"), (25, "SMTP")];

/// Highest destination port drawn by the slow scan. The wide range is a
/// superset of the curated pool.
const WIDE_PORT_CEILING: usize = 64999;

/// Parameters supplied by the external caller for one scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    /// IDS endpoint, as "host:port"
    pub target: String,
    /// Simulated source identity of the scanner
    pub src_ip: String,
    pub format: LogFormat,
    /// Pause between individual datagrams. Ignored when coalescing.
    pub delay: Duration,
    /// Send all records of the run in a single datagram
    pub coalesce: bool,
    /// Echo every rendered record back in the report
    pub verbose: bool,
}

impl ScenarioParams {
    /// Reject bad parameters before anything is transmitted.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.src_ip.trim().is_empty() {
            return Err("the simulated source IP must not be empty".into());
        }
        if !self.coalesce && self.delay.is_zero() {
            return Err("the inter-event delay must be positive for individual dispatch".into());
        }
        Ok(())
    }
}

/// Outcome of one scenario run: how many records were attempted and how many
/// the local transport accepted. `echoed` carries the rendered records when
/// the caller asked for them.
#[derive(Debug, Default)]
pub struct RunReport {
    pub attempted: usize,
    pub sent: usize,
    pub echoed: Vec<String>,
}

impl RunReport {
    fn merge(&mut self, other: RunReport) {
        self.attempted += other.attempted;
        self.sent += other.sent;
        self.echoed.extend(other.echoed);
    }
}

/// Encodes each named test scenario as a reproducible sequence of events plus
/// delivery timing, chosen to straddle the profile's detection thresholds.
pub struct ScenarioRunner {
    profile: Profile,
    rng: Pcg32,
}

impl ScenarioRunner {
    pub fn new(profile: Profile, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        log::info!("Generating with seed {seed}");
        ScenarioRunner {
            profile,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Fast scan: strictly more distinct ports than the short-window
    /// threshold, delivered well inside the window.
    pub fn fast_scan(&mut self, params: &ScenarioParams) -> Result<RunReport, Box<dyn Error>> {
        params.validate()?;
        let count = self.profile.fast_scan_count();
        log::info!(
            "Fast scan: {count} distinct ports against a threshold of {} in {}s",
            self.profile.detection.fast_scan_ports,
            self.profile.detection.fast_scan_window_secs,
        );
        if !params.coalesce && pacing(count, params.delay) >= self.profile.fast_scan_window() {
            log::warn!("The configured delay spreads the scan beyond the fast scan window");
        }
        let ports = self.sample_common_ports(count)?;
        let events = drop_events(&ports, params);
        self.dispatch(params, &events)
    }

    /// Slow scan: strictly more distinct ports than the long-window
    /// threshold, dripped out with a multi-second delay.
    pub fn slow_scan(&mut self, params: &ScenarioParams) -> Result<RunReport, Box<dyn Error>> {
        params.validate()?;
        let count = self.profile.slow_scan_count();
        log::info!(
            "Slow scan: {count} distinct ports against a threshold of {} in {} min (expect ~{}s of traffic)",
            self.profile.detection.slow_scan_ports,
            self.profile.detection.slow_scan_window_mins,
            pacing(count, params.delay).as_secs(),
        );
        if pacing(count, params.delay) >= self.profile.slow_scan_window() {
            log::warn!("The configured delay spreads the scan beyond the slow scan window");
        }
        let ports = self.sample_wide_ports(count);
        let events = drop_events(&ports, params);
        self.dispatch(params, &events)
    }

    /// Baseline traffic: a handful of drop records, strictly below the fast
    /// scan threshold. Must not raise any alert.
    pub fn baseline_traffic(
        &mut self,
        params: &ScenarioParams,
    ) -> Result<RunReport, Box<dyn Error>> {
        params.validate()?;
        let count = self.profile.baseline_count();
        log::info!(
            "Baseline traffic: {count} distinct ports, below the threshold of {}",
            self.profile.detection.fast_scan_ports,
        );
        let ports = self.sample_common_ports(count)?;
        let events = drop_events(&ports, params);
        self.dispatch(params, &events)
    }

    /// Allowed connections over everyday services. The IDS filters non-drop
    /// actions before counting, so this must never alert regardless of count.
    pub fn allow_traffic(&mut self, params: &ScenarioParams) -> Result<RunReport, Box<dyn Error>> {
        params.validate()?;
        log::info!("Allow traffic: {} accepted connections", ALLOW_PORTS.len());
        let events: Vec<Event> = ALLOW_PORTS
            .iter()
            .map(|&(port, service)| {
                log::debug!("allowed {service} connection on port {port}");
                Event {
                    src_ip: params.src_ip.clone(),
                    dst_port: port,
                    action: Action::Accept,
                    appliance: params.format.default_appliance().to_string(),
                }
            })
            .collect();
        self.dispatch(params, &events)
    }

    /// Baseline, then allow traffic, then a fast scan, strictly one after
    /// another. Each sub-scenario uses its own source identity so the
    /// per-source counters of the IDS cannot cross-contaminate.
    pub fn composite(&mut self, params: &ScenarioParams) -> Result<RunReport, Box<dyn Error>> {
        params.validate()?;
        let baseline_params = ScenarioParams {
            src_ip: self.profile.scenario.baseline_src_ip.clone(),
            coalesce: false,
            ..params.clone()
        };
        let allow_params = ScenarioParams {
            src_ip: self.profile.scenario.allow_src_ip.clone(),
            coalesce: false,
            ..params.clone()
        };

        let mut report = self.baseline_traffic(&baseline_params)?;
        report.merge(self.allow_traffic(&allow_params)?);
        report.merge(self.fast_scan(params)?);
        Ok(report)
    }

    /// Draw distinct ports from the curated pool.
    fn sample_common_ports(&mut self, count: usize) -> Result<Vec<u16>, Box<dyn Error>> {
        if count > COMMON_PORTS.len() {
            return Err(format!(
                "the scenario needs {count} distinct ports but the candidate pool only has {}",
                COMMON_PORTS.len()
            )
            .into());
        }
        Ok(COMMON_PORTS
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect())
    }

    /// Draw distinct ports from the full numeric range.
    fn sample_wide_ports(&mut self, count: usize) -> Vec<u16> {
        index::sample(&mut self.rng, WIDE_PORT_CEILING, count)
            .iter()
            .map(|i| (i + 1) as u16)
            .collect()
    }

    /// Render the events and deliver them, either coalesced into a single
    /// datagram or one datagram per event with the configured delay in
    /// between. A failed send is counted and the loop moves on: the goal is
    /// best-effort traffic generation, not guaranteed delivery.
    fn dispatch(
        &mut self,
        params: &ScenarioParams,
        events: &[Event],
    ) -> Result<RunReport, Box<dyn Error>> {
        // the socket is owned for the duration of this run only
        let dispatcher = Dispatcher::new(&params.target)?;
        let clock = SystemClock;
        let lines: Vec<String> = events
            .iter()
            .map(|e| record::render(e, params.format, &clock, &mut self.rng))
            .collect();

        let mut report = RunReport {
            attempted: lines.len(),
            ..Default::default()
        };

        if params.coalesce {
            match dispatcher.send_coalesced(&lines) {
                Ok(bytes) => {
                    report.sent = lines.len();
                    log::info!(
                        "{} records coalesced into one datagram of {bytes} bytes",
                        lines.len()
                    );
                }
                Err(e) => log::warn!("coalesced send to {} failed: {e}", params.target),
            }
        } else {
            for (i, (event, line)) in events.iter().zip(&lines).enumerate() {
                match dispatcher.send_one(line) {
                    Ok(_) => {
                        report.sent += 1;
                        log::debug!("[{:02}/{}] port {:>5} sent", i + 1, lines.len(), event.dst_port);
                    }
                    Err(e) => log::warn!(
                        "[{:02}/{}] port {:>5} failed: {e}",
                        i + 1,
                        lines.len(),
                        event.dst_port
                    ),
                }
                if i + 1 < lines.len() {
                    thread::sleep(params.delay);
                }
            }
        }

        if params.verbose {
            for line in &lines {
                log::debug!("rendered: {line}");
            }
            report.echoed = lines;
        }
        Ok(report)
    }
}

fn drop_events(ports: &[u16], params: &ScenarioParams) -> Vec<Event> {
    ports
        .iter()
        .map(|&port| Event {
            src_ip: params.src_ip.clone(),
            dst_port: port,
            action: Action::Drop,
            appliance: params.format.default_appliance().to_string(),
        })
        .collect()
}

/// Wall-clock span of a run dispatched individually. Only feeds the window
/// warnings, so overflow saturates instead of panicking.
fn pacing(count: usize, delay: Duration) -> Duration {
    let gaps = count.saturating_sub(1).try_into().unwrap_or(u32::MAX);
    delay.checked_mul(gaps).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::net::UdpSocket;

    fn local_receiver() -> (UdpSocket, String) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(500)))
            .unwrap();
        let addr = socket.local_addr().unwrap().to_string();
        (socket, addr)
    }

    fn recv_datagrams(socket: &UdpSocket, expected: usize) -> Vec<String> {
        let mut datagrams = Vec::new();
        let mut buf = [0u8; 16384];
        while datagrams.len() < expected {
            match socket.recv_from(&mut buf) {
                Ok((n, _)) => datagrams.push(String::from_utf8(buf[..n].to_vec()).unwrap()),
                Err(_) => break,
            }
        }
        datagrams
    }

    fn params(target: &str) -> ScenarioParams {
        ScenarioParams {
            target: target.to_string(),
            src_ip: "192.168.11.7".to_string(),
            format: LogFormat::Gaia,
            delay: Duration::from_millis(1),
            coalesce: false,
            verbose: true,
        }
    }

    fn runner() -> ScenarioRunner {
        ScenarioRunner::new(Profile::default(), Some(42))
    }

    /// Destination port of a rendered Gaia record ("service: N;").
    fn gaia_port(line: &str) -> u16 {
        let start = line.find("service: ").unwrap() + "service: ".len();
        let end = line[start..].find(';').unwrap() + start;
        line[start..end].parse().unwrap()
    }

    #[test]
    fn fast_scan_exceeds_threshold_without_duplicates() {
        let (receiver, addr) = local_receiver();
        let mut runner = runner();
        let report = runner.fast_scan(&params(&addr)).unwrap();

        let threshold = runner.profile.detection.fast_scan_ports;
        assert_eq!(report.attempted, 20);
        assert!(report.attempted > threshold);
        assert_eq!(report.sent, report.attempted);

        let ports: HashSet<u16> = report.echoed.iter().map(|l| gaia_port(l)).collect();
        assert_eq!(ports.len(), 20, "duplicate destination ports in the scan");
        assert!(ports.iter().all(|p| COMMON_PORTS.contains(p)));

        assert_eq!(recv_datagrams(&receiver, 20).len(), 20);
    }

    #[test]
    fn coalesced_fast_scan_is_one_datagram() {
        let (receiver, addr) = local_receiver();
        let mut runner = runner();
        let mut params = params(&addr);
        params.coalesce = true;

        let report = runner.fast_scan(&params).unwrap();
        assert_eq!(report.sent, 20);

        let datagrams = recv_datagrams(&receiver, 1);
        assert_eq!(datagrams.len(), 1);
        let records: Vec<&str> = datagrams[0].lines().collect();
        assert_eq!(records, report.echoed);
    }

    #[test]
    fn slow_scan_ports_are_distinct() {
        let (receiver, addr) = local_receiver();
        let mut runner = runner();
        let report = runner.slow_scan(&params(&addr)).unwrap();

        assert_eq!(report.attempted, 35);
        assert!(report.attempted > runner.profile.detection.slow_scan_ports);
        let ports: HashSet<u16> = report.echoed.iter().map(|l| gaia_port(l)).collect();
        assert_eq!(ports.len(), 35);
        assert_eq!(recv_datagrams(&receiver, 35).len(), 35);
    }

    #[test]
    fn baseline_stays_below_the_threshold() {
        let (_receiver, addr) = local_receiver();
        let mut runner = runner();
        let report = runner.baseline_traffic(&params(&addr)).unwrap();
        assert_eq!(report.attempted, 5);
        assert!(report.attempted < runner.profile.detection.fast_scan_ports);
    }

    #[test]
    fn allow_traffic_never_uses_the_blocking_action() {
        let (_receiver, addr) = local_receiver();
        let mut runner = runner();
        let mut params = params(&addr);
        params.format = LogFormat::Cef;

        let report = runner.allow_traffic(&params).unwrap();
        assert_eq!(report.attempted, 4);
        for line in &report.echoed {
            assert!(line.contains("act=Allow"), "blocking action in: {line}");
            assert!(!line.contains("act=drop"));
        }
    }

    #[test]
    fn composite_keeps_source_identities_apart() {
        let (receiver, addr) = local_receiver();
        let mut runner = runner();
        let report = runner.composite(&params(&addr)).unwrap();

        // 5 baseline + 4 allowed + 20 fast scan
        assert_eq!(report.attempted, 29);
        assert_eq!(recv_datagrams(&receiver, 29).len(), 29);

        let sources: HashSet<&str> = report
            .echoed
            .iter()
            .map(|l| l.split_whitespace().nth(6).unwrap())
            .collect();
        assert_eq!(
            sources,
            HashSet::from(["192.168.1.1", "192.168.1.2", "192.168.11.7"])
        );
    }

    #[test]
    fn pacing_saturates_instead_of_panicking() {
        assert_eq!(pacing(0, Duration::MAX), Duration::ZERO);
        assert_eq!(pacing(1, Duration::MAX), Duration::ZERO);
        assert_eq!(pacing(3, Duration::MAX), Duration::MAX);
        // the gap count is clamped rather than wrapped
        assert_eq!(
            pacing(usize::MAX, Duration::from_secs(2)),
            Duration::from_secs(2) * u32::MAX
        );
    }

    #[test]
    fn failed_sends_are_counted_and_the_run_continues() {
        let mut runner = runner();
        // resolution fails on every send, so each event is a counted failure
        let report = runner.fast_scan(&params("nonexistent.invalid:1")).unwrap();
        assert_eq!(report.attempted, 20);
        assert_eq!(report.sent, 0);
        assert_eq!(report.echoed.len(), 20, "generation stopped early");
    }

    #[test]
    fn invalid_parameters_fail_before_any_transmission() {
        let (receiver, addr) = local_receiver();
        let mut runner = runner();

        let mut empty_src = params(&addr);
        empty_src.src_ip = "  ".to_string();
        assert!(runner.fast_scan(&empty_src).is_err());

        let mut zero_delay = params(&addr);
        zero_delay.delay = Duration::ZERO;
        assert!(runner.fast_scan(&zero_delay).is_err());

        let mut buf = [0u8; 64];
        assert!(receiver.recv_from(&mut buf).is_err(), "records were sent");
    }
}
