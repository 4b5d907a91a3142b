use crate::structs::*;

use rand::Rng;

/// Marker token of the structured format. Real syslog transport prepends a
/// timestamp and hostname before it, so it is never at the start of the line;
/// downstream parsers must search for it instead of anchoring at position 0.
pub const CEF_MARKER: &str = "CEF:";

const CEF_VERSION: u8 = 0;
const VENDOR: &str = "Checkpoint";
const CEF_PRODUCT: &str = "VPN-1 & FireWall-1";
const CEF_DEVICE_VERSION: &str = "NGX R65";
const CEF_SIGNATURE_ID: &str = "firewall";
const CEF_DST_IP: &str = "10.0.0.1";
const TS_FORMAT: &str = "%b %d %H:%M:%S";

/// Render one event into a single newline-free line of text. Two calls with
/// the same inputs differ only in the timestamp and the ephemeral source
/// port; every other token is byte-identical.
pub fn render(event: &Event, format: LogFormat, clock: &impl Clock, rng: &mut impl Rng) -> String {
    match format {
        LogFormat::Gaia => render_gaia(event, clock, rng),
        LogFormat::Cef => render_cef(event, clock),
    }
}

/// Checkpoint Gaia raw line, e.g.
/// `Sep 03 15:12:20 192.168.99.1 Checkpoint: drop 192.168.11.7 proto: tcp; service: 22; s_port: 1352`
fn render_gaia(event: &Event, clock: &impl Clock, rng: &mut impl Rng) -> String {
    let ts = clock.now().format(TS_FORMAT);
    let s_port: u16 = rng.gen_range(1024..=65535);
    format!(
        "{ts} {} Checkpoint: {} {} proto: tcp; service: {}; s_port: {s_port}",
        event.appliance,
        event.action.gaia_token(),
        event.src_ip,
        event.dst_port,
    )
}

/// ArcSight CEF record with its syslog prefix (timestamp + host token), the
/// shape the IDS actually receives on the wire.
fn render_cef(event: &Event, clock: &impl Clock) -> String {
    // read the clock once so the syslog timestamp and rt= agree
    let now = clock.now();
    let ts = now.format(TS_FORMAT);
    format!(
        "{ts} {} {CEF_MARKER}{CEF_VERSION}|{VENDOR}|{CEF_PRODUCT}|{CEF_DEVICE_VERSION}|{CEF_SIGNATURE_ID}|{}|{}|src={} dst={CEF_DST_IP} dpt={} act={} proto=TCP rt={}",
        event.appliance,
        event.action.cef_name(),
        event.action.cef_severity(),
        event.src_ip,
        event.dst_port,
        event.action.cef_token(),
        now.timestamp_millis(),
    )
}
