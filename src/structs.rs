use chrono::{DateTime, Utc};
use clap::ValueEnum;

/// What the simulated firewall decided about a connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Drop,
    Accept,
}

impl Action {
    /// Action keyword in the Gaia raw format.
    pub fn gaia_token(&self) -> &'static str {
        match self {
            Action::Drop => "drop",
            Action::Accept => "accept",
        }
    }

    /// Value of the act= key in the CEF extension.
    pub fn cef_token(&self) -> &'static str {
        match self {
            Action::Drop => "drop",
            Action::Accept => "Allow",
        }
    }

    /// Human-readable event name in the CEF header.
    pub fn cef_name(&self) -> &'static str {
        match self {
            Action::Drop => "Connection Blocked",
            Action::Accept => "Connection Allowed",
        }
    }

    pub fn cef_severity(&self) -> u8 {
        match self {
            Action::Drop => 7,
            Action::Accept => 3,
        }
    }
}

/// Wire format of the rendered records. Must match the parser configured on
/// the IDS under test.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Checkpoint Gaia raw line format
    Gaia,
    /// ArcSight CEF with a syslog prefix before the CEF: marker
    Cef,
}

impl LogFormat {
    /// Appliance identity token when the caller does not supply one. Gaia
    /// logs carry the firewall IP, CEF logs carry a syslog hostname.
    pub fn default_appliance(&self) -> &'static str {
        match self {
            LogFormat::Gaia => "192.168.99.1",
            LogFormat::Cef => "firewall",
        }
    }
}

/// One simulated network observation, created by the scenario runner and
/// rendered to a single line of text. The ephemeral source port and the
/// timestamp are drawn at render time.
#[derive(Debug, Clone)]
pub struct Event {
    /// Simulated source of the connection attempt. Trusted input: any
    /// non-empty string is accepted as-is.
    pub src_ip: String,
    pub dst_port: u16,
    pub action: Action,
    /// Firewall identity token, used differently per format.
    pub appliance: String,
}

/// Wall-clock source, abstracted so rendering can be tested against a fixed
/// point in time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
