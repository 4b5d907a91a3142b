use clap::{Parser, Subcommand};
use fwforge::structs::LogFormat;

#[derive(Debug, Parser, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    #[arg(
        long,
        global = true,
        default_value = "127.0.0.1",
        help = "Host of the IDS under test"
    )]
    pub host: String,
    #[arg(
        short,
        long,
        global = true,
        default_value_t = 5555,
        help = "UDP port the IDS listens on"
    )]
    pub port: u16,
    #[arg(
        short = 'i',
        long,
        global = true,
        default_value = "192.168.11.7",
        help = "Simulated source IP of the scanner"
    )]
    pub source_ip: String,
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        default_value = "gaia",
        help = "Log record format. Must match the parser configured on the IDS!"
    )]
    pub format: LogFormat,
    #[arg(short, long, global = true, help = "Seed for random number generation")]
    pub seed: Option<u64>,
    #[arg(
        long,
        global = true,
        default_value = None,
        help = "Path to a detection profile describing the thresholds of the IDS"
    )]
    pub profile: Option<String>,
    #[arg(
        short,
        long,
        global = true,
        default_value_t = false,
        help = "Echo every rendered record"
    )]
    pub verbose: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Burst of distinct-port drop records above the fast scan threshold
    FastScan {
        #[arg(
            short,
            long,
            default_value_t = 0.05,
            help = "Delay in seconds between datagrams"
        )]
        delay: f64,
        #[arg(
            short,
            long,
            default_value_t = false,
            help = "Coalesce all records into a single datagram, like a firewall flushing its log buffer"
        )]
        coalesce: bool,
    },
    /// Drip-feed of distinct-port drop records above the slow scan threshold
    SlowScan {
        #[arg(
            short,
            long,
            default_value_t = 2.0,
            help = "Delay in seconds between datagrams"
        )]
        delay: f64,
    },
    /// A few drop records, strictly below the fast scan threshold. Must not alert
    Baseline {
        #[arg(
            short,
            long,
            default_value_t = 0.1,
            help = "Delay in seconds between datagrams"
        )]
        delay: f64,
    },
    /// Allowed connections over everyday services. Must never alert
    AllowTraffic {
        #[arg(
            short,
            long,
            default_value_t = 0.1,
            help = "Delay in seconds between datagrams"
        )]
        delay: f64,
    },
    /// Baseline, then allow traffic, then a fast scan, each from its own source IP
    All {
        #[arg(
            short,
            long,
            default_value_t = 0.05,
            help = "Delay in seconds between datagrams"
        )]
        delay: f64,
        #[arg(
            short,
            long,
            default_value_t = false,
            help = "Coalesce the fast scan records into a single datagram"
        )]
        coalesce: bool,
    },
}
