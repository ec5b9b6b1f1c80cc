use std::time::Duration;

use clap::Parser;

use crate::adapters::format::OutputFormat;
use crate::domain::SemanticsOrder;
use crate::usecases::InspectMode;

const VERSION: &str = concat!(
    env!("FLUTTER_INSPECT_VERSION"),
    " (",
    env!("FLUTTER_INSPECT_GIT_SHA"),
    ")"
);

const LONG_ABOUT: &str = "\
Inspect the UI of a running Flutter debug app.\n\
\n\
Finds the Dart VM service of an app started with `flutter run`, fetches its\n\
semantics tree and prints a token-efficient summary of what is on screen.";

const AFTER_LONG_HELP: &str = r#"DISCOVERY:
    1. Proxy file written by a VM service proxy (FLUTTER_INSPECT_PROXY_FILE)
    2. Processes whose command line mentions dart or flutter, with their
       listening sockets read from /proc
    3. lsof LISTEN rows mentioning dart
    4. Known port range (FLUTTER_INSPECT_SCAN_PORTS)

OUTPUT:
    compact       One line per element (default)
    tree          Element hierarchy with box drawing
    minimal       Labels and actions only
    json          Pretty JSON with element count
    json-compact  Single-line JSON with short keys
    json-lines    One JSON object per element

EXAMPLES:
    flutter-inspect                      # Auto-discover and inspect
    flutter-inspect --list               # Show discovered services
    flutter-inspect --uri ws://127.0.0.1:8181/ws
    flutter-inspect --watch --interval 1 # Print whenever the UI changes
    flutter-inspect --json --tokens"#;

#[derive(Debug, Parser)]
#[command(name = "flutter-inspect")]
#[command(version = VERSION)]
#[command(about = "CLI tool for AI agents to inspect the UI of running Flutter debug apps")]
#[command(long_about = LONG_ABOUT)]
#[command(after_long_help = AFTER_LONG_HELP)]
pub struct Cli {
    /// VM service WebSocket URI (skips discovery)
    #[arg(
        long,
        env = "FLUTTER_VM_SERVICE_URI",
        value_name = "URI",
        help_heading = "Connection Options"
    )]
    pub uri: Option<String>,

    /// List discovered Flutter debug services and exit
    #[arg(long, help_heading = "Connection Options")]
    pub list: bool,

    /// Pick the Nth discovered service
    #[arg(
        long,
        value_name = "N",
        default_value_t = 0,
        help_heading = "Connection Options"
    )]
    pub index: usize,

    /// Output format
    #[arg(
        short,
        long,
        value_enum,
        value_name = "FORMAT",
        default_value_t = OutputFormat::Compact,
        help_heading = "Output Options"
    )]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "minimal", help_heading = "Output Options")]
    pub json: bool,

    /// Shorthand for --format minimal
    #[arg(long, help_heading = "Output Options")]
    pub minimal: bool,

    /// Print the raw semantics dump
    #[arg(long, conflicts_with = "widgets", help_heading = "Output Options")]
    pub raw: bool,

    /// Print the widget tree (debugDumpApp) instead of semantics
    #[arg(long, help_heading = "Output Options")]
    pub widgets: bool,

    /// Order semantics nodes by inverse hit test instead of traversal
    #[arg(long, help_heading = "Output Options")]
    pub hit_test_order: bool,

    /// Show an estimated token count on stderr
    #[arg(long, help_heading = "Output Options")]
    pub tokens: bool,

    /// Suppress connection info, output only UI data
    #[arg(short, long, help_heading = "Output Options")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR)
    #[arg(long, help_heading = "Output Options")]
    pub no_color: bool,

    /// Re-inspect periodically and print when the UI changes
    #[arg(short, long, help_heading = "Watch Options")]
    pub watch: bool,

    /// Seconds between watch iterations
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 2.0,
        value_parser = parse_interval,
        help_heading = "Watch Options"
    )]
    pub interval: f64,

    /// Enable debug logging
    #[arg(short, long, help_heading = "Debug Options")]
    pub verbose: bool,
}

impl Cli {
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.minimal {
            OutputFormat::Minimal
        } else {
            self.format
        }
    }

    pub fn inspect_mode(&self) -> InspectMode {
        if self.raw {
            InspectMode::RawSemantics
        } else if self.widgets {
            InspectMode::WidgetTree
        } else {
            InspectMode::Semantics
        }
    }

    pub fn semantics_order(&self) -> SemanticsOrder {
        if self.hit_test_order {
            SemanticsOrder::InverseHitTest
        } else {
            SemanticsOrder::Traversal
        }
    }

    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs_f64(self.interval)
    }
}

fn parse_interval(value: &str) -> Result<f64, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err("interval must be a positive number of seconds".to_string());
    }
    Ok(secs)
}
