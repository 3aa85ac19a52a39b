use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "polypath - Generate self-avoiding random walks and lamellar templates as particle chains.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grow a self-avoiding random walk with bond length, bend angle and spacing constraints.
    Walk(WalkArgs),
    /// Lay out a folded chain of parallel layers joined by semicircular turns.
    Lamellae(LamellaeArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain XYZ coordinates, one dummy particle per point.
    #[default]
    Xyz,
    /// The full chain (coordinates and bonds) as TOML.
    Toml,
}

/// Where and how the generated chain is written.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output file. Writes to standard output when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output file format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Xyz)]
    pub format: OutputFormat,
}

/// Arguments for the `walk` subcommand.
#[derive(Args, Debug)]
pub struct WalkArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Walk Parameters ---
    /// Number of points in the chain (at least 2).
    #[arg(short = 'n', long = "points", value_name = "INT")]
    pub n: Option<usize>,

    /// Distance between consecutive points.
    #[arg(short, long, value_name = "FLOAT")]
    pub bond_length: Option<f64>,

    /// Minimum distance between non-adjacent points.
    #[arg(short = 'r', long, value_name = "FLOAT")]
    pub min_separation: Option<f64>,

    /// Lower bound of the angle between consecutive bond vectors.
    #[arg(long, value_name = "ANGLE")]
    pub min_angle: Option<f64>,

    /// Upper bound of the angle between consecutive bond vectors.
    #[arg(long, value_name = "ANGLE")]
    pub max_angle: Option<f64>,

    /// Interpret every angle (CLI and config file) in degrees instead of radians.
    #[arg(long)]
    pub degrees: bool,

    /// Total number of candidate positions to try before giving up.
    #[arg(long, value_name = "INT")]
    pub max_attempts: Option<usize>,

    /// Seed of the random stream driving the walk.
    #[arg(short, long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Slack subtracted from the minimum separation in overlap checks.
    #[arg(long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    // --- Confinement ---
    #[command(flatten)]
    pub confinement: ConfinementArgs,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S walk.seed=7
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Mutually exclusive volumes centred on the origin that the walk must stay inside.
#[derive(Args, Debug, Clone, Default)]
#[group(required = false, multiple = false)]
pub struct ConfinementArgs {
    /// Confine the walk to a sphere of the given radius.
    #[arg(long, value_name = "RADIUS")]
    pub sphere: Option<f64>,

    /// Confine the walk to a box with the given edge lengths.
    #[arg(long, value_name = "LX,LY,LZ", value_delimiter = ',')]
    pub cuboid: Option<Vec<f64>>,

    /// Confine the walk to a z-aligned cylinder with the given radius and height.
    #[arg(long, value_name = "RADIUS,HEIGHT", value_delimiter = ',')]
    pub cylinder: Option<Vec<f64>>,
}

/// Arguments for the `lamellae` subcommand.
#[derive(Args, Debug)]
pub struct LamellaeArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of layers.
    #[arg(short = 'l', long = "layers", value_name = "INT")]
    pub num_layers: Option<usize>,

    /// Distance between neighbouring layers.
    #[arg(long, value_name = "FLOAT")]
    pub layer_separation: Option<f64>,

    /// Length of each straight layer.
    #[arg(long, value_name = "FLOAT")]
    pub layer_length: Option<f64>,

    /// Distance between consecutive points.
    #[arg(short, long, value_name = "FLOAT")]
    pub bond_length: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S lamellae.num-layers=4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}
