use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "pitwall",
    about = "A lap-discrete race management simulator with weather, tire strategy and AI opponents"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing (standings after every lap, only for non-interactive mode)
    #[clap(short, long, conflicts_with = "interactive")]
    pub debug: bool,

    /// Activate interactive mode (race is simulated in real-time and controlled via stdin)
    #[clap(short, long, conflicts_with = "debug")]
    pub interactive: bool,

    /// Increase logging verbosity (can be repeated)
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u8,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of simulation runs (must be one in interactive mode)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the simulation parameter file (OPTIONAL: if not set, the default parameters
    /// are used)
    #[clap(short, long, parse(from_os_str))]
    pub parfile_path: Option<PathBuf>,

    /// Set real-time factor (only relevant in interactive mode)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set seed of the random number generator (run i of a Monte Carlo simulation uses seed + i)
    #[clap(short, long, default_value = "42")]
    pub seed: u64,

    /// Set path of a CSV file the lap and race times are written to (only for a single run)
    #[clap(long, parse(from_os_str))]
    pub results_csv: Option<PathBuf>,
}
