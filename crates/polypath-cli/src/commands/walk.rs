use crate::cli::WalkArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::output;
use crate::utils::progress::CliProgressHandler;
use polypath::engine::progress::ProgressReporter;
use polypath::workflows::generate::PathStrategy;
use tracing::info;

pub fn run(args: WalkArgs, progress: CliProgressHandler) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = PartialConfig::load(args.config.as_deref())?.merge_walk(&args)?;
    let comment = format!(
        "polypath walk n={} bond-length={} min-separation={} seed={}",
        config.n, config.bond_length, config.min_separation, config.seed
    );

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let chain = PathStrategy::RandomWalk(config).generate(&reporter)?;

    if let Some(closest) = chain.min_nonbonded_distance(None) {
        info!("Closest non-bonded pair: {:.4}", closest);
    }
    output::write_chain(&chain, &comment, &args.output)
}
