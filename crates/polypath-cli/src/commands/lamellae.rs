use crate::cli::LamellaeArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::output;
use crate::utils::progress::CliProgressHandler;
use polypath::engine::progress::ProgressReporter;
use polypath::workflows::generate::PathStrategy;
use tracing::info;

pub fn run(args: LamellaeArgs, progress: CliProgressHandler) -> Result<()> {
    let config = PartialConfig::load(args.config.as_deref())?.merge_lamellae(&args)?;
    let comment = format!(
        "polypath lamellae layers={} layer-separation={} layer-length={} bond-length={}",
        config.num_layers, config.layer_separation, config.layer_length, config.bond_length
    );

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let chain = PathStrategy::Lamellae(config).generate(&reporter)?;

    let extent = chain.bounding_box();
    info!(
        "Template spans {:.3} x {:.3} x {:.3}",
        extent.x, extent.y, extent.z
    );
    output::write_chain(&chain, &comment, &args.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use polypath::core::models::chain::Chain;

    #[test]
    fn lamellae_writes_toml_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lamellae.toml");
        let argv = [
            "polypath",
            "lamellae",
            "--layers",
            "2",
            "--layer-separation",
            "2",
            "--layer-length",
            "3",
            "-b",
            "1",
            "--format",
            "toml",
            "-o",
            path.to_str().unwrap(),
        ];
        let Commands::Lamellae(args) = Cli::parse_from(argv).command else {
            panic!("expected lamellae command");
        };

        run(args, CliProgressHandler::hidden()).unwrap();

        let chain: Chain = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(chain.len(), 9);
        assert_eq!(chain.bonds().len(), 8);
    }
}
