use crate::cli::{ConfinementArgs, LamellaeArgs, WalkArgs};
use crate::error::{CliError, Result};
use nalgebra::{Point3, Vector3};
use polypath::core::models::volume::Confinement;
use polypath::engine::error::EngineError;
use polypath::engine::config::{
    LamellaeConfig, LamellaeConfigBuilder, WalkConfig, WalkConfigBuilder,
};
use serde::Deserialize;
use std::f64::consts::PI;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialWalkConfig {
    n: Option<usize>,
    bond_length: Option<f64>,
    min_separation: Option<f64>,
    min_angle: Option<f64>,
    max_angle: Option<f64>,
    max_attempts: Option<usize>,
    seed: Option<u64>,
    tolerance: Option<f64>,
    confinement: Option<Confinement>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialLamellaeConfig {
    num_layers: Option<usize>,
    layer_separation: Option<f64>,
    layer_length: Option<f64>,
    bond_length: Option<f64>,
}

/// The contents of a configuration file. Every value is optional; anything missing
/// must come from the command line.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    walk: Option<PartialWalkConfig>,
    lamellae: Option<PartialLamellaeConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `path` when given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves the walk parameters. Precedence: CLI flag, then `--set`, then the
    /// file, then the library defaults.
    pub fn merge_walk(mut self, args: &WalkArgs) -> Result<WalkConfig> {
        self.apply_set_values(&args.set_values)?;
        let file = self.walk.take().unwrap_or_default();

        let to_radians = |angle: f64| {
            if args.degrees {
                angle / 180.0 * PI
            } else {
                angle
            }
        };

        let mut builder = WalkConfigBuilder::new()
            .n(required(args.n.or(file.n), "walk.n")?)
            .bond_length(required(
                args.bond_length.or(file.bond_length),
                "walk.bond-length",
            )?)
            .min_separation(required(
                args.min_separation.or(file.min_separation),
                "walk.min-separation",
            )?)
            .min_angle(to_radians(required(
                args.min_angle.or(file.min_angle),
                "walk.min-angle",
            )?))
            .max_angle(to_radians(required(
                args.max_angle.or(file.max_angle),
                "walk.max-angle",
            )?))
            .confinement(Self::merge_confinement(&args.confinement, file.confinement)?);

        if let Some(attempts) = args.max_attempts.or(file.max_attempts) {
            builder = builder.max_attempts(attempts);
        }
        if let Some(seed) = args.seed.or(file.seed) {
            builder = builder.seed(seed);
        }
        if let Some(tolerance) = args.tolerance.or(file.tolerance) {
            builder = builder.tolerance(tolerance);
        }

        let config = builder.build().map_err(EngineError::from)?;
        Ok(config)
    }

    /// Resolves the lamellae parameters with the same precedence as [`Self::merge_walk`].
    pub fn merge_lamellae(mut self, args: &LamellaeArgs) -> Result<LamellaeConfig> {
        self.apply_set_values(&args.set_values)?;
        let file = self.lamellae.take().unwrap_or_default();

        let config = LamellaeConfigBuilder::new()
            .num_layers(required(
                args.num_layers.or(file.num_layers),
                "lamellae.num-layers",
            )?)
            .layer_separation(required(
                args.layer_separation.or(file.layer_separation),
                "lamellae.layer-separation",
            )?)
            .layer_length(required(
                args.layer_length.or(file.layer_length),
                "lamellae.layer-length",
            )?)
            .bond_length(required(
                args.bond_length.or(file.bond_length),
                "lamellae.bond-length",
            )?)
            .build()
            .map_err(EngineError::from)?;
        Ok(config)
    }

    fn merge_confinement(
        cli: &ConfinementArgs,
        file_val: Option<Confinement>,
    ) -> Result<Option<Confinement>> {
        let center = Point3::origin();
        if let Some(radius) = cli.sphere {
            return Ok(Some(Confinement::Sphere { center, radius }));
        }
        if let Some(lengths) = &cli.cuboid {
            let [lx, ly, lz] = expect_values::<3>(lengths, "--cuboid")?;
            return Ok(Some(Confinement::Cuboid {
                center,
                lengths: Vector3::new(lx, ly, lz),
            }));
        }
        if let Some(values) = &cli.cylinder {
            let [radius, height] = expect_values::<2>(values, "--cylinder")?;
            return Ok(Some(Confinement::Cylinder {
                center,
                radius,
                height,
            }));
        }
        Ok(file_val)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key.split_once('.') {
                Some(("walk", field)) => {
                    let walk = self.walk.get_or_insert_with(Default::default);
                    match field {
                        "n" => walk.n = Some(parse(key, value_str)?),
                        "bond-length" => walk.bond_length = Some(parse(key, value_str)?),
                        "min-separation" => walk.min_separation = Some(parse(key, value_str)?),
                        "min-angle" => walk.min_angle = Some(parse(key, value_str)?),
                        "max-angle" => walk.max_angle = Some(parse(key, value_str)?),
                        "max-attempts" => walk.max_attempts = Some(parse(key, value_str)?),
                        "seed" => walk.seed = Some(parse(key, value_str)?),
                        "tolerance" => walk.tolerance = Some(parse(key, value_str)?),
                        _ => return Err(unsupported_key(key)),
                    }
                }
                Some(("lamellae", field)) => {
                    let lamellae = self.lamellae.get_or_insert_with(Default::default);
                    match field {
                        "num-layers" => lamellae.num_layers = Some(parse(key, value_str)?),
                        "layer-separation" => {
                            lamellae.layer_separation = Some(parse(key, value_str)?)
                        }
                        "layer-length" => lamellae.layer_length = Some(parse(key, value_str)?),
                        "bond-length" => lamellae.bond_length = Some(parse(key, value_str)?),
                        _ => return Err(unsupported_key(key)),
                    }
                }
                _ => return Err(unsupported_key(key)),
            }
        }
        Ok(())
    }
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!("Unsupported configuration key for --set: '{}'", key))
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| {
        CliError::Config(format!(
            "A value for '{}' is required either in the config file or via CLI argument.",
            key
        ))
    })
}

fn parse<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value_str))
    })
}

fn expect_values<const N: usize>(values: &[f64], flag: &str) -> Result<[f64; N]> {
    values.try_into().map_err(|_| {
        CliError::Argument(format!(
            "{} expects {} comma-separated values, got {}",
            flag,
            N,
            values.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use polypath::engine::config::ConfigError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("polypath.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn walk_args(args: &[&str]) -> WalkArgs {
        let argv = ["polypath", "walk"].iter().chain(args).copied();
        match Cli::parse_from(argv).command {
            Commands::Walk(args) => args,
            other => panic!("expected walk command, got {:?}", other),
        }
    }

    fn lamellae_args(args: &[&str]) -> LamellaeArgs {
        let argv = ["polypath", "lamellae"].iter().chain(args).copied();
        match Cli::parse_from(argv).command {
            Commands::Lamellae(args) => args,
            other => panic!("expected lamellae command, got {:?}", other),
        }
    }

    const WALK_FILE: &str = r#"
        [walk]
        n = 12
        bond-length = 1.5
        min-separation = 1.2
        min-angle = 1.0
        max-angle = 2.0
        seed = 99

        [walk.confinement]
        type = "sphere"
        center = [1.0, 2.0, 3.0]
        radius = 20.0
    "#;

    #[test]
    fn cli_only_walk_uses_library_defaults() {
        let args = walk_args(&[
            "-n", "5", "-b", "1.0", "-r", "0.9", "--min-angle", "1.0", "--max-angle", "2.0",
        ]);
        let config = PartialConfig::default().merge_walk(&args).unwrap();
        assert_eq!(config.n, 5);
        assert_eq!(config.max_attempts, 1000);
        assert_eq!(config.seed, 24);
        assert_eq!(config.tolerance, 1e-5);
        assert_eq!(config.confinement, None);
    }

    #[test]
    fn file_values_fill_in_missing_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, WALK_FILE);
        let args = walk_args(&["-c", path.to_str().unwrap()]);

        let config = PartialConfig::load(args.config.as_deref())
            .unwrap()
            .merge_walk(&args)
            .unwrap();
        assert_eq!(config.n, 12);
        assert_eq!(config.bond_length, 1.5);
        assert_eq!(config.seed, 99);
        assert_eq!(
            config.confinement,
            Some(Confinement::Sphere {
                center: Point3::new(1.0, 2.0, 3.0),
                radius: 20.0
            })
        );
    }

    #[test]
    fn precedence_is_flag_then_set_then_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, WALK_FILE);
        let args = walk_args(&[
            "-c",
            path.to_str().unwrap(),
            "-n",
            "30",
            "-S",
            "walk.n=20",
            "-S",
            "walk.seed=7",
            "--sphere",
            "50",
        ]);

        let config = PartialConfig::from_file(&path)
            .unwrap()
            .merge_walk(&args)
            .unwrap();
        assert_eq!(config.n, 30);
        assert_eq!(config.seed, 7);
        assert_eq!(config.bond_length, 1.5);
        assert_eq!(
            config.confinement,
            Some(Confinement::Sphere {
                center: Point3::origin(),
                radius: 50.0
            })
        );
    }

    #[test]
    fn degrees_flag_converts_file_and_cli_angles() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "[walk]\nn = 4\nbond-length = 1.0\nmin-separation = 0.5\nmin-angle = 90.0\n",
        );
        let args = walk_args(&[
            "-c",
            path.to_str().unwrap(),
            "--max-angle",
            "180",
            "--degrees",
        ]);

        let config = PartialConfig::from_file(&path)
            .unwrap()
            .merge_walk(&args)
            .unwrap();
        assert_eq!(config.min_angle, PI / 2.0);
        assert_eq!(config.max_angle, PI);
    }

    #[test]
    fn cuboid_flag_builds_a_box_around_the_origin() {
        let args = walk_args(&[
            "-n", "3", "-b", "1", "-r", "0.5", "--min-angle", "0", "--max-angle", "3",
            "--cuboid", "10,12,14",
        ]);
        let config = PartialConfig::default().merge_walk(&args).unwrap();
        assert_eq!(
            config.confinement,
            Some(Confinement::Cuboid {
                center: Point3::origin(),
                lengths: Vector3::new(10.0, 12.0, 14.0)
            })
        );
    }

    #[test]
    fn cylinder_flag_requires_two_values() {
        let args = walk_args(&[
            "-n", "3", "-b", "1", "-r", "0.5", "--min-angle", "0", "--max-angle", "3",
            "--cylinder", "4",
        ]);
        let result = PartialConfig::default().merge_walk(&args);
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn missing_required_parameter_is_reported() {
        let args = walk_args(&["-n", "5", "-b", "1.0", "-r", "0.9", "--min-angle", "1.0"]);
        let err = PartialConfig::default().merge_walk(&args).unwrap_err();
        assert!(matches!(err, CliError::Config(ref msg) if msg.contains("walk.max-angle")));
    }

    #[test]
    fn invalid_values_are_rejected_by_validation() {
        let args = walk_args(&[
            "-n", "5", "-b", "1.0", "-r", "0.9", "--min-angle", "2.0", "--max-angle", "1.0",
        ]);
        let err = PartialConfig::default().merge_walk(&args).unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(EngineError::Configuration(ConfigError::InvalidAngleRange { .. }))
        ));
    }

    #[test]
    fn invalid_lamellae_keeps_the_library_error() {
        let args = lamellae_args(&[
            "--layers", "0", "--layer-separation", "1", "--layer-length", "2", "-b", "1",
        ]);
        let err = PartialConfig::default().merge_lamellae(&args).unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(EngineError::Configuration(ConfigError::InvalidLamellae(_)))
        ));
    }

    #[test]
    fn malformed_and_unknown_set_values_are_errors() {
        let mut config = PartialConfig::default();
        assert!(matches!(
            config.apply_set_values(&["walk.seed".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            config.apply_set_values(&["walk.colour=red".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            config.apply_set_values(&["walk.n=many".to_string()]),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, "[walk]\nsteps = 10\n");
        let result = PartialConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn lamellae_merges_file_set_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "[lamellae]\nnum-layers = 2\nlayer-separation = 2.0\nlayer-length = 3.0\nbond-length = 1.0\n",
        );
        let args = lamellae_args(&[
            "-c",
            path.to_str().unwrap(),
            "--layers",
            "5",
            "-S",
            "lamellae.layer-length=8",
        ]);

        let config = PartialConfig::from_file(&path)
            .unwrap()
            .merge_lamellae(&args)
            .unwrap();
        assert_eq!(config.num_layers, 5);
        assert_eq!(config.layer_separation, 2.0);
        assert_eq!(config.layer_length, 8.0);
        assert_eq!(config.bond_length, 1.0);
    }
}
