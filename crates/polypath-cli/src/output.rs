use crate::cli::{OutputArgs, OutputFormat};
use crate::error::{CliError, Result};
use polypath::core::models::chain::Chain;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;

/// Placeholder element written for every point of an XYZ file.
const XYZ_ELEMENT: &str = "X";

pub fn write_xyz<W: Write>(chain: &Chain, comment: &str, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", chain.len())?;
    writeln!(writer, "{}", comment.replace('\n', " "))?;
    for point in chain.coordinates() {
        writeln!(
            writer,
            "{} {:.6} {:.6} {:.6}",
            XYZ_ELEMENT, point.x, point.y, point.z
        )?;
    }
    Ok(())
}

pub fn write_toml<W: Write>(chain: &Chain, writer: &mut W) -> Result<()> {
    let text = toml::to_string(chain).map_err(|e| CliError::Other(e.into()))?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Writes `chain` to the destination selected on the command line.
pub fn write_chain(chain: &Chain, comment: &str, args: &OutputArgs) -> Result<()> {
    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => {
            info!("Writing {} points to {:?}", chain.len(), path);
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match args.format {
        OutputFormat::Xyz => write_xyz(chain, comment, &mut writer)?,
        OutputFormat::Toml => write_toml(chain, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}
