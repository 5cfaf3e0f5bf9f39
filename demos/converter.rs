use std::{io, path::PathBuf};

use clap::Parser;
use igc2fit::{convert_track_to_fit, parse_igc};
use thiserror::Error;

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Igc(#[from] igc2fit::igc::IgcError),
    #[error(transparent)]
    Encode(#[from] igc2fit::encode::EncodeError),
    #[error(transparent)]
    Fit(#[from] igc2fit::fit::reader::ReadError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Parser)]
struct Args {
    /// Source .igc file
    in_path: PathBuf,
    /// Destination .fit file
    out_path: PathBuf,
    /// Parse the written file back and report its message count
    #[clap(long)]
    verify: bool,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    let igc_text = std::fs::read_to_string(&args.in_path)?;
    let track = parse_igc(&igc_text)?;
    let fit_bytes = convert_track_to_fit(&track)?;
    std::fs::write(&args.out_path, &fit_bytes)?;
    println!(
        "{}: {} fixes -> {} bytes",
        args.out_path.display(),
        track.fixes.len(),
        fit_bytes.len()
    );
    if args.verify {
        let messages = igc2fit::fit::reader::read_fit(&fit_bytes)?;
        println!("verified: {} messages", messages.len());
    }
    Ok(())
}
