use std::fs;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use log::{debug, info};

use huffpack::HuffError;

/// Decompress a file written by `encode`.
#[derive(Parser, Debug)]
#[command(name = "decode")]
struct Args {
    /// Compressed file.
    input: PathBuf,

    /// Where to write the decoded data.
    output: PathBuf,

    /// Print the decoded Huffman tree.
    #[arg(short, long)]
    verbose: bool,
}

fn decode_error(err: HuffError) -> anyhow::Error {
    match err {
        HuffError::MalformedStream(reason) => {
            anyhow!("UNABLE TO DECOMPRESS FILE: {reason}")
        }
        err => anyhow::Error::new(err).context("decompressing input"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    debug!("{args:?}");

    info!("--- Start Decoding ---");
    let encoded = fs::read(&args.input)
        .with_context(|| format!("reading from {}", args.input.display()))?;

    let decoded = huffpack::decompress(&encoded).map_err(decode_error)?;

    info!("Writing decoded output to file: {}", args.output.display());
    fs::write(&args.output, &decoded.data)
        .with_context(|| format!("writing to {}", args.output.display()))?;

    println!(
        "✅ Decoding successful.\n\
         📂 Input:  {} ({} bytes)\n\
         💾 Output: {} ({} bytes)",
        args.input.display(),
        encoded.len(),
        args.output.display(),
        decoded.data.len()
    );

    if args.verbose {
        println!("------Huffman Tree------");
        print!("{}", decoded.tree);
    }

    info!("--- End ---");
    Ok(())
}
