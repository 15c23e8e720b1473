use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{debug, info};

use huffpack::Compression;

/// Compress a file with Huffman coding.
#[derive(Parser, Debug)]
#[command(name = "encode")]
struct Args {
    /// File to compress.
    input: PathBuf,

    /// Where to write the compressed stream.
    output: PathBuf,

    /// Write the output even when it is not smaller than the input.
    #[arg(short, long)]
    force: bool,

    /// Print symbol frequencies, the tree, the codes and file sizes.
    #[arg(short, long)]
    verbose: bool,
}

fn print_verbose(report: &Compression) {
    println!("------Frequency of each char------");
    print!("{}", report.frequencies);

    println!("\n------Huffman Tree------");
    print!("{}", report.tree);

    println!("\n------Code of each char------");
    print!("{}", report.codes);

    println!("\n------File Sizes------");
    println!("Size of input file: {}", report.stats.input_bits);
    println!("Size of output file: {}", report.stats.estimated_bits);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    debug!("{args:?}");

    let data = fs::read(&args.input)
        .with_context(|| format!("reading from {}", args.input.display()))?;
    let original_len = data.len();

    let (output, report) = huffpack::compress(&data, args.force)
        .with_context(|| format!("compressing {}", args.input.display()))?;

    match output {
        Some(bytes) => {
            info!("Writing compressed output to {}", args.output.display());
            fs::write(&args.output, &bytes)
                .with_context(|| format!("writing to {}", args.output.display()))?;

            let ratio = 100.0 * (1.0 - bytes.len() as f64 / original_len as f64);
            println!(
                "✅ Encoding successful.\n\
                 📂  Input:       {} ({} bytes)\n\
                 💾  Output:      {} ({} bytes)\n\
                 ℹ️  Entropy:     {:.4} bits/symbol\n\
                 🗜️  Ratio:       {:.4}%",
                args.input.display(),
                original_len,
                args.output.display(),
                bytes.len(),
                report.frequencies.entropy(),
                ratio
            );
        }
        None => println!("FILE NOT COMPRESSED. OUTPUT FILE LARGER THAN INPUT FILE.\n"),
    }

    if args.verbose {
        print_verbose(&report);
    }
    Ok(())
}
