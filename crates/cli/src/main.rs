//! CLI tool for exporting presentation slides as PNG images.

use anyhow::{bail, Context, Result};
use clap::Parser;
use slidepng_core::{slide_path, PresentationFormat, SlideDeck};
use slidepng_render::{RenderOptions, SlideRenderer};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Export each slide of a presentation file as a PNG image.
#[derive(Parser, Debug)]
#[command(name = "slidepng")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input presentation file (.pptx)
    input: PathBuf,

    /// Output directory (created if missing)
    #[arg(short, long, default_value = "slides")]
    output: PathBuf,

    /// Output image width in pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Output image height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    // A missing input fails here, before any output is created.
    let input_path = args
        .input
        .canonicalize()
        .with_context(|| format!("Failed to resolve input file {}", args.input.display()))?;
    println!("Opening: {}", input_path.display());

    let deck = parse_deck(&input_path)?;
    println!("Slides: {}", deck.slide_count());

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory: {}", args.output.display()))?;
    let out_dir = args
        .output
        .canonicalize()
        .with_context(|| format!("Failed to resolve output directory {}", args.output.display()))?;

    let renderer = SlideRenderer::new(RenderOptions::with_size(args.width, args.height));

    for slide in &deck.slides {
        let out_path = slide_path(&out_dir, slide.number);
        let image = renderer
            .render(deck.slide_size, slide)
            .with_context(|| format!("Failed to render slide {}", slide.number))?;
        image
            .save(&out_path)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        println!(
            "  Exported slide {:02} -> {}",
            slide.number,
            out_path.display()
        );
    }

    println!("Done.");
    Ok(())
}

/// Open and parse the input presentation into a renderable deck.
fn parse_deck(input_path: &Path) -> Result<SlideDeck> {
    let file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let mut reader = BufReader::new(file);

    // Read magic bytes to detect format
    let mut magic = [0u8; 8];
    reader
        .read_exact(&mut magic)
        .with_context(|| "Failed to read file header")?;

    // Re-open for parsing; the parser needs the stream from the start.
    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let format = PresentationFormat::from_magic(&magic)
        .or_else(|| {
            input_path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(PresentationFormat::from_extension)
        })
        .ok_or_else(|| anyhow::anyhow!("Could not detect file format"))?;

    let filename = input_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    match format {
        PresentationFormat::Pptx => {
            log::debug!("Parsing as PPTX");
            let parser = slidepng_pptx::PptxParser::new();
            parser
                .parse(reader, filename)
                .map_err(|e| anyhow::anyhow!("{}", e))
        }
        PresentationFormat::Ppt => {
            bail!(
                "{} is a legacy binary .ppt file; only .pptx is supported",
                input_path.display()
            )
        }
    }
}
