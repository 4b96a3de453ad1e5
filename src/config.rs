use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Default extension set when no format flag is given. Deliberately
/// asymmetric: lowercase "jpg"/"jpeg" are not matched by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "png", "PNG", "gif", "GIF", "bmp", "BMP", "tiff", "TIFF", "tif", "TIF", "webp", "WEBP", "JPG",
    "JPEG",
];

/// Format-selection flags replace each other: the last one on the command
/// line wins. Each flag overrides every member of this group, itself included.
const FORMAT_ARGS: [&str; 9] = [
    "ext", "png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp",
];

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Magick,
    Ffmpeg,
    Auto,
}

/// img2heic — batch image to HEIC converter
#[derive(Parser, Debug)]
#[command(
    name = "img2heic",
    version,
    about = "Converts images to HEIC format",
    long_about = "Converts every matching image in a directory to HEIC.\n\
                  The actual encoding is delegated to ImageMagick or FFmpeg,\n\
                  whichever is installed (or explicitly requested)."
)]
pub struct Cli {
    /// Lossless encoding (forces quality 100)
    #[arg(short = 'l', long = "lossless")]
    pub lossless: bool,

    /// Encoding quality, 1-100 (higher is better)
    #[arg(
        short = 'q',
        long = "quality",
        value_name = "NUM",
        default_value_t = 65,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub quality: u8,

    /// Delete original files after successful conversion
    #[arg(short = 'd', long = "delete")]
    pub delete: bool,

    /// Overwrite existing .heic files
    #[arg(short = 'o', long = "overwrite")]
    pub overwrite: bool,

    /// Convert files one at a time instead of in parallel
    #[arg(short = 'p', long = "no-parallel")]
    pub no_parallel: bool,

    /// Show what would be done without converting anything
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Suppress progress output (errors are still printed)
    #[arg(short = 's', long = "silent")]
    pub silent: bool,

    /// Conversion tool to use
    #[arg(
        short = 't',
        long = "tool",
        value_enum,
        value_name = "TOOL",
        default_value_t = Tool::Auto
    )]
    pub tool: Tool,

    /// Comma-separated list of file extensions to convert (case-sensitive, no leading dot)
    #[arg(
        short = 'e',
        long = "ext",
        value_name = "LIST",
        value_delimiter = ',',
        overrides_with_all = FORMAT_ARGS
    )]
    pub ext: Option<Vec<String>>,

    /// Convert .png/.PNG files only
    #[arg(long, overrides_with_all = FORMAT_ARGS)]
    pub png: bool,

    /// Convert .jpg/.JPG files only
    #[arg(long, overrides_with_all = FORMAT_ARGS)]
    pub jpg: bool,

    /// Convert .jpeg/.JPEG files only
    #[arg(long, overrides_with_all = FORMAT_ARGS)]
    pub jpeg: bool,

    /// Convert .gif/.GIF files only
    #[arg(long, overrides_with_all = FORMAT_ARGS)]
    pub gif: bool,

    /// Convert .bmp/.BMP files only
    #[arg(long, overrides_with_all = FORMAT_ARGS)]
    pub bmp: bool,

    /// Convert .tiff/.TIFF files only
    #[arg(long, overrides_with_all = FORMAT_ARGS)]
    pub tiff: bool,

    /// Convert .tif/.TIF files only
    #[arg(long, overrides_with_all = FORMAT_ARGS)]
    pub tif: bool,

    /// Convert .webp/.WEBP files only
    #[arg(long, overrides_with_all = FORMAT_ARGS)]
    pub webp: bool,

    /// Directory to scan for images
    #[arg(value_name = "INPUT_DIR", default_value = ".")]
    pub input_dir: PathBuf,

    /// Directory for converted files (default: INPUT_DIR)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Resolved run configuration. Built once per invocation, read-only afterwards.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub quality: u8,
    pub lossless: bool,
    pub delete_originals: bool,
    pub overwrite: bool,
    pub parallel: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub tool: Tool,
    pub extensions: Vec<String>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Merge CLI options into a validated configuration.
    pub fn resolve(cli: Cli) -> Result<RunConfig> {
        // Lossless always wins over an explicit --quality.
        let quality = if cli.lossless { 100 } else { cli.quality };

        let extensions = resolve_extensions(&cli)?;

        let output_dir = cli
            .output_dir
            .clone()
            .unwrap_or_else(|| cli.input_dir.clone());

        Ok(RunConfig {
            quality,
            lossless: cli.lossless,
            delete_originals: cli.delete,
            overwrite: cli.overwrite,
            parallel: !cli.no_parallel,
            dry_run: cli.dry_run,
            verbose: !cli.silent,
            tool: cli.tool,
            extensions,
            input_dir: cli.input_dir,
            output_dir,
        })
    }
}

fn resolve_extensions(cli: &Cli) -> Result<Vec<String>> {
    if let Some(list) = &cli.ext {
        for ext in list {
            if ext.is_empty() {
                anyhow::bail!("--ext list contains an empty extension");
            }
        }
        return Ok(list.clone());
    }

    // Format flags override each other, so at most one of these is set.
    let single = [
        (cli.png, "png"),
        (cli.jpg, "jpg"),
        (cli.jpeg, "jpeg"),
        (cli.gif, "gif"),
        (cli.bmp, "bmp"),
        (cli.tiff, "tiff"),
        (cli.tif, "tif"),
        (cli.webp, "webp"),
    ];
    for (set, ext) in single {
        if set {
            return Ok(vec![ext.to_string(), ext.to_uppercase()]);
        }
    }

    Ok(DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
}
