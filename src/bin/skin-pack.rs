use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use skin_pack::{
    package, write_mask, ArchiveLocation, BatchReport, PackConfig, SkinPackEngine, TemplateResult,
};

#[derive(Parser)]
#[command(
    name = "skin-pack",
    about = "Cut transparency masks into sprite templates, embed custom art, and zip the result",
    version,
    after_help = "Default layout (relative to --base):\n  \
                  mask.png                 mask template (white = cut out)\n  \
                  jerseys/*.png            sprite templates\n  \
                  NHL Uniforms Skin Pack/  output directory"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    paths: PathArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Args)]
struct PathArgs {
    /// Base directory the default layout is resolved against
    #[arg(long, global = true, default_value = ".")]
    base: PathBuf,

    /// Mask template image (default: <base>/mask.png)
    #[arg(long, global = true)]
    mask: Option<PathBuf>,

    /// Template directory (default: <base>/jerseys)
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// Output directory (default: <base>/NHL Uniforms Skin Pack)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Archive file name without extension
    #[arg(long, global = true)]
    archive_name: Option<String>,

    /// Directory receiving the archive (default: ~/Downloads or ~/Desktop)
    #[arg(long, global = true)]
    archive_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Cut the mask out of every template, then zip the output to ~/Downloads
    Mask {
        /// Skip zipping the output directory
        #[arg(long)]
        no_archive: bool,
    },
    /// Embed an image into every template, then zip the output to ~/Desktop
    Embed {
        /// PNG image to embed (64x64 art is upscaled to 128x128)
        image: PathBuf,

        /// Skip zipping the output directory
        #[arg(long)]
        no_archive: bool,
    },
    /// Write the binary mask built from the mask template
    BuildMask {
        /// Destination PNG path
        dest: PathBuf,
    },
    /// Zip the output directory
    Package {
        /// Home folder used when --archive-dir is not given
        #[arg(long, value_enum, default_value = "downloads")]
        to: Location,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Location {
    Downloads,
    Desktop,
}

impl From<Location> for ArchiveLocation {
    fn from(l: Location) -> Self {
        match l {
            Location::Downloads => ArchiveLocation::Downloads,
            Location::Desktop => ArchiveLocation::Desktop,
        }
    }
}

impl PathArgs {
    fn config(&self) -> PackConfig {
        let mut config = PackConfig::from_base_dir(&self.base);
        if let Some(m) = &self.mask {
            config.mask_path.clone_from(m);
        }
        if let Some(t) = &self.templates {
            config.template_dir.clone_from(t);
        }
        if let Some(o) = &self.output {
            config.output_dir.clone_from(o);
        }
        if let Some(n) = &self.archive_name {
            config.archive_name.clone_from(n);
        }
        config
    }

    fn archive_base(
        &self,
        config: &PackConfig,
        location: ArchiveLocation,
    ) -> skin_pack::Result<PathBuf> {
        match &self.archive_dir {
            Some(dir) => Ok(config.archive_base_in(dir)),
            None => config.archive_base(location),
        }
    }
}

struct Output {
    verbose: bool,
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose && cli.quiet {
        eprintln!("Error: Cannot specify both --verbose and --quiet");
        process::exit(1);
    }

    let out = Output {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    let config = cli.paths.config();

    if out.verbose {
        eprintln!("Mask:      {}", config.mask_path.display());
        eprintln!("Templates: {}", config.template_dir.display());
        eprintln!("Output:    {}", config.output_dir.display());
        eprintln!();
    }

    let code = match cli.command {
        Command::Mask { no_archive } => {
            let engine = SkinPackEngine::new(config);
            run_batch(&engine, engine.mask_templates(), &out, |engine| {
                if no_archive {
                    return Ok(());
                }
                let base = cli.paths.archive_base(engine.config(), ArchiveLocation::Downloads)?;
                let zip = engine.package(&base)?;
                if !out.quiet {
                    eprintln!("Your skin pack has been zipped and saved to {}!", zip.display());
                }
                Ok(())
            })
        }
        Command::Embed { image, no_archive } => {
            if !image.is_file() {
                eprintln!("Error: No image selected: {}", image.display());
                process::exit(1);
            }
            let engine = SkinPackEngine::new(config);
            run_batch(&engine, engine.embed_image(&image), &out, |engine| {
                if !out.quiet {
                    eprintln!("Processing Completed!");
                }
                if no_archive {
                    return Ok(());
                }
                let base = cli.paths.archive_base(engine.config(), ArchiveLocation::Desktop)?;
                if out.verbose {
                    eprintln!("Zip base name: {}", base.display());
                    eprintln!("Zip filename: {}", package::archive_path(&base).display());
                }
                let zip = engine.package(&base)?;
                if !out.quiet {
                    eprintln!("[Success] Your skin pack is ready: {}", zip.display());
                }
                Ok(())
            })
        }
        Command::BuildMask { dest } => match write_mask(&config.mask_path, &dest) {
            Ok(mask) => {
                if !out.quiet {
                    eprintln!(
                        "[OK] {} ({}x{})",
                        dest.display(),
                        mask.width(),
                        mask.height()
                    );
                }
                0
            }
            Err(e) => {
                eprintln!("Fatal: Failed to build mask: {e}");
                1
            }
        },
        Command::Package { to } => {
            let engine = SkinPackEngine::new(config);
            match package_only(&engine, &cli.paths, to.into()) {
                Ok(zip) => {
                    if !out.quiet {
                        eprintln!("Archive saved to {}", zip.display());
                    }
                    0
                }
                Err(e) => {
                    eprintln!("Fatal: Failed to create archive: {e}");
                    1
                }
            }
        }
    };

    process::exit(code);
}

fn package_only(
    engine: &SkinPackEngine,
    paths: &PathArgs,
    location: ArchiveLocation,
) -> skin_pack::Result<PathBuf> {
    let base = paths.archive_base(engine.config(), location)?;
    engine.package(&base)
}

/// Print a batch outcome, then package when setup succeeded. Returns the exit code.
fn run_batch<F>(
    engine: &SkinPackEngine,
    report: skin_pack::Result<BatchReport>,
    out: &Output,
    finish: F,
) -> i32
where
    F: FnOnce(&SkinPackEngine) -> skin_pack::Result<()>,
{
    let report = match report {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Fatal: {e}");
            return 1;
        }
    };

    for r in &report.results {
        print_result(r, out);
    }

    if report.results.len() > 1 && !out.quiet {
        eprintln!();
        eprint!("[Summary] Saved: {}", report.saved_count());
        if report.failed_count() > 0 {
            eprint!(", Failed: {}", report.failed_count());
        }
        eprintln!(" (Total: {})", report.results.len());
    }

    if let Err(e) = finish(engine) {
        eprintln!("Fatal: Failed to create archive: {e}");
        return 1;
    }

    i32::from(!report.is_clean())
}

fn print_result(result: &TemplateResult, out: &Output) {
    match result {
        TemplateResult::Saved { output, template } => {
            if !out.quiet {
                eprintln!("[OK] {}", output.display());
            }
            if out.verbose {
                eprintln!("  <- {}", template.display());
            }
        }
        TemplateResult::Failed { error, .. } => {
            eprintln!("[FAIL] {}: {error}", result.filename());
        }
    }
}
