use clap::{Parser, Subcommand};
use image_comparison::config::{self, ComparisonConfig};
use image_comparison::{ImageReference, render};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-comparison")]
#[command(about = "Render a before/after slider comparing two images")]
#[command(long_about = "\
Render a before/after slider comparing two images

Each image may be a local path or an http(s) URL. The output is an HTML
fragment that mounts a juxtapose slider on both images, embedded as JPEG
data URIs; its required height is derived from the first image.

Settings are read from the config file (if present), then overridden by
flags. Run 'image-comparison gen-config' for a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "image-comparison.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the comparison fragment for two images
    Render(RenderArgs),
    /// Print a stock config file with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// First (left) image: path or URL
    img1: String,
    /// Second (right) image: path or URL
    img2: String,

    /// Label for the first image
    #[arg(long)]
    label1: Option<String>,
    /// Label for the second image
    #[arg(long)]
    label2: Option<String>,
    /// Component width in pixels
    #[arg(long)]
    width: Option<u32>,
    /// Starting slider position, percent from the left (0-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    starting_position: Option<u32>,
    /// Hide the image labels
    #[arg(long)]
    hide_labels: bool,
    /// Fixed-size widget instead of a responsive one
    #[arg(long)]
    no_responsive: bool,
    /// Encode in memory instead of via scratch files
    #[arg(long)]
    in_memory: bool,
    /// Apply EXIF orientation to both images
    #[arg(long)]
    correct_orientation: bool,

    /// Wrap the fragment in a complete HTML page
    #[arg(long)]
    page: bool,
    /// Write the output here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl RenderArgs {
    /// Layer command-line flags over the file config.
    fn apply(&self, config: &mut ComparisonConfig) {
        if let Some(label) = &self.label1 {
            config.label1 = label.clone();
        }
        if let Some(label) = &self.label2 {
            config.label2 = label.clone();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(position) = self.starting_position {
            config.starting_position = position;
        }
        if self.hide_labels {
            config.show_labels = false;
        }
        if self.no_responsive {
            config.make_responsive = false;
        }
        if self.in_memory {
            config.in_memory = true;
        }
        if self.correct_orientation {
            config.reader.correct_orientation = true;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => {
            let mut config = config::load_config_or_default(&cli.config)?;
            args.apply(&mut config);

            let img1 = ImageReference::from_location(&args.img1);
            let img2 = ImageReference::from_location(&args.img2);
            let rendered = render(&img1, &img2, &config)?;

            let out = if args.page {
                let title = format!("{} vs {}", config.label1, config.label2);
                rendered.standalone_page(&title)
            } else {
                rendered.fragment.clone()
            };
            match &args.output {
                Some(path) => {
                    std::fs::write(path, out)?;
                    eprintln!(
                        "Wrote {} (declare height={} width={})",
                        path.display(),
                        rendered.height,
                        rendered.width
                    );
                }
                None => {
                    println!("{out}");
                    eprintln!("height={} width={}", rendered.height, rendered.width);
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
