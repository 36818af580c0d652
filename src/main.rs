use clap::{Parser, Subcommand};
use icolib::config::{self, IcolibConfig};
use icolib::export::IconExporter;
use icolib::imaging::{Channels, Operation, ResizeParams, RustBackend, process_file};
use icolib::output;
use icolib::presets;
use icolib::template::TemplateStore;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "icolib")]
#[command(about = "Batch app-icon exporter and image colour tools")]
#[command(long_about = "\
Batch app-icon exporter and image colour tools

Exports one source image to every size a platform template lists, and applies
whole-image colour transforms to single files.

Templates are XML files in the templates directory, one per template:

  templates/
  ├── ios.xml          # icolib gen-templates writes the built-in ones
  └── android.xml

Naming patterns in templates expand %w to the item width and %h to its
height. Output files take the source image's extension:

  icolib export logo.png ios   →   output/iOS/Icon-20.png, Icon-20@2x.png, ...

Run 'icolib gen-config' to generate a documented icolib.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: icolib.toml in the working directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Templates directory (overrides the config file)
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,

    /// Export root directory (overrides the config file)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Log each step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the built-in iOS and Android templates to the templates directory
    GenTemplates,
    /// Export a source image with every item of a template
    Export {
        /// Source image
        source: PathBuf,
        /// Template name (looked up as <templates-dir>/<name>.xml)
        template: String,
        /// Print the per-item report as JSON instead of progress lines
        #[arg(long)]
        json: bool,
    },
    /// List the templates in the templates directory
    Templates,
    /// Show a template's items and the file name each one produces
    Show {
        /// Template name
        name: String,
    },
    /// Invert the colour channels of an image, keeping alpha
    Invert {
        source: PathBuf,
        /// Output file (its extension is replaced by the source's)
        destination: PathBuf,
    },
    /// Invert only some channels of an image
    InvertChannels {
        source: PathBuf,
        destination: PathBuf,
        /// Channels to invert, any of a, r, g, b
        #[arg(long, default_value = "rb")]
        channels: Channels,
    },
    /// Scale channels of an image by a factor, saturating at 0 and 255
    Adjust {
        source: PathBuf,
        destination: PathBuf,
        #[arg(long, default_value_t = 2.0)]
        scalar: f64,
        /// Channels to scale, any of a, r, g, b
        #[arg(long, default_value = "rgb")]
        channels: Channels,
    },
    /// Resample an image to a new size
    Resize {
        source: PathBuf,
        destination: PathBuf,
        width: u32,
        height: u32,
        /// Fit inside WIDTHxHEIGHT keeping the source aspect ratio
        #[arg(long)]
        keep_aspect: bool,
    },
    /// Print a stock icolib.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(cli.config.as_deref())?;
    let templates_dir = cli
        .templates_dir
        .clone()
        .unwrap_or_else(|| config.templates_path());
    let output_root = cli.output.clone().unwrap_or_else(|| config.output_path());
    let store = TemplateStore::new(templates_dir);

    match cli.command {
        Command::GenTemplates => {
            let mut saved = Vec::new();
            for template in presets::all() {
                let path = store.save(&template)?;
                saved.push((template.name, path));
            }
            output::print_generated_templates(&saved);
        }
        Command::Export {
            source,
            template,
            json,
        } => {
            init_thread_pool(&config.processing);
            let template = store.load(&template)?;
            let exporter = IconExporter::new(&template);
            let backend = RustBackend::new();

            let report = if json {
                let report = exporter.export_with_codec(&backend, &source, &output_root, None)?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::export_report_json(&report))?
                );
                report
            } else {
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = std::thread::spawn(move || {
                    for event in rx {
                        for line in output::format_export_event(&event) {
                            println!("{}", line);
                        }
                    }
                });
                let result = exporter.export_with_codec(&backend, &source, &output_root, Some(&tx));
                drop(tx);
                printer
                    .join()
                    .map_err(|_| "progress printer thread panicked")?;
                let report = result?;
                output::print_export_summary(&report);
                report
            };

            if !report.is_complete() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Templates => {
            output::print_template_list(&store.list(), store.dir());
        }
        Command::Show { name } => {
            output::print_template(&store.load(&name)?);
        }
        Command::Invert {
            source,
            destination,
        } => run_operation(&source, &destination, Operation::Invert)?,
        Command::InvertChannels {
            source,
            destination,
            channels,
        } => run_operation(&source, &destination, Operation::InvertChannels(channels))?,
        Command::Adjust {
            source,
            destination,
            scalar,
            channels,
        } => run_operation(&source, &destination, Operation::Adjust { scalar, channels })?,
        Command::Resize {
            source,
            destination,
            width,
            height,
            keep_aspect,
        } => run_operation(
            &source,
            &destination,
            Operation::Resize(ResizeParams {
                width,
                height,
                preserve_aspect: keep_aspect,
            }),
        )?,
        Command::GenConfig => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// `warn` by default, `debug` with `--verbose`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Load an explicit `--config`, or `icolib.toml` if one is lying around.
fn load_config(explicit: Option<&Path>) -> Result<IcolibConfig, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) if !path.exists() => {
            Err(format!("config file not found: {}", path.display()).into())
        }
        Some(path) => Ok(config::load_config(path)?),
        None => Ok(config::load_config(Path::new(config::DEFAULT_CONFIG_FILE))?),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn run_operation(
    source: &Path,
    destination: &Path,
    operation: Operation,
) -> Result<(), Box<dyn std::error::Error>> {
    let written = process_file(&RustBackend::new(), source, destination, &operation)?;
    output::print_operation_output(&operation.describe(), source, &written);
    Ok(())
}
