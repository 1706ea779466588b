use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use icongen_client::{
    AnimationKind, ClientConfig, DirectorySink, DownloadSink, GradientDirection, InputKind,
    OutputFormat, Playground, PlaygroundError, UploadedFile,
};

/// icongen: generate and export icons through an icon generation service
#[derive(Parser, Debug)]
#[command(name = "icongen", version, about, long_about = None)]
struct Cli {
    /// Generation service URL (overrides ICONGEN_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides ICONGEN_AUTH_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an icon and optionally export it
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Apply a saved settings preset before the flags below
        #[arg(long)]
        preset: Option<String>,

        #[command(flatten)]
        visual: VisualArgs,

        /// Formats to export, comma separated (svg, png, webp, ico)
        #[arg(long, value_delimiter = ',', default_value = "svg")]
        export: Vec<OutputFormat>,

        /// Directory the exported files are written to
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Suggest Iconify references for a query
    Suggest {
        query: String,
    },

    /// Saved settings presets
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Saved icon collections
    #[command(subcommand)]
    Collections(CollectionCommands),
}

#[derive(Subcommand, Debug)]
enum SettingsCommands {
    /// List saved presets
    List,
    /// Show one preset grouped by section
    Show { id: String },
    /// Save the given settings as a preset
    Save {
        name: String,
        /// Update this preset instead of creating a new one
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        visual: VisualArgs,
    },
    /// Delete a preset
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum CollectionCommands {
    /// List collections
    List,
    /// Delete a collection
    Delete { id: String },
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct InputArgs {
    /// Iconify reference, e.g. mdi:home
    #[arg(long)]
    icon: Option<String>,

    /// Direct image URL
    #[arg(long)]
    url: Option<String>,

    /// Local SVG, PNG, WebP or JPEG file
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct VisualArgs {
    /// Solid icon color
    #[arg(long)]
    color: Option<String>,

    /// Icon gradient stops
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    gradient: Option<Vec<String>>,

    /// Icon gradient direction
    #[arg(long)]
    direction: Option<GradientDirection>,

    /// Solid background color
    #[arg(long)]
    bg_color: Option<String>,

    /// Background gradient stops
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    bg_gradient: Option<Vec<String>>,

    /// Background gradient direction
    #[arg(long)]
    bg_direction: Option<GradientDirection>,

    /// Size in pixels (16-512)
    #[arg(long)]
    size: Option<u32>,

    /// Scale multiplier
    #[arg(long)]
    scale: Option<f32>,

    /// Corner radius in pixels
    #[arg(long)]
    border_radius: Option<u32>,

    /// Outline width in pixels (0-20)
    #[arg(long)]
    outline_width: Option<u32>,

    /// Outline color
    #[arg(long)]
    outline_color: Option<String>,

    /// Animation type (spin, pulse, flip-h, flip-v)
    #[arg(long)]
    animation: Option<AnimationKind>,

    /// Animation duration in seconds
    #[arg(long, default_value_t = 1.0)]
    duration: f32,
}

impl VisualArgs {
    /// Applies the flags in the same order a user would set them.
    fn apply(&self, playground: &mut Playground) {
        let config = &mut playground.config;

        if let Some(color) = &self.color {
            config.set_icon_color(color.clone());
        }
        if let Some([start, end]) = self.gradient.as_deref() {
            config.set_icon_gradient_stops(start.clone(), end.clone());
            config.set_icon_gradient(true);
        }
        if let Some(direction) = self.direction {
            config.set_icon_direction(direction);
        }

        if let Some(color) = &self.bg_color {
            config.set_background_color(color.clone());
        }
        if let Some([start, end]) = self.bg_gradient.as_deref() {
            config.set_background_gradient_stops(start.clone(), end.clone());
            config.set_background_gradient(true);
        }
        if let Some(direction) = self.bg_direction {
            config.set_background_direction(direction);
        }

        if let Some(size) = self.size {
            config.set_size(size);
        }
        if let Some(scale) = self.scale {
            config.set_scale(scale);
        }
        if let Some(radius) = self.border_radius {
            config.set_border_radius(radius);
        }
        if let Some(width) = self.outline_width {
            config.set_outline_width(width);
        }
        if let Some(color) = &self.outline_color {
            config.set_outline_color(color.clone());
        }

        if let Some(kind) = self.animation {
            config.set_animation_kind(kind);
            config.set_animation_duration(self.duration);
            config.set_animation_enabled(true);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, PlaygroundError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url);
    }
    if let Some(token) = cli.token {
        config = config.with_auth_token(token);
    }

    let mut playground = Playground::from_config(&config)?;

    match cli.command {
        Commands::Generate {
            input,
            preset,
            visual,
            export,
            out,
        } => {
            select_input(&mut playground, input)?;
            if let Some(id) = preset {
                playground.load_settings(&id).await?;
            }
            visual.apply(&mut playground);

            let artifact = playground.generate().await?;
            println!("Generated {} bytes", artifact.len());

            let sink = DirectorySink::new(out);
            if !export_all(&playground, &export, &sink).await {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Suggest { query } => {
            for suggestion in playground.suggest(&query).await? {
                println!("{}", suggestion);
            }
        }

        Commands::Settings(SettingsCommands::List) => {
            for preset in playground.list_settings().await? {
                println!("{}\t{}", preset.id.unwrap_or_default(), preset.name);
            }
        }

        Commands::Settings(SettingsCommands::Show { id }) => {
            let preset = playground.load_settings(&id).await?;
            println!("{}", preset.name);
            for group in preset.settings.summary() {
                println!("\n[{}]", group.title);
                for (label, value) in group.entries {
                    println!("  {}: {}", label, value);
                }
            }
        }

        Commands::Settings(SettingsCommands::Save { name, id, visual }) => {
            visual.apply(&mut playground);
            let saved = playground.save_settings(&name, id.as_deref()).await?;
            println!("Saved {}", saved.id.unwrap_or(saved.name));
        }

        Commands::Settings(SettingsCommands::Delete { id }) => {
            playground.delete_settings(&id).await?;
            println!("Deleted {}", id);
        }

        Commands::Collections(CollectionCommands::List) => {
            for collection in playground.list_collections().await? {
                println!(
                    "{}\t{}\t({} icons)",
                    collection.id.as_deref().unwrap_or_default(),
                    collection.name,
                    collection.len()
                );
            }
        }

        Commands::Collections(CollectionCommands::Delete { id }) => {
            playground.delete_collection(&id).await?;
            println!("Deleted {}", id);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Exports every format, reporting failures without stopping.
///
/// Returns false if any format failed.
async fn export_all(
    playground: &Playground,
    formats: &[OutputFormat],
    sink: &dyn DownloadSink,
) -> bool {
    let mut ok = true;
    for &format in formats {
        match playground.download(format, sink).await {
            Ok(path) => println!("{}", path.display()),
            Err(err) => {
                tracing::debug!(%format, error = ?err, "Export failed");
                eprintln!("{}", err.user_message());
                ok = false;
            }
        }
    }
    ok
}

fn select_input(playground: &mut Playground, input: InputArgs) -> Result<(), PlaygroundError> {
    if let Some(icon) = input.icon {
        playground.input.set_icon_name(icon);
        playground.input.select(InputKind::Iconify);
    } else if let Some(url) = input.url {
        playground.input.set_direct_url(url);
        playground.input.select(InputKind::Url);
    } else if let Some(path) = input.file {
        playground.input.set_upload(UploadedFile::from_path(path)?);
        playground.input.select(InputKind::Upload);
    }
    Ok(())
}
