//! icongen-client: client for an icon generation service
//!
//! Pick an input (an Iconify reference, a direct image URL, or an uploaded
//! file), adjust the visual settings, ask the service to render the icon,
//! then export it as SVG, PNG, WebP or ICO.
//!
//! # Example
//!
//! ```
//! use icongen_client::{InputSource, RequestTarget, VisualConfig, build_request};
//!
//! let mut config = VisualConfig::new();
//! config.set_icon_color("dodgerblue");
//! config.set_size(128);
//!
//! let payload = build_request(
//!     &InputSource::iconify("mdi:home"),
//!     &config,
//!     RequestTarget::Preview,
//! )
//! .unwrap();
//!
//! assert_eq!(payload.keys(), ["icon_name", "size", "color"]);
//! ```
//!
//! # Sessions
//!
//! [`Playground`] ties the pieces together: it owns the input selection and
//! settings, keeps the last generated artifact, and talks to the generation,
//! discovery and persistence services.
//!
//! ```no_run
//! use icongen_client::{ClientConfig, DirectorySink, OutputFormat, Playground};
//!
//! # async fn run() -> icongen_client::Result<()> {
//! let mut playground = Playground::from_config(&ClientConfig::from_env()?)?;
//! playground.input.set_icon_name("mdi:rocket");
//! playground.config.set_background_color("#1e1e2e");
//!
//! playground.generate().await?;
//! playground
//!     .download(OutputFormat::Ico, &DirectorySink::new("out"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod artifact;
mod collection;
mod config;
mod error;
mod identity;
mod playground;
mod request;
mod settings;
mod source;

pub mod client;
pub mod export;
pub mod visual;

pub use artifact::GeneratedArtifact;
pub use client::{
    DiscoveryBackend, DiscoveryClient, GenerationBackend, HttpGenerationClient,
    HttpPersistenceClient, PersistenceBackend,
};
pub use collection::{Collection, SavedIcon, icon_file_name};
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::{
    ExportError, GENERIC_FAILURE, PlaygroundError, Result, ServiceError, ValidationError,
};
pub use export::{
    DirectorySink, DownloadSink, ExportStrategy, ExportedFile, Exporter, OutputFormat,
    RasterFormat,
};
pub use identity::{Anonymous, Identity, SessionIdentity, StaticIdentity, UserSession};
pub use playground::{ANALYTICS_TARGET, CollectionTarget, Playground};
pub use request::{PayloadInput, RequestPayload, RequestTarget, ServerFormat, build_request};
pub use settings::{Configurable, SavedSettings, SettingsGroup, SettingsSnapshot};
pub use source::{
    ACCEPTED_UPLOAD_TYPES, DEFAULT_ICON, ICONIFY_API, InputKind, InputSelection, InputSource,
    UploadedFile, url_points_to_jpeg,
};
pub use visual::{
    Animation, AnimationKind, ColorSlot, Gradient, GradientDirection, Paint, ParseEnumError,
    VisualConfig,
};
