use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "layr", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render at the photo's native resolution and save a PNG named after the app.
    Export(ExportArgs),
    /// Render at a preview size and write a PNG.
    Preview(PreviewArgs),
    /// Print the sniffed content type of an image file.
    Sniff {
        /// File to inspect.
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Document JSON (layers and adjustments).
    #[arg(long)]
    doc: PathBuf,

    /// Base photo.
    #[arg(long)]
    photo: PathBuf,

    /// Pre-separated cutout for the photo.
    #[arg(long, conflicts_with = "separate")]
    cutout: Option<PathBuf>,

    /// Ask the configured separation service for the cutout.
    #[arg(long)]
    separate: bool,

    /// `layr.toml` with app name, fonts and separation settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra font directory; may be repeated.
    #[arg(long = "fonts")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Preview height the layer lengths were authored at. Unset means lengths are in export
    /// pixels already.
    #[arg(long)]
    preview_height: Option<f64>,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[arg(long)]
    width: u32,

    #[arg(long)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args).await,
        Command::Preview(args) => cmd_preview(args).await,
        Command::Sniff { path } => cmd_sniff(&path),
    }
}

fn read_encoded(path: &Path) -> anyhow::Result<layr::EncodedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let mut img = layr::EncodedImage::new(bytes);
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        img = img.with_file_name(name);
    }
    Ok(img)
}

async fn open_session(source: &SourceArgs) -> anyhow::Result<layr::EditorSession> {
    let mut config = match &source.config {
        Some(path) => layr::config::LayrConfig::load_from_file(path)?,
        None => layr::config::LayrConfig::default(),
    };
    config.fonts.dirs.extend(source.font_dirs.iter().cloned());

    let json = std::fs::read_to_string(&source.doc)
        .with_context(|| format!("read document '{}'", source.doc.display()))?;
    let doc = layr::Document::from_json(&json)?;

    let mut session = layr::EditorSession::from_config(&config)?;
    session.replace_document(doc);

    let photo = read_encoded(&source.photo)?;
    if source.separate {
        session
            .upload(photo)
            .await
            .context("background separation failed")?;
    } else {
        session.document_mut().set_photo(photo);
        if let Some(cutout) = &source.cutout {
            session.document_mut().set_cutout(read_encoded(cutout)?);
        }
    }
    Ok(session)
}

async fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args.source).await?;
    if let Some(h) = args.preview_height {
        session.set_preview_size(layr::PreviewSize::new(0.0, h));
    }
    let mut sink = layr::DirectorySink::new(&args.out_dir);
    let saved = session.export(&mut sink).await?;
    let path = saved.path.unwrap_or_else(|| args.out_dir.join(&saved.file_name));
    eprintln!("wrote {} ({} bytes)", path.display(), saved.bytes);
    Ok(())
}

async fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args.source).await?;
    session.set_preview_size(layr::PreviewSize::new(
        f64::from(args.width),
        f64::from(args.height),
    ));
    let frame = session.preview().await?;
    let png = layr::encode_png(&frame)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sniff(path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    match layr::sniff_mime(&bytes) {
        Some(mime) => println!("{mime}"),
        None => println!("unknown"),
    }
    Ok(())
}
