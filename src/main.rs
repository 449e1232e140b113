use clap::{Parser, Subcommand};
use link_gallery::auth::{Session, hash_secret};
use link_gallery::client::{BlobPublisher, HttpLinkStore, LinkStore};
use link_gallery::config::{self, AppConfig};
use link_gallery::editor::{
    Confirmation, Editor, EditorSettings, ImageUpload, LinkDraft, SubmitForm,
};
use link_gallery::html::{PageSettings, render_page};
use link_gallery::imaging::supported_input_extensions;
use link_gallery::local_cache::LocalCache;
use link_gallery::render::{RenderOptions, render_gallery};
use link_gallery::types::{Category, Filter};
use link_gallery::{output, server};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "link-gallery")]
#[command(about = "Admin-editable gallery of categorized link cards")]
#[command(long_about = "\
Admin-editable gallery of categorized link cards

Visitors browse the cards by category. A single admin, unlocked with a shared
secret, adds, edits and deletes entries and attaches a thumbnail.

  link-gallery serve                  # endpoints + gallery page on [server].bind
  link-gallery list --category tool   # what the endpoint currently holds
  link-gallery add --title T --url U --image-file shot.png

When the link store endpoint is unreachable, reads and writes fall back to a
local cache ([cache].dir), so nothing typed is lost.

Run 'link-gallery gen-config' to generate a documented config.toml and
'link-gallery hash-password' to produce [admin].password_sha256.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Admin secret for add/edit/delete
    #[arg(long, global = true, env = "LINK_GALLERY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Entry fields shared by `add` and `edit`.
#[derive(clap::Args, Clone, Default)]
struct EntryArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    url: Option<String>,
    /// game, tool, art, or any label
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    desc: Option<String>,
    /// Image URL to use as-is
    #[arg(long, conflicts_with = "image_file")]
    image: Option<String>,
    /// Local image to downsample and publish (jpg, jpeg, png, gif or webp)
    #[arg(long)]
    image_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the link store, blob and gallery page service
    Serve,
    /// Print the collection
    List {
        /// Only this category ("all" for everything)
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// Render the gallery as JSON view-models, or as an HTML page
    Render {
        #[arg(long, default_value = "all")]
        category: String,
        /// Write the HTML page here instead of printing JSON
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Add an entry (admin)
    Add(EntryArgs),
    /// Edit an entry (admin). Omitted fields keep their value.
    Edit {
        id: i64,
        #[command(flatten)]
        entry: EntryArgs,
        /// Remove the entry's image
        #[arg(long, conflicts_with_all = ["image", "image_file"])]
        clear_image: bool,
    },
    /// Delete an entry (admin)
    Delete {
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Print the SHA-256 digest of a secret for [admin].password_sha256
    HashPassword { secret: String },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Command::Serve));

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::HashPassword { secret } => {
            println!("{}", hash_secret(&secret));
        }
        Command::Serve => {
            let config = load_config(cli.config.as_deref())?;
            server::run(&config).await?;
        }
        Command::List { category } => {
            let config = load_config(cli.config.as_deref())?;
            let links = link_store(&config)?.load().await;
            output::print_links(
                &links,
                &Filter::parse(&category),
                &RenderOptions::from_config(&config.gallery),
            );
        }
        Command::Render { category, html } => {
            let config = load_config(cli.config.as_deref())?;
            let links = link_store(&config)?.load().await;
            let view = render_gallery(
                &links,
                &Filter::parse(&category),
                false,
                &RenderOptions::from_config(&config.gallery),
            );
            match html {
                Some(path) => {
                    let page = render_page(&view, &PageSettings::from_config(&config));
                    std::fs::write(&path, page.into_string())?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&view)?),
            }
        }
        Command::Add(entry) => {
            let config = load_config(cli.config.as_deref())?;
            let mut editor = admin_editor(&config, cli.password.as_deref()).await?;
            let draft = LinkDraft {
                title: entry.title.clone().unwrap_or_default(),
                url: entry.url.clone().unwrap_or_default(),
                category: entry
                    .category
                    .as_deref()
                    .map(Category::parse)
                    .unwrap_or_default(),
                desc: entry.desc.clone().unwrap_or_default(),
                image: entry.image.clone(),
            };
            let submitted = editor.submit(form(draft, &entry)?).await?;
            let id = submitted.id;
            output::print_mutation("Created", id, submitted.wait().await?);
        }
        Command::Edit {
            id,
            entry,
            clear_image,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mut editor = admin_editor(&config, cli.password.as_deref()).await?;
            let mut draft = editor.begin_edit(id)?;
            if let Some(title) = &entry.title {
                draft.title = title.clone();
            }
            if let Some(url) = &entry.url {
                draft.url = url.clone();
            }
            if let Some(category) = &entry.category {
                draft.category = Category::parse(category);
            }
            if let Some(desc) = &entry.desc {
                draft.desc = desc.clone();
            }
            if entry.image.is_some() || clear_image {
                draft.image = entry.image.clone();
            }
            let submitted = editor.submit(form(draft, &entry)?).await?;
            output::print_mutation("Updated", id, submitted.wait().await?);
        }
        Command::Delete { id, yes } => {
            let config = load_config(cli.config.as_deref())?;
            let mut editor = admin_editor(&config, cli.password.as_deref()).await?;
            let confirmation = if yes {
                Confirmation::Confirmed
            } else {
                Confirmation::Declined
            };
            if !editor.delete(id, confirmation)? {
                if yes {
                    println!("No entry with id {id}");
                } else {
                    println!("Not deleted: pass --yes to confirm");
                }
                return Ok(());
            }
            output::print_mutation("Deleted", id, editor.persist().wait().await?);
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` overrides the default level: `info` for the
/// service, `warn` for one-shot commands so stdout stays readable.
fn init_tracing(serving: bool) {
    let default_level = if serving { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

fn link_store(config: &AppConfig) -> Result<HttpLinkStore, Box<dyn std::error::Error>> {
    Ok(HttpLinkStore::new(
        &config.client,
        LocalCache::new(&config.cache.dir),
    )?)
}

/// A loaded editor with the admin session unlocked.
async fn admin_editor(
    config: &AppConfig,
    password: Option<&str>,
) -> Result<Editor, Box<dyn std::error::Error>> {
    let password = password.ok_or("admin password required (--password or LINK_GALLERY_PASSWORD)")?;
    let store: Arc<dyn LinkStore> = Arc::new(link_store(config)?);
    let mut editor = Editor::new(
        store,
        Some(BlobPublisher::new(&config.client)?),
        Session::new(&config.admin.password_sha256),
        EditorSettings::from_config(config),
    );
    editor.login(password)?;
    editor.load().await;
    Ok(editor)
}

fn form(draft: LinkDraft, entry: &EntryArgs) -> Result<SubmitForm, Box<dyn std::error::Error>> {
    let upload = match entry.image_file.as_deref() {
        Some(path) => {
            check_image_extension(path)?;
            Some(ImageUpload::from_path(path)?)
        }
        None => None,
    };
    Ok(SubmitForm { draft, upload })
}

/// Reject files the thumbnail decoder cannot read before uploading anything.
fn check_image_extension(path: &Path) -> Result<(), String> {
    let accepted = supported_input_extensions();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if accepted.iter().any(|a| *a == ext) {
        Ok(())
    } else {
        Err(format!(
            "{}: unsupported image type (accepted: {})",
            path.display(),
            accepted.join(", ")
        ))
    }
}
