mod terminal;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terminal::{PageTracker, TerminalNotifier};
use vcrs_client::auth::LoginForm;
use vcrs_client::models::{ComplaintStatus, Credentials, ImageAttachment, NewComplaint, Registration};
use vcrs_client::render::ViewRenderer;
use vcrs_client::session::logout;
use vcrs_client::{
    Capabilities, ClientConfig, ClientError, FileSessionStore, HtmlDocument, HttpBackend, Page,
    PageController, PageEvent, PageView, SessionStore,
};

/// Upper bound on chained redirects followed after a command.
const MAX_REDIRECTS: usize = 4;

#[derive(Parser)]
#[command(name = "vcrs")]
#[command(version, about = "Village Complaint Redressal System client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Complaint service base URL (overrides VCRS_API_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session file (overrides VCRS_SESSION_FILE)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Write the rendered page to this file instead of stdout
    #[arg(long, global = true)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a citizen account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in and open the role's home page
    Login {
        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,

        /// Use the admin login form
        #[arg(long)]
        admin: bool,
    },
    /// Clear the stored session
    Logout,
    /// File a new complaint
    ///
    /// Examples:
    ///     vcrs submit --title "Broken pump" --category Water --location "Ward 3"
    ///     vcrs submit --title "Pothole" --category Roads --image ./pothole.jpg
    ///     vcrs submit --title "Dark street" --category Electricity --field landmark=school
    #[command(verbatim_doc_comment)]
    Submit {
        #[arg(long)]
        title: String,

        #[arg(long)]
        category: String,

        #[arg(long, default_value = "")]
        location: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Extra form field (format: key=value), can be repeated
        #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Image to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Open a page: landing, register, citizen-submit, citizen-status, admin-dashboard
    Open {
        page: Page,

        /// Print the fetched complaints as JSON instead of the page
        #[arg(short, long)]
        json: bool,
    },
    /// Change a complaint's status (admin)
    SetStatus {
        /// Complaint id
        id: String,

        /// Pending, In-Progress or Resolved
        status: ComplaintStatus,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the stored session
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,vcrs=info,vcrs_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Failed to load VCRS_ configuration")?;
    if let Some(url) = cli.api_url {
        config = config.with_api_base_url(url);
    }
    if let Some(path) = cli.session_file {
        config = config.with_session_file(path);
    }

    let session_path = config.session_path()?;
    let store = Arc::new(
        FileSessionStore::open(&session_path)
            .with_context(|| format!("Failed to open session file {:?}", session_path))?,
    );
    let assume_yes = matches!(cli.command, Commands::SetStatus { yes: true, .. });
    let tracker = Arc::new(PageTracker::default());
    let caps = Capabilities::new(
        store,
        Arc::new(TerminalNotifier::new(assume_yes)),
        tracker.clone(),
    );

    let document = Arc::new(HtmlDocument::new());
    let controller = PageController::new(
        Arc::new(HttpBackend::new(&config)?),
        caps.clone(),
        document.clone(),
        ViewRenderer::new(&config.api_base_url)?,
    );

    let mut app = App {
        controller,
        caps,
        document,
        tracker,
        out: cli.out,
    };

    match app.run(cli.command).await {
        Ok(()) => Ok(()),
        // Flow failures have already been shown to the user.
        Err(e) if e.downcast_ref::<ClientError>().is_some() => {
            tracing::debug!(error = %e, "Command failed");
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}

struct App {
    controller: PageController,
    caps: Capabilities,
    document: Arc<HtmlDocument>,
    tracker: Arc<PageTracker>,
    out: Option<PathBuf>,
}

impl App {
    async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Register {
                name,
                email,
                password,
            } => {
                let password = password_or_prompt(password)?;
                self.controller.load(Page::Register).await?;
                self.controller
                    .dispatch(PageEvent::Register(Registration {
                        name,
                        email,
                        password,
                    }))
                    .await?;
            }
            Commands::Login {
                email,
                password,
                admin,
            } => {
                let password = password_or_prompt(password)?;
                let form = if admin {
                    LoginForm::Admin
                } else {
                    LoginForm::Citizen
                };
                self.controller.load(Page::Landing).await?;
                self.controller
                    .dispatch(PageEvent::Login {
                        credentials: Credentials { email, password },
                        form,
                    })
                    .await?;
            }
            Commands::Logout => {
                if self.caps.store.session()?.is_none() {
                    println!("Not logged in.");
                    return Ok(());
                }
                logout(&self.caps)?;
            }
            Commands::Submit {
                title,
                category,
                location,
                description,
                fields,
                image,
            } => {
                let image = image.as_deref().map(read_image).transpose()?;
                if let PageView::Redirected(_) = self.controller.load(Page::CitizenSubmit).await? {
                    bail!("Log in as a citizen to submit complaints");
                }
                self.controller
                    .dispatch(PageEvent::SubmitComplaint(NewComplaint {
                        title,
                        category,
                        location,
                        description,
                        fields: fields.into_iter().collect::<BTreeMap<_, _>>(),
                        image,
                    }))
                    .await?;
            }
            Commands::Open { page, json } => {
                let view = self.controller.load(page).await?;
                let view = self.follow(view).await?;
                if json {
                    return print_json(page, view);
                }
                return self.emit();
            }
            Commands::SetStatus { id, status, .. } => {
                if let PageView::Redirected(_) = self.controller.load(Page::AdminDashboard).await? {
                    bail!("Log in as an admin to change complaint status");
                }
                self.controller
                    .dispatch(PageEvent::ChangeStatus {
                        complaint_id: id,
                        status,
                    })
                    .await?;
            }
            Commands::Whoami => {
                match self.caps.store.session()? {
                    Some(session) => {
                        println!("Role:    {}", session.role);
                        println!("User ID: {}", session.user_id);
                    }
                    None => println!("Not logged in."),
                }
                return Ok(());
            }
        }

        self.follow(PageView::Static).await?;
        self.emit()
    }

    /// Load every page the flows navigated to, in order.
    async fn follow(&mut self, mut view: PageView) -> Result<PageView> {
        for _ in 0..MAX_REDIRECTS {
            let Some(page) = self.tracker.take() else {
                return Ok(view);
            };
            view = self.controller.load(page).await?;
        }
        bail!("Too many redirects");
    }

    fn emit(&self) -> Result<()> {
        if self.document.page().is_none() {
            return Ok(());
        }
        let html = self.document.to_html();
        match &self.out {
            Some(path) => {
                fs::write(path, html).context(format!("Failed to write {:?}", path))?;
                println!("Page written to {:?}", path);
            }
            None => print!("{}", html),
        }
        Ok(())
    }
}

fn print_json(page: Page, view: PageView) -> Result<()> {
    let value = match view {
        PageView::Citizen(complaints) => serde_json::to_value(complaints)?,
        PageView::Dashboard { complaints, counts } => serde_json::json!({
            "counts": counts,
            "complaints": complaints,
        }),
        PageView::Redirected(target) => bail!("{} redirected to {}", page, target),
        PageView::Static => bail!("{} has no complaint data", page),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => rpassword::prompt_password("Password: ").context("Failed to read password"),
    }
}

fn parse_field(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid field '{}', expected KEY=VALUE", s)),
    }
}

fn read_image(path: &Path) -> Result<ImageAttachment> {
    let bytes = fs::read(path).context(format!("Failed to read image {:?}", path))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(ImageAttachment {
        content_type: content_type_for(path).to_string(),
        file_name,
        bytes,
    })
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
