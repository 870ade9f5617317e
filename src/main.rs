use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use farm_market::api::{Attachment, Credentials, HttpMarketApi, ListingUpdate, MarketApi};
use farm_market::browse::{BrowseView, ListingBrowser};
use farm_market::checkout::{self, ContactForm};
use farm_market::config::Config;
use farm_market::models::{ListingKind, TransactionStatus};
use farm_market::render;
use farm_market::routes::Route;
use farm_market::scope::ViewScope;
use farm_market::session::{FileTokenStore, GuardOutcome, SessionGuard, TokenStore};
use farm_market::wizard::{ListingDetails, UploadWizard, WizardStep};
use farm_market::{admin::AdminDesk, auth, seller::SellerDesk};
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "farm-market", version, about = "Browse, buy, rent and sell farms")]
struct Cli {
    /// Backend base URL (overrides FARM_MARKET_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and keep the session
    Login(LoginArgs),
    /// Log in to the admin area
    AdminLogin(LoginArgs),
    Logout,
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Check the session for a route, as navigating to it would
    Open { path: String },
    /// List farms, optionally filtered by location
    Browse {
        #[arg(long, value_enum, default_value_t = ViewArg::All)]
        view: ViewArg,
        #[arg(long, short, default_value = "")]
        search: String,
    },
    /// Show one farm
    Show { id: i64 },
    /// Request to buy a farm
    Buy {
        id: i64,
        #[command(flatten)]
        contact: ContactArgs,
    },
    /// Request to rent a farm
    Rent {
        id: i64,
        #[command(flatten)]
        contact: ContactArgs,
        #[arg(long)]
        duration: Option<String>,
    },
    /// Upload a new listing
    Upload(UploadArgs),
    #[command(subcommand)]
    Seller(SellerCommand),
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    /// Route to continue to after logging in
    #[arg(long)]
    next: Option<String>,
}

#[derive(Args)]
struct ContactArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    message: Option<String>,
}

#[derive(Args)]
struct UploadArgs {
    #[arg(long)]
    farm_id: String,
    #[arg(long)]
    location: String,
    /// Size in acres
    #[arg(long)]
    size: String,
    #[arg(long)]
    price: String,
    #[arg(long)]
    quality: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    description: String,
    /// Offer for rent for this long instead of selling
    #[arg(long)]
    rent: Option<String>,
    /// Image files, 4 to 10
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,
    /// Ownership document
    #[arg(long)]
    document: Option<PathBuf>,
}

#[derive(Subcommand)]
enum SellerCommand {
    Listings,
    Edit {
        id: i64,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        sold: Option<bool>,
    },
    Delete { id: i64 },
    Transactions,
    Status {
        id: i64,
        #[arg(value_enum)]
        status: StatusArg,
    },
    DeleteTransaction { id: i64 },
}

#[derive(Subcommand)]
enum AdminCommand {
    Pending,
    Approve { id: i64 },
    Reject { id: i64 },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    All,
    Buy,
    Rent,
}

impl From<ViewArg> for BrowseView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::All => BrowseView::All,
            ViewArg::Buy => BrowseView::Buy,
            ViewArg::Rent => BrowseView::Rent,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Confirmed,
    Cancelled,
}

impl From<StatusArg> for TransactionStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Confirmed => TransactionStatus::Confirmed,
            StatusArg::Cancelled => TransactionStatus::Cancelled,
        }
    }
}

impl From<ContactArgs> for ContactForm {
    fn from(args: ContactArgs) -> Self {
        ContactForm {
            full_name: args.name,
            email: args.email,
            phone: args.phone,
            message: args.message,
            rent_duration: None,
        }
    }
}

/// Await a view's fetch; Ctrl-C cancels it
async fn in_view<F: Future>(fut: F) -> Option<F::Output> {
    let scope = ViewScope::new();
    tokio::select! {
        out = scope.run(fut) => out,
        _ = tokio::signal::ctrl_c() => {
            scope.cancel();
            info!("Cancelled");
            None
        }
    }
}

/// Run the session guard for `route`. Returns true when the view may render.
async fn guard(api: &dyn MarketApi, store: &dyn TokenStore, route: Route) -> bool {
    let guard = SessionGuard::new(api, store);
    if route.requires_session() {
        println!("Checking session...");
    }

    match guard.run(route).await {
        GuardOutcome::Render(route) => {
            debug!("Rendering {}", route);
            true
        }
        GuardOutcome::Redirect { to, next } => {
            match next {
                Some(next) => println!("Please log in first: {} (then continue to {})", to, next),
                None => println!("Redirecting to {}", to),
            }
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url);
    }
    debug!("Using backend {}", config.api_url);

    let api = HttpMarketApi::from_config(&config).context("Failed to create HTTP client")?;
    let store = FileTokenStore::new(config.session_file.clone());

    match cli.command {
        Command::Login(args) => {
            if !guard(&api, &store, Route::Login).await {
                return Ok(());
            }
            let next = args.next.as_deref().map(str::parse::<Route>).transpose()?;
            let credentials = Credentials {
                email: args.email,
                password: args.password,
            };
            let to = auth::login(&api, &store, &credentials, next).await?;
            println!("✅ Logged in, continue to {}", to);
        }
        Command::AdminLogin(args) => {
            if !guard(&api, &store, Route::AdminLogin).await {
                return Ok(());
            }
            let next = args.next.as_deref().map(str::parse::<Route>).transpose()?;
            let credentials = Credentials {
                email: args.email,
                password: args.password,
            };
            let to = auth::admin_login(&api, &store, &credentials, next).await?;
            println!("✅ Admin logged in, continue to {}", to);
        }
        Command::Logout => {
            auth::logout(&store)?;
            println!("Logged out");
        }
        Command::Refresh => {
            auth::refresh(&api, &store).await?;
            println!("Session refreshed");
        }
        Command::Open { path } => {
            let route: Route = path.parse()?;
            if guard(&api, &store, route.clone()).await {
                println!("{} is available", route);
            }
        }
        Command::Browse { view, search } => {
            let Some(browser) = in_view(ListingBrowser::load(&api, view.into())).await else {
                return Ok(());
            };
            let browser = browser?;
            let visible = browser.visible(&search);
            for listing in &visible {
                println!("{}", render::listing_card(listing));
            }
            info!("Showing {} of {} listings", visible.len(), browser.len());
        }
        Command::Show { id } => {
            if let Some(listing) = in_view(checkout::load_listing(&api, id)).await {
                println!("{}", render::listing_detail(&listing?));
            }
        }
        Command::Buy { id, contact } => {
            let Some(listing) = in_view(checkout::load_listing(&api, id)).await else {
                return Ok(());
            };
            let receipt = checkout::purchase(&api, &listing?, &contact.into()).await?;
            print_receipt(&receipt);
        }
        Command::Rent {
            id,
            contact,
            duration,
        } => {
            let Some(listing) = in_view(checkout::load_listing(&api, id)).await else {
                return Ok(());
            };
            let mut form: ContactForm = contact.into();
            form.rent_duration = duration;
            let receipt = checkout::rent(&api, &listing?, &form).await?;
            print_receipt(&receipt);
        }
        Command::Upload(args) => {
            if !guard(&api, &store, Route::SellerUpload).await {
                return Ok(());
            }
            upload(&api, &store, args).await?;
        }
        Command::Seller(command) => {
            let route = match command {
                SellerCommand::Transactions | SellerCommand::Status { .. } => Route::SellerTransactions,
                _ => Route::SellerListings,
            };
            if !guard(&api, &store, route).await {
                return Ok(());
            }
            seller(&api, &store, command).await?;
        }
        Command::Admin(command) => {
            if !guard(&api, &store, Route::AdminHome).await {
                return Ok(());
            }
            admin(&api, &store, command).await?;
        }
    }

    Ok(())
}

fn print_receipt(receipt: &checkout::Receipt) {
    println!("✅ Request recorded: {}", render::transaction_row(&receipt.transaction));
    if receipt.email_sent {
        println!("📧 Confirmation sent to {}", receipt.transaction.email);
    } else {
        println!("⚠️  Request recorded, but the confirmation email could not be sent");
    }
}

async fn upload(api: &dyn MarketApi, store: &dyn TokenStore, args: UploadArgs) -> Result<()> {
    let mut wizard = UploadWizard::new();
    wizard.details = ListingDetails {
        farm_id: args.farm_id,
        location: args.location,
        size: args.size,
        price: args.price,
        quality: args.quality,
        email: args.email,
        phone: args.phone,
        description: args.description,
        kind: if args.rent.is_some() {
            ListingKind::Rent
        } else {
            ListingKind::Sale
        },
        rent_duration: args.rent.unwrap_or_default(),
    };
    wizard.next()?;

    wizard.select_image_files(args.images.as_slice()).await?;

    if let Some(path) = &args.document {
        let document = Attachment::from_path(path)
            .await
            .with_context(|| format!("Failed to read document {}", path.display()))?;
        wizard.attach_document(Some(document));
    }
    let step = wizard.next()?;
    debug_assert_eq!(step, WizardStep::Confirmation);
    println!(
        "Step {}/3: uploading {} with {} images",
        step.index() + 1,
        wizard.details.farm_id,
        wizard.images().len()
    );

    let (listing, next) = wizard.submit(api, store).await?;
    println!("✅ Uploaded {}", render::listing_card(&listing));
    println!("Continue to {}", next);
    Ok(())
}

async fn seller(api: &dyn MarketApi, store: &dyn TokenStore, command: SellerCommand) -> Result<()> {
    let desk = SellerDesk::open(api, store)?;
    match command {
        SellerCommand::Listings => {
            if let Some(listings) = in_view(desk.listings()).await {
                for listing in listings? {
                    println!("{}", render::listing_card(&listing));
                }
            }
        }
        SellerCommand::Edit {
            id,
            price,
            location,
            description,
            sold,
        } => {
            let update = ListingUpdate {
                price,
                location,
                description,
                sold,
                ..Default::default()
            };
            let listing = desk.update_listing(id, &update).await?;
            println!("Updated {}", render::listing_card(&listing));
        }
        SellerCommand::Delete { id } => {
            desk.delete_listing(id).await?;
            println!("Deleted listing {}", id);
        }
        SellerCommand::Transactions => {
            if let Some(transactions) = in_view(desk.transactions()).await {
                for transaction in transactions? {
                    println!("{}", render::transaction_row(&transaction));
                }
            }
        }
        SellerCommand::Status { id, status } => {
            let change = desk.set_transaction_status(id, status.into()).await?;
            println!("Updated {}", render::transaction_row(&change.transaction));
            if change.sold_update_failed {
                println!("⚠️  Transaction confirmed, but listing {} could not be marked sold", change.transaction.listing);
            }
        }
        SellerCommand::DeleteTransaction { id } => {
            desk.delete_transaction(id).await?;
            println!("Deleted transaction {}", id);
        }
    }
    Ok(())
}

async fn admin(api: &dyn MarketApi, store: &dyn TokenStore, command: AdminCommand) -> Result<()> {
    let desk = AdminDesk::open(api, store)?;
    match command {
        AdminCommand::Pending => {
            if let Some(listings) = in_view(desk.pending()).await {
                let listings = listings?;
                for listing in &listings {
                    println!("{}", render::listing_detail(listing));
                }
                info!("{} listings awaiting review", listings.len());
            }
        }
        AdminCommand::Approve { id } => {
            let listing = desk.approve(id).await?;
            println!("Approved {}", render::listing_card(&listing));
        }
        AdminCommand::Reject { id } => {
            let listing = desk.reject(id).await?;
            println!("Rejected {}", render::listing_card(&listing));
        }
    }
    Ok(())
}
