//! Ventura admin CLI
//!
//! Operator front end for the marketplace approval workflow: log in, inspect
//! the dashboard counters and pending queue, decide reviews, open review
//! pages by URL and manage user accounts.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use ventura_admin::{
    AdminDashboard, AdminRoute, PageState, PendingAction, PitchDeckReviewPage, PitchDeckRoute,
    ProfileReviewPage, RejectForm, StatsStore, UserDirectory, UserViewPage, WorkflowError,
    dashboard::stat_cards,
};
use ventura_client::{
    ClientError, CreateUserRequest, FileTokenStore, HttpClient, SessionEvent, TokenStore,
};
use ventura_core::{ApprovalItem, Config, ProfileDetails, Role, UserListItem};

/// Command line interface for the Ventura admin workflow
#[derive(Parser)]
#[command(
    name = "ventura-admin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Approval workflow for the Ventura marketplace",
    long_about = "Review pending investor, mentor and pitch-deck submissions, manage user accounts and follow the admin dashboard counters from the terminal."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API base URL (overrides config)
    #[arg(long, env = "VENTURA_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    /// Aligned text
    #[default]
    Table,
    /// JSON document
    Json,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session tokens
    Login {
        /// Admin email
        #[arg(long, env = "VENTURA_ADMIN_EMAIL")]
        email: String,

        /// Admin password
        #[arg(long, env = "VENTURA_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Discard the stored session tokens
    Logout,

    /// Show dashboard counters
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },

    /// List pending approvals
    Pending {
        /// Only show this role (venture, investor, mentor)
        #[arg(short, long)]
        role: Option<Role>,

        /// Filter by submitter name or email
        #[arg(short, long)]
        search: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },

    /// Approve a pending review
    Approve {
        /// Review identifier
        #[arg(value_name = "REVIEW_ID")]
        review_id: String,
    },

    /// Reject a pending review
    Reject {
        /// Review identifier
        #[arg(value_name = "REVIEW_ID")]
        review_id: String,

        /// Reason shown to the submitter
        #[arg(short, long)]
        reason: String,
    },

    /// Open a review or user page by URL
    Review {
        /// Page URL, e.g. /dashboard/admin/profile-review?reviewId=R1
        #[arg(value_name = "URL")]
        url: String,

        /// Approve the review after showing it
        #[arg(long, conflicts_with = "reject")]
        approve: bool,

        /// Reject the review with this reason after showing it
        #[arg(long, value_name = "REASON")]
        reject: Option<String>,
    },

    /// Delete the product behind a pitch-deck review
    DeleteProduct {
        /// Pitch-deck review identifier
        #[arg(value_name = "REVIEW_ID")]
        review_id: String,

        /// Product identifier, if the review does not carry one
        #[arg(long)]
        product_id: Option<String>,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Manage user accounts
    Users {
        /// User management subcommand
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Show the resolved configuration
    Config,
}

/// User management commands
#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List {
        /// Only show this role
        #[arg(short, long)]
        role: Option<Role>,

        /// Filter by name or email
        #[arg(short, long)]
        search: Option<String>,

        /// Page number
        #[arg(short, long)]
        page: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: Format,
    },

    /// Create a user account
    Create {
        /// Login email
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Account role (venture, investor, mentor, admin)
        #[arg(long)]
        role: Role,

        /// Initial password
        #[arg(long, env = "VENTURA_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show one user
    Show {
        /// User identifier
        #[arg(value_name = "USER_ID")]
        user_id: String,
    },

    /// Allow a user to log in
    Activate {
        /// User identifier
        #[arg(value_name = "USER_ID")]
        user_id: String,
    },

    /// Prevent a user from logging in
    Deactivate {
        /// User identifier
        #[arg(value_name = "USER_ID")]
        user_id: String,
    },

    /// Delete a user
    Delete {
        /// User identifier
        #[arg(value_name = "USER_ID")]
        user_id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Main entry point for the admin CLI
///
/// # Errors
///
/// Returns error if configuration, logging or the requested command fails
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.api_url.clone() {
        config.api.base_url = url;
    }
    if let Some(level) = cli.log_level.clone() {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
    ventura_core::init_logging(&config.logging).context("Failed to initialize logging")?;

    if matches!(cli.command, Commands::Config) {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    config
        .ensure_token_dir()
        .context("Failed to create token directory")?;
    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.auth.token_file));
    let (services, http) = ventura_client::Services::http(&config, tokens)?;
    watch_session(&http);

    let app = App {
        services,
        http,
        stats: StatsStore::default(),
    };

    match app.run(cli.command).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let expired = err
                .downcast_ref::<WorkflowError>()
                .is_some_and(WorkflowError::is_session_expired)
                || err
                    .downcast_ref::<ClientError>()
                    .is_some_and(ClientError::is_auth_failure);
            if expired {
                eprintln!("Session expired. Run `ventura-admin login` to sign in again.");
            }
            Err(err)
        }
    }
}

/// Log session lifecycle events as they happen
fn watch_session(http: &HttpClient) {
    let mut events = http.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::TokensRefreshed => info!("Session tokens refreshed"),
                SessionEvent::LoginRequired { redirect_to } => {
                    warn!(redirect_to = %redirect_to, "Session ended, login required");
                }
            }
        }
    });
}

struct App {
    services: ventura_client::Services,
    http: Arc<HttpClient>,
    stats: StatsStore,
}

impl App {
    async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Login { email, password } => {
                self.services.auth.login(&email, &password).await?;
                println!("Logged in as {}", email.trim());
            }
            Commands::Logout => {
                self.services.auth.logout().await?;
                println!("Logged out");
            }
            Commands::Stats { format } => self.stats_command(format).await?,
            Commands::Pending {
                role,
                search,
                format,
            } => self.pending(role, search, format).await?,
            Commands::Approve { review_id } => {
                self.require_session()?;
                let notice = PendingAction::approve(review_id)
                    .submit(self.services.admin.as_ref(), &self.stats)
                    .await?;
                print_notice(Some(&notice));
            }
            Commands::Reject { review_id, reason } => {
                self.require_session()?;
                let notice = PendingAction::reject(review_id, RejectForm::new(reason))?
                    .submit(self.services.admin.as_ref(), &self.stats)
                    .await?;
                print_notice(Some(&notice));
            }
            Commands::Review {
                url,
                approve,
                reject,
            } => self.review(&url, approve, reject).await?,
            Commands::DeleteProduct {
                review_id,
                product_id,
                yes,
            } => self.delete_product(review_id, product_id, yes).await?,
            Commands::Users { action } => self.users(action).await?,
            Commands::Config => {}
        }
        Ok(())
    }

    fn require_session(&self) -> Result<()> {
        if !self.http.is_authenticated()? {
            bail!("Not logged in. Run `ventura-admin login` first.");
        }
        Ok(())
    }

    async fn stats_command(&self, format: Format) -> Result<()> {
        self.require_session()?;
        let stats = self.stats.refresh(self.services.admin.as_ref()).await;
        match format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
            Format::Table => {
                for card in stat_cards(&stats) {
                    println!("{:<20} {:>8}", card.label, card.value);
                }
            }
        }
        Ok(())
    }

    async fn pending(&self, role: Option<Role>, search: Option<String>, format: Format) -> Result<()> {
        self.require_session()?;
        let mut dashboard = AdminDashboard::new(self.stats.clone());
        dashboard.load(self.services.admin.as_ref()).await;

        let queue = dashboard.queue_mut();
        queue.set_role(role);
        queue.set_search(search.unwrap_or_default());

        let queue = dashboard.queue();
        let rows = queue.visible();
        match format {
            Format::Json => {
                let items: Vec<&ApprovalItem> = rows.iter().map(|row| row.item).collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
            Format::Table => {
                if let Some(message) = queue.empty_message() {
                    println!("{message}");
                    return Ok(());
                }
                println!(
                    "{:<12} {:<9} {:<28} {:<24} {}",
                    "REVIEW", "ROLE", "SUBMITTER", "SUBMITTED", "OPEN"
                );
                for row in rows {
                    println!(
                        "{:<12} {:<9} {:<28} {:<24} {}",
                        row.item.id,
                        row.item.role,
                        row.item.display_name(),
                        row.item.submitted_at.format("%Y-%m-%d %H:%M"),
                        row.route
                    );
                }
            }
        }
        Ok(())
    }

    async fn review(&self, url: &str, approve: bool, reject: Option<String>) -> Result<()> {
        self.require_session()?;
        let route = AdminRoute::parse(url)?;
        let admin = self.services.admin.as_ref();

        match &route {
            AdminRoute::ProfileReview { .. } => {
                let mut page = ProfileReviewPage::from_route(&route, self.stats.clone())?;
                page.load(admin, self.services.profiles.as_ref()).await;
                let Some(data) = page.state().ready() else {
                    println!("{}", page.not_found_message().unwrap_or_default());
                    return Ok(());
                };
                print_item(&data.item);
                print_profile(&data.profile);

                if approve {
                    println!("{}", page.approve(admin).await?);
                } else if let Some(reason) = reject {
                    println!("{}", page.reject(admin, RejectForm::new(reason)).await?);
                }
            }
            AdminRoute::PitchDeckReview(_) => {
                let mut page = PitchDeckReviewPage::from_route(&route, self.stats.clone())?;
                page.load(admin).await;
                let Some(data) = page.state().ready() else {
                    println!("{}", page.not_found_message().unwrap_or_default());
                    return Ok(());
                };
                print_item(&data.item);
                print_pitch_deck(&data.item);

                if approve {
                    println!("{}", page.approve(admin).await?);
                } else if let Some(reason) = reject {
                    println!("{}", page.reject(admin, RejectForm::new(reason)).await?);
                }
            }
            AdminRoute::UserView { .. } => {
                if approve || reject.is_some() {
                    bail!("User pages have no review decision");
                }
                let mut page = UserViewPage::from_route(&route)?;
                page.load(admin).await;
                match page.state() {
                    PageState::Ready(user) => print_user(user),
                    _ => println!("User not found"),
                }
            }
        }
        Ok(())
    }

    async fn delete_product(
        &self,
        review_id: String,
        product_id: Option<String>,
        yes: bool,
    ) -> Result<()> {
        self.require_session()?;
        let route = PitchDeckRoute {
            product_id,
            ..PitchDeckRoute::new(review_id)
        };
        let mut page = PitchDeckReviewPage::new(route, self.stats.clone());
        page.load(self.services.admin.as_ref()).await;
        let Some(data) = page.state().ready() else {
            bail!("{}", page.not_found_message().unwrap_or("Review not available"));
        };

        let product = data
            .item
            .pitch_deck
            .product_name
            .clone()
            .unwrap_or_else(|| data.product_id.clone());
        if !yes {
            println!("This permanently deletes {product}. Re-run with --yes to confirm.");
            return Ok(());
        }

        page.request_delete()?;
        let notice = page.confirm_delete(self.services.products.as_ref()).await?;
        println!("{notice}");
        Ok(())
    }

    async fn users(&self, action: UserCommands) -> Result<()> {
        self.require_session()?;
        let admin = self.services.admin.as_ref();

        match action {
            UserCommands::List {
                role,
                search,
                page,
                format,
            } => {
                let mut directory = UserDirectory::new();
                directory.set_role(role);
                directory.set_search(search.unwrap_or_default());
                if let Some(page) = page {
                    directory.set_page(page);
                }
                directory.load(admin).await?;

                match format {
                    Format::Json => println!("{}", serde_json::to_string_pretty(directory.users())?),
                    Format::Table => {
                        println!(
                            "{:<10} {:<30} {:<24} {:<9} {}",
                            "USER", "EMAIL", "NAME", "ROLE", "ACTIVE"
                        );
                        for user in directory.users() {
                            println!(
                                "{:<10} {:<30} {:<24} {:<9} {}",
                                user.id,
                                user.email,
                                user.full_name,
                                user.role,
                                if user.is_active { "yes" } else { "no" }
                            );
                        }
                        println!("{} of {} users", directory.users().len(), directory.total());
                    }
                }
            }
            UserCommands::Create {
                email,
                name,
                role,
                password,
            } => {
                let request = CreateUserRequest {
                    email: email.trim().to_string(),
                    full_name: name.trim().to_string(),
                    role,
                    password,
                };
                let user = admin.create_user(&request).await?;
                println!("Created user {}", user.id);
                print_user(&user);
            }
            UserCommands::Show { user_id } => {
                let user = admin.user(&user_id).await?;
                print_user(&user);
            }
            UserCommands::Activate { user_id } => {
                let mut page = UserViewPage::new(user_id);
                page.load(admin).await;
                println!("{}", page.set_active(admin, true).await?);
            }
            UserCommands::Deactivate { user_id } => {
                let mut page = UserViewPage::new(user_id);
                page.load(admin).await;
                println!("{}", page.set_active(admin, false).await?);
            }
            UserCommands::Delete { user_id, yes } => {
                if !yes {
                    println!("This permanently deletes user {user_id}. Re-run with --yes to confirm.");
                    return Ok(());
                }
                let mut page = UserViewPage::new(user_id);
                page.load(admin).await;
                println!("{}", page.delete(admin).await?);
            }
        }
        Ok(())
    }
}

fn print_notice(notice: Option<&ventura_admin::Notice>) {
    if let Some(notice) = notice {
        println!("{notice}");
    }
}

fn print_item(item: &ApprovalItem) {
    println!("Review:     {}", item.id);
    println!("Role:       {}", item.role);
    println!("Status:     {}", item.status);
    println!("Submitter:  {}", item.display_name());
    if let Some(email) = &item.user_email {
        println!("Email:      {email}");
    }
    println!("Submitted:  {}", item.submitted_at.format("%Y-%m-%d %H:%M"));
}

fn print_profile(profile: &ProfileDetails) {
    let fields = [
        ("Name", profile.full_name.clone()),
        ("Organization", profile.organization_name.clone()),
        ("Title", profile.title.clone()),
        ("Location", profile.location.clone()),
        ("LinkedIn", profile.linkedin_url.clone()),
        ("Website", profile.website.clone()),
        ("Industries", profile.industries.as_ref().map(|v| v.join(", "))),
        ("Stages", profile.investment_stages.as_ref().map(|v| v.join(", "))),
        ("Expertise", profile.expertise_areas.as_ref().map(|v| v.join(", "))),
        (
            "Check size",
            match (profile.check_size_min, profile.check_size_max) {
                (Some(min), Some(max)) => Some(format!("{min} - {max}")),
                (Some(min), None) => Some(format!("from {min}")),
                (None, Some(max)) => Some(format!("up to {max}")),
                (None, None) => None,
            },
        ),
        ("Availability", profile.availability.clone()),
        ("Bio", profile.bio.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{:<12}{value}", format!("{label}:"));
        }
    }
}

fn print_pitch_deck(item: &ApprovalItem) {
    let deck = &item.pitch_deck;
    if let Some(name) = &deck.product_name {
        println!("Product:    {name}");
    }
    if let Some(industry) = &deck.industry {
        println!("Industry:   {industry}");
    }
    if let Some(stage) = &deck.funding_stage {
        println!("Stage:      {stage}");
    }
    if let Some(amount) = deck.funding_amount {
        println!("Raising:    {amount}");
    }
    if let Some(problem) = &deck.problem_statement {
        println!("Problem:    {problem}");
    }
    if let Some(url) = &deck.pitch_deck_url {
        println!("Deck:       {url}");
    }
    for (metric, value) in &deck.traction_metrics {
        println!("  {metric}: {value}");
    }
}

fn print_user(user: &UserListItem) {
    println!("User:       {}", user.id);
    println!("Name:       {}", user.full_name);
    println!("Email:      {}", user.email);
    println!("Role:       {}", user.role);
    println!("Active:     {}", user.is_active);
    println!("Verified:   {}", user.is_email_verified);
    println!("Joined:     {}", user.date_joined.format("%Y-%m-%d"));
    for (label, profile) in [
        ("Venture", &user.venture_profile),
        ("Investor", &user.investor_profile),
        ("Mentor", &user.mentor_profile),
    ] {
        if let Some(profile) = profile {
            let status = profile.status.map_or_else(String::new, |s| format!(" ({s})"));
            println!("{label} profile: {}{status}", profile.id);
        }
    }
}
