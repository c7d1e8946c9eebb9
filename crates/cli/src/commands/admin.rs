//! Back-office commands.
//!
//! Every action except `login` needs a stored back-office session.

use std::path::{Path, PathBuf};

use avira_vastra_core::{Email, OrderStatus, Price, ProductId};
use avira_vastra_storefront::AppState;
use avira_vastra_storefront::models::{Credentials, ProductInput, Taxonomy, TaxonomyInput};
use avira_vastra_storefront::navigation::Notice;
use avira_vastra_storefront::services::account;
use avira_vastra_storefront::services::admin::{filter_orders, search_customers};
use clap::Subcommand;
use rust_decimal::Decimal;

use super::orders::print_order_line;
use super::products::parse_taxonomy;
use super::{CliError, CommandResult, say};

const SIGN_IN_REQUIRED: &str = "Sign in to the back-office first";

#[derive(Subcommand)]
pub enum AdminAction {
    /// Sign in to the back-office
    Login {
        #[arg(short, long)]
        email: Email,

        #[arg(short, long)]
        password: String,
    },
    /// Sign out of the back-office
    Logout,
    /// Dashboard figures and recent orders
    Stats,
    /// List customers
    Customers {
        /// Filter by name, email or phone
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List orders
    Orders {
        /// Only orders in this status
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Change an order's fulfilment status
    OrderStatus {
        id: String,
        status: OrderStatus,
    },
    /// Upload an image and print its URL
    Upload {
        path: PathBuf,
    },
    /// Show or change the announcement banner
    Banner {
        /// New banner text
        #[arg(short, long)]
        text: Option<String>,

        #[arg(long, conflicts_with = "hide")]
        show: bool,

        #[arg(long)]
        hide: bool,
    },
    /// Manage categories, occasions and collections
    Taxonomy {
        #[command(subcommand)]
        action: TaxonomyAction,
    },
    /// Manage products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
pub enum TaxonomyAction {
    List {
        #[arg(value_parser = parse_taxonomy)]
        kind: Taxonomy,
    },
    Create {
        #[arg(value_parser = parse_taxonomy)]
        kind: Taxonomy,
        #[command(flatten)]
        fields: TaxonomyFields,
    },
    Update {
        #[arg(value_parser = parse_taxonomy)]
        kind: Taxonomy,
        id: String,
        #[command(flatten)]
        fields: TaxonomyFields,
    },
    Delete {
        #[arg(value_parser = parse_taxonomy)]
        kind: Taxonomy,
        id: String,
    },
}

#[derive(clap::Args)]
pub struct TaxonomyFields {
    #[arg(short, long)]
    title: String,

    #[arg(long, default_value = "")]
    subtitle: String,

    /// Derived from the title when omitted
    #[arg(long, default_value = "")]
    slug: String,

    #[arg(long, default_value = "")]
    image: String,

    #[arg(long, default_value_t = 0)]
    sort_order: i32,
}

impl TaxonomyFields {
    fn input(&self) -> TaxonomyInput {
        TaxonomyInput::new(
            &self.title,
            &self.subtitle,
            &self.slug,
            &self.image,
            self.sort_order,
        )
    }
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// Create a product
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        price: Decimal,

        #[arg(long)]
        discounted_price: Option<Decimal>,

        #[arg(short, long, default_value_t = 0)]
        stock: u32,

        /// Category ID
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Image URL; repeat for more
        #[arg(long = "image")]
        images: Vec<String>,

        /// Create hidden from the storefront
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a product
    Delete {
        id: String,
    },
}

pub async fn run(state: &AppState, action: AdminAction) -> CommandResult {
    let api = state.admin_api();
    let session = state.admin_session();

    match action {
        AdminAction::Login { email, password } => {
            let credentials = Credentials {
                email: email.into_inner(),
                password,
            };
            let admin = account::admin_login(api, session, &credentials).await?;
            say!("Signed in to the back-office as {}", admin.name);
            return Ok(());
        }
        AdminAction::Logout => {
            session.logout();
            say!("Signed out of the back-office");
            return Ok(());
        }
        _ if !session.is_authenticated() => {
            return Err(CliError::Refused(Notice::error(SIGN_IN_REQUIRED)));
        }
        AdminAction::Stats => {
            let dashboard = api.dashboard().await?;
            let stats = &dashboard.stats;
            say!("Revenue:        {}", Price::inr(stats.revenue));
            say!("Orders:         {}", stats.total_orders);
            say!("Pending orders: {}", stats.pending_orders);
            say!("Products:       {}", stats.total_products);
            if !dashboard.recent_orders.is_empty() {
                say!();
                say!("Recent orders:");
                for order in &dashboard.recent_orders {
                    print_order_line(order)?;
                }
            }
        }
        AdminAction::Customers { search } => {
            let customers = api.customers().await?;
            let term = search.unwrap_or_default();
            for customer in search_customers(&customers, &term) {
                say!(
                    "{:<26} {:<28} {:<32} {:>3} orders",
                    customer.id,
                    customer.name,
                    customer.email,
                    customer.total_orders
                );
            }
        }
        AdminAction::Orders { status } => {
            let orders = api.list_orders().await?;
            for order in filter_orders(&orders, status) {
                print_order_line(order)?;
            }
        }
        AdminAction::OrderStatus { id, status } => {
            let order = api.update_order_status(&id, status).await?;
            say!(
                "Order {} is now {}",
                order.reference().unwrap_or(order.id.as_str()),
                order.order_status
            );
        }
        AdminAction::Upload { path } => {
            let bytes = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string();
            let uploaded = api
                .upload_image(&file_name, image_mime(&path), bytes)
                .await?;
            say!("{}", uploaded.url);
        }
        AdminAction::Banner { text, show, hide } => {
            let mut content = api.content().await?;
            if text.is_some() || show || hide {
                if let Some(text) = text {
                    content.banner_text = Some(text);
                }
                if show || hide {
                    content.show_banner = Some(show);
                }
                content = api.update_content(&content).await?;
            }
            let visible = content.show_banner.unwrap_or(false);
            say!(
                "Banner ({}): {}",
                if visible { "shown" } else { "hidden" },
                content.banner_text.as_deref().unwrap_or("")
            );
        }
        AdminAction::Taxonomy { action } => run_taxonomy(state, action).await?,
        AdminAction::Product { action } => run_product(state, action).await?,
    }
    Ok(())
}

async fn run_taxonomy(state: &AppState, action: TaxonomyAction) -> CommandResult {
    let api = state.admin_api();

    match action {
        TaxonomyAction::List { kind } => {
            for item in api.list_taxonomy(kind).await? {
                say!(
                    "{:<26} {:>3} {:<24} {}",
                    item.id,
                    item.sort_order,
                    item.slug.as_deref().unwrap_or("-"),
                    item.title
                );
            }
        }
        TaxonomyAction::Create { kind, fields } => {
            let item = api.create_taxonomy_item(kind, &fields.input()).await?;
            say!("Created {} {}", kind, item.id);
        }
        TaxonomyAction::Update { kind, id, fields } => {
            let item = api.update_taxonomy_item(kind, &id, &fields.input()).await?;
            say!("Updated {} {}", kind, item.id);
        }
        TaxonomyAction::Delete { kind, id } => {
            api.delete_taxonomy_item(kind, &id).await?;
            say!("Deleted {kind} {id}");
        }
    }
    Ok(())
}

async fn run_product(state: &AppState, action: ProductAction) -> CommandResult {
    let api = state.admin_api();

    match action {
        ProductAction::Create {
            name,
            price,
            discounted_price,
            stock,
            category,
            description,
            images,
            inactive,
        } => {
            let input = ProductInput {
                name,
                description,
                price,
                discounted_price,
                images,
                stock,
                category,
                is_active: !inactive,
                ..ProductInput::default()
            };
            let product = api.create_product(&input).await?;
            say!("Created product {}", product.id);
        }
        ProductAction::Delete { id } => {
            api.delete_product(&ProductId::new(id.as_str())).await?;
            say!("Deleted product {id}");
        }
    }
    Ok(())
}

/// MIME type for an image upload, from the file extension.
fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
