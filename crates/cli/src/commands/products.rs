//! Catalog browsing commands.

use avira_vastra_core::{Price, ProductId};
use avira_vastra_storefront::AppState;
use avira_vastra_storefront::models::{Product, ProductFilters, Taxonomy};
use avira_vastra_storefront::services::catalog::load_product;
use clap::Subcommand;

use super::{CliError, CommandResult, say};

#[derive(Subcommand)]
pub enum ProductsAction {
    /// List products
    List {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Category slug
        #[arg(long)]
        category: Option<String>,

        /// Occasion slug
        #[arg(long)]
        occasion: Option<String>,

        /// Collection slug
        #[arg(long)]
        collection: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
    /// List a taxonomy (`categories`, `occasions`, `collections`)
    Taxonomy {
        #[arg(value_parser = parse_taxonomy)]
        kind: Taxonomy,
    },
}

pub(crate) fn parse_taxonomy(value: &str) -> Result<Taxonomy, String> {
    value.parse()
}

pub async fn run(state: &AppState, action: ProductsAction) -> CommandResult {
    match action {
        ProductsAction::List {
            search,
            category,
            occasion,
            collection,
            page,
            limit,
        } => {
            let filters = ProductFilters {
                search,
                occasion,
                collection,
                category,
                limit,
                page,
                ..ProductFilters::storefront()
            };
            let products = state.api().list_products(&filters).await?;
            if products.is_empty() {
                say!("No products found");
            }
            for product in &products {
                print_summary(product)?;
            }
        }
        ProductsAction::Show { id } => {
            match load_product(state.api(), &ProductId::new(id)).await {
                Ok(product) => print_detail(&product)?,
                Err(navigation) => {
                    say!("-> {}", navigation.route);
                    if let Some(notice) = navigation.notice {
                        return Err(CliError::Refused(notice));
                    }
                }
            }
        }
        ProductsAction::Taxonomy { kind } => {
            for item in state.api().list_taxonomy(kind).await? {
                let slug = item.slug.as_deref().unwrap_or("-");
                say!("{:<26} {:<24} {}", item.id, slug, item.title);
            }
        }
    }
    Ok(())
}

fn price_label(product: &Product) -> String {
    match product.discounted_price {
        Some(discounted) => format!("{} (was {})", Price::inr(discounted), Price::inr(product.price)),
        None => Price::inr(product.price).to_string(),
    }
}

fn print_summary(product: &Product) -> CommandResult {
    say!(
        "{:<26} {:<40} {:>20}  stock {}",
        product.id,
        product.name,
        price_label(product),
        product.stock
    );
    Ok(())
}

fn print_detail(product: &Product) -> CommandResult {
    say!("{}", product.name);
    say!("  id:     {}", product.id);
    say!("  price:  {}", price_label(product));
    say!("  stock:  {}", product.stock);
    if let Some(weave) = &product.weave_type {
        say!("  weave:  {weave}");
    }
    if let Some(description) = &product.description {
        say!();
        say!("{description}");
    }
    Ok(())
}
