//! Seed the catalog from a YAML file.
//!
//! Categories are created in file order and may name a parent by slug,
//! either one defined earlier in the file or one already in the database.
//! Products name their category the same way. Rows that already exist
//! (same category slug, same product name) are skipped, so a seed file can
//! be re-applied safely.
//!
//! ```yaml
//! categories:
//!   - name: Furniture
//!   - name: Chairs
//!     parent: furniture
//! products:
//!   - name: Oak Chair
//!     price: "129.00"
//!     category: chairs
//!     color: oak
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use hearth_admin::db::{
    self, CategoryDraft, CategoryRepository, MutationError, ProductDraft, ProductRepository,
};
use hearth_core::{CategoryId, Slug, SlugError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid slug {slug:?}: {source}")]
    Slug { slug: String, source: SlugError },

    #[error("Unknown category {0:?}")]
    UnknownCategory(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Mutation(#[from] MutationError),
}

/// Top level of a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// Parent slug.
    #[serde(default)]
    pub parent: Option<String>,
}

impl SeedCategory {
    /// The slug this category will be stored under.
    fn slug(&self) -> Result<Slug, SeedError> {
        match self.slug.as_deref() {
            Some(raw) => parse_slug(raw),
            None => Ok(Slug::from_name(&self.name)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    #[serde(flatten)]
    pub draft: ProductDraft,
    /// Category slug.
    #[serde(default)]
    pub category: Option<String>,
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub categories_skipped: usize,
    pub products_created: usize,
    pub products_skipped: usize,
}

fn parse_slug(raw: &str) -> Result<Slug, SeedError> {
    Slug::parse(raw.trim()).map_err(|source| SeedError::Slug {
        slug: raw.to_owned(),
        source,
    })
}

/// Parse a seed file's contents.
///
/// # Errors
///
/// Returns `SeedError::Parse` for malformed YAML.
pub fn parse(content: &str) -> Result<SeedFile, SeedError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Load `file_path` into the database named by `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a slug cannot be
/// resolved, or a write fails.
pub async fn run(file_path: &Path) -> Result<SeedReport, SeedError> {
    let content =
        tokio::fs::read_to_string(file_path)
            .await
            .map_err(|source| SeedError::Read {
                path: file_path.display().to_string(),
                source,
            })?;
    let seed = parse(&content)?;
    info!(
        path = %file_path.display(),
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Parsed seed file"
    );

    let database_url = super::database_url().ok_or(SeedError::MissingEnvVar("DATABASE_URL"))?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let mut report = SeedReport::default();
    let categories = CategoryRepository::new(&pool);
    let mut known: HashMap<Slug, CategoryId> = HashMap::new();

    for entry in &seed.categories {
        let slug = entry.slug()?;
        let parent_id = match entry.parent.as_deref() {
            Some(parent) => Some(resolve(&categories, &mut known, parent).await?),
            None => None,
        };

        if let Some(existing) = categories.find_by_slug(&slug).await? {
            known.insert(slug, existing.id);
            report.categories_skipped += 1;
            continue;
        }

        let draft = CategoryDraft {
            name: entry.name.clone(),
            slug: Some(slug.to_string()),
            parent_id,
        };
        let created = categories.create(&draft).await?;
        known.insert(created.slug, created.id);
        report.categories_created += 1;
    }

    let products = ProductRepository::new(&pool);
    let mut existing_names: HashSet<String> = products
        .list()
        .await?
        .into_iter()
        .map(|product| product.name)
        .collect();

    for entry in &seed.products {
        if existing_names.contains(entry.draft.name.trim()) {
            report.products_skipped += 1;
            continue;
        }

        let mut draft = entry.draft.clone();
        if let Some(category) = entry.category.as_deref() {
            draft.category_id = Some(resolve(&categories, &mut known, category).await?);
        }
        let created = products.create(&draft).await?;
        existing_names.insert(created.name);
        report.products_created += 1;
    }

    if report.categories_skipped + report.products_skipped > 0 {
        warn!(
            categories = report.categories_skipped,
            products = report.products_skipped,
            "Skipped rows that already exist"
        );
    }
    Ok(report)
}

/// Resolve a category slug from this run or the database.
async fn resolve(
    categories: &CategoryRepository<'_>,
    known: &mut HashMap<Slug, CategoryId>,
    raw: &str,
) -> Result<CategoryId, SeedError> {
    let slug = parse_slug(raw)?;
    if let Some(id) = known.get(&slug) {
        return Ok(*id);
    }
    let category = categories
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| SeedError::UnknownCategory(raw.to_owned()))?;
    known.insert(slug, category.id);
    Ok(category.id)
}
