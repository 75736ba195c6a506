use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::{AppError, ResultExt};
use crate::lead::Lead;
use crate::models::LeadRow;
use crate::repository::{LeadQuery, LeadRepository, Pagination, WriteOutcome};

const LEAD_COLUMNS: &str = "id, created, category, description, status, price, \
    contact_first_name, suburb, contact_full_name, contact_email, contact_phone_number, version";

/// PostgreSQL-backed lead storage
pub struct PgLeadRepository {
    pool: PgPool,
}

impl PgLeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM leads WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("checking lead existence")?;

        Ok(exists)
    }
}

/// Escapes LIKE wildcards so the term is matched literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Contact columns in table order: full name, email, phone.
fn contact_columns(lead: &Lead) -> (Option<&str>, Option<&str>, Option<&str>) {
    match lead.contact() {
        Some(contact) => (
            Some(contact.full_name.as_str()),
            Some(contact.email.as_str()),
            Some(contact.phone_number.as_str()),
        ),
        None => (None, None, None),
    }
}

#[async_trait]
impl LeadRepository for PgLeadRepository {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database health check")?;
        Ok(())
    }

    #[tracing::instrument(name = "Fetch lead by id", skip(self))]
    async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads WHERE id = $1",
            LEAD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching lead")?;

        row.map(Lead::try_from).transpose()
    }

    #[tracing::instrument(name = "Query leads", skip(self))]
    async fn query_leads(
        &self,
        query: &LeadQuery,
        pagination: Pagination,
    ) -> Result<Vec<Lead>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM leads WHERE TRUE", LEAD_COLUMNS));

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(term) = &query.search_term {
            let pattern = like_pattern(term);
            builder
                .push(" AND (category ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder
            .push(" ORDER BY id LIMIT ")
            .push_bind(i64::from(pagination.size))
            .push(" OFFSET ")
            .push_bind(pagination.offset() as i64);

        let rows = builder
            .build_query_as::<LeadRow>()
            .fetch_all(&self.pool)
            .await
            .context("querying leads")?;

        rows.into_iter().map(Lead::try_from).collect()
    }

    #[tracing::instrument(name = "Insert lead", skip(self, lead), fields(lead_id = %lead.id()))]
    async fn create_lead(&self, lead: &Lead) -> Result<WriteOutcome, AppError> {
        let (full_name, email, phone) = contact_columns(lead);

        let result = sqlx::query(
            r#"
            INSERT INTO leads (
                id, created, category, description, status, price,
                contact_first_name, suburb, contact_full_name, contact_email,
                contact_phone_number, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(lead.id())
        .bind(lead.created())
        .bind(lead.category())
        .bind(lead.description())
        .bind(lead.status().as_str())
        .bind(lead.price())
        .bind(lead.contact_first_name())
        .bind(lead.suburb())
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .bind(lead.version())
        .execute(&self.pool)
        .await
        .context("inserting lead")?;

        if result.rows_affected() == 1 {
            Ok(WriteOutcome::Applied)
        } else {
            Ok(WriteOutcome::Conflict)
        }
    }

    #[tracing::instrument(
        name = "Update lead",
        skip(self, lead),
        fields(lead_id = %lead.id(), version = lead.version())
    )]
    async fn update_lead(&self, lead: &Lead) -> Result<WriteOutcome, AppError> {
        let (full_name, email, phone) = contact_columns(lead);

        let result = sqlx::query(
            r#"
            UPDATE leads
            SET category = $2,
                description = $3,
                status = $4,
                price = $5,
                contact_first_name = $6,
                suburb = $7,
                contact_full_name = $8,
                contact_email = $9,
                contact_phone_number = $10,
                version = version + 1,
                updated_at = now()
            WHERE id = $1 AND version = $11
            "#,
        )
        .bind(lead.id())
        .bind(lead.category())
        .bind(lead.description())
        .bind(lead.status().as_str())
        .bind(lead.price())
        .bind(lead.contact_first_name())
        .bind(lead.suburb())
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .bind(lead.version())
        .execute(&self.pool)
        .await
        .context("updating lead")?;

        if result.rows_affected() == 1 {
            return Ok(WriteOutcome::Applied);
        }

        // Zero rows: either the lead is gone or someone else bumped the version
        if self.exists(lead.id()).await? {
            tracing::warn!("Lead {} was modified concurrently", lead.id());
            Ok(WriteOutcome::Conflict)
        } else {
            Ok(WriteOutcome::NotFound)
        }
    }

    #[tracing::instrument(name = "Delete lead", skip(self))]
    async fn delete_lead(&self, id: Uuid) -> Result<WriteOutcome, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting lead")?;

        if result.rows_affected() == 1 {
            Ok(WriteOutcome::Applied)
        } else {
            Ok(WriteOutcome::NotFound)
        }
    }
}
