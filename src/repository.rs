//! Storage contract for leads.
//!
//! Expected outcomes of a write (row missing, concurrent modification) come back as a
//! [`WriteOutcome`]; only genuine faults such as a lost connection are `Err`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lead::{Lead, LeadStatus};

pub const DEFAULT_PAGE_SIZE: u32 = 30;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const MAX_SEARCH_TERM_LENGTH: usize = 32;

/// Result of a write that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    NotFound,
    /// Insert of an existing id, or update against a stale version.
    Conflict,
}

/// Filters for listing leads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadQuery {
    pub status: Option<LeadStatus>,
    pub search_term: Option<String>,
}

impl LeadQuery {
    pub fn new(status: Option<LeadStatus>, search_term: Option<&str>) -> Self {
        Self {
            status,
            search_term: search_term.and_then(sanitize_search_term),
        }
    }

    /// In-process equivalent of the SQL filter.
    pub fn matches(&self, lead: &Lead) -> bool {
        if self.status.is_some_and(|status| status != lead.status()) {
            return false;
        }

        match &self.search_term {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                lead.category().to_lowercase().contains(&term)
                    || lead
                        .description()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
        }
    }
}

/// Trims the term and caps it at [`MAX_SEARCH_TERM_LENGTH`] characters; blank means no filter.
pub fn sanitize_search_term(term: &str) -> Option<String> {
    let term: String = term.trim().chars().take(MAX_SEARCH_TERM_LENGTH).collect();
    if term.is_empty() {
        None
    } else {
        Some(term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_index: u32,
    pub size: u32,
}

impl Pagination {
    pub fn new(page_index: Option<u32>, size: Option<u32>) -> Self {
        let size = match size {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(size) => size.min(MAX_PAGE_SIZE),
        };

        Self {
            page_index: page_index.unwrap_or(0),
            size,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Short name of the backing store, reported by the health endpoint.
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), AppError>;

    async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError>;

    /// Matching leads ordered by id, one page at a time.
    async fn query_leads(
        &self,
        query: &LeadQuery,
        pagination: Pagination,
    ) -> Result<Vec<Lead>, AppError>;

    async fn create_lead(&self, lead: &Lead) -> Result<WriteOutcome, AppError>;

    /// Writes `lead` back if the stored version still equals `lead.version()`.
    async fn update_lead(&self, lead: &Lead) -> Result<WriteOutcome, AppError>;

    async fn delete_lead(&self, id: Uuid) -> Result<WriteOutcome, AppError>;
}

/// Process-local store, used when no database is configured.
#[derive(Default)]
pub struct InMemoryLeadRepository {
    leads: RwLock<BTreeMap<Uuid, Lead>>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        Ok(self.leads.read().await.get(&id).cloned())
    }

    async fn query_leads(
        &self,
        query: &LeadQuery,
        pagination: Pagination,
    ) -> Result<Vec<Lead>, AppError> {
        let leads = self.leads.read().await;
        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);

        Ok(leads
            .values()
            .filter(|lead| query.matches(lead))
            .skip(offset)
            .take(pagination.size as usize)
            .cloned()
            .collect())
    }

    async fn create_lead(&self, lead: &Lead) -> Result<WriteOutcome, AppError> {
        let mut leads = self.leads.write().await;
        if leads.contains_key(&lead.id()) {
            return Ok(WriteOutcome::Conflict);
        }

        leads.insert(lead.id(), lead.clone());
        Ok(WriteOutcome::Applied)
    }

    async fn update_lead(&self, lead: &Lead) -> Result<WriteOutcome, AppError> {
        let mut leads = self.leads.write().await;
        let Some(stored) = leads.get_mut(&lead.id()) else {
            return Ok(WriteOutcome::NotFound);
        };

        if stored.version != lead.version {
            return Ok(WriteOutcome::Conflict);
        }

        *stored = Lead {
            version: lead.version + 1,
            ..lead.clone()
        };
        Ok(WriteOutcome::Applied)
    }

    async fn delete_lead(&self, id: Uuid) -> Result<WriteOutcome, AppError> {
        match self.leads.write().await.remove(&id) {
            Some(_) => Ok(WriteOutcome::Applied),
            None => Ok(WriteOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::{CreateLeadData, LeadContact};
    use crate::money;

    fn lead(category: &str, description: Option<&str>) -> Lead {
        Lead::new(CreateLeadData {
            category: category.to_string(),
            description: description.map(str::to_string),
            price: money::from_cents(25_000),
            contact_first_name: "Ana".to_string(),
            suburb: "Fitzroy".to_string(),
        })
    }

    #[test]
    fn test_pagination_defaults_and_cap() {
        assert_eq!(Pagination::new(None, None), Pagination { page_index: 0, size: 30 });
        assert_eq!(Pagination::new(Some(2), Some(0)).size, 30);
        assert_eq!(Pagination::new(None, Some(500)).size, MAX_PAGE_SIZE);
        assert_eq!(Pagination::new(Some(3), Some(10)).offset(), 30);
    }

    #[test]
    fn test_search_term_sanitizing() {
        assert_eq!(sanitize_search_term("  paint  "), Some("paint".to_string()));
        assert_eq!(sanitize_search_term("   "), None);
        assert_eq!(
            sanitize_search_term(&"x".repeat(40)).map(|t| t.len()),
            Some(MAX_SEARCH_TERM_LENGTH)
        );
    }

    #[test]
    fn test_query_matches_category_or_description() {
        let query = LeadQuery::new(None, Some("PAINT"));

        assert!(query.matches(&lead("Interior Painter", None)));
        assert!(query.matches(&lead("Builder", Some("needs paint on fence"))));
        assert!(!query.matches(&lead("Plumber", Some("leaking tap"))));
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let repo = InMemoryLeadRepository::new();
        let lead = lead("Painter", None);

        assert_eq!(repo.create_lead(&lead).await.unwrap(), WriteOutcome::Applied);
        assert_eq!(repo.create_lead(&lead).await.unwrap(), WriteOutcome::Conflict);
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let repo = InMemoryLeadRepository::new();
        let original = lead("Painter", None);
        repo.create_lead(&original).await.unwrap();

        let mut first = repo.get_lead(original.id()).await.unwrap().unwrap();
        let mut second = first.clone();

        first.decline().unwrap();
        assert_eq!(repo.update_lead(&first).await.unwrap(), WriteOutcome::Applied);

        second
            .accept(LeadContact {
                full_name: "Ana B".to_string(),
                email: "ana@b.com".to_string(),
                phone_number: "12345678".to_string(),
            })
            .unwrap();
        assert_eq!(repo.update_lead(&second).await.unwrap(), WriteOutcome::Conflict);

        let stored = repo.get_lead(original.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), LeadStatus::Declined);
        assert_eq!(stored.version(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let repo = InMemoryLeadRepository::new();
        let lead = lead("Painter", None);

        assert_eq!(repo.update_lead(&lead).await.unwrap(), WriteOutcome::NotFound);
        assert_eq!(repo.delete_lead(lead.id()).await.unwrap(), WriteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_query_orders_by_id_and_pages() {
        let repo = InMemoryLeadRepository::new();
        for i in 0..5 {
            repo.create_lead(&lead(&format!("Trade {}", i), None))
                .await
                .unwrap();
        }

        let all = repo
            .query_leads(&LeadQuery::default(), Pagination::default())
            .await
            .unwrap();
        let ids: Vec<Uuid> = all.iter().map(Lead::id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        let page = repo
            .query_leads(&LeadQuery::default(), Pagination::new(Some(1), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id(), ids[2]);

        let past_end = repo
            .query_leads(&LeadQuery::default(), Pagination::new(Some(9), Some(2)))
            .await
            .unwrap();
        assert!(past_end.is_empty());
    }
}
