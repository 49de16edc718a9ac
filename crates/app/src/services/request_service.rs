//! Request service: use-cases for service requests and the quotes on them.

use haulhub_domain::error::{Entity, HaulHubError, NotFoundError};
use haulhub_domain::id::ServiceRequestId;
use haulhub_domain::quote::{Quote, QuoteDraft};
use haulhub_domain::service_request::ServiceRequest;
use haulhub_domain::time::now;
use serde::Serialize;

use crate::ports::{BusinessRepository, QuoteRepository, ServiceRequestRepository};

/// A quote together with the name of the business that placed it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteView {
    #[serde(flatten)]
    pub quote: Quote,
    pub business_name: Option<String>,
}

/// Application service for service requests and quotes.
pub struct RequestService<RR, QR, BR> {
    requests: RR,
    quotes: QR,
    businesses: BR,
}

impl<RR, QR, BR> RequestService<RR, QR, BR>
where
    RR: ServiceRequestRepository,
    QR: QuoteRepository,
    BR: BusinessRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(requests: RR, quotes: QR, businesses: BR) -> Self {
        Self {
            requests,
            quotes,
            businesses,
        }
    }

    /// Store a new service request after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, request), fields(request_id = %request.id, category = %request.service_category))]
    pub async fn create_request(
        &self,
        request: ServiceRequest,
    ) -> Result<ServiceRequest, HaulHubError> {
        request.validate()?;
        let created = self.requests.create(request).await?;
        tracing::info!("service request created");
        Ok(created)
    }

    /// Look up a request by id. An open request past its expiry is reported
    /// as expired.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when no request with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_request(&self, id: ServiceRequestId) -> Result<ServiceRequest, HaulHubError> {
        let mut request = self.requests.get_by_id(id).await?.ok_or_else(|| NotFoundError {
            entity: Entity::ServiceRequest,
            id: id.to_string(),
        })?;
        request.status = request.effective_status(now());
        Ok(request)
    }

    /// Quotes placed on a request, each with its business name.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when the request does not exist,
    /// or a storage error from a repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_quotes(&self, id: ServiceRequestId) -> Result<Vec<QuoteView>, HaulHubError> {
        self.get_request(id).await?;
        let quotes = self.quotes.list_for_request(id).await?;
        let mut views = Vec::with_capacity(quotes.len());
        for quote in quotes {
            let business_name = self
                .businesses
                .get_by_id(quote.business_id)
                .await?
                .map(|b| b.name);
            views.push(QuoteView {
                quote,
                business_name,
            });
        }
        Ok(views)
    }

    /// Place a quote on an open request.
    ///
    /// # Errors
    ///
    /// Returns [`HaulHubError::NotFound`] when the request or the quoting
    /// business does not exist, [`HaulHubError::Transition`] when the request
    /// no longer accepts quotes, [`HaulHubError::Validation`] for an invalid
    /// draft, or a storage error from a repository.
    #[tracing::instrument(skip(self, draft))]
    pub async fn submit_quote(
        &self,
        id: ServiceRequestId,
        draft: QuoteDraft,
    ) -> Result<Quote, HaulHubError> {
        let request = self.get_request(id).await?;
        request.ensure_open(now())?;
        let quote = draft.into_quote(id)?;
        if self.businesses.get_by_id(quote.business_id).await?.is_none() {
            return Err(NotFoundError {
                entity: Entity::Business,
                id: quote.business_id.to_string(),
            }
            .into());
        }
        let quote = self.quotes.create(quote).await?;
        tracing::info!(quote_id = %quote.id, amount = quote.amount, "quote submitted");
        Ok(quote)
    }
}
