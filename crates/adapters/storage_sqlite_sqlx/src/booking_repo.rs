//! `SQLite` implementation of [`BookingRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use haulhub_app::ports::BookingRepository;
use haulhub_domain::booking::{Booking, BookingStatus};
use haulhub_domain::error::{Entity, HaulHubError, NotFoundError, TransitionError};
use haulhub_domain::id::{BookingId, UserId};
use haulhub_domain::pagination::{Page, Window};
use haulhub_domain::quote::QuoteStatus;
use haulhub_domain::service_request::RequestStatus;
use haulhub_domain::time::{format_date, format_time};

use crate::codec::{
    decode, decode_date, decode_json, decode_opt_time, decode_opt_ts, decode_time, decode_ts,
    encode_json, encode_ts,
};
use crate::error::StorageError;

struct Wrapper(Booking);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let request_id: String = row.try_get("request_id")?;
        let quote_id: String = row.try_get("quote_id")?;
        let customer_user_id: String = row.try_get("customer_user_id")?;
        let business_id: String = row.try_get("business_id")?;
        let scheduled_date: String = row.try_get("scheduled_date")?;
        let scheduled_time_start: String = row.try_get("scheduled_time_start")?;
        let payment_status: String = row.try_get("payment_status")?;
        let booking_status: String = row.try_get("booking_status")?;
        let before_photos: String = row.try_get("before_photos")?;
        let after_photos: String = row.try_get("after_photos")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(Booking {
            id: decode(&id)?,
            reference: row.try_get("reference")?,
            request_id: decode(&request_id)?,
            quote_id: decode(&quote_id)?,
            customer_user_id: UserId::new(customer_user_id),
            business_id: decode(&business_id)?,
            scheduled_date: decode_date(&scheduled_date)?,
            scheduled_time_start: decode_time(&scheduled_time_start)?,
            scheduled_time_end: decode_opt_time(row.try_get("scheduled_time_end")?)?,
            final_amount: row.try_get("final_amount")?,
            payment_status: decode(&payment_status)?,
            booking_status: decode(&booking_status)?,
            cancellation_reason: row.try_get("cancellation_reason")?,
            actual_start_time: decode_opt_ts(row.try_get("actual_start_time")?)?,
            actual_end_time: decode_opt_ts(row.try_get("actual_end_time")?)?,
            completion_notes: row.try_get("completion_notes")?,
            before_photos: decode_json(&before_photos)?,
            after_photos: decode_json(&after_photos)?,
            customer_signature: row.try_get("customer_signature")?,
            created_at: decode_ts(&created_at)?,
            updated_at: decode_ts(&updated_at)?,
            completed_at: decode_opt_ts(row.try_get("completed_at")?)?,
        }))
    }
}

const ACCEPT_QUOTE: &str = "UPDATE quotes SET status = ? WHERE id = ? AND status = ?";

const SELECT_QUOTE_STATUS: &str = "SELECT status FROM quotes WHERE id = ?";

const REJECT_OTHER_QUOTES: &str =
    "UPDATE quotes SET status = ? WHERE request_id = ? AND id != ? AND status = ?";

const BOOK_REQUEST: &str = "UPDATE service_requests SET status = ?, updated_at = ? WHERE id = ?";

const INSERT: &str = r"
    INSERT INTO bookings (
        id, reference, request_id, quote_id, customer_user_id, business_id,
        scheduled_date, scheduled_time_start, scheduled_time_end, final_amount,
        payment_status, booking_status, cancellation_reason, actual_start_time,
        actual_end_time, completion_notes, before_photos, after_photos,
        customer_signature, created_at, updated_at, completed_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM bookings WHERE id = ?";

const SELECT_FOR_CUSTOMER: &str = r"
    SELECT * FROM bookings
    WHERE customer_user_id = ?1 AND (?2 IS NULL OR booking_status = ?2)
    ORDER BY created_at DESC, rowid DESC
    LIMIT ?3 OFFSET ?4
";

const COUNT_FOR_CUSTOMER: &str = r"
    SELECT COUNT(*) FROM bookings
    WHERE customer_user_id = ?1 AND (?2 IS NULL OR booking_status = ?2)
";

const UPDATE: &str = r"
    UPDATE bookings SET
        scheduled_date = ?, scheduled_time_start = ?, scheduled_time_end = ?,
        final_amount = ?, payment_status = ?, booking_status = ?,
        cancellation_reason = ?, actual_start_time = ?, actual_end_time = ?,
        completion_notes = ?, before_photos = ?, after_photos = ?,
        customer_signature = ?, updated_at = ?, completed_at = ?
    WHERE id = ? AND booking_status = ?
";

const SELECT_STATUS: &str = "SELECT booking_status FROM bookings WHERE id = ?";

const COUNT_COMPLETED_JOB: &str =
    "UPDATE businesses SET total_jobs_completed = total_jobs_completed + 1 WHERE id = ?";

/// `SQLite`-backed booking repository.
#[derive(Clone)]
pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

impl SqliteBookingRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl BookingRepository for SqliteBookingRepository {
    /// The quote only moves to accepted if it is still pending when the
    /// transaction runs, so two concurrent acceptances cannot both succeed.
    async fn accept_quote(&self, booking: Booking) -> Result<Booking, HaulHubError> {
        let quote_id = booking.quote_id.to_string();
        let request_id = booking.request_id.to_string();
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let accepted = sqlx::query(ACCEPT_QUOTE)
            .bind(QuoteStatus::Accepted.as_str())
            .bind(&quote_id)
            .bind(QuoteStatus::Pending.as_str())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        if accepted.rows_affected() == 0 {
            let status: Option<(String,)> = sqlx::query_as(SELECT_QUOTE_STATUS)
                .bind(&quote_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            return Err(match status {
                Some((status,)) => TransitionError::QuoteNotPending(status).into(),
                None => NotFoundError {
                    entity: Entity::Quote,
                    id: quote_id,
                }
                .into(),
            });
        }

        sqlx::query(REJECT_OTHER_QUOTES)
            .bind(QuoteStatus::Rejected.as_str())
            .bind(&request_id)
            .bind(&quote_id)
            .bind(QuoteStatus::Pending.as_str())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        sqlx::query(BOOK_REQUEST)
            .bind(RequestStatus::Booked.as_str())
            .bind(encode_ts(booking.created_at))
            .bind(&request_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(booking.id.to_string())
            .bind(&booking.reference)
            .bind(&request_id)
            .bind(&quote_id)
            .bind(booking.customer_user_id.as_str())
            .bind(booking.business_id.to_string())
            .bind(format_date(booking.scheduled_date))
            .bind(format_time(booking.scheduled_time_start))
            .bind(booking.scheduled_time_end.map(format_time))
            .bind(booking.final_amount)
            .bind(booking.payment_status.as_str())
            .bind(booking.booking_status.as_str())
            .bind(&booking.cancellation_reason)
            .bind(booking.actual_start_time.map(encode_ts))
            .bind(booking.actual_end_time.map(encode_ts))
            .bind(&booking.completion_notes)
            .bind(encode_json(&booking.before_photos)?)
            .bind(encode_json(&booking.after_photos)?)
            .bind(&booking.customer_signature)
            .bind(encode_ts(booking.created_at))
            .bind(encode_ts(booking.updated_at))
            .bind(booking.completed_at.map(encode_ts))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        tx.commit().await.map_err(StorageError::from)?;

        Ok(booking)
    }

    async fn get_by_id(&self, id: BookingId) -> Result<Option<Booking>, HaulHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn list_for_customer(
        &self,
        customer: &UserId,
        status: Option<BookingStatus>,
        window: Window,
    ) -> Result<Page<Booking>, HaulHubError> {
        let status = status.map(BookingStatus::as_str);

        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_FOR_CUSTOMER)
            .bind(customer.as_str())
            .bind(status)
            .bind(i64::from(window.limit))
            .bind(i64::from(window.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let (total,): (i64,) = sqlx::query_as(COUNT_FOR_CUSTOMER)
            .bind(customer.as_str())
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Page::new(
            rows.into_iter().map(|w| w.0).collect(),
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    /// The row is only written while it still holds `from`, so a booking
    /// that moved on since it was read is never overwritten. Completing a
    /// booking also bumps the business's completed job count.
    async fn update(&self, booking: Booking, from: BookingStatus) -> Result<Booking, HaulHubError> {
        let id = booking.id.to_string();
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let updated = sqlx::query(UPDATE)
            .bind(format_date(booking.scheduled_date))
            .bind(format_time(booking.scheduled_time_start))
            .bind(booking.scheduled_time_end.map(format_time))
            .bind(booking.final_amount)
            .bind(booking.payment_status.as_str())
            .bind(booking.booking_status.as_str())
            .bind(&booking.cancellation_reason)
            .bind(booking.actual_start_time.map(encode_ts))
            .bind(booking.actual_end_time.map(encode_ts))
            .bind(&booking.completion_notes)
            .bind(encode_json(&booking.before_photos)?)
            .bind(encode_json(&booking.after_photos)?)
            .bind(&booking.customer_signature)
            .bind(encode_ts(booking.updated_at))
            .bind(booking.completed_at.map(encode_ts))
            .bind(&id)
            .bind(from.as_str())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        if updated.rows_affected() == 0 {
            let current: Option<(String,)> = sqlx::query_as(SELECT_STATUS)
                .bind(&id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            return Err(match current {
                Some((current,)) => {
                    let current: BookingStatus = decode(&current).map_err(StorageError::from)?;
                    booking.booking_status.refused_from(current).into()
                }
                None => NotFoundError {
                    entity: Entity::Booking,
                    id,
                }
                .into(),
            });
        }

        if booking.booking_status == BookingStatus::Completed && from != BookingStatus::Completed {
            sqlx::query(COUNT_COMPLETED_JOB)
                .bind(booking.business_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
        }

        tx.commit().await.map_err(StorageError::from)?;

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use crate::quote_repo::tests::{draft, seed};
    use crate::{SqliteBusinessRepository, SqliteQuoteRepository, SqliteServiceRequestRepository};
    use chrono::{NaiveDate, NaiveTime};
    use haulhub_app::ports::{BusinessRepository, QuoteRepository, ServiceRequestRepository};
    use haulhub_domain::booking::{CompletionReport, Slot};
    use haulhub_domain::id::ServiceRequestId;
    use haulhub_domain::quote::Quote;
    use haulhub_domain::time::now;

    fn slot() -> Slot {
        Slot {
            date: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(12, 0, 0),
        }
    }

    struct Fixture {
        pool: SqlitePool,
        repo: SqliteBookingRepository,
        request_id: ServiceRequestId,
        quotes: Vec<Quote>,
    }

    async fn fixture() -> Fixture {
        let db = Config::memory().build().await.unwrap();
        let pool = db.pool().clone();
        let (business_id, request_id) = seed(&pool, "owner_1").await;
        let quote_repo = SqliteQuoteRepository::new(pool.clone());
        let mut quotes = Vec::new();
        for amount in [150.0, 175.0] {
            let quote = draft(business_id, amount).into_quote(request_id).unwrap();
            quotes.push(quote_repo.create(quote).await.unwrap());
        }
        Fixture {
            repo: SqliteBookingRepository::new(pool.clone()),
            pool,
            request_id,
            quotes,
        }
    }

    fn booking_for(quote: &Quote) -> Booking {
        Booking::from_quote(quote, UserId::new("customer_1"), slot(), now()).unwrap()
    }

    #[tokio::test]
    async fn should_accept_quote_and_settle_siblings_atomically() {
        let f = fixture().await;
        let booking = f.repo.accept_quote(booking_for(&f.quotes[0])).await.unwrap();

        let quotes = SqliteQuoteRepository::new(f.pool.clone());
        let accepted = quotes.get_by_id(f.quotes[0].id).await.unwrap().unwrap();
        let rejected = quotes.get_by_id(f.quotes[1].id).await.unwrap().unwrap();
        assert_eq!(accepted.status, QuoteStatus::Accepted);
        assert_eq!(rejected.status, QuoteStatus::Rejected);

        let request = SqliteServiceRequestRepository::new(f.pool.clone())
            .get_by_id(f.request_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Booked);

        let stored = f.repo.get_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.reference, booking.reference);
        assert_eq!(stored.booking_status, BookingStatus::Confirmed);
        assert_eq!(stored.scheduled_time_end, NaiveTime::from_hms_opt(12, 0, 0));
    }

    #[tokio::test]
    async fn should_refuse_second_acceptance_and_keep_state() {
        let f = fixture().await;
        f.repo.accept_quote(booking_for(&f.quotes[0])).await.unwrap();

        let result = f.repo.accept_quote(booking_for(&f.quotes[1])).await;
        assert!(matches!(
            result,
            Err(HaulHubError::Transition(TransitionError::QuoteNotPending(ref s))) if s == "rejected"
        ));

        let page = f
            .repo
            .list_for_customer(&UserId::new("customer_1"), None, Window::default())
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
    }

    #[tokio::test]
    async fn should_filter_and_page_customer_history() {
        let db = Config::memory().build().await.unwrap();
        let pool = db.pool().clone();
        let repo = SqliteBookingRepository::new(pool.clone());
        let quote_repo = SqliteQuoteRepository::new(pool.clone());

        let mut ids = Vec::new();
        for owner in ["owner_1", "owner_2", "owner_3"] {
            let (business_id, request_id) = seed(&pool, owner).await;
            let quote = quote_repo
                .create(draft(business_id, 100.0).into_quote(request_id).unwrap())
                .await
                .unwrap();
            ids.push(repo.accept_quote(booking_for(&quote)).await.unwrap().id);
        }

        let mut cancelled = repo.get_by_id(ids[0]).await.unwrap().unwrap();
        cancelled.cancel(None, now()).unwrap();
        repo.update(cancelled, BookingStatus::Confirmed).await.unwrap();

        let customer = UserId::new("customer_1");
        let page = repo
            .list_for_customer(&customer, None, Window::new(0, 2))
            .await
            .unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, ids[2]);

        let confirmed = repo
            .list_for_customer(&customer, Some(BookingStatus::Confirmed), Window::default())
            .await
            .unwrap();
        assert_eq!(confirmed.total_count, 2);

        let cancelled = repo
            .list_for_customer(&customer, Some(BookingStatus::Cancelled), Window::default())
            .await
            .unwrap();
        assert_eq!(cancelled.items[0].cancellation_reason.as_deref(), Some("Customer requested cancellation"));
    }

    #[tokio::test]
    async fn should_count_completed_job_once() {
        let f = fixture().await;
        let mut booking = f.repo.accept_quote(booking_for(&f.quotes[0])).await.unwrap();

        booking.start(vec!["before.jpg".to_string()], now()).unwrap();
        let mut booking = f
            .repo
            .update(booking, BookingStatus::Confirmed)
            .await
            .unwrap();
        booking
            .complete(
                CompletionReport {
                    notes: Some("All hauled".to_string()),
                    after_photos: vec!["after.jpg".to_string()],
                    customer_signature: None,
                },
                now(),
            )
            .unwrap();
        let booking = f
            .repo
            .update(booking, BookingStatus::InProgress)
            .await
            .unwrap();
        f.repo
            .update(booking.clone(), BookingStatus::Completed)
            .await
            .unwrap();

        let stored = f.repo.get_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.booking_status, BookingStatus::Completed);
        assert_eq!(stored.before_photos, vec!["before.jpg".to_string()]);
        assert!(stored.completed_at.is_some());

        let business = SqliteBusinessRepository::new(f.pool.clone())
            .get_by_id(booking.business_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(business.total_jobs_completed, 1);
    }

    #[tokio::test]
    async fn should_report_missing_booking_on_update() {
        let f = fixture().await;
        let booking = booking_for(&f.quotes[0]);
        assert!(matches!(
            f.repo.update(booking, BookingStatus::Confirmed).await,
            Err(HaulHubError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_refuse_stale_cancel_of_completed_booking() {
        let f = fixture().await;
        let mut booking = f.repo.accept_quote(booking_for(&f.quotes[0])).await.unwrap();
        booking.start(vec![], now()).unwrap();
        f.repo
            .update(booking.clone(), BookingStatus::Confirmed)
            .await
            .unwrap();

        // Two callers read the same in-progress booking.
        let mut completing = f.repo.get_by_id(booking.id).await.unwrap().unwrap();
        let mut cancelling = completing.clone();

        completing
            .complete(CompletionReport::default(), now())
            .unwrap();
        f.repo
            .update(completing, BookingStatus::InProgress)
            .await
            .unwrap();

        cancelling.cancel(None, now()).unwrap();
        let result = f.repo.update(cancelling, BookingStatus::InProgress).await;
        assert!(matches!(
            result,
            Err(HaulHubError::Transition(TransitionError::BookingCannotBeCancelled(ref s))) if s == "completed"
        ));

        let stored = f.repo.get_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.booking_status, BookingStatus::Completed);
        assert!(stored.completed_at.is_some());
        assert!(stored.cancellation_reason.is_none());
        let business = SqliteBusinessRepository::new(f.pool.clone())
            .get_by_id(booking.business_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(business.total_jobs_completed, 1);
    }

    #[tokio::test]
    async fn should_refuse_stale_start_of_cancelled_booking() {
        let f = fixture().await;
        let booking = f.repo.accept_quote(booking_for(&f.quotes[0])).await.unwrap();

        let mut starting = booking.clone();
        let mut cancelled = booking.clone();
        cancelled.cancel(None, now()).unwrap();
        f.repo
            .update(cancelled, BookingStatus::Confirmed)
            .await
            .unwrap();

        starting.start(vec![], now()).unwrap();
        assert!(matches!(
            f.repo.update(starting, BookingStatus::Confirmed).await,
            Err(HaulHubError::Transition(TransitionError::BookingNotConfirmed))
        ));
    }
}
