//! Due-date reminder scanner.
//!
//! Runs on a configured interval, independent of the request flow. Each
//! run loads every borrowing, resolves its user and book, and sends a
//! reminder for the ones due within the next 24 hours. Borrowings are
//! processed independently: a missing user or book, or a failed delivery,
//! never aborts the rest of the batch. There is no deduplication marker,
//! so an un-returned due-soon borrowing is reminded again on every run.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::ReminderConfig,
    error::AppResult,
    services::email::Notifier,
    store::Store,
};

/// Subject line used for every reminder.
const REMINDER_SUBJECT: &str = "Reminder: Book return due tomorrow";

#[derive(Clone)]
pub struct ReminderService {
    store: Store,
    notifier: Arc<dyn Notifier>,
    config: ReminderConfig,
}

impl ReminderService {
    pub fn new(store: Store, notifier: Arc<dyn Notifier>, config: ReminderConfig) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Scan on the configured interval until the task is dropped.
    pub async fn run(self) {
        let period = std::time::Duration::from_secs(self.config.interval_secs);
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(err) = self.run_once().await {
                tracing::error!(error = %err, "reminder scan failed");
            }
        }
    }

    /// Scan all borrowings once and remind every user whose borrowing is
    /// due within the next 24 hours.
    pub async fn run_once(&self) -> AppResult<()> {
        tracing::info!("reminder scan started");

        let borrowings = self.store.borrowings.list_all().await?;
        let mut reminded = 0usize;

        for borrowing in &borrowings {
            let user = match self.store.users.get(borrowing.user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    tracing::debug!(borrowing_id = %borrowing.id, "user missing, skipping");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(borrowing_id = %borrowing.id, error = %err, "user lookup failed");
                    continue;
                }
            };
            let book = match self.store.books.get(borrowing.book_id).await {
                Ok(Some(book)) => book.value,
                Ok(None) => {
                    tracing::debug!(borrowing_id = %borrowing.id, "book missing, skipping");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(borrowing_id = %borrowing.id, error = %err, "book lookup failed");
                    continue;
                }
            };

            let now = Utc::now();
            if !(now < borrowing.return_date && borrowing.return_date < now + Duration::days(1)) {
                continue;
            }

            let body = reminder_body(&user.name, &book.title, borrowing.return_date);
            match self
                .notifier
                .send(&self.config.sender, &user.email, REMINDER_SUBJECT, &body)
                .await
            {
                Ok(()) => reminded += 1,
                Err(err) => {
                    tracing::warn!(
                        borrowing_id = %borrowing.id,
                        error = %err,
                        "reminder delivery failed"
                    );
                }
            }
        }

        tracing::info!(
            total = borrowings.len(),
            reminded,
            "reminder scan finished"
        );
        Ok(())
    }
}

fn reminder_body(user_name: &str, book_title: &str, return_date: DateTime<Utc>) -> String {
    format!(
        "Dear {user_name},\n\n\
         This is a reminder that your borrowed book {book_title} is due back tomorrow, {return_date}.\n\n\
         Please return it by the due date to avoid late fees. If you need an extension, visit your account or contact us.\n\n\
         Thank you,\n\
         Libris"
    )
}
