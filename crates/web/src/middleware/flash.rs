//! Session-backed flash messages.
//!
//! A handler queues a message before redirecting; the next page that renders
//! drains the queue and shows it once.

use tower_sessions::Session;

use crate::models::{FlashMessage, session_keys};

/// Queue a message for the next rendered page.
///
/// Failure to store a flash never fails the request that produced it; the
/// write it reports on has already happened.
pub async fn push_flash(session: &Session, message: FlashMessage) {
    let mut queued: Vec<FlashMessage> = session
        .get(session_keys::FLASH_MESSAGES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(message);

    if let Err(e) = session.insert(session_keys::FLASH_MESSAGES, queued).await {
        tracing::warn!("Failed to queue flash message: {e}");
    }
}

/// Drain all queued messages.
pub async fn take_flashes(session: &Session) -> Vec<FlashMessage> {
    match session
        .remove::<Vec<FlashMessage>>(session_keys::FLASH_MESSAGES)
        .await
    {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read flash messages: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flashes_are_shown_once_in_order() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push_flash(&session, FlashMessage::success("List created.")).await;
        push_flash(&session, FlashMessage::info("Welcome back.")).await;

        let first = take_flashes(&session).await;
        assert_eq!(
            first,
            vec![
                FlashMessage::success("List created."),
                FlashMessage::info("Welcome back."),
            ]
        );
        assert!(take_flashes(&session).await.is_empty());
    }
}
