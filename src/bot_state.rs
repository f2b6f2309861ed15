use std::collections::HashMap;
use std::sync::Arc;

use teloxide::types::ChatId;
use tokio::sync::{Mutex, RwLock};

use crate::models::Session;
use crate::warehouse::WarehouseClient;

type SessionMap = Arc<RwLock<HashMap<ChatId, Arc<Mutex<Session>>>>>;

/// Общее состояние бота: клиент Warehouse API и хранилище сессий.
///
/// Каждая сессия обернута в собственный `Mutex`, и обработчик держит
/// его на все время работы, включая ожидание сетевого вызова: действия
/// одного чата строго последовательны, разные чаты друг друга не ждут.
#[derive(Clone)]
pub struct BotState {
    api: Arc<WarehouseClient>,
    sessions: SessionMap,
}

impl BotState {
    pub fn new(api: WarehouseClient) -> Self {
        Self {
            api: Arc::new(api),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn api(&self) -> &WarehouseClient {
        &self.api
    }

    /// Сессия чата; создается при первом обращении.
    pub async fn session(&self, chat_id: ChatId) -> Arc<Mutex<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(&chat_id) {
                return Arc::clone(session);
            }
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(Session::default()))),
        )
    }

    /// Начать сессию заново: используется /start.
    pub async fn reset_session(&self, chat_id: ChatId) -> Arc<Mutex<Session>> {
        let session = self.session(chat_id).await;
        session.lock().await.reset();
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversationState, IdTarget, PendingOp};

    fn state() -> BotState {
        BotState::new(WarehouseClient::new("http://localhost:8000/api").unwrap())
    }

    #[tokio::test]
    async fn session_is_created_on_first_contact() {
        let state = state();
        let session = state.session(ChatId(1)).await;
        assert_eq!(session.lock().await.state, ConversationState::MainMenu);
    }

    #[tokio::test]
    async fn same_chat_gets_same_session() {
        let state = state();

        {
            let session = state.session(ChatId(1)).await;
            session
                .lock()
                .await
                .await_input(PendingOp::AwaitingProductId(IdTarget::ThermocupLookup));
        }

        let session = state.session(ChatId(1)).await;
        assert_eq!(
            session.lock().await.pending,
            Some(PendingOp::AwaitingProductId(IdTarget::ThermocupLookup))
        );
    }

    #[tokio::test]
    async fn reset_clears_in_flight_operation() {
        let state = state();

        {
            let session = state.session(ChatId(7)).await;
            session
                .lock()
                .await
                .await_input(PendingOp::AwaitingThermocupData);
        }

        let session = state.reset_session(ChatId(7)).await;
        let session = session.lock().await;
        assert_eq!(session.state, ConversationState::MainMenu);
        assert!(session.pending.is_none());
    }
}
