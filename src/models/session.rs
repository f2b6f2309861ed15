use super::PendingOp;

/// Номинальное состояние диалога: подсказка о том, какой ввод ожидается.
/// Для диспетчеризации свободного текста используется `Session::pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    MainMenu,
    GetProductsMenu,
    AddProductMenu,
    UpdateProductMenu,
    AwaitingInput,
}

/// Сессия одного чата: текущее меню, незавершенная операция и кэш
/// страниц последней выдачи. Живет только в памяти процесса.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: ConversationState,
    pub pending: Option<PendingOp>,
    pub pages: Vec<String>,
    pub page_index: usize,
}

impl Session {
    /// Сброс к главному меню: незавершенная операция и кэш страниц
    /// очищаются.
    pub fn reset(&mut self) {
        *self = Session::default();
    }

    pub fn enter_menu(&mut self, state: ConversationState) {
        self.state = state;
        self.pending = None;
    }

    pub fn await_input(&mut self, pending: PendingOp) {
        self.state = ConversationState::AwaitingInput;
        self.pending = Some(pending);
    }

    pub fn cache_pages(&mut self, pages: Vec<String>) {
        self.pages = pages;
        self.page_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdTarget, PendingOp};

    #[test]
    fn reset_clears_pending_and_pages() {
        let mut session = Session::default();
        session.await_input(PendingOp::AwaitingProductId(IdTarget::ProductLookup));
        session.cache_pages(vec!["page".to_string()]);

        session.reset();

        assert_eq!(session.state, ConversationState::MainMenu);
        assert!(session.pending.is_none());
        assert!(session.pages.is_empty());
        assert_eq!(session.page_index, 0);
    }

    #[test]
    fn entering_menu_drops_pending_op() {
        let mut session = Session::default();
        session.await_input(PendingOp::AwaitingThermocupData);

        session.enter_menu(ConversationState::AddProductMenu);

        assert_eq!(session.state, ConversationState::AddProductMenu);
        assert!(session.pending.is_none());
    }
}
