pub mod callbacks;
pub mod commands;
pub mod input;
pub mod messages;
pub mod pager;
pub mod utils;

pub use callbacks::callback_handler;
pub use commands::command_handler;
pub use messages::message_handler;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Единый текст для любого сбоя удаленного сервиса: пользователь не
/// различает 404, 500 и таймаут.
pub const SERVICE_UNAVAILABLE_TEXT: &str =
    "❌ Произошла ошибка. Пожалуйста, попробуйте позже.";
