use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};

use crate::handlers::HandlerResult;
use crate::models::Session;

pub const MAIN_MENU_TEXT: &str = "🏭 Главное меню управления складом\nВыберите действие:";
pub const GET_PRODUCTS_MENU_TEXT: &str = "📦 Получить продукты\nВыберите тип запроса:";
pub const ADD_PRODUCT_MENU_TEXT: &str = "➕ Добавить продукты\nВыберите тип продукта:";
pub const UPDATE_PRODUCT_MENU_TEXT: &str = "🔄 Обновить продукты\nВыберите действие:";

/// Экранирование MarkdownV2
pub fn escape_markdown_v2(text: &str) -> String {
    let specials = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];
    let mut out = String::with_capacity(text.len() * 2);

    for ch in text.chars() {
        if specials.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub fn main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("📦 Получить продукты", "get_products")],
        vec![InlineKeyboardButton::callback("➕ Добавить продукты", "add_products")],
        vec![InlineKeyboardButton::callback("🔄 Обновить продукты", "update_products")],
    ])
}

pub fn get_products_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("📋 Все продукты", "all_products")],
        vec![InlineKeyboardButton::callback("🔍 Поиск по названию", "search_products")],
        vec![InlineKeyboardButton::callback("🏷️ По категории", "search_category")],
        vec![InlineKeyboardButton::callback("💰 По цене", "search_price_range")],
        vec![InlineKeyboardButton::callback("✅ Только в наличии", "search_in_stock")],
        vec![InlineKeyboardButton::callback("🆔 По ID продукта", "by_id")],
        vec![InlineKeyboardButton::callback("☕ Термокружка по ID", "thermocup_by_id")],
        vec![InlineKeyboardButton::callback("🔙 Назад", "back_to_main")],
    ])
}

pub fn add_product_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("☕ Добавить термокружку", "add_thermocup")],
        vec![InlineKeyboardButton::callback("🔙 Назад", "back_to_main")],
    ])
}

pub fn update_product_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("✏️ Обновить термокружку", "update_thermocup")],
        vec![InlineKeyboardButton::callback("📦 Обновить резерв", "update_reserved")],
        vec![InlineKeyboardButton::callback("🏭 Обновить склад", "update_stock")],
        vec![InlineKeyboardButton::callback("🔙 Назад", "back_to_main")],
    ])
}

pub fn back_to_products_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🔙 Назад",
        "back_to_products_menu",
    )]])
}

fn pager_keyboard(has_more: bool) -> InlineKeyboardMarkup {
    let mut keyboard = Vec::new();
    if has_more {
        keyboard.push(vec![InlineKeyboardButton::callback(
            "📄 Показать еще",
            "show_more_products",
        )]);
    }
    keyboard.push(vec![InlineKeyboardButton::callback(
        "🔙 Назад",
        "back_to_products_menu",
    )]);
    InlineKeyboardMarkup::new(keyboard)
}

/// Текущая страница кэшированной выдачи. Индекс за последней страницей
/// — отдельный случай, не «товаров нет вообще».
pub async fn show_product_page(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    session: &Session,
) -> HandlerResult {
    let Some(page) = session.pages.get(session.page_index) else {
        let text = "❌ Нет данных для отображения";
        match message_id {
            Some(message_id) => {
                bot.edit_message_text(chat_id, message_id, text)
                    .reply_markup(back_to_products_keyboard())
                    .await?;
            }
            None => {
                bot.send_message(chat_id, text)
                    .reply_markup(back_to_products_keyboard())
                    .await?;
            }
        }
        return Ok(());
    };

    let has_more = session.page_index + 1 < session.pages.len();
    let keyboard = pager_keyboard(has_more);

    match message_id {
        Some(message_id) => {
            bot.edit_message_text(chat_id, message_id, page.clone())
                .reply_markup(keyboard)
                .await?;
        }
        None => {
            bot.send_message(chat_id, page.clone())
                .reply_markup(keyboard)
                .await?;
        }
    }

    Ok(())
}

/// Детальная карточка: построчно все поля ответа, как их отдал сервис.
pub fn render_detail(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut out = String::new();
            for (key, value) in map {
                let rendered = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out.push_str(&format!("{}: {}\n", key, rendered));
            }
            out
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markdown_v2_specials() {
        assert_eq!(escape_markdown_v2("a.b-c (x)"), "a\\.b\\-c \\(x\\)");
        assert_eq!(escape_markdown_v2("обычный текст"), "обычный текст");
    }

    #[test]
    fn detail_renders_strings_without_quotes() {
        let value = serde_json::json!({
            "id": 7,
            "name": "Stanley Classic",
            "is_active": true
        });

        let detail = render_detail(&value);
        assert!(detail.contains("id: 7\n"));
        assert!(detail.contains("name: Stanley Classic\n"));
        assert!(detail.contains("is_active: true\n"));
    }
}
