use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};

use crate::bot_state::BotState;
use crate::handlers::pager::{paginate, PAGE_CHAR_BUDGET};
use crate::handlers::utils::{
    add_product_menu_keyboard, back_to_products_keyboard, get_products_menu_keyboard,
    main_menu_keyboard, show_product_page, update_product_menu_keyboard, ADD_PRODUCT_MENU_TEXT,
    GET_PRODUCTS_MENU_TEXT, MAIN_MENU_TEXT, UPDATE_PRODUCT_MENU_TEXT,
};
use crate::handlers::{HandlerResult, SERVICE_UNAVAILABLE_TEXT};
use crate::models::{ConversationState, IdTarget, PendingOp, ProductFilter, Session};

pub async fn callback_handler(bot: Bot, q: CallbackQuery, state: BotState) -> HandlerResult {
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(ref message) = q.message else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    bot.answer_callback_query(q.id.clone()).await?;

    let session = state.session(chat_id).await;
    let mut session = session.lock().await;

    match data {
        "back_to_main" => {
            session.enter_menu(ConversationState::MainMenu);
            bot.edit_message_text(chat_id, message_id, MAIN_MENU_TEXT)
                .reply_markup(main_menu_keyboard())
                .await?;
        }

        "get_products" | "back_to_products_menu" => {
            session.enter_menu(ConversationState::GetProductsMenu);
            bot.edit_message_text(chat_id, message_id, GET_PRODUCTS_MENU_TEXT)
                .reply_markup(get_products_menu_keyboard())
                .await?;
        }

        "add_products" => {
            session.enter_menu(ConversationState::AddProductMenu);
            bot.edit_message_text(chat_id, message_id, ADD_PRODUCT_MENU_TEXT)
                .reply_markup(add_product_menu_keyboard())
                .await?;
        }

        "update_products" => {
            session.enter_menu(ConversationState::UpdateProductMenu);
            bot.edit_message_text(chat_id, message_id, UPDATE_PRODUCT_MENU_TEXT)
                .reply_markup(update_product_menu_keyboard())
                .await?;
        }

        "all_products" => {
            let filter = ProductFilter::with_limit(100);
            fetch_and_show(&bot, chat_id, message_id, &mut session, &state, filter).await?;
        }

        "search_in_stock" => {
            let filter = ProductFilter {
                include_out_of_stock: Some(false),
                limit: Some(100),
                ..ProductFilter::default()
            };
            fetch_and_show(&bot, chat_id, message_id, &mut session, &state, filter).await?;
        }

        // Листание кэшированной выдачи, без нового запроса к API.
        "show_more_products" => {
            session.page_index += 1;
            show_product_page(&bot, chat_id, Some(message_id), &session).await?;
        }

        "search_products" => {
            session.await_input(PendingOp::AwaitingSearchQuery);
            bot.edit_message_text(
                chat_id,
                message_id,
                "🔍 *Поиск продуктов по названию*\n\nВведите поисковый запрос:",
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        "search_category" => {
            session.await_input(PendingOp::AwaitingCategory);
            bot.edit_message_text(
                chat_id,
                message_id,
                "🏷️ *Поиск по категории*\n\nВведите название категории:",
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        "search_price_range" => {
            session.await_input(PendingOp::AwaitingPriceRange);
            bot.edit_message_text(
                chat_id,
                message_id,
                "💰 *Поиск по диапазону цен*\n\nВведите диапазон в формате:\n\
                 `минимум - максимум`\n\nЛюбую границу можно оставить пустой:\n\
                 `- 50` или `100 -`",
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        "by_id" => {
            session.await_input(PendingOp::AwaitingProductId(IdTarget::ProductLookup));
            bot.edit_message_text(
                chat_id,
                message_id,
                "🆔 *Получить продукт по ID*\n\nВведите ID продукта:",
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        "thermocup_by_id" => {
            session.await_input(PendingOp::AwaitingProductId(IdTarget::ThermocupLookup));
            bot.edit_message_text(
                chat_id,
                message_id,
                "☕ *Получить термокружку по ID*\n\nВведите ID термокружки:",
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        "add_thermocup" => {
            session.await_input(PendingOp::AwaitingThermocupData);
            bot.edit_message_text(
                chat_id,
                message_id,
                "☕ *Добавить новую термокружку*\n\nВведите данные в формате:\n\
                 `Название | Категория ID | Цена | Количество | Склад ID | Фото | Объем | Цвет | Бренд`\n\n\
                 Пример:\n\
                 `Stanley Classic | 1 | 45.99 | 100 | 1 | | 500 | Черный | Stanley`\n\n\
                 Обязательные поля: Название, Категория ID, Цена, Количество",
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        "update_thermocup" => {
            session.await_input(PendingOp::AwaitingProductId(IdTarget::ThermocupUpdate));
            bot.edit_message_text(
                chat_id,
                message_id,
                "✏️ *Обновить термокружку*\n\nВведите ID термокружки для обновления:",
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        "update_reserved" => {
            session.await_input(PendingOp::AwaitingProductId(IdTarget::ReservedUpdate));
            bot.edit_message_text(
                chat_id,
                message_id,
                "📦 *Обновить количество зарезервированного товара*\n\nВведите ID продукта:",
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        "update_stock" => {
            session.await_input(PendingOp::AwaitingProductId(IdTarget::StockUpdate));
            bot.edit_message_text(
                chat_id,
                message_id,
                "🏭 *Обновить количество товара на складе*\n\nВведите ID продукта:",
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        _ => {
            log::warn!("Unknown callback data from chat {}: {}", chat_id, data);
        }
    }

    Ok(())
}

/// Общий путь «запросить список и показать первую страницу».
async fn fetch_and_show(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    session: &mut Session,
    state: &BotState,
    filter: ProductFilter,
) -> HandlerResult {
    session.enter_menu(ConversationState::GetProductsMenu);

    let Some(products) = state.api().get_products(&filter).await else {
        bot.edit_message_text(chat_id, message_id, SERVICE_UNAVAILABLE_TEXT)
            .reply_markup(back_to_products_keyboard())
            .await?;
        return Ok(());
    };

    if products.is_empty() {
        bot.edit_message_text(chat_id, message_id, "❌ Нет продуктов на складе")
            .reply_markup(back_to_products_keyboard())
            .await?;
        return Ok(());
    }

    session.cache_pages(paginate(&products, PAGE_CHAR_BUDGET));
    show_product_page(bot, chat_id, Some(message_id), session).await
}
