use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot_state::BotState;
use crate::handlers::input::{
    parse_delta, parse_id, parse_price_range, parse_search_text, parse_thermocup_draft,
    parse_thermocup_update, ValidationError,
};
use crate::handlers::pager::{render_product_block, truncate_message, MESSAGE_HARD_LIMIT};
use crate::handlers::utils::{
    add_product_menu_keyboard, back_to_products_keyboard, escape_markdown_v2,
    get_products_menu_keyboard, main_menu_keyboard, render_detail, update_product_menu_keyboard,
    ADD_PRODUCT_MENU_TEXT, GET_PRODUCTS_MENU_TEXT, MAIN_MENU_TEXT, UPDATE_PRODUCT_MENU_TEXT,
};
use crate::handlers::{HandlerResult, SERVICE_UNAVAILABLE_TEXT};
use crate::models::{ConversationState, IdTarget, PendingOp, ProductFilter, Session};

/// Свободный текст диспетчеризуется по незавершенной операции сессии,
/// а не по номинальному состоянию: несколько сценариев делят один и
/// тот же промпт ввода ID.
pub async fn message_handler(bot: Bot, msg: Message, state: BotState) -> HandlerResult {
    let chat_id = msg.chat.id;

    let Some(text) = msg.text() else {
        bot.send_message(chat_id, "ℹ️ Отправьте текстовое сообщение или используйте /start.")
            .await?;
        return Ok(());
    };

    // Команды уже обработаны в command_handler
    if text.starts_with('/') {
        return Ok(());
    }

    let session = state.session(chat_id).await;
    let mut session = session.lock().await;

    let Some(pending) = session.pending.clone() else {
        if session.state == ConversationState::AwaitingInput {
            // Состояние ждет ввода, а операции нет: нарушение контракта,
            // не пользовательская ошибка.
            log::error!(
                "Chat {} awaits input without a pending operation, resetting session",
                chat_id
            );
            session.reset();
            bot.send_message(chat_id, "❌ Произошла ошибка. Пожалуйста, начните заново.")
                .await?;
            bot.send_message(chat_id, MAIN_MENU_TEXT)
                .reply_markup(main_menu_keyboard())
                .await?;
        } else {
            bot.send_message(chat_id, "ℹ️ Выберите действие кнопками или используйте /start.")
                .await?;
        }
        return Ok(());
    };

    match pending {
        PendingOp::AwaitingProductId(target) => {
            handle_product_id(&bot, chat_id, text, target, &mut session, &state).await
        }
        PendingOp::AwaitingSearchQuery => {
            handle_search_query(&bot, chat_id, text, &mut session, &state).await
        }
        PendingOp::AwaitingCategory => {
            handle_category(&bot, chat_id, text, &mut session, &state).await
        }
        PendingOp::AwaitingPriceRange => {
            handle_price_range(&bot, chat_id, text, &mut session, &state).await
        }
        PendingOp::AwaitingThermocupData => {
            handle_thermocup_data(&bot, chat_id, text, &mut session, &state).await
        }
        PendingOp::AwaitingUpdateData { product_id } => {
            handle_update_data(&bot, chat_id, text, product_id, &mut session, &state).await
        }
        PendingOp::AwaitingReservedQuantity { product_id } => {
            handle_reserved_quantity(&bot, chat_id, text, product_id, &mut session, &state).await
        }
        PendingOp::AwaitingWarehouseId { product_id } => {
            handle_warehouse_id(&bot, chat_id, text, product_id, &mut session).await
        }
        PendingOp::AwaitingStockQuantity {
            product_id,
            warehouse_id,
        } => {
            handle_stock_quantity(
                &bot,
                chat_id,
                text,
                product_id,
                warehouse_id,
                &mut session,
                &state,
            )
            .await
        }
    }
}

/// Универсальный обработчик ввода ID: куда двигаться дальше, решает
/// цель, записанная при нажатии кнопки.
async fn handle_product_id(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    target: IdTarget,
    session: &mut Session,
    state: &BotState,
) -> HandlerResult {
    let product_id = match parse_id(text) {
        Ok(product_id) => product_id,
        Err(_) => {
            // Самопереход: операция и уже собранные данные сохраняются.
            bot.send_message(chat_id, "❌ Пожалуйста, введите числовой ID")
                .await?;
            return Ok(());
        }
    };

    match target {
        IdTarget::ProductLookup | IdTarget::ThermocupLookup => {
            let (result, emoji, label, not_found) = match target {
                IdTarget::ProductLookup => (
                    state.api().get_product_by_id(product_id).await,
                    "🆔",
                    "Продукт",
                    format!("❌ Продукт с ID {} не найден", product_id),
                ),
                _ => (
                    state.api().get_thermocup_by_id(product_id).await,
                    "☕",
                    "Термокружка",
                    format!("❌ Термокружка с ID {} не найдена", product_id),
                ),
            };

            session.enter_menu(ConversationState::GetProductsMenu);

            match result {
                Some(value) => {
                    let detail = format!(
                        "{} {} ID {}:\n\n{}",
                        emoji,
                        label,
                        product_id,
                        render_detail(&value)
                    );
                    bot.send_message(chat_id, truncate_message(&detail, MESSAGE_HARD_LIMIT))
                        .reply_markup(back_to_products_keyboard())
                        .await?;
                }
                None => {
                    bot.send_message(chat_id, not_found).await?;
                    send_get_products_menu(bot, chat_id).await?;
                }
            }
        }

        IdTarget::ThermocupUpdate => {
            session.await_input(PendingOp::AwaitingUpdateData { product_id });
            bot.send_message(
                chat_id,
                format!(
                    "✏️ *Обновление термокружки ID {}*\n\nВведите новые данные в формате:\n\
                     `Название | Цена | SKU | Активен(true/false)`\n\nПример:\n\
                     `Stanley New | 49.99 | STAN-002 | true`\n\n\
                     Все поля опциональны, пустые пропускаются",
                    product_id
                ),
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        IdTarget::ReservedUpdate => {
            session.await_input(PendingOp::AwaitingReservedQuantity { product_id });
            bot.send_message(
                chat_id,
                format!(
                    "📦 *Обновление резерва для ID {}*\n\nВведите изменение количества:\n\
                     \\(положительное число \\- прибавить, отрицательное \\- отнять\\)\n\n\
                     Пример: `10` или `-5`",
                    product_id
                ),
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }

        IdTarget::StockUpdate => {
            session.await_input(PendingOp::AwaitingWarehouseId { product_id });
            bot.send_message(
                chat_id,
                format!(
                    "🏭 *Обновление склада для ID {}*\n\nВведите ID склада:",
                    product_id
                ),
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }
    }

    Ok(())
}

async fn handle_search_query(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    session: &mut Session,
    state: &BotState,
) -> HandlerResult {
    let query = match parse_search_text(text) {
        Ok(query) => query,
        Err(_) => {
            bot.send_message(chat_id, "❌ Поисковый запрос не должен быть пустым")
                .await?;
            return Ok(());
        }
    };

    let filter = ProductFilter {
        search: Some(query.clone()),
        limit: Some(50),
        ..ProductFilter::default()
    };

    run_product_search(
        bot,
        chat_id,
        session,
        state,
        filter,
        format!("🔍 Результаты поиска «{}»:", query),
        format!("❌ Продукты по запросу «{}» не найдены", query),
    )
    .await
}

async fn handle_category(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    session: &mut Session,
    state: &BotState,
) -> HandlerResult {
    let category = match parse_search_text(text) {
        Ok(category) => category,
        Err(_) => {
            bot.send_message(chat_id, "❌ Название категории не должно быть пустым")
                .await?;
            return Ok(());
        }
    };

    let filter = ProductFilter {
        category: Some(category.clone()),
        limit: Some(50),
        ..ProductFilter::default()
    };

    run_product_search(
        bot,
        chat_id,
        session,
        state,
        filter,
        format!("🏷️ Продукты категории «{}»:", category),
        format!("❌ В категории «{}» ничего не найдено", category),
    )
    .await
}

async fn handle_price_range(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    session: &mut Session,
    state: &BotState,
) -> HandlerResult {
    let (min_price, max_price) = match parse_price_range(text) {
        Ok(range) => range,
        Err(e) => {
            bot.send_message(chat_id, format!("❌ {}", e)).await?;
            return Ok(());
        }
    };

    let range_text = describe_price_range(min_price, max_price);
    let filter = ProductFilter {
        min_price,
        max_price,
        limit: Some(50),
        ..ProductFilter::default()
    };

    run_product_search(
        bot,
        chat_id,
        session,
        state,
        filter,
        format!("💰 Продукты по цене {}:", range_text),
        format!("❌ По цене {} ничего не найдено", range_text),
    )
    .await
}

async fn handle_thermocup_data(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    session: &mut Session,
    state: &BotState,
) -> HandlerResult {
    let draft = match parse_thermocup_draft(text) {
        Ok(draft) => draft,
        Err(ValidationError::TooFewFields { .. }) => {
            bot.send_message(
                chat_id,
                "❌ Неверный формат. Нужно минимум 4 поля:\n\
                 Название | Категория ID | Цена | Количество",
            )
            .await?;
            return Ok(());
        }
        Err(e) => {
            bot.send_message(chat_id, format!("❌ Ошибка в данных: {}", e))
                .await?;
            return Ok(());
        }
    };

    let result = state.api().create_thermocup(&draft).await;
    session.enter_menu(ConversationState::AddProductMenu);

    match result {
        Some(record) => {
            let id_text = record
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let name = record.name.unwrap_or(draft.name);
            bot.send_message(
                chat_id,
                format!(
                    "✅ *Термокружка успешно создана\\!*\nID: {}\nНазвание: {}",
                    id_text,
                    escape_markdown_v2(&name)
                ),
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }
        None => {
            bot.send_message(chat_id, "❌ Ошибка при создании термокружки")
                .await?;
        }
    }

    send_add_product_menu(bot, chat_id).await
}

async fn handle_update_data(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    product_id: i64,
    session: &mut Session,
    state: &BotState,
) -> HandlerResult {
    let update = match parse_thermocup_update(text) {
        Ok(update) => update,
        Err(e) => {
            bot.send_message(chat_id, format!("❌ Ошибка в данных: {}", e))
                .await?;
            return Ok(());
        }
    };

    if update.is_empty() {
        bot.send_message(chat_id, "❌ Не указано ни одного поля для обновления")
            .await?;
        return Ok(());
    }

    let result = state.api().update_thermocup(product_id, &update).await;
    session.enter_menu(ConversationState::UpdateProductMenu);

    match result {
        Some(_) => {
            bot.send_message(
                chat_id,
                format!(
                    "✅ Термокружка ID {} успешно обновлена\\!\nИзмененные поля: {}",
                    product_id,
                    escape_markdown_v2(&update.changed_fields().join(", "))
                ),
            )
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        }
        None => {
            bot.send_message(chat_id, "❌ Ошибка при обновлении термокружки")
                .await?;
        }
    }

    send_update_product_menu(bot, chat_id).await
}

async fn handle_reserved_quantity(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    product_id: i64,
    session: &mut Session,
    state: &BotState,
) -> HandlerResult {
    let quantity_change = match parse_delta(text) {
        Ok(quantity_change) => quantity_change,
        Err(_) => {
            // ID продукта остается в ожидающей операции.
            bot.send_message(chat_id, "❌ Пожалуйста, введите целое число")
                .await?;
            return Ok(());
        }
    };

    let result = state.api().update_reserved(product_id, quantity_change).await;
    session.enter_menu(ConversationState::UpdateProductMenu);

    match result {
        Some(_) => {
            bot.send_message(
                chat_id,
                format!(
                    "✅ Резерв для продукта ID {} обновлен!\nИзменение: {} единиц",
                    product_id, quantity_change
                ),
            )
            .await?;
        }
        None => {
            bot.send_message(chat_id, "❌ Ошибка при обновлении резерва")
                .await?;
        }
    }

    send_update_product_menu(bot, chat_id).await
}

async fn handle_warehouse_id(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    product_id: i64,
    session: &mut Session,
) -> HandlerResult {
    let warehouse_id = match parse_id(text) {
        Ok(warehouse_id) => warehouse_id,
        Err(_) => {
            bot.send_message(chat_id, "❌ Пожалуйста, введите числовой ID склада")
                .await?;
            return Ok(());
        }
    };

    session.await_input(PendingOp::AwaitingStockQuantity {
        product_id,
        warehouse_id,
    });
    bot.send_message(
        chat_id,
        format!(
            "🏭 *Обновление склада {} для продукта {}*\n\nВведите изменение количества:\n\
             \\(положительное число \\- прибавить, отрицательное \\- отнять\\)",
            warehouse_id, product_id
        ),
    )
    .parse_mode(ParseMode::MarkdownV2)
    .await?;

    Ok(())
}

async fn handle_stock_quantity(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    product_id: i64,
    warehouse_id: i64,
    session: &mut Session,
    state: &BotState,
) -> HandlerResult {
    let quantity_change = match parse_delta(text) {
        Ok(quantity_change) => quantity_change,
        Err(_) => {
            // ID продукта и склада переживают неудачный ввод количества.
            bot.send_message(chat_id, "❌ Пожалуйста, введите целое число")
                .await?;
            return Ok(());
        }
    };

    let result = state
        .api()
        .update_stock(product_id, warehouse_id, quantity_change)
        .await;
    session.enter_menu(ConversationState::UpdateProductMenu);

    match result {
        Some(_) => {
            bot.send_message(
                chat_id,
                format!(
                    "✅ Склад обновлен!\nПродукт ID: {}\nСклад ID: {}\nИзменение: {} единиц",
                    product_id, warehouse_id, quantity_change
                ),
            )
            .await?;
        }
        None => {
            bot.send_message(chat_id, "❌ Ошибка при обновлении склада")
                .await?;
        }
    }

    send_update_product_menu(bot, chat_id).await
}

/// Запрос списка по фильтру и отправка результатов одним сообщением.
async fn run_product_search(
    bot: &Bot,
    chat_id: ChatId,
    session: &mut Session,
    state: &BotState,
    filter: ProductFilter,
    header: String,
    no_results: String,
) -> HandlerResult {
    let result = state.api().get_products(&filter).await;
    session.enter_menu(ConversationState::GetProductsMenu);

    let Some(products) = result else {
        bot.send_message(chat_id, SERVICE_UNAVAILABLE_TEXT).await?;
        return send_get_products_menu(bot, chat_id).await;
    };

    if products.is_empty() {
        bot.send_message(chat_id, no_results).await?;
        return send_get_products_menu(bot, chat_id).await;
    }

    let mut message = format!("{}\n\n", header);
    for product in &products {
        message.push_str(&render_product_block(product));
    }

    bot.send_message(chat_id, truncate_message(&message, MESSAGE_HARD_LIMIT))
        .reply_markup(back_to_products_keyboard())
        .await?;

    Ok(())
}

fn describe_price_range(min_price: Option<f64>, max_price: Option<f64>) -> String {
    match (min_price, max_price) {
        (Some(min), Some(max)) => format!("от ${:.2} до ${:.2}", min, max),
        (Some(min), None) => format!("от ${:.2}", min),
        (None, Some(max)) => format!("до ${:.2}", max),
        (None, None) => "без ограничений".to_string(),
    }
}

async fn send_get_products_menu(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, GET_PRODUCTS_MENU_TEXT)
        .reply_markup(get_products_menu_keyboard())
        .await?;
    Ok(())
}

async fn send_add_product_menu(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, ADD_PRODUCT_MENU_TEXT)
        .reply_markup(add_product_menu_keyboard())
        .await?;
    Ok(())
}

async fn send_update_product_menu(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, UPDATE_PRODUCT_MENU_TEXT)
        .reply_markup(update_product_menu_keyboard())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_range_descriptions() {
        assert_eq!(describe_price_range(None, Some(50.0)), "до $50.00");
        assert_eq!(describe_price_range(Some(100.0), None), "от $100.00");
        assert_eq!(
            describe_price_range(Some(10.0), Some(20.0)),
            "от $10.00 до $20.00"
        );
    }

    #[test]
    fn failed_quantity_entry_keeps_collected_ids() {
        let mut session = Session::default();
        session.await_input(PendingOp::AwaitingStockQuantity {
            product_id: 7,
            warehouse_id: 3,
        });

        // Путь обработчика: сессия продвигается только после удачного
        // разбора, неудача оставляет самопереход.
        if parse_delta("десять").is_ok() {
            session.enter_menu(ConversationState::UpdateProductMenu);
        }

        assert_eq!(session.state, ConversationState::AwaitingInput);
        assert_eq!(
            session.pending,
            Some(PendingOp::AwaitingStockQuantity {
                product_id: 7,
                warehouse_id: 3,
            })
        );
    }
}
