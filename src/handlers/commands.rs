use teloxide::prelude::*;

use crate::bot_state::BotState;
use crate::handlers::utils::{main_menu_keyboard, MAIN_MENU_TEXT};
use crate::handlers::HandlerResult;
use crate::Command;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: BotState,
) -> HandlerResult {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await?,
        Command::Help => handle_help(bot, msg).await?,
        Command::Cancel => handle_cancel(bot, msg, state).await?,
    }
    Ok(())
}

async fn handle_start(bot: Bot, msg: Message, state: BotState) -> HandlerResult {
    state.reset_session(msg.chat.id).await;

    let greeting = match msg.chat.first_name() {
        Some(name) => {
            log::info!("User {} started the conversation", name);
            format!(
                "🏭 Добро пожаловать в систему управления складом, {}!\nВыберите действие:",
                name
            )
        }
        None => {
            log::info!("Chat {} started the conversation", msg.chat.id);
            "🏭 Добро пожаловать в систему управления складом!\nВыберите действие:".to_string()
        }
    };

    bot.send_message(msg.chat.id, greeting)
        .reply_markup(main_menu_keyboard())
        .await?;

    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "🏭 Бот управления складом\n\n\
         /start - открыть главное меню\n\
         /cancel - отменить текущую операцию\n\
         /help - эта справка\n\n\
         Навигация кнопками: получение, добавление и обновление товаров.\n\
         Когда бот ждет ввод (ID, количество, данные товара), просто \
         отправьте текст сообщением.",
    )
    .await?;

    Ok(())
}

/// /cancel сбрасывает незавершенную операцию и возвращает в главное меню.
async fn handle_cancel(bot: Bot, msg: Message, state: BotState) -> HandlerResult {
    state.reset_session(msg.chat.id).await;

    bot.send_message(msg.chat.id, "Операция отменена.").await?;
    bot.send_message(msg.chat.id, MAIN_MENU_TEXT)
        .reply_markup(main_menu_keyboard())
        .await?;

    Ok(())
}
