use teloxide::{prelude::*, utils::command::BotCommands};

mod bot_state;
mod config;
mod handlers;
mod models;
mod warehouse;

use crate::bot_state::BotState;
use crate::config::Config;
use crate::handlers::{callback_handler, command_handler, message_handler};
use crate::warehouse::WarehouseClient;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
enum Command {
    #[command(description = "открыть главное меню")]
    Start,
    #[command(description = "показать помощь")]
    Help,
    #[command(description = "отменить текущую операцию")]
    Cancel,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Starting warehouse bot...");

    let config = Config::from_env()?;
    log::info!("Warehouse API: {}", config.warehouse_api_url);

    let api = WarehouseClient::new(&config.warehouse_api_url)?;
    let state = BotState::new(api);

    let bot = Bot::new(config.bot_token);

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
