//! Command and message handlers for the Telegram bot.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

use crate::state::BotState;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and get a welcome message")]
    Start,

    #[command(description = "Show what the assistant can do")]
    Help,

    #[command(description = "Authenticate with your university email")]
    Login,
}

/// Dispatch a parsed command to its handler.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Login => handle_login(bot, msg, state).await,
    }
}

/// Handle the /start command.
async fn handle_start(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let (user_id, first_name, username) = sender_info(&msg);
    state.touch_user(&user_id, &first_name, username.as_deref());

    // /start abandons any half-finished flow from a previous conversation.
    state.engine().reset(&user_id).await;

    let welcome = format!(
        "Hi {}! I am the Master's programme AI Learning Assistant.\n\n\
        I can help you with:\n\
        - Course information for IS621-IS625\n\
        - Assignment details and deadlines\n\
        - Learning materials and resources\n\
        - Answering complex, multi-part questions about your studies\n\n\
        What would you like to know about your programme today?",
        first_name
    );

    bot.send_message(msg.chat.id, welcome).await?;

    info!(user_id = %user_id, "User started bot");
    Ok(())
}

/// Handle the /help command.
async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    let help_text = "I can help with your Master's programme classes in several ways:\n\n\
        1. Ask about specific courses by code (e.g., 'Tell me about IS623')\n\
        2. Get assignment details (e.g., 'What are the assignments for IS624?')\n\
        3. Find learning materials (e.g., 'Where can I find resources for IS625?')\n\
        4. Ask complex, multi-part questions (e.g., 'Compare the assignments for IS623 and IS624')\n\n\
        The more specific your question, the better I can help you!";

    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}

/// Handle the /login command - check auth status and hand out the link.
async fn handle_login(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let (user_id, _, _) = sender_info(&msg);

    if state.engine().is_authenticated(&user_id).await {
        bot.send_message(
            msg.chat.id,
            "You are already authenticated. You can continue using the bot.",
        )
        .await?;
        return Ok(());
    }

    let link = state.engine().login_link(&user_id);
    bot.send_message(
        msg.chat.id,
        format!(
            "Please authenticate using your university email address by clicking the link below:\n\n\
            {}\n\n\
            You need to authenticate to use the full features of this bot.",
            link
        ),
    )
    .await?;

    info!(user_id = %user_id, "Login link sent");
    Ok(())
}

/// Handle a plain text message: route it through the dialog engine.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let (user_id, first_name, username) = sender_info(&msg);
    state.touch_user(&user_id, &first_name, username.as_deref());

    info!(user_id = %user_id, "Processing message");

    let reply = state.process_message(&user_id, text).await;

    if let Err(e) = bot.send_message(msg.chat.id, reply).await {
        error!(user_id = %user_id, error = %e, "Failed to send reply");
    }

    Ok(())
}

/// Extract (user_id, first_name, username) from a message's sender.
///
/// Messages without a sender (channel posts) fall back to the chat id.
fn sender_info(msg: &Message) -> (String, String, Option<String>) {
    match msg.from.as_ref() {
        Some(user) => (
            user.id.to_string(),
            user.first_name.clone(),
            user.username.clone(),
        ),
        None => (msg.chat.id.to_string(), "there".to_string(), None),
    }
}
