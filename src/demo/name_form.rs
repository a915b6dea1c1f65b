//! One-question form: ask for a name, greet the user.
//!
//! Shows the two kinds of dynamic handlers working together: a message hook
//! capturing the user's next text, and an inline hook button cancelling the
//! form.

use async_trait::async_trait;

use crate::messages::{message_fn, MessageContext, MessageHandler};
use crate::routing::{hook_fn, Args};
use crate::transport::{MessageRef, Target, UserId};

const PROMPT: &str = "Enter your name";

/// Starts the form; mount it as a command or reply-button handler
#[derive(Debug, Default)]
pub struct NameForm;

#[async_trait]
impl MessageHandler for NameForm {
    async fn handle(&self, ctx: &MessageContext) -> anyhow::Result<()> {
        let d = &ctx.dispatcher;
        let chat_id = ctx.message.message.chat_id;
        let user = ctx.message.from;

        let cancel_router = ctx.router.clone();
        let cancel = d.hook_button(
            "Cancel",
            None,
            hook_fn(move |_, cb| {
                let router = cancel_router.clone();
                async move {
                    router.unregister_hook(cb.message.chat_id, cb.from);
                    cb.dispatcher.close_view(cb.key());
                    cb.transport().delete_message(cb.message).await?;
                    cb.transport()
                        .send_message(&Target::chat(cb.message.chat_id), "Cancelled.", None)
                        .await?;
                    anyhow::Ok(())
                }
            }),
            Args::new(),
        );

        let sent = d
            .transport()
            .send_message(&ctx.message.target(), PROMPT, Some(&vec![vec![cancel.button]]))
            .await;
        let prompt = match sent {
            Ok(prompt) => prompt,
            Err(err) => {
                d.state().hooks.unregister(&cancel.hook_id);
                return Err(err);
            }
        };
        // The hook existed before its message did
        d.state().hooks.adopt(&cancel.hook_id, prompt.key());

        ctx.router
            .register_hook(chat_id, user, message_fn(move |reply| answer(reply, prompt, user)));
        tracing::debug!(%prompt, %user, "name form opened");
        Ok(())
    }
}

async fn answer(ctx: MessageContext, prompt: MessageRef, user: UserId) -> anyhow::Result<()> {
    let transport = ctx.dispatcher.transport();
    let name = ctx.message.text.trim();
    if name.is_empty() || name.starts_with('/') {
        transport
            .send_message(&ctx.message.target(), "Try again", None)
            .await?;
        return Ok(());
    }

    ctx.router.unregister_hook(prompt.chat_id, user);
    ctx.dispatcher.close_view(prompt.key());
    transport.edit_keyboard(prompt, None).await?;
    transport
        .send_message(&ctx.message.target(), &format!("Nice to meet you, {name}!"), None)
        .await?;
    Ok(())
}
