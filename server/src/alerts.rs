use std::fmt;

use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};

const MARKDOWN_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

struct Alert {
    level: Level,
    message: String,
}

/// Forwards warnings and errors to a Telegram chat.
///
/// Sending happens on a background task so logging never waits for the network.
#[derive(Clone)]
pub struct TelegramAlerts {
    sender: mpsc::UnboundedSender<Alert>,
}

impl TelegramAlerts {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(sender_task(receiver, Client::new(), bot_token, chat_id));
        Self { sender }
    }

    fn alert(&self, level: Level, message: String) {
        let _ = self.sender.send(Alert { level, message });
    }
}

pub(crate) fn is_alerted(level: Level) -> bool {
    level <= Level::WARN
}

fn format_alert(alert: &Alert) -> String {
    let escaped: String = alert
        .message
        .chars()
        .flat_map(|c| {
            let escape = MARKDOWN_SPECIAL.contains(&c).then_some('\\');
            escape.into_iter().chain(std::iter::once(c))
        })
        .collect();
    format!("*{}*: `{}`", alert.level.as_str(), escaped)
}

async fn sender_task(
    mut receiver: mpsc::UnboundedReceiver<Alert>,
    client: Client,
    bot_token: String,
    chat_id: String,
) {
    let url = format!("https://api.telegram.org/bot{bot_token}/sendMessage");
    while let Some(alert) = receiver.recv().await {
        let text = format_alert(&alert);
        let params = [
            ("chat_id", chat_id.as_str()),
            ("text", text.as_str()),
            ("parse_mode", "MarkdownV2"),
        ];

        match client.post(&url).form(&params).send().await {
            Ok(response) if response.status().is_success() => {}
            // Logging through tracing here would feed the alert back into this layer
            Ok(response) => eprintln!("Failed to send alert: HTTP {}", response.status()),
            Err(e) => eprintln!("Failed to send alert: {e}"),
        }
    }
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for TelegramAlerts {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let level = *event.metadata().level();
        if !is_alerted(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.alert(level, visitor.message);
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}
