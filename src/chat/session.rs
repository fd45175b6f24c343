use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

use crate::common::{ChatEvent, Contact, Message, MessageSender};
use crate::config::ChatConfig;

use super::rate_limit::RateLimiter;
use super::validation::{ValidationError, sanitize, validate};

/// Canned text the simulated contact answers with.
const REPLY_TEXT: &str = "Copy that. Over.";

/// Why a send was rejected. Every rejection is recoverable and carries a
/// human-readable reason for the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// A send is already in flight for this session; the caller should
    /// simply not double-submit.
    #[error("A send is already in progress")]
    Busy,
    #[error("{0}")]
    Invalid(#[from] ValidationError),
    #[error("Sending too fast; try again in {} s", .cooldown.as_millis().div_ceil(1000))]
    RateLimited { cooldown: Duration },
}

impl SendError {
    /// Wait time in whole seconds (ceiling), present only for rate-limit
    /// rejections.
    pub fn cooldown_secs(&self) -> Option<u64> {
        match self {
            SendError::RateLimited { cooldown } => {
                Some(cooldown.as_millis().div_ceil(1000) as u64)
            }
            _ => None,
        }
    }
}

/// Coordinates one chat session with a contact: validates and rate-limits
/// outbound messages, owns the message log, and schedules the simulated
/// reply.
///
/// The reply task never touches the session directly; it delivers through
/// an internal channel that [`messages`](Self::messages) drains, so a
/// torn-down session can never be mutated by a late timer.
pub struct ChatSession {
    contact: Contact,
    config: ChatConfig,
    messages: Vec<Message>,
    limiter: RateLimiter,
    in_flight: bool,
    reply_tx: mpsc::UnboundedSender<Message>,
    reply_rx: mpsc::UnboundedReceiver<Message>,
    reply_tasks: Vec<JoinHandle<()>>,
    event_tx: Option<mpsc::UnboundedSender<ChatEvent>>,
}

impl ChatSession {
    pub fn new(contact: Contact, config: ChatConfig) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let limiter = RateLimiter::new(
            config.max_messages_per_window,
            Duration::from_millis(config.window_ms),
        );

        let now = chrono::Utc::now().timestamp_millis();
        let messages = vec![
            Message::with_timestamp(
                "Hey, I can hear you over the airwaves!",
                MessageSender::Contact,
                now - 60_000,
            ),
            Message::with_timestamp("Loud and clear. What's up?", MessageSender::Me, now - 30_000),
        ];

        Self {
            contact,
            config,
            messages,
            limiter,
            in_flight: false,
            reply_tx,
            reply_rx,
            reply_tasks: Vec::new(),
            event_tx: None,
        }
    }

    /// Registers a sink for [`ChatEvent`]s; a dropped receiver is ignored.
    pub fn set_event_sink(&mut self, event_tx: mpsc::UnboundedSender<ChatEvent>) {
        self.event_tx = Some(event_tx);
    }

    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    /// Runs the send pipeline: busy check, validation, rate limiting,
    /// sanitization, append, reply scheduling.
    ///
    /// Returns the appended message on success. The in-flight flag is
    /// released once the self message is appended, not when the reply
    /// lands.
    pub fn send(&mut self, raw: &str) -> Result<Message, SendError> {
        if self.in_flight {
            return Err(SendError::Busy);
        }
        self.in_flight = true;
        let result = self.admit(raw);
        self.in_flight = false;

        if let Err(err) = &result {
            log::debug!("Send rejected for {}: {err}", self.contact.handle);
        }
        result
    }

    fn admit(&mut self, raw: &str) -> Result<Message, SendError> {
        validate(raw, self.config.max_message_chars)?;

        if !self.limiter.try_admit() {
            return Err(SendError::RateLimited {
                cooldown: self.limiter.remaining_cooldown(),
            });
        }

        let message = Message::new(sanitize(raw), MessageSender::Me);
        self.append(message.clone());
        self.schedule_reply();
        Ok(message)
    }

    /// The message log in creation order, with any delivered replies
    /// folded in first.
    pub fn messages(&mut self) -> &[Message] {
        self.drain_replies();
        &self.messages
    }

    /// Cancels pending reply timers. Idempotent; called from `Drop`.
    pub fn teardown(&mut self) {
        for task in self.reply_tasks.drain(..) {
            task.abort();
        }
    }

    fn schedule_reply(&mut self) {
        let reply_tx = self.reply_tx.clone();
        let delay = Duration::from_millis(self.config.reply_delay_ms);
        let task = tokio::spawn(async move {
            sleep(delay).await;
            // Receiver gone means the session was dropped; nothing to do.
            let _ = reply_tx.send(Message::new(REPLY_TEXT, MessageSender::Contact));
        });

        self.reply_tasks.retain(|task| !task.is_finished());
        self.reply_tasks.push(task);
    }

    fn drain_replies(&mut self) {
        while let Ok(reply) = self.reply_rx.try_recv() {
            self.append(reply);
        }
    }

    fn append(&mut self, message: Message) {
        if let Some(event_tx) = &self.event_tx {
            if event_tx.send(ChatEvent::MessageAppended(message.clone())).is_err() {
                log::debug!("Chat event receiver dropped");
            }
        }
        self.messages.push(message);
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn contact() -> Contact {
        Contact {
            id: "1".into(),
            name: "Alex Rivera".into(),
            handle: "@alex".into(),
            distance_meters: 12,
            signal: 0.8,
        }
    }

    fn session() -> ChatSession {
        ChatSession::new(contact(), ChatConfig::default())
    }

    async fn settle() {
        // Let the reply task observe its expired timer and deliver.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn new_session_carries_the_seed_conversation() {
        let mut session = session();
        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, MessageSender::Contact);
        assert_eq!(messages[1].sender, MessageSender::Me);
        assert!(messages[0].created_at <= messages[1].created_at);
    }

    #[tokio::test(start_paused = true)]
    async fn send_appends_self_message_then_reply_after_delay() {
        let mut session = session();
        let sent = session.send("Hello there").expect("send should succeed");
        assert_eq!(sent.text, "Hello there");
        assert_eq!(sent.sender, MessageSender::Me);
        assert_eq!(session.messages().len(), 3);

        // Let the spawned reply task register its timer before advancing.
        settle().await;
        advance(Duration::from_millis(1000)).await;
        settle().await;

        let messages = session.messages();
        assert_eq!(messages.len(), 4);
        let reply = messages.last().expect("reply present");
        assert_eq!(reply.sender, MessageSender::Contact);
        assert_eq!(reply.text, "Copy that. Over.");
    }

    #[tokio::test(start_paused = true)]
    async fn no_reply_before_the_delay_elapses() {
        let mut session = session();
        session.send("ping").expect("send should succeed");
        advance(Duration::from_millis(999)).await;
        settle().await;
        assert_eq!(session.messages().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn sent_text_is_sanitized() {
        let mut session = session();
        let sent = session.send("  5/5 & clear  ").expect("send should succeed");
        assert_eq!(sent.text, "5&#x2F;5 &amp; clear");
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_input_is_rejected_with_reason() {
        let mut session = session();
        assert_eq!(
            session.send("   "),
            Err(SendError::Invalid(ValidationError::Empty))
        );
        assert_eq!(
            session.send("<script>alert(1)</script>"),
            Err(SendError::Invalid(ValidationError::UnsafeContent))
        );
        // Nothing was appended or admitted.
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn eleventh_send_in_window_is_rate_limited() {
        let mut session = session();
        for i in 0..10 {
            session
                .send(&format!("message {i}"))
                .expect("within the window limit");
        }
        let err = session.send("one too many").expect_err("over the limit");
        match &err {
            SendError::RateLimited { cooldown } => assert!(*cooldown > Duration::ZERO),
            other => panic!("expected rate limit, got {other:?}"),
        }
        assert_eq!(err.cooldown_secs(), Some(60));
        assert_eq!(session.messages().len(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn busy_session_rejects_without_side_effects() {
        let mut session = session();
        session.in_flight = true;
        assert_eq!(session.send("hello"), Err(SendError::Busy));
        session.in_flight = false;
        assert_eq!(session.messages().len(), 2);
        assert!(session.send("hello").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_the_pending_reply() {
        let mut session = session();
        session.send("going dark").expect("send should succeed");
        session.teardown();
        session.teardown();

        advance(Duration::from_millis(5000)).await;
        settle().await;
        // Self message landed; the reply never will.
        assert_eq!(session.messages().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn events_are_emitted_for_every_append() {
        let mut session = session();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        session.set_event_sink(event_tx);

        session.send("check one two").expect("send should succeed");
        settle().await;
        advance(Duration::from_millis(1000)).await;
        settle().await;
        session.messages();

        let ChatEvent::MessageAppended(first) = event_rx.try_recv().expect("self event");
        assert_eq!(first.sender, MessageSender::Me);
        let ChatEvent::MessageAppended(second) = event_rx.try_recv().expect("reply event");
        assert_eq!(second.sender, MessageSender::Contact);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_error_reads_in_whole_seconds() {
        let err = SendError::RateLimited {
            cooldown: Duration::from_millis(1),
        };
        assert_eq!(err.cooldown_secs(), Some(1));
        assert_eq!(err.to_string(), "Sending too fast; try again in 1 s");
    }
}
