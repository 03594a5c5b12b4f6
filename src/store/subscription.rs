use futures::stream::{BoxStream, Stream, StreamExt};

/// A message received on a pub/sub channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMessage {
    /// The channel the message was published on
    pub channel: String,
    /// Raw payload as published
    pub payload: String,
}

impl ChannelMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

/// A live subscription to one channel.
///
/// Owns the store-side resources for the subscription (a broadcast receiver,
/// a dedicated connection, ...). Dropping it unsubscribes, so every exit path
/// of a waiter tears it down.
pub struct Subscription {
    channel: String,
    messages: BoxStream<'static, ChannelMessage>,
}

impl Subscription {
    /// Wrap a message stream for `channel`.
    pub fn new<S>(channel: impl Into<String>, messages: S) -> Self
    where
        S: Stream<Item = ChannelMessage> + Send + 'static,
    {
        Self {
            channel: channel.into(),
            messages: messages.boxed(),
        }
    }

    /// The channel this subscription was opened for.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Wait for the next message. `None` means the stream has ended.
    pub async fn next_message(&mut self) -> Option<ChannelMessage> {
        self.messages.next().await
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
