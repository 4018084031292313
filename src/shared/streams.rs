use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Bridges discrete UI events into a transform input stream. The stream
/// ends when the sender is dropped.
pub fn event_channel<T: Send + 'static>() -> (UnboundedSender<T>, BoxStream<'static, T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, receiver_stream(rx))
}

/// Adapts an existing receiver into a stream that ends when every sender
/// is dropped.
pub fn receiver_stream<T: Send + 'static>(rx: UnboundedReceiver<T>) -> BoxStream<'static, T> {
    stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event, rx))
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_events_in_order_and_ends_on_drop() {
        let (tx, mut stream) = event_channel::<u32>();

        tx.send(1).unwrap();
        tx.send(2).unwrap();
        drop(tx);

        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, Some(2));
        assert_eq!(stream.next().await, None);
    }
}
