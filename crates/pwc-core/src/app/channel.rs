//! Result Channel - パーティションごとの一回限りの配送路
//!
//! # 学習ポイント
//! - `deliver(self, ..)` が sender を消費するので二重送信は型で防がれる
//! - sender を drop すると receiver 側は `ChannelClosed` で起きる（polling 不要）

use tokio::sync::oneshot;

use crate::domain::{CountMessage, CountTriple, PwcError};

/// Create the channel for partition `index`.
pub fn result_channel(index: usize) -> (ResultSender, ResultReceiver) {
    let (tx, rx) = oneshot::channel();
    (ResultSender { index, tx }, ResultReceiver { index, rx })
}

/// Write end, owned by exactly one supervisor.
#[derive(Debug)]
pub struct ResultSender {
    index: usize,
    tx: oneshot::Sender<CountMessage>,
}

impl ResultSender {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Send the single result and close the channel.
    pub fn deliver(self, triple: CountTriple) -> Result<(), PwcError> {
        self.tx
            .send(CountMessage::from(triple))
            .map_err(|_| PwcError::ChannelClosed { index: self.index })
    }
}

/// Read end, owned by the aggregator. `recv` resolves once, when the sender
/// delivers or goes away.
#[derive(Debug)]
pub struct ResultReceiver {
    index: usize,
    rx: oneshot::Receiver<CountMessage>,
}

impl ResultReceiver {
    pub fn index(&self) -> usize {
        self.index
    }

    pub async fn recv(self) -> Result<CountTriple, PwcError> {
        let index = self.index;
        self.rx
            .await
            .map(|msg| msg.triple())
            .map_err(|_| PwcError::ChannelClosed { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn delivered_triple_is_received() {
        let (tx, rx) = result_channel(4);
        tx.deliver(CountTriple::new(1, 2, 3)).unwrap();
        assert_eq!(rx.recv().await.unwrap(), CountTriple::new(1, 2, 3));
    }

    #[tokio::test]
    async fn dropped_sender_closes_the_channel() {
        let (tx, rx) = result_channel(7);
        drop(tx);
        let err = rx.recv().await.unwrap_err();
        assert!(matches!(err, PwcError::ChannelClosed { index: 7 }));
    }

    #[tokio::test]
    async fn receiver_waits_for_a_late_delivery() {
        let (tx, rx) = result_channel(0);
        let sender = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tx.deliver(CountTriple::new(0, 0, 9)).unwrap();
        });

        assert_eq!(rx.recv().await.unwrap().chars, 9);
        sender.await.unwrap();
    }

    #[tokio::test]
    async fn delivery_to_a_gone_receiver_is_reported() {
        let (tx, rx) = result_channel(2);
        drop(rx);
        let err = tx.deliver(CountTriple::ZERO).unwrap_err();
        assert!(matches!(err, PwcError::ChannelClosed { index: 2 }));
    }
}
