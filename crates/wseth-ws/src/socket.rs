//! The duplex socket the client runs on.
//!
//! A [`Socket`] is a pair of channels: outbound [`Frame`]s, each acknowledged
//! once written, and inbound [`SocketEvent`]s (`Open`, `Message`, `Close`).
//! [`Socket::connect`] backs it with a real WebSocket; [`Socket::pair`]
//! hands the far end to the caller, which is how tests play the node.

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

use wseth_core::ClientError;

/// An outbound text frame plus the channel its write outcome is reported on.
#[derive(Debug)]
pub struct Frame {
    pub text: String,
    pub sent: oneshot::Sender<Result<(), ClientError>>,
}

impl Frame {
    /// Report the write outcome back to the client.
    pub fn ack(self, outcome: Result<(), ClientError>) -> String {
        let _ = self.sent.send(outcome);
        self.text
    }
}

/// Events emitted by the socket.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Open,
    Message(String),
    /// The socket is gone; carries the close reason if one was given.
    Close(Option<String>),
}

/// Client end of a socket.
pub struct Socket {
    pub frames: mpsc::UnboundedSender<Frame>,
    pub events: mpsc::UnboundedReceiver<SocketEvent>,
}

/// Far end of an in-memory socket.
pub struct SocketPeer {
    pub frames: mpsc::UnboundedReceiver<Frame>,
    pub events: mpsc::UnboundedSender<SocketEvent>,
}

impl Socket {
    /// An in-memory socket. Nothing is opened until the peer sends
    /// [`SocketEvent::Open`].
    pub fn pair() -> (Socket, SocketPeer) {
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            Socket {
                frames: frames_tx,
                events: events_rx,
            },
            SocketPeer {
                frames: frames_rx,
                events: events_tx,
            },
        )
    }

    /// Dial `url` in a background task. Returns immediately; `Open` (or
    /// `Close` on failure) arrives on the event channel.
    pub fn connect(url: impl Into<String>) -> Socket {
        let (socket, peer) = Self::pair();
        let url = url.into();
        tokio::spawn(async move {
            socket_task(url, peer).await;
        });
        socket
    }
}

/// Background task that owns the WebSocket connection.
async fn socket_task(url: String, peer: SocketPeer) {
    let SocketPeer {
        mut frames,
        events,
    } = peer;

    tracing::info!(url = %url, "connecting via WebSocket");
    let ws_stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "WS connect failed");
            let _ = events.send(SocketEvent::Close(Some(e.to_string())));
            return;
        }
    };
    tracing::info!(url = %url, "WS connected");
    let (mut sink, mut stream) = ws_stream.split();
    if events.send(SocketEvent::Open).is_err() {
        return;
    }

    let reason = loop {
        tokio::select! {
            frame = frames.recv() => {
                match frame {
                    // Client dropped: close politely.
                    None => {
                        let _ = sink.send(Message::Close(None)).await;
                        break None;
                    }
                    Some(Frame { text, sent }) => {
                        tracing::trace!(bytes = text.len(), "WS send");
                        let outcome = sink
                            .send(Message::Text(text.into()))
                            .await
                            .map_err(|e| ClientError::WebSocket(e.to_string()));
                        let failed = outcome.as_ref().err().map(ToString::to_string);
                        let _ = sent.send(outcome);
                        if let Some(error) = failed {
                            tracing::warn!(url = %url, error = %error, "WS send failed");
                            break Some(error);
                        }
                    }
                }
            }
            msg = stream.next() => {
                match msg {
                    None => break None,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "WS receive error");
                        break Some(e.to_string());
                    }
                    Some(Ok(Message::Text(text))) => {
                        if events.send(SocketEvent::Message(text.to_string())).is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        break frame.map(|f| f.reason.to_string());
                    }
                    _ => {}
                }
            }
        }
    };

    tracing::info!(url = %url, reason = ?reason, "WS disconnected");
    let _ = events.send(SocketEvent::Close(reason));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pair_carries_frames_and_events() {
        let (mut socket, mut peer) = Socket::pair();

        let (sent, ack) = oneshot::channel();
        socket
            .frames
            .send(Frame {
                text: "{}".into(),
                sent,
            })
            .unwrap();
        let frame = peer.frames.recv().await.unwrap();
        assert_eq!(frame.ack(Ok(())), "{}");
        assert!(ack.await.unwrap().is_ok());

        peer.events.send(SocketEvent::Open).unwrap();
        assert_eq!(socket.events.recv().await, Some(SocketEvent::Open));
    }
}
