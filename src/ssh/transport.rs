// ABOUTME: Seam between session logic and the SSH library.
// ABOUTME: RusshTransport adapts a russh client handle to the Transport/Channel traits.

use super::handler::ClientHandler;
use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect, Sig};

/// Something that happened on a session channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    ExitStatus(u32),
    ExitSignal {
        signal: String,
        core_dumped: bool,
        message: String,
    },
    /// The server refused a request on this channel.
    Failure,
    Eof,
    Close,
}

/// Signal name without the `SIG` prefix, as sent by the server.
fn signal_label(sig: Sig) -> String {
    match sig {
        Sig::Custom(name) => name,
        other => format!("{other:?}"),
    }
}

/// An authenticated connection able to open session channels.
#[async_trait]
pub trait Transport: Send + Sync {
    type Channel: Channel;

    async fn open_channel(&self) -> Result<Self::Channel, russh::Error>;

    async fn disconnect(&self) -> Result<(), russh::Error>;
}

/// A session channel carrying one remote command.
#[async_trait]
pub trait Channel: Send {
    async fn exec(&mut self, command: &str) -> Result<(), russh::Error>;

    /// Next event, or `None` once the channel is gone.
    async fn next_event(&mut self) -> Option<ChannelEvent>;
}

/// Transport backed by a russh client connection.
pub struct RusshTransport {
    handle: Handle<ClientHandler>,
}

impl RusshTransport {
    pub(crate) fn new(handle: Handle<ClientHandler>) -> Self {
        Self { handle }
    }
}

impl std::fmt::Debug for RusshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshTransport")
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

#[async_trait]
impl Transport for RusshTransport {
    type Channel = RusshChannel;

    async fn open_channel(&self) -> Result<RusshChannel, russh::Error> {
        let channel = self.handle.channel_open_session().await?;
        Ok(RusshChannel { channel })
    }

    async fn disconnect(&self) -> Result<(), russh::Error> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
    }
}

pub struct RusshChannel {
    channel: russh::Channel<client::Msg>,
}

#[async_trait]
impl Channel for RusshChannel {
    async fn exec(&mut self, command: &str) -> Result<(), russh::Error> {
        self.channel.exec(true, command).await
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        loop {
            let event = match self.channel.wait().await? {
                ChannelMsg::Data { data } => ChannelEvent::Stdout(data.to_vec()),
                // Extended data type 1 is stderr.
                ChannelMsg::ExtendedData { data, ext: 1 } => ChannelEvent::Stderr(data.to_vec()),
                ChannelMsg::ExitStatus { exit_status } => ChannelEvent::ExitStatus(exit_status),
                ChannelMsg::ExitSignal {
                    signal_name,
                    core_dumped,
                    error_message,
                    ..
                } => ChannelEvent::ExitSignal {
                    signal: signal_label(signal_name),
                    core_dumped,
                    message: error_message,
                },
                ChannelMsg::Failure => ChannelEvent::Failure,
                ChannelMsg::Eof => ChannelEvent::Eof,
                ChannelMsg::Close => ChannelEvent::Close,
                _ => continue,
            };
            return Some(event);
        }
    }
}
