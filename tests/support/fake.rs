// ABOUTME: Scripted in-memory transport for exercising session logic.
// ABOUTME: Each opened channel replays a prepared list of events.

use async_trait::async_trait;
use sshrun::ssh::{Channel, ChannelEvent, Transport};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the next opened channel does.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub events: Vec<ChannelEvent>,
    /// Fail the exec request itself.
    pub exec_fails: bool,
    /// Never finish once the events run out.
    pub hang: bool,
}

impl Script {
    pub fn events(events: Vec<ChannelEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    /// A command that prints `stdout`/`stderr` and exits with `code`.
    pub fn command(stdout: &str, stderr: &str, code: u32) -> Self {
        let mut events = Vec::new();
        if !stdout.is_empty() {
            events.push(ChannelEvent::Stdout(stdout.as_bytes().to_vec()));
        }
        if !stderr.is_empty() {
            events.push(ChannelEvent::Stderr(stderr.as_bytes().to_vec()));
        }
        events.push(ChannelEvent::ExitStatus(code));
        events.push(ChannelEvent::Eof);
        events.push(ChannelEvent::Close);
        Self::events(events)
    }
}

/// Shared view of what the session did to the transport.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    commands: Arc<Mutex<Vec<String>>>,
    disconnects: Arc<AtomicUsize>,
}

impl Recorder {
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

pub struct FakeTransport {
    scripts: Mutex<VecDeque<Script>>,
    recorder: Recorder,
}

impl FakeTransport {
    /// Transport whose channels follow `scripts` in order. Opening more
    /// channels than scripts fails.
    pub fn new(scripts: Vec<Script>) -> (Self, Recorder) {
        let recorder = Recorder::default();
        let transport = Self {
            scripts: Mutex::new(scripts.into()),
            recorder: recorder.clone(),
        };
        (transport, recorder)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    type Channel = FakeChannel;

    async fn open_channel(&self) -> Result<FakeChannel, russh::Error> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(russh::Error::Disconnect)?;
        Ok(FakeChannel {
            events: script.events.into(),
            exec_fails: script.exec_fails,
            hang: script.hang,
            recorder: self.recorder.clone(),
        })
    }

    async fn disconnect(&self) -> Result<(), russh::Error> {
        self.recorder.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeChannel {
    events: VecDeque<ChannelEvent>,
    exec_fails: bool,
    hang: bool,
    recorder: Recorder,
}

#[async_trait]
impl Channel for FakeChannel {
    async fn exec(&mut self, command: &str) -> Result<(), russh::Error> {
        self.recorder.commands.lock().unwrap().push(command.to_string());
        if self.exec_fails {
            return Err(russh::Error::Disconnect);
        }
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        match self.events.pop_front() {
            Some(event) => Some(event),
            None if self.hang => std::future::pending().await,
            None => None,
        }
    }
}
