//! Per-channel fetch, append and render cycle

use log::{debug, warn};

use crate::channel::MetricChannel;
use crate::frame::RenderFrame;
use crate::source::MetricSource;
use crate::window::SampleWindow;
use crate::{EvalmonError, Result};

struct ChannelState {
    channel: MetricChannel,
    window: SampleWindow,
    source: Box<dyn MetricSource>,
    last_frame: Option<RenderFrame>,
}

impl ChannelState {
    fn poll(&mut self) -> Option<RenderFrame> {
        match self.source.sample() {
            Ok(value) => {
                self.window.append(value);
                debug!("sampled {} = {:.2}", self.channel.id(), value);
                self.last_frame = RenderFrame::from_window(&self.channel, &self.window);
            }
            Err(e) => {
                // Keep the previous frame; the next tick retries.
                warn!("skipping {} sample: {}", self.channel.id(), e);
            }
        }
        self.last_frame.clone()
    }
}

/// Owns every channel's window. All mutation goes through `&mut self`, so a
/// poller has exactly one writer at a time.
#[derive(Default)]
pub struct Poller {
    channels: Vec<ChannelState>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        channel: MetricChannel,
        capacity: usize,
        source: impl MetricSource + 'static,
    ) -> Result<()> {
        if self.state(channel.id()).is_some() {
            return Err(EvalmonError::DuplicateChannel(channel.id().to_string()));
        }
        self.channels.push(ChannelState {
            channel,
            window: SampleWindow::new(capacity),
            source: Box::new(source),
            last_frame: None,
        });
        Ok(())
    }

    /// Fetch one sample for `channel_id`, append it and render the window.
    ///
    /// A failed fetch leaves the window untouched and returns the previous
    /// frame, or `None` if the channel has never produced one.
    pub fn poll_and_render(&mut self, channel_id: &str) -> Result<Option<RenderFrame>> {
        let state = self
            .channels
            .iter_mut()
            .find(|c| c.channel.id() == channel_id)
            .ok_or_else(|| EvalmonError::UnknownChannel(channel_id.to_string()))?;
        Ok(state.poll())
    }

    /// Poll every channel in registration order.
    pub fn poll_all(&mut self) -> Vec<RenderFrame> {
        self.channels.iter_mut().filter_map(ChannelState::poll).collect()
    }

    pub fn window(&self, channel_id: &str) -> Option<&SampleWindow> {
        self.state(channel_id).map(|c| &c.window)
    }

    pub fn last_frame(&self, channel_id: &str) -> Option<&RenderFrame> {
        self.state(channel_id).and_then(|c| c.last_frame.as_ref())
    }

    pub fn channels(&self) -> impl Iterator<Item = &MetricChannel> {
        self.channels.iter().map(|c| &c.channel)
    }

    fn state(&self, channel_id: &str) -> Option<&ChannelState> {
        self.channels.iter().find(|c| c.channel.id() == channel_id)
    }
}
