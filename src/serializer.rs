//! Full-rate drain of the channel buffers onto the serial output.

use crate::buffers::ChannelBuffers;
use crate::CHANNEL_COUNT;

/// Walks the captured bits channel-major, MSB first.
///
/// The serializer owns a copy of the buffers taken when sampling finished, so nothing written
/// afterwards can reach the output. `position` always points at the bit currently presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serializer {
    buffers: ChannelBuffers,
    position: usize,
}

impl Serializer {
    pub fn new(buffers: ChannelBuffers) -> Serializer {
        assert!(buffers.is_full(), "serializing incomplete capture");
        Serializer { buffers, position: 0 }
    }

    pub fn len(&self) -> usize {
        self.buffers.width() as usize * CHANNEL_COUNT
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.len() - self.position
    }

    pub fn current(&self) -> bool {
        let width = self.buffers.width() as usize;
        let channel = self.position / width;
        let index = self.position % width;
        self.buffers.channel(channel).bit(index as u8)
    }

    /// Move to the next bit. Returns `None` once every bit has been presented.
    pub fn advance(&mut self) -> Option<bool> {
        if self.position + 1 >= self.len() {
            self.position = self.len();
            return None
        }
        self.position += 1;
        Some(self.current())
    }

    pub fn buffers(&self) -> &ChannelBuffers {
        &self.buffers
    }
}
