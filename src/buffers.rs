//! Per-channel capture storage.

use crate::CHANNEL_COUNT;

/// One channel's bits, most significant (first captured) bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBuffer {
    bits: u16,
    len: u8,
    capacity: u8,
}

impl ChannelBuffer {
    pub fn new(capacity: u8) -> ChannelBuffer {
        debug_assert!(capacity >= 1 && capacity <= 16);
        ChannelBuffer { bits: 0, len: 0, capacity }
    }

    pub fn len(&self) -> u8 {
        self.len
    }

    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    pub fn push(&mut self, bit: bool) {
        assert!(!self.is_full(), "channel buffer overrun");
        self.bits = self.bits << 1 | bit as u16;
        self.len += 1;
    }

    /// Bit at `index`, where index 0 is the first bit captured.
    pub fn bit(&self, index: u8) -> bool {
        assert!(index < self.len);
        (self.bits >> (self.len - 1 - index)) & 1 != 0
    }

    /// The captured sample, right-aligned. Only meaningful once full.
    pub fn word(&self) -> u16 {
        self.bits
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBuffers {
    channels: [ChannelBuffer; CHANNEL_COUNT],
}

impl ChannelBuffers {
    pub fn new(width: u8) -> ChannelBuffers {
        ChannelBuffers { channels: [ChannelBuffer::new(width); CHANNEL_COUNT] }
    }

    pub fn width(&self) -> u8 {
        self.channels[0].capacity()
    }

    /// Number of bits captured so far; all channels fill in lock-step.
    pub fn len(&self) -> u8 {
        self.channels[0].len()
    }

    pub fn is_full(&self) -> bool {
        self.channels[0].is_full()
    }

    /// Append one bit to every channel. `index` is the position the bits are expected to land at.
    pub fn push(&mut self, index: u8, bits: [bool; CHANNEL_COUNT]) {
        assert_eq!(index, self.len(), "channel buffers filled out of order");
        for (channel, bit) in self.channels.iter_mut().zip(bits) {
            channel.push(bit);
        }
    }

    pub fn channel(&self, index: usize) -> &ChannelBuffer {
        &self.channels[index]
    }

    pub fn words(&self) -> [u16; CHANNEL_COUNT] {
        self.channels.map(|channel| channel.word())
    }
}
