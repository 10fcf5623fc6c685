//! Interrupt-driven button input.
//!
//! Button edges are produced by GPIO ISRs (or a host input thread) and
//! consumed by the main loop, which feeds them through the gesture
//! classifiers one at a time in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Button A ISR│────▶│              │     │              │
//! │ Button B ISR│────▶│  InputQueue  │────▶│  Main Loop   │
//! │ Button C ISR│────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use crate::nav::Button;

/// Maximum number of pending edges.
/// Power of 2 for efficient ring buffer modulo.
pub const INPUT_QUEUE_CAP: usize = 16;

/// One debounced falling edge on a button line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEdge {
    pub button: Button,
    /// Monotonic milliseconds at the edge.
    pub at_ms: u64,
}

impl ButtonEdge {
    pub fn new(button: Button, at_ms: u64) -> Self {
        Self { button, at_ms }
    }

    // Button index in the low two bits, timestamp above.
    fn pack(self) -> u64 {
        (self.at_ms << 2) | self.button as u64
    }

    fn unpack(raw: u64) -> Option<Self> {
        let button = Button::from_index((raw & 0b11) as u8)?;
        Some(Self {
            button,
            at_ms: raw >> 2,
        })
    }
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// ISRs write (produce), main loop reads (consume). One slot is kept
// free to tell full from empty.

pub struct InputQueue {
    head: AtomicU8,
    tail: AtomicU8,
    slots: [AtomicU64; INPUT_QUEUE_CAP],
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InputQueue {
    pub const fn new() -> Self {
        Self {
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
            slots: [const { AtomicU64::new(0) }; INPUT_QUEUE_CAP],
        }
    }

    /// Push an edge into the queue.
    /// Safe to call from ISR context (lock-free).
    /// Returns `false` if the queue is full (edge dropped).
    pub fn push(&self, edge: ButtonEdge) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let next_head = (head + 1) % INPUT_QUEUE_CAP as u8;

        if next_head == tail {
            return false;
        }

        self.slots[head as usize].store(edge.pack(), Ordering::Relaxed);
        self.head.store(next_head, Ordering::Release);
        true
    }

    /// Pop the next edge. Called from the main loop (single consumer).
    pub fn pop(&self) -> Option<ButtonEdge> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let raw = self.slots[tail as usize].load(Ordering::Relaxed);
        self.tail
            .store((tail + 1) % INPUT_QUEUE_CAP as u8, Ordering::Release);

        ButtonEdge::unpack(raw)
    }

    /// Drain all pending edges into a callback, in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(ButtonEdge)) {
        while let Some(edge) = self.pop() {
            handler(edge);
        }
    }

    pub fn is_empty(&self) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        tail == head
    }

    /// Number of pending edges.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed) as usize;
        let tail = self.tail.load(Ordering::Relaxed) as usize;
        (head + INPUT_QUEUE_CAP - tail) % INPUT_QUEUE_CAP
    }
}
