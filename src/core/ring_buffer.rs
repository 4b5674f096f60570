//! Fixed-capacity ring buffer for real-time audio paths.

use thiserror::Error;

/// Returned by [`RingBuffer::write`] when old samples had to be discarded.
///
/// The write itself still completed: the newest samples are always kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ring buffer overrun: {dropped} oldest samples dropped")]
pub struct Overrun {
    pub dropped: usize,
}

/// Returned by [`RingBuffer::read`] when supply ran out.
///
/// The missing tail of the destination has been zero-filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ring buffer underrun: {missing} samples zero-filled")]
pub struct Underrun {
    pub missing: usize,
}

/// Fixed-capacity ring buffer.
///
/// The buffer never allocates after construction and never shifts memory.
/// All operations are O(n) in the number of elements copied, with deterministic
/// upper bounds.
///
/// Two overflow behaviours are available: [`write`](Self::write) drops the
/// oldest data so the most recent audio survives (the real-time policy), while
/// [`push_slice`](Self::push_slice) rejects whatever does not fit.
#[derive(Debug, Clone)]
pub struct RingBuffer<T>
where
    T: Copy + Default,
{
    data: Vec<T>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> RingBuffer<T>
where
    T: Copy + Default,
{
    /// Creates a ring buffer with fixed capacity.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            data: vec![T::default(); cap],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Returns the number of elements currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns available free space.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity().saturating_sub(self.len)
    }

    /// Returns true when no elements are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears the ring buffer.
    #[inline]
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Discards up to `n` elements from the front.
    ///
    /// Returns the number of elements discarded.
    pub fn discard(&mut self, n: usize) -> usize {
        let to_drop = n.min(self.len);
        if to_drop == 0 || self.capacity() == 0 {
            return 0;
        }
        self.head = (self.head + to_drop) % self.capacity();
        self.len -= to_drop;
        if self.len == 0 {
            self.head = 0;
            self.tail = 0;
        }
        to_drop
    }

    /// Copies elements from the front into `out` without removing them.
    ///
    /// Returns the number of copied elements.
    pub fn peek_slice(&self, out: &mut [T]) -> usize {
        let to_copy = out.len().min(self.len);
        if to_copy == 0 || self.capacity() == 0 {
            return 0;
        }

        let first = to_copy.min(self.capacity() - self.head);
        out[..first].copy_from_slice(&self.data[self.head..self.head + first]);
        let second = to_copy - first;
        if second > 0 {
            out[first..first + second].copy_from_slice(&self.data[..second]);
        }
        to_copy
    }

    /// Pushes as many items as fit from `input`, rejecting the rest.
    ///
    /// Returns the number of items pushed.
    pub fn push_slice(&mut self, input: &[T]) -> usize {
        if input.is_empty() || self.capacity() == 0 || self.available() == 0 {
            return 0;
        }
        let to_push = input.len().min(self.available());
        let first = to_push.min(self.capacity() - self.tail);
        self.data[self.tail..self.tail + first].copy_from_slice(&input[..first]);
        self.tail = (self.tail + first) % self.capacity();

        let second = to_push - first;
        if second > 0 {
            self.data[..second].copy_from_slice(&input[first..first + second]);
            self.tail = second;
        }

        self.len += to_push;
        to_push
    }

    /// Pops as many items as available into `output`.
    ///
    /// Returns the number of items popped.
    pub fn pop_slice(&mut self, output: &mut [T]) -> usize {
        if output.is_empty() || self.capacity() == 0 || self.len == 0 {
            return 0;
        }
        let to_pop = output.len().min(self.len);
        let first = to_pop.min(self.capacity() - self.head);
        output[..first].copy_from_slice(&self.data[self.head..self.head + first]);
        self.head = (self.head + first) % self.capacity();

        let second = to_pop - first;
        if second > 0 {
            output[first..first + second].copy_from_slice(&self.data[..second]);
            self.head = second;
        }

        self.len -= to_pop;
        if self.len == 0 {
            self.head = 0;
            self.tail = 0;
        }
        to_pop
    }

    /// Appends all of `input`, discarding the oldest stored elements if needed.
    ///
    /// If `input` alone is longer than the capacity only its newest
    /// `capacity` elements are kept. Returns [`Overrun`] with the number of
    /// elements lost (old contents plus any skipped head of `input`).
    pub fn write(&mut self, input: &[T]) -> Result<(), Overrun> {
        let cap = self.capacity();
        if cap == 0 {
            return if input.is_empty() {
                Ok(())
            } else {
                Err(Overrun {
                    dropped: input.len(),
                })
            };
        }

        let skipped = input.len().saturating_sub(cap);
        let input = &input[skipped..];
        let evicted = self.discard(input.len().saturating_sub(self.available()));
        let pushed = self.push_slice(input);
        debug_assert_eq!(pushed, input.len());

        let dropped = skipped + evicted;
        if dropped > 0 {
            Err(Overrun { dropped })
        } else {
            Ok(())
        }
    }

    /// Fills `output` from the front of the buffer.
    ///
    /// Never blocks: when fewer than `output.len()` elements are stored the
    /// remainder is filled with `T::default()` (silence for samples) and
    /// [`Underrun`] reports how many were missing.
    pub fn read(&mut self, output: &mut [T]) -> Result<(), Underrun> {
        let got = self.pop_slice(output);
        if got < output.len() {
            output[got..].fill(T::default());
            Err(Underrun {
                missing: output.len() - got,
            })
        } else {
            Ok(())
        }
    }
}
