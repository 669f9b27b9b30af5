//! Hand-off between the audio callback and the control thread.
//!
//! The producer half lives inside the capture callback; the consumer half
//! stays with the session. Backed by an unbounded lock-free channel, so a
//! push never blocks and never drops audio when the consumer lags. Memory
//! grows with recording length instead.
//!
//! Neither half is `Clone`: there is exactly one producer and one consumer.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::models::audio_models::{PcmSample, SampleBuffer};
use crate::models::error::CaptureError;

/// Create a connected producer/consumer pair for a stream with `channels`
/// interleaved channels.
pub fn sample_sink(channels: u16) -> (SampleProducer, SampleConsumer) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (
        SampleProducer {
            sender,
            channels: channels.max(1),
            next_sequence: 0,
        },
        SampleConsumer { receiver },
    )
}

/// Real-time side of the sink.
pub struct SampleProducer {
    sender: Sender<SampleBuffer>,
    channels: u16,
    next_sequence: u64,
}

impl SampleProducer {
    /// Hand a buffer to the consumer. Never blocks.
    ///
    /// Returns `false` if the consumer is gone, in which case the buffer is
    /// discarded.
    pub fn push(&mut self, mut buffer: SampleBuffer) -> bool {
        buffer.sequence = self.next_sequence;
        self.next_sequence += 1;
        match self.sender.try_send(buffer) {
            Ok(()) => true,
            // Unbounded: `Full` cannot happen.
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Serialize interleaved samples and push them as one buffer.
    pub fn push_samples<T: PcmSample>(&mut self, samples: &[T]) -> bool {
        self.push(SampleBuffer::from_samples(samples, self.channels))
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of buffers pushed so far.
    pub fn pushed(&self) -> u64 {
        self.next_sequence
    }
}

/// Control side of the sink.
pub struct SampleConsumer {
    receiver: Receiver<SampleBuffer>,
}

impl SampleConsumer {
    /// Buffers queued and not yet drained.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Take every buffer in push order, exactly once.
    ///
    /// Completes only once the producer has been dropped, which is the
    /// signal that no further callback can deliver samples. If the producer
    /// is still attached after `timeout` the drain fails, since any snapshot
    /// taken at that point could miss trailing audio.
    pub fn drain(self, timeout: Duration) -> Result<Vec<SampleBuffer>, CaptureError> {
        let deadline = Instant::now() + timeout;
        let mut buffers = Vec::with_capacity(self.receiver.len());
        loop {
            match self.receiver.recv_deadline(deadline) {
                Ok(buffer) => {
                    debug_assert_eq!(buffer.sequence(), buffers.len() as u64);
                    buffers.push(buffer);
                }
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(CaptureError::StreamFailure(
                        "capture stream still delivering after teardown".into(),
                    ))
                }
            }
        }
        log::debug!("Drained {} sample buffers", buffers.len());
        Ok(buffers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn drain_preserves_push_order() {
        let (mut producer, consumer) = sample_sink(1);
        for i in 0..100i16 {
            assert!(producer.push_samples(&[i, i]));
        }
        drop(producer);

        let buffers = consumer.drain(TIMEOUT).unwrap();
        assert_eq!(buffers.len(), 100);
        for (i, buffer) in buffers.iter().enumerate() {
            assert_eq!(buffer.sequence(), i as u64);
            let first = i16::from_le_bytes([buffer.data()[0], buffer.data()[1]]);
            assert_eq!(first, i as i16);
        }
    }

    #[test]
    fn drain_waits_for_concurrent_producer() {
        let (mut producer, consumer) = sample_sink(2);
        let handle = thread::spawn(move || {
            for i in 0..1000i32 {
                producer.push_samples(&[i, -i]);
                if i % 100 == 0 {
                    thread::yield_now();
                }
            }
        });

        let buffers = consumer.drain(TIMEOUT).unwrap();
        handle.join().unwrap();

        assert_eq!(buffers.len(), 1000);
        let sequences: Vec<u64> = buffers.iter().map(SampleBuffer::sequence).collect();
        assert_eq!(sequences, (0..1000).collect::<Vec<u64>>());
        assert!(buffers.iter().all(|b| b.frames() == 1));
    }

    #[test]
    fn drain_fails_while_producer_attached() {
        let (mut producer, consumer) = sample_sink(1);
        producer.push_samples(&[0.25f32]);

        let err = consumer.drain(Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, CaptureError::StreamFailure(_)));
        drop(producer);
    }

    #[test]
    fn push_after_consumer_dropped_reports_false() {
        let (mut producer, consumer) = sample_sink(1);
        drop(consumer);
        assert!(!producer.push_samples(&[1u8]));
    }

    #[test]
    fn pending_counts_queued_buffers() {
        let (mut producer, consumer) = sample_sink(1);
        producer.push_samples(&[1i16]);
        producer.push_samples(&[2i16]);
        assert_eq!(consumer.pending(), 2);
        assert_eq!(producer.pushed(), 2);
    }

    #[test]
    fn empty_recording_drains_to_nothing() {
        let (producer, consumer) = sample_sink(1);
        drop(producer);
        assert!(consumer.drain(TIMEOUT).unwrap().is_empty());
    }
}
