mod common;

use std::fs;

use common::ScriptedBackend;
use mic_recorder_core::{
    sample_sink, DeviceFormat, MicRecorder, RecorderConfig, SampleBuffer, SampleFormat, WavEncoder, WavHeader,
};
use proptest::prelude::*;

fn chunks() -> impl Strategy<Value = Vec<Vec<i16>>> {
    // Each chunk is a whole number of stereo frames.
    prop::collection::vec(
        prop::collection::vec(any::<i16>(), 0..64).prop_map(|mut v| {
            v.truncate(v.len() & !1);
            v
        }),
        0..24,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn recording_holds_exactly_the_pushed_samples(chunks in chunks()) {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::stereo_i16();
        let recorder = MicRecorder::new(backend.clone(), RecorderConfig::with_output_directory(dir.path())).unwrap();

        recorder.start_recording().unwrap();
        for chunk in &chunks {
            backend.feed(chunk);
        }
        let path = recorder.stop_recording().unwrap();

        let expected: Vec<i16> = chunks.concat();
        let bytes = fs::read(&path).unwrap();
        let header = WavHeader::parse(&bytes).unwrap();
        prop_assert_eq!(header.data_len as usize, expected.len() * 2);

        let payload: Vec<i16> = bytes[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        prop_assert_eq!(payload, expected);
    }

    #[test]
    fn drain_preserves_push_order(sizes in prop::collection::vec(0usize..32, 0..40)) {
        let (mut producer, consumer) = sample_sink(1);
        for (i, &size) in sizes.iter().enumerate() {
            let samples = vec![i as i16; size];
            prop_assert!(producer.push_samples(&samples));
        }
        drop(producer);

        let drained = consumer.drain(std::time::Duration::from_secs(1)).unwrap();
        prop_assert_eq!(drained.len(), sizes.len());
        for (i, buffer) in drained.iter().enumerate() {
            prop_assert_eq!(buffer.sequence(), i as u64);
            prop_assert_eq!(buffer.frames(), sizes[i]);
        }
    }

    #[test]
    fn encoding_is_deterministic(chunks in chunks(), rate in prop::sample::select(vec![8000u32, 44100, 48000])) {
        let dir = tempfile::tempdir().unwrap();
        let format = DeviceFormat::new(rate, 2, SampleFormat::I16);
        let buffers: Vec<SampleBuffer> = chunks.iter().map(|c| SampleBuffer::from_samples(c, 2)).collect();
        let encoder = WavEncoder::new(dir.path());

        let first = encoder.encode_to(&buffers, &format, &dir.path().join("a.wav")).unwrap();
        let second = encoder.encode_to(&buffers, &format, &dir.path().join("b.wav")).unwrap();

        prop_assert_eq!(&first.checksum, &second.checksum);
        prop_assert_eq!(fs::read(&first.path).unwrap(), fs::read(&second.path).unwrap());
    }
}
