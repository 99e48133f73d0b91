//! End-to-end fetch and ordering tests against a fake TCP backend.
//!
//! No audio device is involved: these exercise the offline synthesis path,
//! which shares the segmentation, wire protocol, and per-sentence workers
//! with the playback pipeline.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use voxflow_core::CrossfadeMixer;
use voxflow_pipeline::{PipelineConfig, SENTINEL, probe, synthesize};

/// Fake synthesis backend. Serves `connections` requests, each answered
/// with PCM whose constant sample value encodes the sentence it received,
/// followed by the end-of-stream sentinel.
fn spawn_backend(connections: usize) -> (u16, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    let handle = thread::spawn(move || {
        for _ in 0..connections {
            let (mut socket, _) = listener.accept().expect("accept");
            socket
                .set_read_timeout(Some(Duration::from_secs(2)))
                .expect("read timeout");

            let mut request = vec![0u8; 1024];
            let n = socket.read(&mut request).expect("read request");
            let text = String::from_utf8_lossy(&request[..n]).into_owned();

            let value = sample_value(&text);
            let samples = vec![value; 50];
            let mut response: Vec<u8> =
                samples.iter().flat_map(|s: &f32| s.to_le_bytes()).collect();
            response.extend_from_slice(SENTINEL);
            socket.write_all(&response).expect("write response");
        }
    });
    (port, handle)
}

fn sample_value(text: &str) -> f32 {
    match text {
        "One." => 0.1,
        "Two!" => 0.2,
        "Three?" => 0.3,
        _ => -1.0,
    }
}

fn test_config(port: u16) -> PipelineConfig {
    PipelineConfig {
        port,
        connect_timeout: Duration::from_secs(2),
        read_timeout: Duration::from_secs(2),
        ..PipelineConfig::default()
    }
}

#[test]
fn chunks_come_back_in_sentence_order() {
    let (port, backend) = spawn_backend(3);
    let chunks = synthesize("One. Two! Three?", &test_config(port));
    backend.join().expect("backend");

    assert_eq!(chunks.len(), 3);
    for (i, expected) in [0.1f32, 0.2, 0.3].iter().enumerate() {
        let chunk = chunks[i].as_ref().expect("chunk present");
        assert_eq!(chunk.len(), 50, "sentence {i}");
        assert!(chunk.iter().all(|s| (s - expected).abs() < 1e-6), "sentence {i}");
    }
}

#[test]
fn mixing_fetched_chunks_crossfades_each_seam() {
    let (port, backend) = spawn_backend(3);
    let config = test_config(port);
    let chunks = synthesize("One. Two! Three?", &config);
    backend.join().expect("backend");

    // 50-sample chunks with a 10-sample overlap window.
    let mixer = CrossfadeMixer::new(10);
    let mixed = mixer.mix_chunks(&chunks);
    assert_eq!(mixed.len(), 50 * 3 - 10 * 2);
}

#[test]
fn unreachable_backend_yields_all_none() {
    // Bind and immediately drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let config = PipelineConfig {
        connect_timeout: Duration::from_millis(200),
        ..test_config(port)
    };
    let chunks = synthesize("One. Two!", &config);
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(Option::is_none));
}

#[test]
fn empty_text_produces_no_chunks() {
    let chunks = synthesize("   ", &test_config(1));
    assert!(chunks.is_empty());
}

#[test]
fn probe_reflects_backend_reachability() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    let config = PipelineConfig {
        connect_timeout: Duration::from_millis(200),
        ..test_config(port)
    };
    assert!(probe(&config));

    drop(listener);
    assert!(!probe(&config));
}
