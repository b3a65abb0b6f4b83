//! Full sink-to-wire and sink-to-source pipeline tests.
//!
//! Exercises every framing mode across real loopback sockets:
//! - exact on-wire bytes produced by the sink
//! - round trips through a listening source
//! - single-use and raw-mode connection-per-message behavior

use std::time::Duration;

use adapters::{Charset, Message, MessageSink, SinkConfig, SourceConfig, TcpSink, TcpSource};
use framewire_e2e_tests::{init_tracing, RawCollector};
use framing::Encoding;
use transport::{ClientConfig, ServerConfig};

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

fn source_config(encoding: Encoding) -> SourceConfig {
    SourceConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            encoding,
            ..ServerConfig::default()
        },
        charset: Charset::Utf8,
    }
}

fn sink_config(port: u16, encoding: Encoding, single_use: bool) -> SinkConfig {
    SinkConfig {
        client: ClientConfig {
            host: "127.0.0.1".to_string(),
            port,
            encoding,
            single_use,
            ..ClientConfig::default()
        },
        charset: Charset::Utf8,
    }
}

#[tokio::test]
async fn test_crlf_sink_writes_terminated_frames_in_order() {
    init_tracing();
    let mut collector = RawCollector::start().await.unwrap();

    let sink = TcpSink::new(sink_config(collector.addr.port(), Encoding::Crlf, false)).unwrap();
    sink.send_text("foo").await.unwrap();
    sink.send_text("bar").await.unwrap();
    sink.close().await;

    let wire = tokio::time::timeout(TEST_TIMEOUT, collector.next_connection())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&wire[..], b"foo\r\nbar\r\n");
    collector.stop();
}

#[tokio::test]
async fn test_length_prefixed_sink_wire_format() {
    init_tracing();
    let mut collector = RawCollector::start().await.unwrap();

    let sink = TcpSink::new(sink_config(collector.addr.port(), Encoding::L2, false)).unwrap();
    sink.send_text("hello").await.unwrap();
    sink.close().await;

    let wire = tokio::time::timeout(TEST_TIMEOUT, collector.next_connection())
        .await
        .unwrap()
        .unwrap();
    // Two-byte big-endian length, then the payload.
    assert_eq!(&wire[..], b"\x00\x05hello");
    collector.stop();
}

#[tokio::test]
async fn test_round_trip_every_stream_encoding() {
    init_tracing();
    let encodings = [
        Encoding::Crlf,
        Encoding::Lf,
        Encoding::Null,
        Encoding::StxEtx,
        Encoding::L1,
        Encoding::L2,
        Encoding::L4,
    ];

    for encoding in encodings {
        let mut source = TcpSource::new(source_config(encoding)).unwrap();
        let addr = source.start().await.unwrap();

        let sink = TcpSink::new(sink_config(addr.port(), encoding, false)).unwrap();
        sink.send_text("first").await.unwrap();
        sink.send_text("second").await.unwrap();

        for expected in ["first", "second"] {
            let message = tokio::time::timeout(TEST_TIMEOUT, source.recv())
                .await
                .unwrap_or_else(|_| panic!("timed out waiting for {expected} ({encoding})"))
                .unwrap();
            assert_eq!(
                message.payload_text(Charset::Utf8).unwrap(),
                expected,
                "mismatch under {encoding}"
            );
            assert!(message.metadata.peer_addr.is_some());
        }

        sink.close().await;
        source.stop().await;
    }
}

#[tokio::test]
async fn test_raw_mode_delivers_one_frame_per_connection() {
    init_tracing();
    let mut source = TcpSource::new(source_config(Encoding::Raw)).unwrap();
    let addr = source.start().await.unwrap();

    // Raw frames end at connection close, so each message needs its own
    // connection.
    let sink = TcpSink::new(sink_config(addr.port(), Encoding::Raw, true)).unwrap();
    sink.send_text("alpha").await.unwrap();
    sink.send_text("beta").await.unwrap();

    let mut received = Vec::new();
    for _ in 0..2 {
        let message = tokio::time::timeout(TEST_TIMEOUT, source.recv())
            .await
            .unwrap()
            .unwrap();
        received.push(message.payload_text(Charset::Utf8).unwrap());
    }
    received.sort();
    assert_eq!(received, vec!["alpha", "beta"]);

    source.stop().await;
}

#[tokio::test]
async fn test_single_use_sink_dials_per_message() {
    init_tracing();
    let mut collector = RawCollector::start().await.unwrap();

    let sink = TcpSink::new(sink_config(collector.addr.port(), Encoding::Lf, true)).unwrap();
    sink.send_text("one").await.unwrap();
    sink.send_text("two").await.unwrap();

    let mut wires = Vec::new();
    for _ in 0..2 {
        let wire = tokio::time::timeout(TEST_TIMEOUT, collector.next_connection())
            .await
            .unwrap()
            .unwrap();
        wires.push(wire);
    }
    wires.sort();
    assert_eq!(wires, vec![b"one\n".to_vec(), b"two\n".to_vec()]);
    collector.stop();
}

#[tokio::test]
async fn test_binary_payload_survives_stx_etx() {
    init_tracing();
    let mut source = TcpSource::new(source_config(Encoding::StxEtx)).unwrap();
    let addr = source.start().await.unwrap();

    let sink = TcpSink::new(sink_config(addr.port(), Encoding::StxEtx, false)).unwrap();
    // Bytes other than STX/ETX pass through unescaped, terminators included.
    let payload = vec![0x00u8, 0x0A, 0x0D, 0x7F, 0xFF];
    sink.send(Message::new(payload.clone())).await.unwrap();

    let message = tokio::time::timeout(TEST_TIMEOUT, source.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&message.payload[..], &payload[..]);

    sink.close().await;
    source.stop().await;
}
