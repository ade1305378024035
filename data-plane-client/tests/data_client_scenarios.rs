use bytes::Bytes;
use data_plane_client::{
    Codec, DataChunk, DataClient, DataClientConfig, DataClientError, Elements,
    EndpointDescriptor, InstructionId, LogicalEndpoint, OutboundObserverKind,
};
use futures::future::join_all;
use integration_test_utils::{
    decode_u32s, init_logging, FixedWidthCodec, LoopbackChannelFactory, RecordingReceiver,
};
use std::sync::Arc;
use std::time::Duration;

const RECV_TIMEOUT: Duration = Duration::from_millis(500);
const IDLE: Duration = Duration::from_millis(100);

fn client_with(config: DataClientConfig) -> (DataClient, Arc<LoopbackChannelFactory>) {
    init_logging();
    let channels = Arc::new(LoopbackChannelFactory::new());
    let client = DataClient::new(config, channels.clone()).expect("valid config");
    (client, channels)
}

fn u32_codec() -> Arc<dyn Codec<u32>> {
    Arc::new(FixedWidthCodec)
}

fn chunks_for<'a>(
    batches: &'a [Elements],
    endpoint: &'a LogicalEndpoint,
) -> impl Iterator<Item = &'a DataChunk> + 'a {
    batches
        .iter()
        .flat_map(|elements| elements.data.iter())
        .filter(move |chunk| &chunk.endpoint == endpoint)
}

#[tokio::test]
async fn writer_sends_records_then_exactly_one_terminal_chunk() {
    let (client, channels) = client_with(DataClientConfig::default());
    let d1 = EndpointDescriptor::new("loopback:d1");
    let out = LogicalEndpoint::data("i1", "out");

    client
        .register_receiver(&"i1".into(), &[d1.clone()], RecordingReceiver::new())
        .await
        .expect("register");

    let mut writer = client
        .send(&d1, out.clone(), u32_codec())
        .await
        .expect("writer");
    for record in [7, 8, 9] {
        writer.write(&record).await.expect("write");
    }
    writer.close().await.expect("close");

    let batches = channels.remote(d1.url()).drain_outbound(IDLE).await;
    let chunks: Vec<_> = chunks_for(&batches, &out).collect();

    let (terminal, data) = chunks.split_last().expect("at least one chunk");
    assert!(terminal.is_terminal());
    assert!(terminal.payload.is_empty());
    assert!(data.iter().all(|chunk| !chunk.is_terminal()));

    let records: Vec<u32> = data
        .iter()
        .flat_map(|chunk| decode_u32s(&chunk.payload))
        .collect();
    assert_eq!(records, vec![7, 8, 9]);
    assert_eq!(writer.records_written(), 3);
    assert_eq!(writer.bytes_written(), 12);
}

#[tokio::test]
async fn small_buffer_limit_splits_records_across_chunks() {
    let (client, channels) = client_with(DataClientConfig {
        outbound_buffer_limit_bytes: 4,
        ..Default::default()
    });
    let d1 = EndpointDescriptor::new("loopback:small");
    let out = LogicalEndpoint::data("i1", "out");

    let mut writer = client
        .send(&d1, out.clone(), u32_codec())
        .await
        .expect("writer");
    for record in [1, 2, 3] {
        writer.write(&record).await.expect("write");
    }
    writer.close().await.expect("close");

    let batches = channels.remote(d1.url()).drain_outbound(IDLE).await;
    let chunks: Vec<_> = chunks_for(&batches, &out).collect();
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks.iter().filter(|chunk| chunk.is_terminal()).count(), 1);
    assert!(chunks[3].is_terminal());
}

#[tokio::test]
async fn closed_writer_rejects_further_use() {
    let (client, channels) = client_with(DataClientConfig::default());
    let d1 = EndpointDescriptor::new("loopback:closed");
    let out = LogicalEndpoint::data("i1", "out");

    let mut writer = client
        .send(&d1, out.clone(), u32_codec())
        .await
        .expect("writer");
    writer.close().await.expect("close");

    assert!(matches!(
        writer.write(&1).await,
        Err(DataClientError::WriterClosed(_))
    ));
    assert!(matches!(
        writer.close().await,
        Err(DataClientError::WriterClosed(_))
    ));

    let batches = channels.remote(d1.url()).drain_outbound(IDLE).await;
    assert_eq!(chunks_for(&batches, &out).count(), 1);
}

#[tokio::test]
async fn registration_reuses_cached_endpoint_and_builds_new_one() {
    let (client, channels) = client_with(DataClientConfig::default());
    let d1 = EndpointDescriptor::new("loopback:d1");
    let d2 = EndpointDescriptor::new("loopback:d2");

    client
        .register_receiver(&"i1".into(), &[d1.clone()], RecordingReceiver::new())
        .await
        .expect("register i1");
    assert_eq!(channels.total_opens(), 1);

    let receiver = RecordingReceiver::new();
    let i2 = InstructionId::from("i2");
    client
        .register_receiver(&i2, &[d1.clone(), d2.clone()], receiver.clone())
        .await
        .expect("register i2");

    assert_eq!(channels.open_count(d1.url()), 1);
    assert_eq!(channels.open_count(d2.url()), 1);
    assert_eq!(client.endpoint_cache().len(), 2);

    for descriptor in [&d1, &d2] {
        channels
            .remote(descriptor.url())
            .push_inbound(Elements::single(DataChunk::data(
                LogicalEndpoint::data(i2.clone(), "in"),
                Bytes::from_static(b"x"),
            )))
            .await;
    }
    assert!(receiver.wait_for(2, RECV_TIMEOUT).await);
}

#[tokio::test]
async fn unregistering_unknown_instruction_succeeds() {
    let (client, channels) = client_with(DataClientConfig::default());
    let d1 = EndpointDescriptor::new("loopback:d1");

    client
        .unregister_receiver(&"i3".into(), &[d1.clone()])
        .await
        .expect("noop unregister");

    assert_eq!(channels.open_count(d1.url()), 1);
    assert!(client.endpoint_cache().contains(&d1));
}

#[tokio::test]
async fn inbound_data_reaches_only_the_current_receiver() {
    let (client, channels) = client_with(DataClientConfig::default());
    let d1 = EndpointDescriptor::new("loopback:inbound");
    let i1 = InstructionId::from("i1");
    let i2 = InstructionId::from("i2");
    let first = RecordingReceiver::new();
    let second = RecordingReceiver::new();

    client
        .register_receiver(&i1, &[d1.clone()], first.clone())
        .await
        .expect("register i1");
    client
        .register_receiver(&i2, &[d1.clone()], second.clone())
        .await
        .expect("register i2");

    let remote = channels.remote(d1.url());
    let chunk = |id: &InstructionId, payload: &'static [u8]| {
        DataChunk::data(LogicalEndpoint::data(id.clone(), "in"), Bytes::from_static(payload))
    };

    remote
        .push_inbound(Elements::new(vec![chunk(&i1, b"a"), chunk(&i2, b"b")]))
        .await;
    assert!(first.wait_for(1, RECV_TIMEOUT).await);
    assert!(second.wait_for(1, RECV_TIMEOUT).await);

    client
        .unregister_receiver(&i1, &[d1.clone()])
        .await
        .expect("unregister i1");
    remote
        .push_inbound(Elements::new(vec![chunk(&i1, b"late"), chunk(&i2, b"c")]))
        .await;
    assert!(second.wait_for(2, RECV_TIMEOUT).await);

    assert_eq!(first.received().len(), 1);
    assert_eq!(first.received()[0].data, vec![chunk(&i1, b"a")]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolution_opens_one_channel_per_endpoint() {
    init_logging();
    let channels = Arc::new(LoopbackChannelFactory::new().with_open_delay(Duration::from_millis(20)));
    let client = Arc::new(
        DataClient::new(DataClientConfig::default(), channels.clone()).expect("valid config"),
    );
    let endpoints: Vec<_> = (0..4)
        .map(|n| EndpointDescriptor::new(format!("loopback:race-{n}")))
        .collect();

    let tasks = (0..64).map(|n| {
        let client = client.clone();
        let descriptor = endpoints[n % endpoints.len()].clone();
        tokio::spawn(async move {
            client
                .register_receiver(
                    &InstructionId::from(format!("i{n}")),
                    &[descriptor],
                    RecordingReceiver::new(),
                )
                .await
        })
    });

    for outcome in join_all(tasks).await {
        outcome.expect("join").expect("register");
    }

    for descriptor in &endpoints {
        assert_eq!(channels.open_count(descriptor.url()), 1);
    }
    assert_eq!(client.endpoint_cache().len(), endpoints.len());
}

#[tokio::test]
async fn failed_channel_is_retried_on_next_use() {
    let (client, channels) = client_with(DataClientConfig::default());
    let d1 = EndpointDescriptor::new("loopback:flaky");
    channels.fail_next(d1.url(), 1);

    let err = client
        .register_receiver(&"i1".into(), &[d1.clone()], RecordingReceiver::new())
        .await
        .expect_err("first open fails");
    assert!(matches!(err, DataClientError::ChannelConstruction { .. }));
    assert!(!client.endpoint_cache().contains(&d1));

    client
        .register_receiver(&"i1".into(), &[d1.clone()], RecordingReceiver::new())
        .await
        .expect("second open succeeds");
    assert_eq!(channels.open_count(d1.url()), 2);
}

#[tokio::test]
async fn evicted_endpoint_closes_stream_and_reopens_on_demand() {
    let (client, channels) = client_with(DataClientConfig::default());
    let d1 = EndpointDescriptor::new("loopback:evict");

    client
        .unregister_receiver(&"i1".into(), &[d1.clone()])
        .await
        .expect("resolve");
    let first_remote = channels.remote(d1.url());

    assert!(client.evict_endpoint(&d1));
    assert_eq!(first_remote.recv_outbound(RECV_TIMEOUT).await, None);

    client
        .unregister_receiver(&"i1".into(), &[d1.clone()])
        .await
        .expect("resolve again");
    assert_eq!(channels.open_count(d1.url()), 2);
}

#[tokio::test]
async fn buffered_observer_preserves_writer_order() {
    let (client, channels) = client_with(
        DataClientConfig::from_json5_str(
            r#"{
                // queue outbound batches behind a background task
                outbound_observer: "buffered",
                outbound_queue_capacity: 2,
                outbound_buffer_limit_bytes: 4,
            }"#,
        )
        .expect("config"),
    );
    assert_eq!(client.config().outbound_observer, OutboundObserverKind::Buffered);

    let d1 = EndpointDescriptor::new("loopback:buffered");
    let out = LogicalEndpoint::data("i1", "out");
    let mut writer = client
        .send(&d1, out.clone(), u32_codec())
        .await
        .expect("writer");
    let remote = channels.remote(d1.url());

    let drain = tokio::spawn(async move { remote.drain_outbound(IDLE).await });
    for record in 0..10 {
        writer.write(&record).await.expect("write");
    }
    writer.close().await.expect("close");

    let batches = drain.await.expect("join");
    let chunks: Vec<_> = chunks_for(&batches, &out).collect();
    let records: Vec<u32> = chunks
        .iter()
        .flat_map(|chunk| decode_u32s(&chunk.payload))
        .collect();
    assert_eq!(records, (0..10).collect::<Vec<_>>());
    assert!(chunks.last().expect("terminal").is_terminal());
}

const CONCURRENT_WRITERS: u32 = 8;
const RECORDS_PER_WRITER: u32 = 50;

async fn concurrent_writers_keep_frames_intact(observer: OutboundObserverKind) {
    let (client, channels) = client_with(DataClientConfig {
        outbound_observer: observer,
        outbound_queue_capacity: 4,
        outbound_buffer_limit_bytes: 8,
    });
    let d1 = EndpointDescriptor::new(format!("loopback:shared-{observer:?}"));

    let mut writers = Vec::new();
    for n in 0..CONCURRENT_WRITERS {
        let endpoint = LogicalEndpoint::data("i1", format!("t{n}"));
        let writer = client
            .send(&d1, endpoint, u32_codec())
            .await
            .expect("writer");
        writers.push((n, writer));
    }
    assert_eq!(channels.open_count(d1.url()), 1);

    let remote = channels.remote(d1.url());
    let drain = tokio::spawn(async move { remote.drain_outbound(IDLE).await });

    let tasks = writers.into_iter().map(|(n, mut writer)| {
        tokio::spawn(async move {
            for k in 0..RECORDS_PER_WRITER {
                writer.write(&(n * 1000 + k)).await.expect("write");
                tokio::task::yield_now().await;
            }
            writer.close().await.expect("close");
        })
    });
    for outcome in join_all(tasks).await {
        outcome.expect("join");
    }

    let batches = drain.await.expect("join drain");
    for n in 0..CONCURRENT_WRITERS {
        let endpoint = LogicalEndpoint::data("i1", format!("t{n}"));
        let chunks: Vec<_> = chunks_for(&batches, &endpoint).collect();

        assert_eq!(chunks.iter().filter(|chunk| chunk.is_terminal()).count(), 1);
        assert!(chunks.last().expect("chunks").is_terminal());

        let mut records = Vec::new();
        for chunk in chunks.iter().filter(|chunk| !chunk.is_terminal()) {
            let decoded = decode_u32s(&chunk.payload);
            assert_eq!(decoded.len(), 2, "chunk for {endpoint} holds a partial frame");
            assert!(decoded.iter().all(|record| record / 1000 == n));
            records.extend(decoded);
        }
        let expected: Vec<u32> = (0..RECORDS_PER_WRITER).map(|k| n * 1000 + k).collect();
        assert_eq!(records, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_through_direct_observer_keep_frames_intact() {
    concurrent_writers_keep_frames_intact(OutboundObserverKind::Direct).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_through_buffered_observer_keep_frames_intact() {
    concurrent_writers_keep_frames_intact(OutboundObserverKind::Buffered).await;
}
