//! # Streaming Integration Tests
//!
//! Full-stack scenarios over real TCP sockets: a server on an ephemeral
//! port, clients speaking the 10-byte header / length-prefixed frame
//! protocol, admission budgets and disconnect behavior.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use ridgeline_core::{ChunkCoord, ChunkSource, Grid, LodLevel, MemSource};
use ridgeline_protocol::{
    decode_frame, ChunkPayload, ChunkRequest, Delta, FrameReader, Value,
};
use ridgeline_server::{ServerConfig, SourceConfig, StreamServer};

/// Boots a server on an ephemeral port, returning its address and handle.
async fn start_server(
    mut config: ServerConfig,
    source: Arc<MemSource>,
) -> (std::net::SocketAddr, Arc<StreamServer>) {
    config.bind_addr = "127.0.0.1:0".to_string();
    config.source = SourceConfig::Empty;
    let server = Arc::new(
        StreamServer::with_source(config, source as Arc<dyn ChunkSource>).unwrap(),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let serving = Arc::clone(&server);
    tokio::spawn(async move {
        let _ = serving.serve(listener).await;
    });
    (addr, server)
}

struct TestClient {
    stream: TcpStream,
    frames: FrameReader,
}

impl TestClient {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        Self {
            stream: TcpStream::connect(addr).await.unwrap(),
            frames: FrameReader::new(),
        }
    }

    async fn send(&mut self, full: bool, x: i32, y: i32, lod: u8) {
        let header = ChunkRequest {
            full,
            coord: ChunkCoord::new(x, y),
            lod: LodLevel::from_byte(lod),
        }
        .encode();
        self.stream.write_all(&header).await.unwrap();
    }

    async fn read_payload(&mut self) -> ChunkPayload {
        let mut buf = [0u8; 4096];
        loop {
            if let Some(frame) = self.frames.next_frame() {
                return decode_frame(&frame).unwrap();
            }
            let n = self.stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before a full frame arrived");
            self.frames.push(&buf[..n]);
        }
    }

    async fn request(&mut self, full: bool, x: i32, y: i32, lod: u8) -> ChunkPayload {
        self.send(full, x, y, lod).await;
        timeout(Duration::from_secs(5), self.read_payload())
            .await
            .expect("response within deadline")
    }
}

#[tokio::test]
async fn test_full_request_against_empty_source_is_zero_grid() {
    let source = Arc::new(MemSource::new(128));
    let (addr, _server) = start_server(ServerConfig::default(), source).await;

    let mut client = TestClient::connect(addr).await;
    let ChunkPayload::Full(grid) = client.request(true, 0, 0, 255).await else {
        panic!("expected full payload");
    };
    assert_eq!(grid.dim(), 128);
    assert!(grid.cells().iter().all(|&c| c == 0.0));
}

#[tokio::test]
async fn test_incremental_request_ships_single_change() {
    let source = Arc::new(MemSource::new(128));
    let base = Grid::from_fn(128, |x, y| ((x * 7 + y * 13) % 31) as f32);
    source.insert(ChunkCoord::new(0, 0), base.clone());

    let config = ServerConfig {
        cache_capacity: 0, // the source changes mid-test; no stale frames
        ..ServerConfig::default()
    };
    let (addr, _server) = start_server(config, Arc::clone(&source)).await;

    let mut client = TestClient::connect(addr).await;
    let ChunkPayload::Full(first) = client.request(true, 0, 0, 255).await else {
        panic!("expected full payload");
    };
    assert_eq!(first, base);

    // One cell changes at row 3, col 5.
    let mut changed = base.clone();
    changed.set(5, 3, -42.0);
    source.insert(ChunkCoord::new(0, 0), changed.clone());

    let ChunkPayload::Delta(Delta::Seq(edits)) = client.request(false, 0, 0, 255).await else {
        panic!("expected sequence delta");
    };
    assert_eq!(edits.len(), 1, "one changed cell is one row edit");
    assert_eq!(edits[0].index, 3);

    // Client-side reconstruction converges on the new grid.
    let rebuilt = Delta::Seq(edits).apply(&Value::from_grid(&base));
    assert_eq!(rebuilt, Value::from_grid(&changed));

    // A third request with nothing changed is the no-change delta.
    let ChunkPayload::Delta(delta) = client.request(false, 0, 0, 255).await else {
        panic!("expected delta");
    };
    assert!(delta.is_no_change());
}

#[tokio::test]
async fn test_downsampled_request_has_ceiling_dimension() {
    let source = Arc::new(MemSource::new(128));
    let (addr, _server) = start_server(ServerConfig::default(), source).await;

    let mut client = TestClient::connect(addr).await;
    // Byte 127 is stride 2: ceil(128 / 2) = 64.
    let ChunkPayload::Full(grid) = client.request(true, 2, -2, 127).await else {
        panic!("expected full payload");
    };
    assert_eq!(grid.dim(), 64);
}

#[tokio::test]
async fn test_seventeenth_connection_waits_for_a_slot() {
    let source = Arc::new(MemSource::new(8));
    let config = ServerConfig {
        chunk_size: 8,
        max_connections: 16,
        ..ServerConfig::default()
    };
    let (addr, _server) = start_server(config, source).await;

    // Fill the budget with 16 served connections.
    let mut admitted = Vec::new();
    for i in 0..16 {
        let mut client = TestClient::connect(addr).await;
        let payload = client.request(true, i, 0, 255).await;
        assert!(matches!(payload, ChunkPayload::Full(_)));
        admitted.push(client);
    }

    // The 17th connects (OS backlog) but is not serviced.
    let mut seventeenth = TestClient::connect(addr).await;
    seventeenth.send(true, 99, 99, 255).await;
    let starved = timeout(Duration::from_millis(300), seventeenth.read_payload()).await;
    assert!(starved.is_err(), "no service while the budget is spent");

    // One admitted client leaves; its slot goes to the 17th.
    drop(admitted.pop());
    let payload = timeout(Duration::from_secs(5), seventeenth.read_payload())
        .await
        .expect("serviced once a slot freed");
    assert!(matches!(payload, ChunkPayload::Full(_)));
}

#[tokio::test]
async fn test_truncated_header_releases_the_slot() {
    let source = Arc::new(MemSource::new(8));
    let config = ServerConfig {
        chunk_size: 8,
        max_connections: 1, // any leak would starve the next client
        ..ServerConfig::default()
    };
    let (addr, _server) = start_server(config, source).await;

    // Send 3 of 10 header bytes, then vanish.
    let mut rude = TcpStream::connect(addr).await.unwrap();
    rude.write_all(&[1, 0, 0]).await.unwrap();
    drop(rude);

    // The single slot must come back for a well-behaved client.
    let mut client = TestClient::connect(addr).await;
    let payload = client.request(true, 0, 0, 255).await;
    assert!(matches!(payload, ChunkPayload::Full(_)));
}

#[tokio::test]
async fn test_shutdown_stops_the_accept_loop() {
    let source = Arc::new(MemSource::new(8));
    let config = ServerConfig {
        chunk_size: 8,
        ..ServerConfig::default()
    };

    let mut config = config;
    config.bind_addr = "127.0.0.1:0".to_string();
    config.source = SourceConfig::Empty;
    let server =
        StreamServer::with_source(config, source as Arc<dyn ChunkSource>).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let shutdown = server.shutdown_handle();
    let task = tokio::spawn(async move { server.serve(listener).await });

    shutdown.trigger();
    let result = timeout(Duration::from_secs(5), task)
        .await
        .expect("accept loop exits promptly")
        .unwrap();
    assert!(result.is_ok());
}
