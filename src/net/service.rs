//! Hand-rolled HTTP service for the state/sensor/decision contracts.
//!
//! One task per connection over a plain TcpListener; requests are matched on
//! the request line, no framework routing. Every handler has a defined
//! fallback value, so a bad payload degrades the response instead of
//! failing the caller.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::game::geom::Rect;
use crate::game::systems::sensors;
use crate::metrics::Metrics;
use crate::net::cache::StateCache;
use crate::net::protocol::{Command, SensorRequest, SensorResponse, WallsPayload, WorldState};
use crate::util::vec2::Vec2;

const MAX_REQUEST_BYTES: usize = 256 * 1024;

/// Shared state behind the HTTP endpoints
pub struct Service {
    cache: Arc<StateCache>,
    walls: Vec<Rect>,
    agent: Mutex<Agent>,
    metrics: Arc<Metrics>,
    started: Instant,
}

struct Response {
    status: &'static str,
    content_type: &'static str,
    body: String,
}

impl Response {
    fn json(body: String) -> Self {
        Self {
            status: "200 OK",
            content_type: "application/json",
            body,
        }
    }

    fn text(body: String) -> Self {
        Self {
            status: "200 OK",
            content_type: "text/plain; version=0.0.4",
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: "404 Not Found",
            content_type: "text/plain",
            body: String::new(),
        }
    }

    fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

impl Service {
    pub fn new(cache: Arc<StateCache>, walls: Vec<Rect>, metrics: Arc<Metrics>) -> Self {
        Self {
            cache,
            walls,
            agent: Mutex::new(Agent::new(0.0)),
            metrics,
            started: Instant::now(),
        }
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn sense(&self, req: &SensorRequest) -> SensorResponse {
        sense_against(&self.cache.get(), &self.walls, req)
    }

    fn decide(&self, req: &SensorRequest) -> Command {
        let sensors = self.sense(req);
        let position = Vec2::new(req.position.x, req.position.y);
        self.agent
            .lock()
            .decide(Some(&sensors), Some(position), self.now(), &mut rand::thread_rng())
    }

    /// Route one request. Malformed bodies never error: sense and decide
    /// fall back to their safe defaults, update_state reports failure.
    fn handle(&self, head: &str, body: &[u8]) -> Response {
        self.metrics
            .requests_served
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        if head.starts_with("GET /walls") {
            let payload = WallsPayload {
                walls: self.walls.clone(),
            };
            return match serde_json::to_string(&payload) {
                Ok(body) => Response::json(body),
                Err(err) => {
                    warn!(%err, "wall payload serialization failed");
                    Response::json("{\"walls\":[]}".to_string())
                }
            };
        }

        if head.starts_with("GET /game_state") {
            let state = self.cache.get();
            return match serde_json::to_string(&state) {
                Ok(body) => Response::json(body),
                Err(err) => {
                    warn!(%err, "state serialization failed");
                    Response::json(empty_state_json())
                }
            };
        }

        if head.starts_with("GET /metrics") {
            return Response::text(self.metrics.to_prometheus());
        }

        if head.starts_with("GET /status") {
            return Response::json(format!(
                "{{\"status\":\"ok\",\"uptime_seconds\":{}}}",
                self.metrics.uptime_seconds()
            ));
        }

        if head.starts_with("POST /update_state") {
            return match serde_json::from_slice::<WorldState>(body) {
                Ok(state) => {
                    debug!(
                        ships = state.ships.len(),
                        coins = state.coins.len(),
                        "state published"
                    );
                    self.cache.set(state);
                    Response::json("{\"status\":\"success\"}".to_string())
                }
                Err(err) => {
                    warn!(%err, "rejecting malformed state payload");
                    Response::json("{\"status\":\"error\"}".to_string())
                }
            };
        }

        if head.starts_with("POST /sense") {
            let response = match serde_json::from_slice::<SensorRequest>(body) {
                Ok(req) => self.sense(&req),
                Err(err) => {
                    warn!(%err, "malformed sense request, serving empty sensors");
                    SensorResponse::default()
                }
            };
            return json_or_default(&response, "{\"laser_hit\":false,\"laser_distance\":null,\"radar_objects\":[]}");
        }

        if head.starts_with("POST /decide") {
            let command = match serde_json::from_slice::<SensorRequest>(body) {
                Ok(req) => self.decide(&req),
                Err(err) => {
                    warn!(%err, "malformed decide request, serving neutral command");
                    Command::default()
                }
            };
            return json_or_default(&command, "{\"rotate\":0.0,\"thrust\":0.0,\"shoot\":false}");
        }

        Response::not_found()
    }
}

/// Compute laser + radar for a requested pose against a published snapshot.
/// Shared by the /sense endpoint and the local decision fallback.
pub fn sense_against(state: &WorldState, walls: &[Rect], req: &SensorRequest) -> SensorResponse {
    let position = Vec2::new(req.position.x, req.position.y);

    let laser = sensors::laser(position, req.angle, walls);

    let ships: Vec<Vec2> = state.ships.iter().map(|s| Vec2::new(s.x, s.y)).collect();
    let coins: Vec<Vec2> = state.coins.iter().map(|c| Vec2::new(c.x, c.y)).collect();
    let contacts = sensors::radar(req.ship_id, position, req.angle, &ships, &coins, walls);

    SensorResponse {
        laser_hit: laser.is_some(),
        laser_distance: laser,
        radar_objects: contacts.into_iter().map(Into::into).collect(),
    }
}

fn json_or_default<T: serde::Serialize>(value: &T, fallback: &str) -> Response {
    match serde_json::to_string(value) {
        Ok(body) => Response::json(body),
        Err(err) => {
            warn!(%err, "response serialization failed");
            Response::json(fallback.to_string())
        }
    }
}

fn empty_state_json() -> String {
    "{\"ships\":[],\"bullets\":[],\"coins\":[],\"score\":[0,0]}".to_string()
}

/// Accept loop: one spawned task per connection, close after one response
pub async fn run(service: Arc<Service>, bind_address: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", bind_address, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("http service listening on {}", addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        let service = service.clone();

        tokio::spawn(async move {
            match read_request(&mut socket).await {
                Ok(Some((head, body))) => {
                    let response = service.handle(&head, &body);
                    if let Err(err) = socket.write_all(response.to_http().as_bytes()).await {
                        debug!(%peer, %err, "failed to write response");
                    }
                }
                Ok(None) => {}
                Err(err) => debug!(%peer, %err, "failed to read request"),
            }
        });
    }
}

/// Read one HTTP request: request line plus a Content-Length-delimited body
async fn read_request(
    socket: &mut tokio::net::TcpStream,
) -> std::io::Result<Option<(String, Vec<u8>)>> {
    let mut data = Vec::with_capacity(1024);
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            return Ok(None);
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = find_header_end(&data) {
            break pos;
        }
        if data.len() > MAX_REQUEST_BYTES {
            return Ok(None);
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).into_owned();
    let content_length = parse_content_length(&head).unwrap_or(0);
    if content_length > MAX_REQUEST_BYTES {
        return Ok(None);
    }

    let body_start = header_end + 4;
    while data.len() < body_start + content_length {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let body = data[body_start..(body_start + content_length).min(data.len())].to_vec();
    Ok(Some((head, body)))
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

fn parse_content_length(head: &str) -> Option<usize> {
    head.lines()
        .find(|line| line.to_ascii_lowercase().starts_with("content-length:"))
        .and_then(|line| line.split(':').nth(1))
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::labyrinth;
    use crate::net::protocol::{CoinState, ShipState};

    fn service() -> Service {
        Service::new(
            Arc::new(StateCache::new()),
            labyrinth(),
            Arc::new(Metrics::new()),
        )
    }

    fn seed_state(svc: &Service) {
        svc.cache.set(WorldState {
            ships: vec![
                ShipState {
                    x: 400.0,
                    y: 400.0,
                    angle: 0.0,
                },
                ShipState {
                    x: 500.0,
                    y: 400.0,
                    angle: 180.0,
                },
            ],
            bullets: vec![],
            coins: vec![CoinState { x: 400.0, y: 450.0 }],
            score: [2, 0],
        });
    }

    #[test]
    fn test_walls_endpoint() {
        let svc = service();
        let resp = svc.handle("GET /walls HTTP/1.1", b"");
        assert_eq!(resp.status, "200 OK");
        let payload: WallsPayload = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(payload.walls.len(), 22);
    }

    #[test]
    fn test_game_state_defaults_to_empty_shape() {
        let svc = service();
        let resp = svc.handle("GET /game_state HTTP/1.1", b"");
        let state: WorldState = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(state, WorldState::default());
    }

    #[test]
    fn test_update_state_round_trip() {
        let svc = service();
        let state = WorldState {
            ships: vec![ShipState {
                x: 1.0,
                y: 2.0,
                angle: 3.0,
            }],
            bullets: vec![],
            coins: vec![],
            score: [1, 0],
        };
        let body = serde_json::to_vec(&state).unwrap();
        let resp = svc.handle("POST /update_state HTTP/1.1", &body);
        assert!(resp.body.contains("success"));

        let resp = svc.handle("GET /game_state HTTP/1.1", b"");
        let back: WorldState = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_sense_sees_enemy_and_coin() {
        let svc = service();
        seed_state(&svc);

        let req = r#"{"ship_id":0,"position":{"x":400.0,"y":400.0},"angle":0.0}"#;
        let resp = svc.handle("POST /sense HTTP/1.1", req.as_bytes());
        let sensors: SensorResponse = serde_json::from_str(&resp.body).unwrap();

        assert_eq!(sensors.radar_objects.len(), 2);
    }

    #[test]
    fn test_sense_malformed_body_serves_empty() {
        let svc = service();
        let resp = svc.handle("POST /sense HTTP/1.1", b"not json");
        let sensors: SensorResponse = serde_json::from_str(&resp.body).unwrap();
        assert!(!sensors.laser_hit);
        assert!(sensors.radar_objects.is_empty());
    }

    #[test]
    fn test_decide_malformed_body_serves_neutral() {
        let svc = service();
        let resp = svc.handle("POST /decide HTTP/1.1", b"{broken");
        let cmd: Command = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(cmd, Command::default());
    }

    #[test]
    fn test_decide_engages_visible_enemy() {
        let svc = service();
        seed_state(&svc);

        // Enemy dead ahead at 100 units: the approach branch thrusts forward
        let req = r#"{"ship_id":0,"position":{"x":400.0,"y":400.0},"angle":0.0}"#;
        let resp = svc.handle("POST /decide HTTP/1.1", req.as_bytes());
        let cmd: Command = serde_json::from_str(&resp.body).unwrap();
        assert!(cmd.thrust > 0.0);
    }

    #[test]
    fn test_unknown_route_404() {
        let svc = service();
        let resp = svc.handle("GET /nope HTTP/1.1", b"");
        assert_eq!(resp.status, "404 Not Found");
    }

    #[test]
    fn test_metrics_endpoint() {
        let svc = service();
        let resp = svc.handle("GET /metrics HTTP/1.1", b"");
        assert!(resp.body.contains("botfighter_tick_count"));
    }

    #[test]
    fn test_content_length_parsing() {
        let head = "POST /sense HTTP/1.1\r\nHost: x\r\nContent-Length: 42\r\n";
        assert_eq!(parse_content_length(head), Some(42));
        assert_eq!(parse_content_length("GET / HTTP/1.1\r\n"), None);
    }
}
