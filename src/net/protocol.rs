//! JSON wire types shared by the HTTP service and the client.
//!
//! World payloads are parsed leniently: a malformed element in any of the
//! entity lists is skipped with a warning instead of failing the whole
//! request. Everything else round-trips through serde as-is.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::game::geom::Rect;
use crate::game::state::GameState;
use crate::game::systems::sensors::{ContactKind, RadarContact};

/// One ship as published to viewers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipState {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// One bullet in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletState {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub lifespan: u32,
    pub owner: usize,
}

/// One coin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinState {
    pub x: f32,
    pub y: f32,
}

/// Full published world snapshot. The default value is the empty-shaped
/// state served before anything has been published.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldState {
    #[serde(default, deserialize_with = "lenient_list")]
    pub ships: Vec<ShipState>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub bullets: Vec<BulletState>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub coins: Vec<CoinState>,
    /// [player, enemies]
    #[serde(default)]
    pub score: [u32; 2],
}

impl From<&GameState> for WorldState {
    fn from(state: &GameState) -> Self {
        Self {
            ships: state
                .ships
                .iter()
                .map(|s| ShipState {
                    x: s.position.x,
                    y: s.position.y,
                    angle: s.angle,
                })
                .collect(),
            bullets: state
                .bullets
                .iter()
                .map(|b| BulletState {
                    x: b.position.x,
                    y: b.position.y,
                    angle: b.angle,
                    lifespan: b.lifespan,
                    owner: b.owner,
                })
                .collect(),
            coins: state
                .coins
                .iter()
                .map(|c| CoinState {
                    x: c.position.x,
                    y: c.position.y,
                })
                .collect(),
            score: state.score,
        }
    }
}

/// Wall layout payload served by `GET /walls`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallsPayload {
    pub walls: Vec<Rect>,
}

/// Position carried in a sensor request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Request body for `POST /sense` and `POST /decide`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorRequest {
    pub ship_id: usize,
    pub position: Position,
    pub angle: f32,
}

/// One radar contact on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarObject {
    #[serde(rename = "type")]
    pub kind: ContactKind,
    pub distance: f32,
    pub angle: f32,
}

impl From<RadarContact> for RadarObject {
    fn from(c: RadarContact) -> Self {
        Self {
            kind: c.kind,
            distance: c.distance,
            angle: c.angle,
        }
    }
}

impl From<RadarObject> for RadarContact {
    fn from(o: RadarObject) -> Self {
        Self {
            kind: o.kind,
            distance: o.distance,
            angle: o.angle,
        }
    }
}

/// Response body for `POST /sense`. The default is the safe fallback served
/// on any internal error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorResponse {
    pub laser_hit: bool,
    pub laser_distance: Option<f32>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub radar_objects: Vec<RadarObject>,
}

/// A control command: degrees to rotate, signed thrust, and a trigger flag.
/// The default is the neutral command used on every failure path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Command {
    pub rotate: f32,
    pub thrust: f32,
    pub shoot: bool,
}

/// Deserialize a list element-by-element, dropping entries that fail to
/// parse instead of rejecting the whole payload.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let mut out = Vec::with_capacity(raw.len());
    for (i, value) in raw.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(item) => out.push(item),
            Err(err) => warn!(index = i, %err, "skipping malformed list entry"),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_state_default_is_empty_shape() {
        let state = WorldState::default();
        assert!(state.ships.is_empty());
        assert!(state.bullets.is_empty());
        assert!(state.coins.is_empty());
        assert_eq!(state.score, [0, 0]);
    }

    #[test]
    fn test_world_state_round_trip() {
        let state = WorldState {
            ships: vec![ShipState {
                x: 400.0,
                y: 400.0,
                angle: 90.0,
            }],
            bullets: vec![BulletState {
                x: 10.0,
                y: 20.0,
                angle: 0.0,
                lifespan: 42,
                owner: 0,
            }],
            coins: vec![CoinState { x: 5.0, y: 6.0 }],
            score: [3, 1],
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: WorldState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_malformed_coin_entries_skipped() {
        let json = r#"{
            "ships": [],
            "bullets": [],
            "coins": [{"x": 1.0, "y": 2.0}, {"x": "bad"}, {"y": 9.0}, {"x": 3.0, "y": 4.0}],
            "score": [0, 0]
        }"#;
        let state: WorldState = serde_json::from_str(json).unwrap();
        assert_eq!(state.coins.len(), 2);
        assert_eq!(state.coins[0], CoinState { x: 1.0, y: 2.0 });
        assert_eq!(state.coins[1], CoinState { x: 3.0, y: 4.0 });
    }

    #[test]
    fn test_radar_object_type_tag() {
        let obj = RadarObject {
            kind: ContactKind::Enemy,
            distance: 120.0,
            angle: -45.0,
        };
        let json = serde_json::to_string(&obj).unwrap();
        assert!(json.contains(r#""type":"enemy""#));

        let coin: RadarObject =
            serde_json::from_str(r#"{"type":"coin","distance":10.0,"angle":0.0}"#).unwrap();
        assert_eq!(coin.kind, ContactKind::Coin);
    }

    #[test]
    fn test_command_default_is_neutral() {
        let cmd = Command::default();
        assert_eq!(cmd.rotate, 0.0);
        assert_eq!(cmd.thrust, 0.0);
        assert!(!cmd.shoot);
    }

    #[test]
    fn test_sensor_request_shape() {
        let req: SensorRequest = serde_json::from_str(
            r#"{"ship_id":0,"position":{"x":100.0,"y":200.0},"angle":45.0}"#,
        )
        .unwrap();
        assert_eq!(req.ship_id, 0);
        assert_eq!(req.position.x, 100.0);
        assert_eq!(req.angle, 45.0);
    }
}
