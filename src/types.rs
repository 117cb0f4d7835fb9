use std::ops::{Add, Index, IndexMut, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::constants::POSITION_EPSILON;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    pub fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() <= POSITION_EPSILON && (self.y - other.y).abs() <= POSITION_EPSILON
    }

    pub fn move_towards(self, target: Self, max_delta: f32) -> Self {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_delta || dist == 0.0 {
            return target;
        }
        self + delta * (max_delta / dist)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    pub const fn to_vec(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, 1.0),
            Self::Down => Vec2::new(0.0, -1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::None => Vec2::ZERO,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::None => "none",
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostRole {
    #[serde(rename = "blinky")]
    Chaser,
    #[serde(rename = "clyde")]
    Evasive,
    #[serde(rename = "inky")]
    Whimsical,
    #[serde(rename = "pinky")]
    Ambusher,
}

impl GhostRole {
    pub const ALL: [Self; 4] = [Self::Chaser, Self::Evasive, Self::Whimsical, Self::Ambusher];

    pub const fn index(self) -> usize {
        match self {
            Self::Chaser => 0,
            Self::Evasive => 1,
            Self::Whimsical => 2,
            Self::Ambusher => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Chaser => "blinky",
            Self::Evasive => "clyde",
            Self::Whimsical => "inky",
            Self::Ambusher => "pinky",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|role| role.name() == normalized)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoleMap<T>([T; 4]);

impl<T> RoleMap<T> {
    pub fn from_fn(mut f: impl FnMut(GhostRole) -> T) -> Self {
        Self(GhostRole::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (GhostRole, &T)> {
        GhostRole::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<GhostRole> for RoleMap<T> {
    type Output = T;

    fn index(&self, role: GhostRole) -> &T {
        &self.0[role.index()]
    }
}

impl<T> IndexMut<GhostRole> for RoleMap<T> {
    fn index_mut(&mut self, role: GhostRole) -> &mut T {
        &mut self.0[role.index()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    Rest,
    Normal(Direction),
}

impl AnimationState {
    pub fn for_direction(dir: Direction) -> Option<Self> {
        if dir.is_none() {
            None
        } else {
            Some(Self::Normal(dir))
        }
    }

    pub fn trigger(self, role: GhostRole) -> String {
        match self {
            Self::Rest => format!("{}.rest", role.name()),
            Self::Normal(dir) => format!("{}.normal_{}", role.name(), dir.name()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorState {
    Idle,
    Queued,
    Moving,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub role: GhostRole,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub controlled: bool,
    pub animation: String,
    #[serde(rename = "pursuitTarget")]
    pub pursuit_target: Option<Vec2>,
    #[serde(rename = "recentTiles")]
    pub recent_tiles: Vec<Vec2>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MazeEvent {
    Animation {
        ghost: GhostRole,
        trigger: String,
    },
    PositionSaved {
        ghost: GhostRole,
        position: Vec2,
    },
    ControlSwitched {
        from: Option<GhostRole>,
        to: GhostRole,
    },
    SwitchRejected {
        #[serde(rename = "remainingMs")]
        remaining_ms: u64,
    },
    MoveAborted {
        ghost: GhostRole,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub active: Option<GhostRole>,
    #[serde(rename = "motorState")]
    pub motor_state: MotorState,
    #[serde(rename = "cooldownText")]
    pub cooldown_text: String,
    pub ghosts: Vec<GhostView>,
    pub events: Vec<MazeEvent>,
}
