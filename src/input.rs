use crate::types::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    FaceUp,
    FaceDown,
    FaceLeft,
    FaceRight,
    ChangeGhost,
}

impl InputAction {
    pub const ALL: [Self; 5] = [
        Self::FaceUp,
        Self::FaceDown,
        Self::FaceLeft,
        Self::FaceRight,
        Self::ChangeGhost,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ghost.face_up" => Some(Self::FaceUp),
            "ghost.face_down" => Some(Self::FaceDown),
            "ghost.face_left" => Some(Self::FaceLeft),
            "ghost.face_right" => Some(Self::FaceRight),
            "ghost.change_ghost" => Some(Self::ChangeGhost),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::FaceUp => "ghost.face_up",
            Self::FaceDown => "ghost.face_down",
            Self::FaceLeft => "ghost.face_left",
            Self::FaceRight => "ghost.face_right",
            Self::ChangeGhost => "ghost.change_ghost",
        }
    }

    pub fn direction(self, inverted: bool) -> Option<Direction> {
        let dir = match self {
            Self::FaceUp => Direction::Up,
            Self::FaceDown => Direction::Down,
            Self::FaceLeft => Direction::Left,
            Self::FaceRight => Direction::Right,
            Self::ChangeGhost => return None,
        };
        Some(if inverted { dir.opposite() } else { dir })
    }
}
