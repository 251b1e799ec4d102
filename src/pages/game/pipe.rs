use crate::{
    constants::game,
    pages::game::object::{Bounds, Object},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Top,
    Bottom,
}

/// One half of a pipe pair. Halves scroll and despawn independently; only
/// their spawn geometry ties them together.
#[derive(Debug)]
pub struct Pipe {
    x: f32,
    y: f32,
    height: f32,
    orientation: Orientation,
    pub passed: bool,
}

impl Pipe {
    fn new(x: f32, y: f32, height: f32, orientation: Orientation) -> Self {
        Pipe { x, y, height, orientation, passed: false }
    }

    /// Both halves share the spawn x; their facing edges sit exactly
    /// PIPE_GAP apart, symmetric around the gap center.
    pub fn spawn_pair(x: f32, gap_center: f32) -> (Pipe, Pipe) {
        let gap_top = gap_center - game::PIPE_GAP / 2.0;
        let gap_bottom = gap_center + game::PIPE_GAP / 2.0;

        let top = Pipe::new(x, 0.0, gap_top, Orientation::Top);
        let bottom = Pipe::new(x, gap_bottom, game::SCREEN_HEIGHT - gap_bottom, Orientation::Bottom);
        (top, bottom)
    }

    pub fn advance(&mut self, scroll_speed: f32) {
        self.x -= scroll_speed;
    }

    pub fn is_offscreen(&self) -> bool {
        self.bounds().right() < 0.0
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

impl Object for Pipe {
    fn bounds(&self) -> Bounds {
        Bounds { x: self.x, y: self.y, width: game::PIPE_WIDTH, height: self.height }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn pair_shares_x_and_leaves_exactly_one_gap() {
        let (top, bottom) = Pipe::spawn_pair(game::SCREEN_WIDTH, 300.0);

        assert_eq!(top.bounds().left(), bottom.bounds().left());
        assert_eq!(bottom.bounds().top() - top.bounds().bottom(), game::PIPE_GAP);
        assert_eq!(top.bounds().top(), 0.0);
        assert_eq!(bottom.bounds().bottom(), game::SCREEN_HEIGHT);
    }

    #[test]
    fn offscreen_once_the_right_edge_crosses_the_left_boundary() {
        let (mut top, _) = Pipe::spawn_pair(0.0, 300.0);
        assert!(!top.is_offscreen());

        while top.bounds().right() >= 0.0 {
            top.advance(game::SCROLL_SPEED);
        }
        assert!(top.is_offscreen());
    }
}
