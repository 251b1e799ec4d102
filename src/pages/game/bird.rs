use std::time::{Duration, SystemTime};

use crate::{
    constants::game,
    pages::game::object::{Bounds, Object},
};

#[derive(Debug)]
pub struct Bird {
    x: f32,
    y: f32, // center of the sprite
    velocity: f32,
    frame: usize,
    animation_time: SystemTime,
    rotation: f32,
    clicked: bool,
}

impl Bird {
    pub fn new(x: f32, y: f32) -> Self {
        Bird {
            x,
            y,
            velocity: 0.0,
            frame: 0,
            animation_time: SystemTime::now(),
            rotation: 0.0,
            clicked: false,
        }
    }

    /// Recenter at a spawn point with zero velocity and a released latch.
    pub fn reset(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.velocity = 0.0;
        self.clicked = false;
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// One simulation tick. The order is load-bearing: gravity first, then
    /// the latched impulse, so a press registers on the tick it arrives and
    /// ends the tick at exactly JUMP_STRENGTH.
    pub fn apply_tick(&mut self, is_flying: bool, is_game_over: bool, input_pressed: bool) {
        if is_flying {
            self.velocity = (self.velocity + game::GRAVITY).min(game::MAX_FALL_SPEED);
            if self.bounds().bottom() < game::SCREEN_HEIGHT - game::GROUND_HEIGHT {
                self.y += self.velocity;
            }
        }
        if !is_game_over {
            if input_pressed && !self.clicked {
                self.clicked = true;
                self.velocity = game::JUMP_STRENGTH;
            }
            if !input_pressed {
                self.clicked = false;
            }
        }
        self.animate();
        self.rotation = self.velocity * -2.0;
    }

    /// Re-arm the click latch. Called for a release that arrives between
    /// ticks, and for a fresh press whose release event was never delivered.
    pub fn release(&mut self) {
        self.clicked = false;
    }

    fn animate(&mut self) {
        let elapsed = self.animation_time.elapsed().unwrap_or(Duration::ZERO);
        if elapsed > Duration::from_millis(game::BIRD_ANIMATION_MS) {
            self.frame = (self.frame + 1) % game::BIRD_FRAMES.len();
            self.animation_time = SystemTime::now();
        }
    }

    pub fn sprite(&self) -> &'static str {
        game::BIRD_FRAMES[self.frame]
    }

    /// Attitude marker drawn at the beak, bucketed from the rotation angle
    /// (in degrees, nose-up positive).
    pub fn attitude(&self) -> char {
        if self.rotation > 8.0 {
            '↗'
        } else if self.rotation < -8.0 {
            '↘'
        } else {
            '→'
        }
    }
}

impl Object for Bird {
    fn bounds(&self) -> Bounds {
        Bounds {
            x: self.x - game::BIRD_WIDTH / 2.0,
            y: self.y - game::BIRD_HEIGHT / 2.0,
            width: game::BIRD_WIDTH,
            height: game::BIRD_HEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn spawned() -> Bird {
        Bird::new(game::SCREEN_WIDTH / 4.0, game::SCREEN_HEIGHT / 2.0)
    }

    #[test]
    fn velocity_stays_clamped_during_free_fall() {
        let mut bird = spawned();
        for _ in 0..100 {
            bird.apply_tick(true, false, false);
            assert!(bird.velocity() <= game::MAX_FALL_SPEED);
            assert!(bird.velocity() >= game::JUMP_STRENGTH);
        }
        assert_eq!(bird.velocity(), game::MAX_FALL_SPEED);
    }

    #[test]
    fn held_press_applies_exactly_one_impulse() {
        let mut bird = spawned();
        bird.apply_tick(true, false, true);
        assert_eq!(bird.velocity(), game::JUMP_STRENGTH);

        bird.apply_tick(true, false, true);
        assert_eq!(bird.velocity(), game::JUMP_STRENGTH + game::GRAVITY);
    }

    #[test]
    fn releasing_rearms_the_impulse() {
        let mut bird = spawned();
        bird.apply_tick(true, false, true);
        bird.apply_tick(true, false, false);
        bird.apply_tick(true, false, true);
        assert_eq!(bird.velocity(), game::JUMP_STRENGTH);
    }

    #[test]
    fn input_is_ignored_after_game_over() {
        let mut bird = spawned();
        bird.apply_tick(false, true, true);
        assert_eq!(bird.velocity(), 0.0);
    }

    #[test]
    fn bird_does_not_sink_below_the_ground_line() {
        let ground = game::SCREEN_HEIGHT - game::GROUND_HEIGHT;
        let mut bird = spawned();
        bird.reset(game::SCREEN_WIDTH / 4.0, ground - game::BIRD_HEIGHT / 2.0);

        let before = bird.bounds().bottom();
        bird.apply_tick(true, false, false);
        assert_eq!(bird.bounds().bottom(), before);
    }

    #[test]
    fn rotation_tracks_velocity() {
        let mut bird = spawned();
        bird.apply_tick(true, false, true);
        assert_eq!(bird.rotation(), game::JUMP_STRENGTH * -2.0);
        assert_eq!(bird.attitude(), '↗');

        for _ in 0..40 {
            bird.apply_tick(true, false, false);
        }
        assert_eq!(bird.attitude(), '↘');
    }
}
