use ratatui::style::Color;

// The simulation runs in a fixed virtual playfield; the draw pass scales
// positions and sizes into whatever canvas the terminal provides. All tuning
// below is native to this space.
pub const SCREEN_WIDTH: f32 = 836.0;
pub const SCREEN_HEIGHT: f32 = 660.0;
pub const GROUND_HEIGHT: f32 = 72.0;

pub const TICK_RATE: f64 = 80.0;
pub const FRAME_RATE: f64 = 30.0;

// Per-tick physics, playfield units.
pub const GRAVITY: f32 = 0.5;
pub const JUMP_STRENGTH: f32 = -10.0;
pub const MAX_FALL_SPEED: f32 = 8.0;
pub const SCROLL_SPEED: f32 = 5.0;

pub const PIPE_WIDTH: f32 = 70.0;
pub const PIPE_GAP: f32 = 140.0;
pub const PIPE_FREQUENCY_MS: u64 = 1500;
// Gap centers are sampled uniformly in this band around mid-screen.
pub const PIPE_OFFSET_RANGE: f32 = 100.0;
pub const PIPE_COLOR: Color = Color::LightGreen;

pub const GROUND_SCROLL_WRAP: f32 = 15.0;
pub const GROUND_PATTERN: &str = "███▓";
pub const GROUND_COLOR: Color = Color::Green;

pub const BIRD_WIDTH: f32 = 50.0;
pub const BIRD_HEIGHT: f32 = 36.0;
pub const BIRD_ANIMATION_MS: u64 = 100;
pub const BIRD_COLOR: Color = Color::Yellow;
pub const BIRD_FRAMES: [&str; 3] = [
    r#"
 \/
(oo
 ~~
"#,
    r#"
 ==
(oo
 ~~
"#,
    r#"
 /\
(oo
 ~~
"#,
];

pub const RESTART_WIDTH: f32 = 170.0;
pub const RESTART_HEIGHT: f32 = 80.0;
