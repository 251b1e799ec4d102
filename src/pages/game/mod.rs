mod bird;
mod object;
mod pipe;

use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, SystemTime},
};

use color_eyre::eyre::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use rand::Rng;
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc::UnboundedSender;

use super::{Frame, Page, PageId};
use crate::{
    action::{Action, ActionState, Command, GameAction},
    components::multiline::MultiLine,
    config::PageKeyBindings,
    constants::game,
    pages::game::{
        bird::Bird,
        object::{Bounds, Object},
        pipe::{Orientation, Pipe},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Flying,
    GameOver,
}

pub struct GamePage {
    pub action_tx: Option<UnboundedSender<Action>>,
    pub keymap: PageKeyBindings,
    state: State,
    canvas: Rect,
    bird: Bird,
    pipes: VecDeque<Pipe>,
    score: f32,
    ground_scroll: f32,
    last_spawn: SystemTime,
    pressed: bool,
}

impl GamePage {
    pub fn new() -> Self {
        GamePage {
            action_tx: None,
            keymap: PageKeyBindings::default(),
            state: State::Idle,
            canvas: Rect::new(0, 0, 0, 0),
            bird: Bird::new(game::SCREEN_WIDTH / 4.0, game::SCREEN_HEIGHT / 2.0),
            pipes: VecDeque::new(),
            score: 0.0,
            ground_scroll: 0.0,
            // Backdated so the first flying tick spawns a pair right away.
            last_spawn: SystemTime::UNIX_EPOCH,
            pressed: false,
        }
    }

    fn reset(&mut self) {
        self.pipes.clear();
        self.bird.reset(game::SCREEN_WIDTH / 4.0, game::SCREEN_HEIGHT / 2.0);
        self.score = 0.0;
        self.state = State::Idle;
        self.last_spawn = SystemTime::now()
            .checked_sub(Duration::from_millis(game::PIPE_FREQUENCY_MS))
            .unwrap_or(SystemTime::UNIX_EPOCH);
    }

    /// A press somewhere on the playfield, in playfield coordinates. Key
    /// presses come through with an off-screen position, so they can start a
    /// flight and flap but never hit the restart control.
    fn press_at(&mut self, x: f32, y: f32) {
        if self.pressed {
            // The matching release never arrived; treat this as a new press.
            self.bird.release();
        }
        self.pressed = true;
        match self.state {
            State::Idle => {
                self.state = State::Flying;
                log::info!("Flight started");
            },
            State::Flying => {},
            State::GameOver => {
                if restart_bounds().contains(x, y) {
                    self.reset();
                }
            },
        }
    }

    fn release(&mut self) {
        self.pressed = false;
    }

    /// One step of the simulation. The order matters: obstacles move before
    /// the bird, collisions are judged on the moved positions, and spawning
    /// is skipped on the tick that ends the run.
    fn tick(&mut self) {
        let game_over = self.state == State::GameOver;

        if !game_over {
            for pipe in self.pipes.iter_mut() {
                pipe.advance(game::SCROLL_SPEED);
            }
            self.pipes.retain(|pipe| !pipe.is_offscreen());
        }

        self.bird.apply_tick(self.state == State::Flying, game_over, self.pressed);

        self.check_collisions();

        if self.state == State::Flying {
            self.maybe_spawn(SystemTime::now());
            self.ground_scroll -= game::SCROLL_SPEED;
            if self.ground_scroll.abs() > game::GROUND_SCROLL_WRAP {
                self.ground_scroll = 0.0;
            }
        }

        self.update_score();
    }

    fn check_collisions(&mut self) {
        let bounds = self.bird.bounds();

        let mut game_over = bounds.top() <= 0.0;
        if !game_over {
            game_over = self.pipes.iter().any(|pipe| self.bird.collides_with(pipe));
        }
        if bounds.bottom() >= game::SCREEN_HEIGHT - game::GROUND_HEIGHT {
            game_over = true;
        }

        if game_over && self.state != State::GameOver {
            self.state = State::GameOver;
            log::info!("Game over with score {}", self.score as u32);
        }
    }

    fn maybe_spawn(&mut self, now: SystemTime) {
        let elapsed = now.duration_since(self.last_spawn).unwrap_or(Duration::ZERO);
        if elapsed > Duration::from_millis(game::PIPE_FREQUENCY_MS) {
            let offset = rand::thread_rng().gen_range(-game::PIPE_OFFSET_RANGE..=game::PIPE_OFFSET_RANGE);
            let (top, bottom) = Pipe::spawn_pair(game::SCREEN_WIDTH, game::SCREEN_HEIGHT / 2.0 + offset);
            self.pipes.push_back(top);
            self.pipes.push_back(bottom);
            self.last_spawn = now;
        }
    }

    fn update_score(&mut self) {
        let bird_left = self.bird.bounds().left();
        for pipe in self.pipes.iter_mut() {
            if !pipe.passed && pipe.bounds().right() < bird_left {
                pipe.passed = true;
                // Each half contributes 0.5; a pair's halves share the same x
                // and the bird never moves horizontally, so both flip on the
                // same tick and a cleared pair is worth exactly 1.
                self.score += 0.5;
            }
        }
    }

    fn scale_x(&self, x: f32) -> i16 {
        (x * self.canvas.width as f32 / game::SCREEN_WIDTH).round() as i16
    }

    fn scale_y(&self, y: f32) -> i16 {
        (y * self.canvas.height as f32 / game::SCREEN_HEIGHT).round() as i16
    }

    /// Playfield rectangle to canvas cells, clipped to the canvas. `None`
    /// when nothing of it is on screen.
    fn cell_rect(&self, bounds: &Bounds) -> Option<Rect> {
        let left = self.scale_x(bounds.left()).max(0);
        let right = self.scale_x(bounds.right()).min(self.canvas.width as i16);
        let top = self.scale_y(bounds.top()).max(0);
        let bottom = self.scale_y(bounds.bottom()).min(self.canvas.height as i16);
        if left >= right || top >= bottom {
            return None;
        }

        Some(Rect {
            x: self.canvas.x + left as u16,
            y: self.canvas.y + top as u16,
            width: (right - left) as u16,
            height: (bottom - top) as u16,
        })
    }

    fn cell_to_playfield(&self, column: u16, row: u16) -> (f32, f32) {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return (-1.0, -1.0);
        }
        let x = column.saturating_sub(self.canvas.x) as f32 * game::SCREEN_WIDTH / self.canvas.width as f32;
        let y = row.saturating_sub(self.canvas.y) as f32 * game::SCREEN_HEIGHT / self.canvas.height as f32;
        (x, y)
    }

    fn draw_ground(&self, f: &mut Frame<'_>) {
        let bounds = Bounds {
            x: 0.0,
            y: game::SCREEN_HEIGHT - game::GROUND_HEIGHT,
            width: game::SCREEN_WIDTH,
            height: game::GROUND_HEIGHT,
        };
        let Some(rect) = self.cell_rect(&bounds) else { return };

        let phase = self.scale_x(-self.ground_scroll).max(0) as usize;
        let pattern: Vec<char> = game::GROUND_PATTERN.chars().collect();
        let rows = (0..rect.height as usize)
            .map(|row| {
                (0..rect.width as usize)
                    .map(|col| if row == 0 { pattern[(col + phase) % pattern.len()] } else { '▒' })
                    .collect::<String>()
            })
            .collect::<Vec<_>>();

        f.render_widget(MultiLine::new(rows).style(Style::default().fg(game::GROUND_COLOR)), rect);
    }

    fn draw_pipes(&self, f: &mut Frame<'_>) {
        for pipe in &self.pipes {
            let Some(rect) = self.cell_rect(&pipe.bounds()) else { continue };
            let rows = pipe_rows(rect.width as usize, rect.height as usize, pipe.orientation());
            f.render_widget(MultiLine::new(rows).style(Style::default().fg(game::PIPE_COLOR)), rect);
        }
    }

    fn draw_bird(&self, f: &mut Frame<'_>) {
        let bounds = self.bird.bounds();
        let Some(rect) = self.cell_rect(&bounds) else { return };

        let clipped_top = (-self.scale_y(bounds.top())).max(0) as usize;
        let lines = self
            .bird
            .sprite()
            .lines()
            .filter(|line| !line.is_empty())
            .skip(clipped_top)
            .map(|line| line.to_string())
            .collect::<Vec<_>>();
        let sprite_width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0) as u16;

        f.render_widget(
            MultiLine::new(lines).style(Style::default().fg(game::BIRD_COLOR)).ignore_whitespace(true),
            rect,
        );

        let beak_x = rect.x + sprite_width;
        let beak_y = rect.y + rect.height / 2;
        if beak_x < self.canvas.x + self.canvas.width {
            f.render_widget(
                Paragraph::new(self.bird.attitude().to_string()).style(Style::default().fg(game::BIRD_COLOR)),
                Rect { x: beak_x, y: beak_y, width: 1, height: 1 },
            );
        }
    }

    fn draw_score(&self, f: &mut Frame<'_>) {
        if self.canvas.height < 2 {
            return;
        }
        let rect = Rect { y: self.canvas.y + 1, height: 1, ..self.canvas };
        f.render_widget(
            Paragraph::new(format!("{}", self.score as u32))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            rect,
        );
    }

    fn draw_start_prompt(&self, f: &mut Frame<'_>) {
        let row = self.scale_y(game::SCREEN_HEIGHT / 2.0 - 100.0).max(0) as u16;
        if row >= self.canvas.height {
            return;
        }
        let rect = Rect { y: self.canvas.y + row, height: 1, ..self.canvas };
        f.render_widget(
            Paragraph::new("Click to Start")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            rect,
        );
    }

    fn draw_restart_button(&self, f: &mut Frame<'_>) {
        let Some(rect) = self.cell_rect(&restart_bounds()) else { return };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(rect);

        f.render_widget(Clear, rect);
        f.render_widget(block, rect);

        let [label_area] = Layout::vertical([Constraint::Length(1)]).flex(layout::Flex::Center).areas(inner);
        f.render_widget(Paragraph::new("Restart").alignment(Alignment::Center), label_area);
    }
}

/// Where the restart control sits on the playfield.
fn restart_bounds() -> Bounds {
    Bounds {
        x: (game::SCREEN_WIDTH - game::RESTART_WIDTH) / 2.0,
        y: (game::SCREEN_HEIGHT - game::RESTART_HEIGHT) / 2.0,
        width: game::RESTART_WIDTH,
        height: game::RESTART_HEIGHT,
    }
}

fn pipe_rows(width: usize, height: usize, orientation: Orientation) -> Vec<String> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let body_row = std::iter::repeat_n('|', width).collect::<String>();
    let cap_row = std::iter::repeat_n('█', width).collect::<String>();

    // The cap marks the edge that faces the gap.
    let mut rows = std::iter::repeat_with(|| body_row.clone()).take(height - 1).collect::<Vec<_>>();
    match orientation {
        Orientation::Top => rows.push(cap_row),
        Orientation::Bottom => rows.insert(0, cap_row),
    }
    rows
}

impl Page for GamePage {
    fn id(&self) -> PageId {
        PageId::Game
    }

    fn register_keymap(&mut self, keymaps: &HashMap<PageId, PageKeyBindings>) -> Result<()> {
        if let Some(keymap) = keymaps.get(&self.id()) {
            self.keymap = keymap.clone();
        }
        Ok(())
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let (x, y) = self.cell_to_playfield(mouse.column, mouse.row);
                self.press_at(x, y);
            },
            MouseEventKind::Up(MouseButton::Left) => self.release(),
            _ => {},
        }
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match &action.command {
            Command::Tick => self.tick(),
            Command::Game(GameAction::Flap) => match action.state {
                ActionState::Start => self.press_at(-1.0, -1.0),
                ActionState::End => self.release(),
                ActionState::Repeat => {},
            },
            Command::Game(GameAction::Restart) => {
                if action.state == ActionState::Start && self.state == State::GameOver {
                    self.reset();
                }
            },
            _ => {},
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        self.canvas = area;

        self.draw_ground(f);
        self.draw_pipes(f);
        self.draw_bird(f);
        self.draw_score(f);

        match self.state {
            State::Idle => self.draw_start_prompt(f),
            State::GameOver => self.draw_restart_button(f),
            State::Flying => {},
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn flying_page() -> GamePage {
        let mut page = GamePage::new();
        page.state = State::Flying;
        // Keep the spawn timer quiet so tests control the pipe set.
        page.last_spawn = SystemTime::now();
        page
    }

    #[test]
    fn idle_click_starts_the_flight_with_a_full_impulse() {
        let mut page = GamePage::new();
        page.last_spawn = SystemTime::now();
        page.press_at(10.0, 10.0);
        assert_eq!(page.state, State::Flying);

        page.tick();
        assert_eq!(page.bird.velocity(), game::JUMP_STRENGTH);
    }

    #[test]
    fn top_contact_ends_the_run() {
        let mut page = flying_page();
        page.bird.reset(game::SCREEN_WIDTH / 4.0, 10.0);

        page.tick();
        assert_eq!(page.state, State::GameOver);
        assert!(page.pipes.is_empty());
    }

    #[test]
    fn ground_contact_ends_the_run() {
        let mut page = flying_page();
        let ground = game::SCREEN_HEIGHT - game::GROUND_HEIGHT;
        page.bird.reset(game::SCREEN_WIDTH / 4.0, ground - game::BIRD_HEIGHT / 2.0);

        page.tick();
        assert_eq!(page.state, State::GameOver);
    }

    #[test]
    fn pipe_overlap_ends_the_run() {
        let mut page = flying_page();
        let (top, bottom) = Pipe::spawn_pair(game::SCREEN_WIDTH / 4.0, 100.0);
        page.pipes.push_back(top);
        page.pipes.push_back(bottom);

        page.tick();
        assert_eq!(page.state, State::GameOver);
    }

    #[test]
    fn pipes_freeze_once_the_run_is_over() {
        let mut page = flying_page();
        page.state = State::GameOver;
        let (top, _) = Pipe::spawn_pair(game::SCREEN_WIDTH, game::SCREEN_HEIGHT / 2.0);
        let before = top.bounds().left();
        page.pipes.push_back(top);

        page.tick();
        assert_eq!(page.pipes[0].bounds().left(), before);
    }

    #[test]
    fn offscreen_pipes_are_culled() {
        let mut page = flying_page();
        let (mut top, mut bottom) = Pipe::spawn_pair(game::SCREEN_WIDTH, game::SCREEN_HEIGHT / 2.0);
        let ticks = ((game::SCREEN_WIDTH + game::PIPE_WIDTH) / game::SCROLL_SPEED).ceil() as usize;
        for _ in 0..ticks {
            top.advance(game::SCROLL_SPEED);
            bottom.advance(game::SCROLL_SPEED);
        }
        page.pipes.push_back(top);
        page.pipes.push_back(bottom);

        page.tick();
        assert!(page.pipes.is_empty());
    }

    #[test]
    fn each_half_scores_half_a_point_exactly_once() {
        let mut page = flying_page();
        // One pair just ahead of the bird's left edge; the next tick moves
        // its right edge past the bird.
        let bird_left = page.bird.bounds().left();
        let (top, bottom) = Pipe::spawn_pair(bird_left - game::PIPE_WIDTH + 1.0, game::SCREEN_HEIGHT / 2.0);
        page.pipes.push_back(top);
        page.pipes.push_back(bottom);

        page.tick();
        assert_eq!(page.state, State::Flying);
        assert_eq!(page.score, 1.0);

        page.tick();
        assert_eq!(page.score, 1.0);
    }

    #[test]
    fn restart_click_outside_the_control_changes_nothing() {
        let mut page = flying_page();
        page.state = State::GameOver;
        page.score = 2.5;
        let (top, _) = Pipe::spawn_pair(game::SCREEN_WIDTH, game::SCREEN_HEIGHT / 2.0);
        page.pipes.push_back(top);
        let velocity = page.bird.velocity();

        page.press_at(0.0, 0.0);
        assert_eq!(page.state, State::GameOver);
        assert_eq!(page.score, 2.5);
        assert_eq!(page.pipes.len(), 1);
        assert_eq!(page.bird.velocity(), velocity);
    }

    #[test]
    fn restart_click_inside_the_control_resets_the_game() {
        let mut page = flying_page();
        page.state = State::GameOver;
        page.score = 3.0;
        let (top, _) = Pipe::spawn_pair(game::SCREEN_WIDTH, game::SCREEN_HEIGHT / 2.0);
        page.pipes.push_back(top);

        page.press_at(game::SCREEN_WIDTH / 2.0, game::SCREEN_HEIGHT / 2.0);
        assert_eq!(page.state, State::Idle);
        assert_eq!(page.score, 0.0);
        assert!(page.pipes.is_empty());
        assert_eq!(page.bird.velocity(), 0.0);
    }

    #[test]
    fn reset_twice_matches_reset_once() {
        let mut page = GamePage::new();
        page.press_at(10.0, 10.0);
        for _ in 0..30 {
            page.tick();
        }
        page.state = State::GameOver;

        page.reset();
        let snapshot = (page.state, page.score, page.pipes.len(), page.bird.bounds(), page.bird.velocity());
        page.reset();
        assert_eq!(snapshot, (page.state, page.score, page.pipes.len(), page.bird.bounds(), page.bird.velocity()));
    }
}
