use crate::entities::{
    Bullet, EnemyFormation, Entity, GameState, Player, Renderer, SpriteType, Tint,
};
use crate::settings::Screen;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// View struct that holds all game state needed for rendering
pub struct RenderView<'a> {
    pub game_state: GameState,
    pub formation: &'a EnemyFormation,
    pub player: &'a Player,
    pub bullets: &'a [Bullet],
    pub screen: Screen,
    pub score: u32,
    /// One-based
    pub level: usize,
    pub level_count: usize,
    pub victory: bool,
    pub area: Rect,
    pub fps: u32,
    pub elapsed_time_secs: u64,
}

/// Scales the pixel playfield onto a rectangle of terminal cells
pub struct CellCanvas<'a> {
    buffer: &'a mut Buffer,
    area: Rect,
    screen: Screen,
}

impl<'a> CellCanvas<'a> {
    pub fn new(buffer: &'a mut Buffer, area: Rect, screen: Screen) -> Self {
        Self {
            buffer,
            area,
            screen,
        }
    }

    /// Cells covered by a pixel rectangle, clipped to the canvas. Anything
    /// visible covers at least one cell.
    pub fn cells_for(&self, x: i32, y: i32, width: i32, height: i32) -> Option<Rect> {
        if self.area.is_empty() || self.screen.width <= 0 || self.screen.height <= 0 {
            return None;
        }
        if x + width <= 0 || y + height <= 0 || x >= self.screen.width || y >= self.screen.height {
            return None;
        }

        let cols = i64::from(self.area.width);
        let rows = i64::from(self.area.height);
        let scale_x = |px: i32| i64::from(px) * cols / i64::from(self.screen.width);
        let scale_y = |px: i32| i64::from(px) * rows / i64::from(self.screen.height);

        let left = scale_x(x).clamp(0, cols - 1);
        let top = scale_y(y).clamp(0, rows - 1);
        let right = scale_x(x + width).max(left + 1).min(cols);
        let bottom = scale_y(y + height).max(top + 1).min(rows);

        Some(Rect::new(
            self.area.x + left as u16,
            self.area.y + top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }
}

impl Renderer for CellCanvas<'_> {
    fn draw_entity(&mut self, entity: &dyn Entity, x: i32, y: i32) {
        let Some(cells) = self.cells_for(x, y, entity.width(), entity.height()) else {
            return;
        };
        let (glyph, color) = appearance(entity.sprite_type(), entity.tint());
        let row: String = std::iter::repeat_n(glyph, usize::from(cells.width)).collect();
        for line in cells.top()..cells.bottom() {
            self.buffer
                .set_string(cells.x, line, &row, Style::default().fg(color));
        }
    }
}

fn appearance(sprite: SpriteType, tint: Tint) -> (char, Color) {
    let (glyph, color) = match sprite {
        SpriteType::Ship => ('A', Color::Green),
        SpriteType::ShipDestroyed => ('x', Color::Red),
        SpriteType::Bullet => ('|', Color::Yellow),
        SpriteType::EnemyBullet => ('!', Color::Magenta),
        SpriteType::EnemyShipA1 => ('W', Color::Cyan),
        SpriteType::EnemyShipA2 => ('M', Color::Cyan),
        SpriteType::EnemyShipB1 => ('Y', Color::Magenta),
        SpriteType::EnemyShipB2 => ('V', Color::Magenta),
        SpriteType::EnemyShipC1 => ('X', Color::Yellow),
        SpriteType::EnemyShipC2 => ('+', Color::Yellow),
        SpriteType::Explosion | SpriteType::BossExplosion => ('*', Color::LightRed),
        SpriteType::BossA => ('#', Color::Red),
        SpriteType::BossB => ('%', Color::LightMagenta),
        SpriteType::BossC => ('@', Color::LightBlue),
        SpriteType::BossD => ('&', Color::LightYellow),
    };
    match tint {
        Tint::Gray => (glyph, Color::Gray),
        Tint::White | Tint::Green => (glyph, color),
    }
}

/// Handles all rendering responsibilities for the game
#[derive(Default)]
pub struct GameRenderer {}

impl GameRenderer {
    pub fn new() -> Self {
        Self {}
    }

    /// Main render method that dispatches to state-specific renderers
    pub fn render(&self, frame: &mut Frame, view: &RenderView) {
        match view.game_state {
            GameState::Playing => self.render_game(frame, view),
            GameState::Paused => self.render_paused(frame, view),
            GameState::GameOver => self.render_game_over(frame, view),
        }
    }

    /// Renders the active gameplay screen
    fn render_game(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;

        // Playfield between the HUD line and the controls line
        let field_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height.saturating_sub(2),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let field = block.inner(field_area);
        frame.render_widget(block, field_area);

        let mut canvas = CellCanvas::new(frame.buffer_mut(), field, view.screen);
        view.formation.draw(&mut canvas);
        if view.player.is_alive() {
            canvas.draw_entity(view.player, view.player.x, view.player.y);
        }
        for bullet in view.bullets {
            canvas.draw_entity(bullet, bullet.x, bullet.y);
        }

        let level_label = if view.formation.boss_stage() > 0 {
            format!("{}/{} BOSS", view.level, view.level_count)
        } else {
            format!("{}/{}", view.level, view.level_count)
        };

        let stats_left = Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.score),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Lives: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.player.lives),
                if view.player.lives > 1 {
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                },
            ),
            Span::styled("  Level: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                level_label,
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Enemies: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.formation.ship_count()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  FPS: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.fps),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);

        let stats_area = Rect {
            x: area.x + 1,
            y: area.y,
            width: area.width.saturating_sub(2),
            height: 1,
        };
        frame.render_widget(Paragraph::new(stats_left), stats_area);

        let minutes = view.elapsed_time_secs / 60;
        let seconds = view.elapsed_time_secs % 60;
        let timer_text = Line::from(vec![
            Span::styled("Time: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{:02}:{:02}", minutes, seconds),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        let timer_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width.saturating_sub(1),
            height: 1,
        };
        frame.render_widget(Paragraph::new(timer_text).right_aligned(), timer_area);

        let controls = Line::from(vec![Span::styled(
            "[A/D/Arrows: Move] [Space: Fire] [P: Pause] [Q: Quit]",
            Style::default().fg(Color::DarkGray),
        )]);
        let controls_area = Rect {
            x: area.x + 1,
            y: area.y + area.height.saturating_sub(1),
            width: area.width.saturating_sub(2),
            height: 1,
        };
        frame.render_widget(Paragraph::new(controls).centered(), controls_area);
    }

    /// Renders the pause screen with overlay
    fn render_paused(&self, frame: &mut Frame, view: &RenderView) {
        self.render_game(frame, view);

        let area = view.area;
        let pause_text = vec![
            Line::from(""),
            Line::from("PAUSED").centered().bold().yellow(),
            Line::from(""),
            Line::from("Press P to resume").centered().white(),
        ];

        let pause_area = Rect {
            x: area.x + (area.width / 2).saturating_sub(15),
            y: area.y + (area.height / 2).saturating_sub(3),
            width: area.width.min(30),
            height: area.height.min(6),
        };

        frame.render_widget(
            Paragraph::new(pause_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            pause_area,
        );
    }

    /// Renders the game over screen
    fn render_game_over(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let minutes = view.elapsed_time_secs / 60;
        let seconds = view.elapsed_time_secs % 60;

        let banner = if view.victory {
            Line::from("║   ALL WAVES CLEARED!      ║")
                .centered()
                .green()
                .bold()
        } else {
            Line::from("║      GAME OVER!           ║")
                .centered()
                .red()
                .bold()
        };

        let game_over_text = vec![
            Line::from(""),
            Line::from("╔═══════════════════════════╗").centered().red(),
            banner,
            Line::from("╚═══════════════════════════╝").centered().red(),
            Line::from(""),
            Line::from(format!("Final Score: {}", view.score))
                .centered()
                .yellow()
                .bold(),
            Line::from(format!("Level Reached: {}/{}", view.level, view.level_count))
                .centered()
                .magenta()
                .bold(),
            Line::from(format!("Time Survived: {:02}:{:02}", minutes, seconds))
                .centered()
                .cyan()
                .bold(),
            Line::from(""),
            Line::from("Press R to restart").centered().white(),
            Line::from("Press Q to quit").centered().white(),
        ];

        frame.render_widget(
            Paragraph::new(game_over_text)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EnemyShip, ShipId};

    fn canvas_buffer() -> Buffer {
        // A quarter of the pixel resolution each way, give or take
        Buffer::empty(Rect::new(0, 0, 112, 130))
    }

    #[test]
    fn test_cells_scale_with_the_canvas() {
        let mut buffer = canvas_buffer();
        let area = buffer.area;
        let canvas = CellCanvas::new(&mut buffer, area, Screen::default());
        assert_eq!(canvas.cells_for(0, 0, 24, 16), Some(Rect::new(0, 0, 6, 4)));
        assert_eq!(canvas.cells_for(40, 100, 24, 16), Some(Rect::new(10, 25, 6, 4)));
    }

    #[test]
    fn test_tiny_entities_cover_one_cell() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 10, 10));
        let area = buffer.area;
        let canvas = CellCanvas::new(&mut buffer, area, Screen::default());
        assert_eq!(canvas.cells_for(0, 0, 6, 10), Some(Rect::new(0, 0, 1, 1)));
    }

    #[test]
    fn test_offscreen_entities_are_skipped_and_wide_ones_clipped() {
        let mut buffer = canvas_buffer();
        let area = buffer.area;
        let canvas = CellCanvas::new(&mut buffer, area, Screen::default());
        assert_eq!(canvas.cells_for(-30, 0, 24, 16), None);
        assert_eq!(canvas.cells_for(0, 520, 6, 10), None);
        let boss = canvas.cells_for(20, 100, 500, 209).unwrap();
        assert_eq!(boss.right(), 112);
    }

    #[test]
    fn test_draw_entity_paints_glyphs() {
        let mut buffer = Buffer::empty(Rect::new(2, 1, 112, 130));
        let area = buffer.area;
        let mut canvas = CellCanvas::new(&mut buffer, area, Screen::default());
        let ship = EnemyShip::new(ShipId(0), 0, 0, SpriteType::EnemyShipC1);
        canvas.draw_entity(&ship, ship.x, ship.y);

        assert_eq!(buffer[(2, 1)].symbol(), "X");
        assert_eq!(buffer[(7, 4)].symbol(), "X");
        assert_eq!(buffer[(8, 1)].symbol(), " ");
        assert_eq!(buffer[(2, 1)].fg, Color::Yellow);
    }

    #[test]
    fn test_gray_tint_overrides_color() {
        assert_eq!(appearance(SpriteType::BossA, Tint::White), ('#', Color::Red));
        assert_eq!(appearance(SpriteType::BossA, Tint::Gray), ('#', Color::Gray));
    }
}
