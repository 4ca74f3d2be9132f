//! The terminal shell: owns the screen, turns crossterm events into host
//! and game input, and drives the scheduler once per frame.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use futures_util::StreamExt;
use ratatui::{
    layout::{Alignment, Constraint, Direction as Axis, Layout, Position, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::core::config::InputConfig;
use crate::core::host::{GameHost, HostState};
use crate::core::input::Direction;
use crate::core::menu::{CatalogAction, CatalogView, Palette};
use crate::core::prefs::Preferences;

/// Dpad buttons in screen order, each `DPAD_WIDTH` columns wide.
const DPAD: [(Direction, &str); 4] = [
    (Direction::Left, "[ ← ]"),
    (Direction::Up, "[ ↑ ]"),
    (Direction::Down, "[ ↓ ]"),
    (Direction::Right, "[ → ]"),
];
const DPAD_WIDTH: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Screen regions of the game view from the last draw, used to route clicks.
#[derive(Debug, Default, Clone, Copy)]
struct GameLayout {
    panel: Rect,
    dpad: Option<Rect>,
}

pub struct Shell {
    host: GameHost,
    prefs: Preferences,
    catalog: CatalogView,
    input: InputConfig,
    frame_period: Duration,
    layout: GameLayout,
    notice: Option<String>,
}

impl Shell {
    pub fn new(host: GameHost, prefs: Preferences, input: InputConfig, frame_period: Duration) -> Self {
        Self {
            host,
            prefs,
            catalog: CatalogView::new(),
            input,
            frame_period,
            layout: GameLayout::default(),
            notice: None,
        }
    }

    pub fn host(&self) -> &GameHost {
        &self.host
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Opens `id`; a failure lands back on the catalog with a notice.
    pub fn open(&mut self, id: &str) {
        match self.host.open(id) {
            Ok(()) => self.notice = None,
            Err(err) => {
                warn!(error = %err, "could not open game");
                self.notice = Some(err.to_string());
            }
        }
    }

    /// Takes over the terminal until the user quits. The terminal is
    /// restored even when the loop fails.
    pub async fn run(mut self) -> Result<()> {
        let mut terminal = ratatui::init();
        set_mouse_capture(&mut io::stdout(), true);

        let result = self.event_loop(&mut terminal).await;

        self.host.close();
        set_mouse_capture(&mut io::stdout(), false);
        ratatui::restore();
        info!("shell exited");
        result
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(self.frame_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            terminal.draw(|f| self.render(f))?;

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if self.handle_event(event, Instant::now()) == Flow::Quit {
                            break;
                        }
                    }
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                },
                _ = ticker.tick() => self.frame(Instant::now())?,
            }
        }
        Ok(())
    }

    /// Runs due timers and plays any queued tone.
    pub fn frame(&mut self, now: Instant) -> Result<()> {
        self.host.context().scheduler.pump(now);
        if self.host.context().sound.take_pending().is_some() {
            let mut out = io::stdout();
            out.write_all(b"\x07")?;
            out.flush()?;
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event, now: Instant) -> Flow {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse, now);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        match key.code {
            KeyCode::F(2) => {
                self.prefs.toggle_sound(&self.host.context().sound);
                return Flow::Continue;
            }
            KeyCode::F(3) => {
                self.prefs.toggle_theme();
                return Flow::Continue;
            }
            _ => {}
        }

        if self.host.state() == HostState::Idle {
            return match self.catalog.handle_key(key, self.host.registry()) {
                CatalogAction::Open(id) => {
                    self.open(id);
                    Flow::Continue
                }
                CatalogAction::Quit => Flow::Quit,
                CatalogAction::None => Flow::Continue,
            };
        }

        let ctx = self.host.context().clone();
        match key.code {
            KeyCode::Esc => self.host.close(),
            KeyCode::Tab => {
                let paused = ctx.pause.toggle();
                debug!(paused, "pause toggled");
            }
            KeyCode::F(5) => {
                if let Err(err) = self.host.restart() {
                    warn!(error = %err, "restart failed");
                    self.notice = Some(err.to_string());
                }
            }
            code => {
                if !ctx.input.key(code) {
                    ctx.mount.dispatch_key(key);
                }
            }
        }
        Flow::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.host.state() == HostState::Idle {
            return;
        }
        let input = self.host.context().input.clone();
        let (x, y) = (
            f32::from(mouse.column) * self.input.cell_width_px,
            f32::from(mouse.row) * self.input.cell_height_px,
        );
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => input.gesture_start(x, y, now),
            MouseEventKind::Up(MouseButton::Left) => {
                if input.gesture_end(x, y, now).is_none() {
                    self.click(mouse.column, mouse.row);
                }
            }
            _ => {}
        }
    }

    /// A press and release that was not a swipe.
    fn click(&mut self, column: u16, row: u16) {
        let ctx = self.host.context();
        let at = Position::new(column, row);
        if let Some(dpad) = self.layout.dpad.filter(|r| r.contains(at)) {
            if let Some(direction) = dpad_button(column - dpad.x) {
                ctx.input.dpad(direction);
            }
            return;
        }
        let panel = self.layout.panel;
        if panel.contains(at) {
            ctx.mount.dispatch_pointer(column - panel.x, row - panel.y);
        }
    }

    fn status(&self) -> String {
        let sound = if self.host.context().sound.is_enabled() { "on" } else { "off" };
        format!("Sound: {sound}  Theme: {:?}", self.prefs.theme())
    }

    fn render(&mut self, f: &mut Frame) {
        let palette = Palette::for_theme(self.prefs.theme());
        let status = match &self.notice {
            Some(notice) => format!("{}  | {notice}", self.status()),
            None => self.status(),
        };
        match self.host.active_id().map(str::to_string) {
            None => {
                let scores = self.host.scores().borrow();
                self.catalog.render(f, self.host.registry(), &scores, palette, &status);
            }
            Some(id) => self.render_game(f, &id, palette, &status),
        }
    }

    fn render_game(&mut self, f: &mut Frame, id: &str, palette: Palette, status: &str) {
        let ctx = self.host.context();
        let dpad_visible = ctx.input.dpad_visible();
        let chunks = Layout::default()
            .direction(Axis::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(if dpad_visible { 1 } else { 0 }),
                Constraint::Length(1),
            ])
            .split(f.area());

        f.render_widget(Block::default().style(palette.base()), f.area());

        let name = self.host.registry().get(id).map_or(id, |g| g.name);
        let best = self.host.scores().borrow().display(id);
        let paused = if ctx.pause.is_paused() { "  [PAUSED]" } else { "" };
        f.render_widget(
            Paragraph::new(format!(" {name}   Best: {best}{paused}   {status}"))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center)
                .style(palette.base().add_modifier(Modifier::BOLD)),
            chunks[0],
        );

        let block = Block::default().borders(Borders::ALL).title(format!(" {} ", name.to_uppercase()));
        let panel = block.inner(chunks[1]);
        f.render_widget(
            Paragraph::new(ctx.mount.lines().join("\n")).block(block).style(palette.base()),
            chunks[1],
        );

        let dpad = dpad_visible.then(|| {
            let row = chunks[2];
            let width = (DPAD_WIDTH * DPAD.len() as u16).min(row.width);
            Rect::new(row.x + (row.width - width) / 2, row.y, width, row.height)
        });
        if let Some(area) = dpad {
            let labels: Vec<&str> = DPAD.iter().map(|(_, label)| *label).collect();
            f.render_widget(
                Paragraph::new(labels.join(" ")).style(Style::default().fg(palette.accent).bg(palette.bg)),
                area,
            );
        }

        f.render_widget(
            Paragraph::new("[Esc] Catalog  [Tab] Pause  [F5] Restart  [F2] Sound  [F3] Theme  [Ctrl-C] Quit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.muted).bg(palette.bg)),
            chunks[3],
        );

        self.layout = GameLayout { panel, dpad };
    }
}

/// Turns mouse reporting on or off. Terminals without mouse support only
/// cost a debug line.
fn set_mouse_capture(out: &mut impl Write, enabled: bool) -> bool {
    let result = if enabled {
        crossterm::execute!(out, EnableMouseCapture)
    } else {
        crossterm::execute!(out, DisableMouseCapture)
    };
    match result {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, enabled, "could not change mouse capture");
            false
        }
    }
}

/// Maps a column offset within the dpad row to its button.
fn dpad_button(offset: u16) -> Option<Direction> {
    if offset % DPAD_WIDTH == DPAD_WIDTH - 1 {
        return None;
    }
    DPAD.get(usize::from(offset / DPAD_WIDTH)).map(|(direction, _)| *direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::core::host::HostContext;
    use crate::core::prefs::Sound;
    use crate::core::score::ScoreStore;
    use crate::core::storage::Storage;
    use crate::games::create_default_registry;

    fn shell() -> Shell {
        let storage = Storage::in_memory();
        let prefs = Preferences::load(storage.clone());
        let ctx = HostContext::new(Default::default(), Sound::new(prefs.sound()), Instant::now());
        let registry = Rc::new(create_default_registry().unwrap());
        let host = GameHost::new(registry, ScoreStore::shared(storage), ctx);
        Shell::new(host, prefs, InputConfig::default(), Duration::from_millis(16))
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn mouse_capture_failures_are_reported_not_raised() {
        let mut buffer = Vec::new();
        assert!(set_mouse_capture(&mut buffer, true));
        assert!(set_mouse_capture(&mut buffer, false));
        assert!(!buffer.is_empty());

        assert!(!set_mouse_capture(&mut BrokenPipe, true));
        assert!(!set_mouse_capture(&mut BrokenPipe, false));
    }

    #[test]
    fn dpad_columns() {
        assert_eq!(dpad_button(0), Some(Direction::Left));
        assert_eq!(dpad_button(5), None);
        assert_eq!(dpad_button(6), Some(Direction::Up));
        assert_eq!(dpad_button(19), Some(Direction::Right));
        assert_eq!(dpad_button(24), None);
    }

    #[test]
    fn enter_opens_and_esc_returns_to_catalog() {
        let mut shell = shell();
        let now = Instant::now();
        for c in "snake".chars() {
            shell.handle_event(press(KeyCode::Char(c)), now);
        }
        shell.handle_event(press(KeyCode::Enter), now);
        assert_eq!(shell.host().active_id(), Some("snake"));
        assert!(shell.host().context().input.is_bound());

        shell.handle_event(press(KeyCode::Tab), now);
        assert!(shell.host().context().pause.is_paused());

        assert_eq!(shell.handle_event(press(KeyCode::Esc), now), Flow::Continue);
        assert_eq!(shell.host().state(), HostState::Idle);
        assert!(!shell.host().context().input.is_bound());
    }

    #[test]
    fn ctrl_c_quits_from_anywhere() {
        let mut shell = shell();
        shell.open("pong");
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(shell.handle_event(ctrl_c, Instant::now()), Flow::Quit);
    }

    #[test]
    fn unknown_game_leaves_a_notice() {
        let mut shell = shell();
        shell.open("chess");
        assert_eq!(shell.host().state(), HostState::Idle);
        assert!(shell.notice().is_some_and(|n| n.contains("chess")));
    }

    #[test]
    fn f2_toggles_sound() {
        let mut shell = shell();
        let before = shell.host().context().sound.is_enabled();
        shell.handle_event(press(KeyCode::F(2)), Instant::now());
        assert_eq!(shell.host().context().sound.is_enabled(), !before);
    }
}
