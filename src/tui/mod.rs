//! Ratatui-based terminal front end.
//!
//! Renders the mounted scene full-screen and feeds key presses and real
//! elapsed time into the [`Session`].

use crate::scene::{
    CakeView, CardState, FinalPhase, FinalView, GalleryView, IntroView, RoomView, SceneAction,
    SceneView, SongCardView,
};
use crate::session::Session;
use crate::stage::Stage;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, stdout, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Minimum terminal width for the greeting
pub const MIN_COLS: u16 = 60;
/// Minimum terminal height for the greeting
pub const MIN_ROWS: u16 = 20;

const ACCENT: Color = Color::Rgb(0xFF, 0x6F, 0x69);
const CREAM: Color = Color::Rgb(0xFF, 0xEE, 0xAD);

/// Check if terminal is large enough
pub fn terminal_supports_tui() -> bool {
    if let Ok((cols, rows)) = crossterm::terminal::size() {
        cols >= MIN_COLS && rows >= MIN_ROWS
    } else {
        false
    }
}

/// What a key press means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Leave the greeting
    Quit,
    /// Global music button
    ToggleMusic,
    /// Scene action
    Scene(SceneAction),
}

/// Map a key press to an input
pub fn map_key(key: &KeyEvent) -> Option<Input> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Input::Quit);
    }
    let input = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Input::Quit,
        KeyCode::Char('m') | KeyCode::Char('M') => Input::ToggleMusic,
        KeyCode::Char(c @ '1'..='9') => Input::Scene(SceneAction::Choose((c as u8 - b'1') as usize)),
        KeyCode::Char(' ') | KeyCode::Char('p') => Input::Scene(SceneAction::TogglePlay),
        KeyCode::Left => Input::Scene(SceneAction::Back),
        KeyCode::Right => Input::Scene(SceneAction::Forward),
        KeyCode::Enter => Input::Scene(SceneAction::Continue),
        KeyCode::Char('b') | KeyCode::Char('B') => Input::Scene(SceneAction::BlowCandles),
        KeyCode::Char('h') | KeyCode::Char('H') => Input::Scene(SceneAction::CatchHeart),
        _ => return None,
    };
    Some(input)
}

/// Restore terminal to normal state.
///
/// This function is safe to call multiple times and handles errors gracefully.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

type PanicHook = Box<dyn Fn(&std::panic::PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Chains a terminal-restoring panic hook in front of the current one and
/// puts the current one back when dropped.
struct PanicHookGuard {
    original: Option<Arc<PanicHook>>,
}

impl PanicHookGuard {
    fn install() -> Self {
        let original = Arc::new(std::panic::take_hook());
        let chained = Arc::clone(&original);
        std::panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            (**chained)(panic_info);
        }));
        Self {
            original: Some(original),
        }
    }

    /// Reinstall the previous hook. Returns false if it was already restored.
    fn restore(&mut self) -> bool {
        let Some(original) = self.original.take() else {
            return false;
        };
        // Dropping our hook releases its clone of `original`.
        drop(std::panic::take_hook());
        match Arc::try_unwrap(original) {
            Ok(hook) => {
                std::panic::set_hook(hook);
                true
            }
            Err(_) => false,
        }
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Run the greeting until the user quits
pub fn run(session: &mut Session) -> io::Result<()> {
    enable_raw_mode()?;
    if let Err(e) = execute!(stdout(), EnterAlternateScreen) {
        restore_terminal();
        return Err(e);
    }

    let result = {
        let _hook = PanicHookGuard::install();
        Terminal::new(CrosstermBackend::new(stdout()))
            .and_then(|mut terminal| event_loop(&mut terminal, session))
    };

    // Leave raw mode and the alternate screen on every exit path
    restore_terminal();
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut Session,
) -> io::Result<()> {
    let frame_duration = Duration::from_millis(33); // ~30 FPS
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();

        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match map_key(&key) {
                        Some(Input::Quit) => return Ok(()),
                        Some(Input::ToggleMusic) => session.toggle_music(),
                        Some(Input::Scene(action)) => session.perform(action),
                        None => {}
                    }
                }
            }
        }

        let now = Instant::now();
        session.advance_time(now - last_frame);
        last_frame = now;

        terminal.draw(|f| draw_ui(f, session))?;

        // Frame rate limiting
        let frame_time = frame_start.elapsed();
        if frame_time < frame_duration {
            std::thread::sleep(frame_duration - frame_time);
        }
    }
}

/// Draw the whole screen
fn draw_ui(f: &mut Frame, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Scene
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    let view = session.view();
    draw_header(f, chunks[0], session);
    draw_scene(f, chunks[1], &view, session.elapsed());
    draw_footer(f, chunks[2], &view);
}

fn draw_header(f: &mut Frame, area: Rect, session: &Session) {
    let music = if session.music_playing() {
        Span::styled("♫ Music on ", Style::default().fg(ACCENT).bold())
    } else {
        Span::styled("♪ Music off", Style::default().fg(Color::DarkGray))
    };

    let stage = session.stage();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" A greeting for {} ", session.config().recipient),
            Style::default().fg(CREAM).bold(),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{}/{} {}", stage.index() + 1, Stage::ALL.len(), stage),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        music,
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Happy Birthday "),
    );

    f.render_widget(header, area);
}

fn draw_scene(f: &mut Frame, area: Rect, view: &SceneView, elapsed: Duration) {
    let card = centered(area, 70, 80);
    match view {
        SceneView::Intro(intro) => draw_intro(f, card, intro),
        SceneView::SongCard(song) => draw_song_card(f, card, song),
        SceneView::Room(room) => draw_room(f, card, room),
        SceneView::Cake(cake) => draw_cake(f, card, cake),
        SceneView::Gallery(gallery) => draw_gallery(f, card, gallery),
        SceneView::Final(finale) => draw_final(f, area, finale, elapsed),
    }
}

fn card_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" {title} "))
        .title_alignment(Alignment::Center)
}

fn draw_intro(f: &mut Frame, area: Rect, intro: &IntroView) {
    let mut lines = vec![
        Line::from(Span::styled("✦", Style::default().fg(ACCENT))),
        Line::from(""),
        Line::from(Span::styled(
            intro.message.clone(),
            Style::default().fg(ACCENT).bold(),
        )),
        Line::from(""),
    ];

    if !intro.actions.is_empty() {
        let mut buttons = Vec::new();
        for (i, label) in intro.actions.iter().enumerate() {
            if i > 0 {
                buttons.push(Span::raw("    "));
            }
            buttons.push(Span::styled(
                format!("[{}] {}", i + 1, label),
                Style::default().fg(Color::Black).bg(CREAM).bold(),
            ));
        }
        lines.push(Line::from(buttons));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(card_block(&format!("{}/{}", intro.index + 1, intro.total)));
    f.render_widget(paragraph, area);
}

fn draw_song_card(f: &mut Frame, area: Rect, song: &SongCardView) {
    let block = card_block("Pick the soundtrack");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),    // Song info
            Constraint::Length(1), // Controls
            Constraint::Length(1), // Progress
        ])
        .split(inner);

    let icon = match song.state {
        CardState::Idle => "♪  press [space] to play",
        CardState::Playing => "♫  now playing",
    };
    let info = Paragraph::new(vec![
        Line::from(Span::styled(icon, Style::default().fg(CREAM))),
        Line::from(""),
        Line::from(Span::styled(song.title.clone(), Style::default().fg(ACCENT).bold())),
        Line::from(Span::styled(
            song.artist.clone(),
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(info, rows[0]);

    let controls = Paragraph::new("⏮ [←]     ⏯ [space]     [→] ⏭")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
    f.render_widget(controls, rows[1]);

    if let Some(progress) = song.progress {
        let label = format!(
            "{} / {}",
            format_time(song.current_time),
            song.duration.map(format_time).unwrap_or_else(|| "--:--".to_string())
        );
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(ACCENT).bg(Color::Black))
            .ratio(progress.clamp(0.0, 1.0))
            .label(label);
        f.render_widget(gauge, rows[2]);
    }
}

fn draw_room(f: &mut Frame, area: Rect, room: &RoomView) {
    let mut lines = Vec::new();
    if room.lights_on {
        lines.push(Line::from(Span::styled(
            "💡 The lights are on!",
            Style::default().fg(CREAM).bold(),
        )));
        lines.push(Line::from(""));
        for decoration in &room.revealed {
            lines.push(Line::from(Span::styled(
                format!("★ {decoration}"),
                Style::default().fg(ACCENT),
            )));
        }
        for _ in 0..room.hidden {
            lines.push(Line::from(Span::styled("·", Style::default().fg(Color::DarkGray))));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "It's dark in here... press [enter] to find the switch",
            Style::default().fg(Color::DarkGray),
        )));
    }
    if room.lights_on && room.can_continue {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[enter] Let's go!",
            Style::default().fg(Color::Black).bg(CREAM).bold(),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(card_block("Surprise!"));
    f.render_widget(paragraph, area);
}

fn draw_cake(f: &mut Frame, area: Rect, cake: &CakeView) {
    let flames: String = (0..cake.candles)
        .map(|i| if i < cake.lit { "🔥" } else { "  " })
        .collect::<Vec<_>>()
        .join(" ");
    let candles: String = vec!["║"; cake.candles as usize].join("  ");

    let mut lines = vec![
        Line::from(Span::styled(flames, Style::default().fg(Color::Yellow))),
        Line::from(Span::styled(candles, Style::default().fg(CREAM))),
        Line::from(Span::styled(
            "▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄",
            Style::default().fg(ACCENT),
        )),
        Line::from(Span::styled(
            "████████████████████",
            Style::default().fg(Color::Magenta),
        )),
        Line::from(""),
    ];
    if cake.celebrating {
        lines.push(Line::from(Span::styled(
            "🎉 Make a wish! 🎉",
            Style::default().fg(ACCENT).bold(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("{} candle(s) left, press [b] to blow", cake.lit),
            Style::default().fg(Color::Gray),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(card_block("Cake time"));
    f.render_widget(paragraph, area);
}

fn draw_gallery(f: &mut Frame, area: Rect, gallery: &GalleryView) {
    let last = gallery.index + 1 >= gallery.total;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("┌──────────────┐", Style::default().fg(CREAM))),
        Line::from(Span::styled("│      📷      │", Style::default().fg(CREAM))),
        Line::from(Span::styled("└──────────────┘", Style::default().fg(CREAM))),
        Line::from(""),
        Line::from(Span::styled(
            gallery.caption.clone(),
            Style::default().fg(ACCENT).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            if last {
                "[←] back   [→] on to the last surprise"
            } else {
                "[←] back   [→] next"
            },
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(card_block(&format!(
            "Memories {}/{}",
            gallery.index + 1,
            gallery.total
        )));
    f.render_widget(paragraph, area);
}

/// Bounce path of the heart, in cells, looping every three seconds
fn heart_offset(elapsed: Duration) -> (i32, i32) {
    const KEYFRAMES: [(i32, i32); 4] = [(0, 0), (10, -2), (-10, 2), (0, 0)];
    let phase = (elapsed.as_millis() % 3000) as f64 / 3000.0;
    let segment = phase * (KEYFRAMES.len() - 1) as f64;
    let idx = (segment.floor() as usize).min(KEYFRAMES.len() - 2);
    let t = segment - idx as f64;
    let (x0, y0) = KEYFRAMES[idx];
    let (x1, y1) = KEYFRAMES[idx + 1];
    (
        (x0 as f64 + (x1 - x0) as f64 * t).round() as i32,
        (y0 as f64 + (y1 - y0) as f64 * t).round() as i32,
    )
}

fn draw_final(f: &mut Frame, area: Rect, finale: &FinalView, elapsed: Duration) {
    match finale.phase {
        FinalPhase::Postcards => {
            let card = centered(area, 80, 80);
            let block = card_block("Special postcards just for you!");
            let inner = block.inner(card);
            f.render_widget(block, card);

            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(1)])
                .split(inner);

            let count = finale.postcards.len().max(1) as u32;
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, count); count as usize])
                .split(rows[0]);
            for (text, column) in finale.postcards.iter().zip(columns.iter()) {
                let postcard = Paragraph::new(text.clone())
                    .wrap(Wrap { trim: true })
                    .alignment(Alignment::Center)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(Color::LightRed)),
                    );
                f.render_widget(postcard, *column);
            }

            let button = Paragraph::new(Span::styled(
                "[enter] Proceed to the Heart Game!",
                Style::default().fg(Color::Black).bg(CREAM).bold(),
            ))
            .alignment(Alignment::Center);
            f.render_widget(button, rows[1]);
        }
        FinalPhase::Game => {
            let block = card_block("Catch the heart to reveal the final message!");
            let inner = block.inner(area);
            f.render_widget(block, area);

            let (dx, dy) = heart_offset(elapsed);
            let x = (inner.x as i32 + inner.width as i32 / 2 + dx)
                .clamp(inner.x as i32, (inner.x + inner.width).saturating_sub(3) as i32);
            let y = (inner.y as i32 + inner.height as i32 / 2 + dy)
                .clamp(inner.y as i32, (inner.y + inner.height).saturating_sub(1) as i32);
            let heart = Rect {
                x: x as u16,
                y: y as u16,
                width: 3.min(inner.width),
                height: 1.min(inner.height),
            };
            f.render_widget(
                Paragraph::new(Span::styled("♥", Style::default().fg(Color::LightRed).bold())),
                heart,
            );

            let hint_area = Rect {
                x: inner.x,
                y: (inner.y + inner.height).saturating_sub(1),
                width: inner.width,
                height: 1.min(inner.height),
            };
            f.render_widget(
                Paragraph::new("press [h] to catch the bouncing heart!")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::White)),
                hint_area,
            );
        }
        FinalPhase::Final => {
            let card = centered(area, 70, 70);
            let lines = vec![
                Line::from(Span::styled("♥", Style::default().fg(Color::LightRed).bold())),
                Line::from(""),
                Line::from(Span::styled(
                    finale.headline.clone(),
                    Style::default().fg(Color::Red).bold(),
                )),
                Line::from(""),
                Line::from(Span::styled(finale.body.clone(), Style::default().fg(Color::White))),
                Line::from(""),
                Line::from(Span::styled(
                    finale.signoff.clone(),
                    Style::default().fg(Color::LightRed).bold(),
                )),
            ];
            let paragraph = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(card_block("♥"));
            f.render_widget(paragraph, card);
        }
    }
}

/// Keys that mean something in the current scene
fn scene_controls(view: &SceneView) -> &'static str {
    match view {
        SceneView::Intro(intro) if intro.actions.is_empty() => "",
        SceneView::Intro(_) => "[1/2] Choose",
        SceneView::SongCard(_) => "[Space] Play/Pause  [←/→] Skip",
        SceneView::Room(room) if room.can_continue => "[Enter] Continue",
        SceneView::Room(_) => "",
        SceneView::Cake(cake) if cake.celebrating => "",
        SceneView::Cake(_) => "[b] Blow",
        SceneView::Gallery(_) => "[←/→] Photos",
        SceneView::Final(finale) => match finale.phase {
            FinalPhase::Postcards => "[Enter] Proceed",
            FinalPhase::Game => "[h] Catch",
            FinalPhase::Final => "",
        },
    }
}

fn draw_footer(f: &mut Frame, area: Rect, view: &SceneView) {
    let mut controls = String::from("[m] Music");
    let scene = scene_controls(view);
    if !scene.is_empty() {
        controls.push_str("  ");
        controls.push_str(scene);
    }
    controls.push_str("  [q] Quit");

    let footer = Paragraph::new(Line::from(Span::styled(
        controls,
        Style::default().fg(Color::DarkGray),
    )))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}

/// Rect of `percent_x` × `percent_y` centred in `area`
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Format seconds as MM:SS
fn format_time(seconds: f64) -> String {
    // Guard against NaN, infinity, or negative values
    if !seconds.is_finite() || seconds < 0.0 {
        return "--:--".to_string();
    }
    let clamped = seconds.min(5999.0);
    let mins = (clamped / 60.0) as u32;
    let secs = (clamped % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentBackend;
    use crate::GreetingConfig;
    use ratatui::backend::TestBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_map() {
        assert_eq!(map_key(&press(KeyCode::Char('q'))), Some(Input::Quit));
        assert_eq!(
            map_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Input::Quit)
        );
        assert_eq!(map_key(&press(KeyCode::Char('m'))), Some(Input::ToggleMusic));
        assert_eq!(
            map_key(&press(KeyCode::Char('2'))),
            Some(Input::Scene(SceneAction::Choose(1)))
        );
        assert_eq!(
            map_key(&press(KeyCode::Enter)),
            Some(Input::Scene(SceneAction::Continue))
        );
        assert_eq!(map_key(&press(KeyCode::Tab)), None);
    }

    #[test]
    fn test_panic_hook_guard_puts_previous_hook_back() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        std::panic::set_hook(Box::new(|_| {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }));

        let mut guard = PanicHookGuard::install();
        assert!(guard.restore());
        assert!(!guard.restore());
        drop(guard);

        let _ = std::panic::catch_unwind(|| panic!("boom"));
        let _ = std::panic::take_hook();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(75.4), "01:15");
        assert_eq!(format_time(-1.0), "--:--");
        assert_eq!(format_time(f64::NAN), "--:--");
    }

    #[test]
    fn test_heart_loops() {
        assert_eq!(heart_offset(Duration::ZERO), (0, 0));
        assert_eq!(heart_offset(Duration::from_millis(1000)), (10, -2));
        assert_eq!(heart_offset(Duration::from_millis(4000)), (10, -2));
    }

    #[test]
    fn test_renders_every_stage() {
        let mut session = Session::new(
            GreetingConfig::default(),
            Box::new(SilentBackend::new(Some(Duration::from_secs(60)))),
        )
        .unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        let steps: [&[SceneAction]; 5] = [
            &[SceneAction::Choose(0), SceneAction::TogglePlay],
            &[SceneAction::Continue],
            &[SceneAction::BlowCandles; 5],
            &[SceneAction::Forward; 4],
            &[SceneAction::Continue, SceneAction::CatchHeart],
        ];
        for actions in steps {
            session.advance_time(Duration::from_secs(10));
            for action in actions {
                terminal.draw(|f| draw_ui(f, &session)).unwrap();
                session.perform(*action);
            }
            terminal.draw(|f| draw_ui(f, &session)).unwrap();
        }
        session.advance_time(Duration::from_secs(6));
        assert_eq!(session.stage(), Stage::FinalMessage);
    }
}
