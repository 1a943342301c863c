use crate::audio;
use crate::config::render::CANVAS_SCALE;
use crate::config::timing::FRAME_MS;
use crate::phase::{Phase, PhaseController};
use crate::session::AnimationSession;
use crate::surface::{Canvas, RasterCanvas};
use crate::timer::{FrameHandle, FrameScheduler};
use anyhow::Context;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{BufWriter, Stdout, Write, stdout};
use std::time::{Duration, Instant};

pub struct ShowOptions {
    pub seed: Option<u64>,
    pub muted: bool,
    pub headline: String,
    pub autostart: bool,
}

const IDLE_PROMPT: &str = "[ Enter ]  light up the sky";
const IDLE_HINT: &str = "q to quit";
const MESSAGE_LINES: [&str; 2] = [
    "You are the brightest star in my night sky",
    "Every heartbeat races for you",
];
const REPLAY_HINT: &str = "[ r ]  watch again";

/// Hands out one frame per refresh tick of the driver loop.
#[derive(Default)]
pub struct RefreshFrames {
    next: u64,
    pending: Option<FrameHandle>,
}

impl RefreshFrames {
    fn take(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for RefreshFrames {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// Takes over the terminal, runs the show until the user quits, and always
/// hands the terminal back.
pub fn run(options: &ShowOptions) -> anyhow::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode().context("enabling raw mode")?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))
        .context("entering the alternate screen")?;

    let result = show_loop(&mut stdout, options);

    let restored = execute!(stdout, ResetColor, Show, LeaveAlternateScreen)
        .and_then(|()| terminal::disable_raw_mode());
    result?;
    restored.context("restoring the terminal")?;
    Ok(())
}

fn show_loop(stdout: &mut BufWriter<Stdout>, options: &ShowOptions) -> anyhow::Result<()> {
    let (mut cols, mut rows) = terminal::size().context("reading terminal size")?;
    let mut canvas = RasterCanvas::new(cols as usize, rows as usize, CANVAS_SCALE);

    let rng = options.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let session = AnimationSession::new(RefreshFrames::default(), rng, audio::open_cue(options.muted));
    let mut show = PhaseController::new(session);
    show.set_viewport(canvas.size().ok());

    if options.autostart {
        show.start();
    }

    let started = Instant::now();
    let elapsed_ms = || started.elapsed().as_millis() as u64;
    let mut next_frame_ms = 0;

    loop {
        let now = elapsed_ms();
        let deadline = show.next_due_ms().map_or(next_frame_ms, |due| due.min(next_frame_ms));
        let wait = Duration::from_millis(deadline.saturating_sub(now));

        if event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        show.start();
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => show.reset(),
                    _ => {}
                },
                Event::Resize(new_cols, new_rows) => {
                    cols = new_cols;
                    rows = new_rows;
                    canvas.resize(cols as usize, rows as usize);
                    show.set_viewport(canvas.size().ok());
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        let now = elapsed_ms();
        show.advance(now);

        if now >= next_frame_ms {
            if let Some(handle) = show.session_mut().frames_mut().take() {
                show.on_frame(handle, &mut canvas);
            }
            canvas.present(stdout)?;
            draw_overlay(stdout, show.phase(), &options.headline, cols, rows)?;
            stdout.flush()?;
            next_frame_ms = now + FRAME_MS;
        }
    }

    show.shutdown();
    Ok(())
}

fn draw_overlay(
    out: &mut impl Write,
    phase: Phase,
    headline: &str,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let mid = rows / 2;
    match phase {
        Phase::Idle => {
            centered(out, IDLE_PROMPT, mid, cols, Color::White)?;
            centered(out, IDLE_HINT, mid + 2, cols, Color::DarkGrey)?;
        }
        Phase::Revealed => {
            let top = mid.saturating_sub(3);
            centered(out, headline, top, cols, Color::White)?;
            for (i, line) in MESSAGE_LINES.iter().enumerate() {
                centered(out, line, top + 2 + i as u16, cols, Color::Grey)?;
            }
            centered(out, REPLAY_HINT, top + 5, cols, Color::DarkGrey)?;
        }
        Phase::Running => {}
    }
    Ok(())
}

fn centered(out: &mut impl Write, text: &str, row: u16, cols: u16, color: Color) -> std::io::Result<()> {
    let width = text.chars().count() as u16;
    if width > cols {
        return Ok(());
    }
    queue!(
        out,
        MoveTo((cols - width) / 2, row),
        SetBackgroundColor(Color::Black),
        SetForegroundColor(color),
        Print(text),
        ResetColor
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_frames_cancel_only_the_pending_handle() {
        let mut frames = RefreshFrames::default();
        let first = frames.request_frame();
        let second = frames.request_frame();
        frames.cancel_frame(first);
        assert_eq!(frames.take(), Some(second));
        assert_eq!(frames.take(), None);
    }

    #[test]
    fn overlay_prints_only_outside_running() {
        let mut out = Vec::new();
        draw_overlay(&mut out, Phase::Running, "hi", 80, 24).unwrap();
        assert!(out.is_empty());

        draw_overlay(&mut out, Phase::Revealed, "I love you", 80, 24).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("I love you"));
        assert!(text.contains(MESSAGE_LINES[0]));
        assert!(text.contains(REPLAY_HINT));
    }

    #[test]
    fn text_wider_than_the_terminal_is_skipped() {
        let mut out = Vec::new();
        centered(&mut out, IDLE_PROMPT, 0, 5, Color::White).unwrap();
        assert!(out.is_empty());
    }
}
