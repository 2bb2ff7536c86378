mod app;
mod panels;

use anyhow::{Context, Result};
use app::{App, Focus};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use docsync_config::Config;
use docsync_engine::anchors::marker_spans;
use docsync_engine::confidence::ConfidenceTier;
use docsync_engine::io::{self, LAYOUT_FILE};
use docsync_engine::sync::ScrollPanel;
use panels::PX_PER_ROW;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
    time::{Duration, Instant},
};

/// Upper bound on how long the loop sleeps with no timer due.
const IDLE_TICK: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    let log_path = init_logging()?;

    // Determine document from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let target = match (args.len(), config.as_ref().and_then(|c| c.documents_path.clone())) {
        (2, _) => PathBuf::from(&args[1]),
        (1, Some(documents_path)) => documents_path,
        (1, None) => {
            eprintln!("Error: No document path provided and no documents_path configured");
            eprintln!("Usage: {} <document-dir>", args[0]);
            eprintln!("Or create a config file at {}", config_path.display());
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [document-dir]", args[0]);
            process::exit(1);
        }
    };

    let document_dir = match resolve_document_dir(&target) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: '{}' is not a usable document: {e:#}", target.display());
            process::exit(1);
        }
    };
    log::info!("opening {}", document_dir.display());

    let document = io::load_document(&document_dir)
        .with_context(|| format!("loading {}", document_dir.display()))?;
    let mut app = App::new(document, &config.unwrap_or_default())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);
    app.controller.teardown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
        println!("Log written to {}", log_path.display());
    }

    Ok(())
}

/// Log to a file so output does not tear the alternate screen.
fn init_logging() -> Result<PathBuf> {
    let log_path = env::temp_dir().join("docsync-cli.log");
    let file = std::fs::File::create(&log_path)
        .with_context(|| format!("creating log file {}", log_path.display()))?;
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(log_path)
}

/// A document directory itself, or the first document found beneath it.
fn resolve_document_dir(path: &Path) -> Result<PathBuf> {
    if path.join(LAYOUT_FILE).is_file() {
        return Ok(path.to_path_buf());
    }
    io::scan_documents(path)?
        .into_iter()
        .next()
        .with_context(|| format!("no {LAYOUT_FILE} found under {}", path.display()))
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = app
            .controller
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .map_or(IDLE_TICK, |wait| wait.min(IDLE_TICK));

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key.code, Instant::now())?
        {
            return Ok(());
        }

        if let Some(outcome) = app.controller.poll(Instant::now())? {
            app.on_sync(&outcome);
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let banner_height = if app.banner.is_some() { 1 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let inner_rows = panes[0].height.saturating_sub(2);
    app.resize(inner_rows, panes[1].height.saturating_sub(2));

    if let Some(banner) = &app.banner {
        let style = Style::default()
            .fg(Color::Black)
            .bg(hex_color(banner.style.border));
        f.render_widget(Paragraph::new(banner.message()).style(style), rows[0]);
    }

    render_image(f, app, panes[0]);
    render_editor(f, app, panes[1]);

    f.render_widget(Paragraph::new(app.status.as_str()), rows[2]);
    let help = Line::from(vec![
        Span::raw("q: Quit | Tab: Switch panel | ↑↓/jk: Scroll | PgUp/PgDn | "),
        Span::raw("n/p: Select block | Enter: Show in other panel | "),
        Span::raw("s: Sync on/off | +/-: Zoom | [ ]: Page | w: Save"),
    ]);
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        rows[3],
    );
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn render_image(f: &mut Frame, app: &mut App, area: Rect) {
    let visible = app.visible_block_indices();
    let scale = app.controller.scale();
    let scroll_top = app
        .controller
        .image_panel()
        .map(|p| p.metrics().scroll_top)
        .unwrap_or(0.0);
    let active = app.controller.active_block_id();
    let hovered = app.controller.hovered_block_id();

    let mut lines = Vec::new();
    for row in 0..area.height.saturating_sub(2) {
        let top = (scroll_top + f64::from(row) * PX_PER_ROW) / scale;
        let bottom = top + PX_PER_ROW / scale;
        let hit = visible
            .iter()
            .filter_map(|&i| app.page_blocks.get(i))
            .find(|b| {
                let y = f64::from(b.bbox.y);
                y < bottom && y + f64::from(b.bbox.height) > top
            });

        let Some(block) = hit else {
            lines.push(Line::from(""));
            continue;
        };
        let tier = ConfidenceTier::from_score(block.confidence);
        let mut style = Style::default().fg(hex_color(tier.style().border));
        if active == Some(block.id.as_str()) {
            style = style.add_modifier(Modifier::BOLD);
        }
        if hovered == Some(block.id.as_str()) {
            style = style.add_modifier(Modifier::REVERSED);
        }

        let starts_here = f64::from(block.bbox.y) >= top;
        let text = if starts_here {
            format!(
                "▌{} {} {:.0}% {}",
                block.block_type.label(),
                block.id,
                block.confidence * 100.0,
                block.text().lines().next().unwrap_or("")
            )
        } else {
            "▌".to_string()
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    let title = format!(
        "Page {} · {:.0}% · {}/{} blocks",
        app.controller.page(),
        app.zoom_percent,
        visible.len(),
        app.page_blocks.len()
    );
    let widget = Paragraph::new(lines).block(pane_block(title, app.focus == Focus::Image));
    f.render_widget(widget, area);
}

fn render_editor(f: &mut Frame, app: &App, area: Rect) {
    let Some(editor) = app.controller.editor_panel() else {
        return;
    };
    let first = editor.first_visible_line();
    let rows = usize::from(area.height.saturating_sub(2));
    let lines: Vec<Line> = editor
        .lines()
        .iter()
        .enumerate()
        .skip(first)
        .take(rows)
        .map(|(n, text)| {
            let mut style = if is_marker_line(text) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            if n == app.cursor_line && app.focus == Focus::Editor {
                style = style.bg(Color::Blue);
            }
            Line::from(Span::styled(text.clone(), style))
        })
        .collect();

    let sync = if app.controller.state().enabled {
        "sync on"
    } else {
        "sync off"
    };
    let generated = if app.document.generated {
        " (unsaved)"
    } else {
        ""
    };
    let title = format!("{}{generated} · {sync}", io::CONTENT_FILE);
    let widget = Paragraph::new(lines).block(pane_block(title, app.focus == Focus::Editor));
    f.render_widget(widget, area);
}

/// Lines holding a decodable anchor marker are dimmed.
fn is_marker_line(text: &str) -> bool {
    !marker_spans(text).is_empty()
}

/// `#rrggbb` to a terminal colour, grey when unparsable.
fn hex_color(hex: &str) -> Color {
    hex.strip_prefix('#')
        .filter(|digits| digits.len() == 6)
        .and_then(|digits| u32::from_str_radix(digits, 16).ok())
        .map(|rgb| Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
        .unwrap_or(Color::Gray)
}
