use anyhow::Result;
use crossterm::event::KeyCode;
use docsync_config::Config;
use docsync_engine::LayoutBlock;
use docsync_engine::confidence::{LowConfidenceBanner, low_confidence_banner};
use docsync_engine::io::{self, LoadedDocument};
use docsync_engine::sync::{ScrollPanel, SyncController, SyncMode, SyncOutcome};
use docsync_engine::viewport::{Viewport, ViewportCuller};
use std::time::Instant;

use crate::panels::{PX_PER_ROW, TermEditorPanel, TermImagePanel};

const ZOOM_STEP: f64 = 25.0;
const MIN_ZOOM: f64 = 25.0;
const MAX_ZOOM: f64 = 400.0;
/// Fallback page size when `blocks.json` has no entry for a page.
const DEFAULT_PAGE_SIZE: (f64, f64) = (850.0, 1100.0);

/// Zoom percentage within the range the `+`/`-` keys allow. NaN falls back
/// to 100%.
fn clamp_zoom(zoom_percent: f64) -> f64 {
    if zoom_percent.is_nan() {
        100.0
    } else {
        zoom_percent.clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Image,
    Editor,
}

pub struct App {
    pub document: LoadedDocument,
    pub controller: SyncController<TermImagePanel, TermEditorPanel>,
    pub culler: ViewportCuller,
    pub page_blocks: Vec<LayoutBlock>,
    pub focus: Focus,
    pub cursor_line: usize,
    pub zoom_percent: f64,
    pub banner: Option<LowConfidenceBanner>,
    pub status: String,
}

impl App {
    pub fn new(document: LoadedDocument, config: &Config) -> Result<Self> {
        let mut controller = SyncController::new(config.sync.options());
        controller.mount_image(TermImagePanel::default())?;
        let mut editor = TermEditorPanel::default();
        editor.set_content(&document.content);
        controller.mount_editor(editor)?;
        controller.load_document(document.layout.clone(), document.content.text())?;
        let zoom_percent = clamp_zoom(config.viewport.zoom_percent);
        controller.set_zoom(zoom_percent)?;

        let mut culler = ViewportCuller::new(config.viewport.culler_options());
        culler.set_zoom(zoom_percent);

        let page_blocks = document.layout.page_blocks(controller.page());
        let banner = low_confidence_banner(&document.layout.blocks);
        let status = if document.generated {
            "Content generated from layout (w to save)".to_string()
        } else {
            format!("Loaded {}", document.dir.display())
        };

        Ok(Self {
            document,
            controller,
            culler,
            page_blocks,
            focus: Focus::Editor,
            cursor_line: 0,
            zoom_percent,
            banner,
            status,
        })
    }

    pub fn page_size(&self) -> (f64, f64) {
        self.document
            .layout
            .page_size(self.controller.page())
            .map(|p| (f64::from(p.width), f64::from(p.height)))
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Fit both panels to the space the last frame gave them.
    pub fn resize(&mut self, image_rows: u16, editor_rows: u16) {
        let (width, height) = self.page_size();
        let scale = self.controller.scale();
        if let Some(image) = self.controller.image_panel_mut() {
            image.resize(width, height, scale, image_rows);
        }
        if let Some(editor) = self.controller.editor_panel_mut() {
            editor.resize(editor_rows);
        }
        self.update_viewport();
    }

    /// Indices into `page_blocks` worth drawing this frame.
    pub fn visible_block_indices(&mut self) -> Vec<usize> {
        self.culler.frame(&self.page_blocks).to_vec()
    }

    fn update_viewport(&mut self) {
        if let Some(image) = self.controller.image_panel() {
            let metrics = image.metrics();
            self.culler.set_viewport(Viewport::from_scroll(
                metrics.scroll_top,
                0.0,
                image.width_px(),
                metrics.client_height,
            ));
        }
    }

    /// Handle one key press. Returns `false` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode, now: Instant) -> Result<bool> {
        match code {
            KeyCode::Char('q') => return Ok(false),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Image => Focus::Editor,
                    Focus::Editor => Focus::Image,
                };
            }
            KeyCode::Down | KeyCode::Char('j') => self.step(1, now)?,
            KeyCode::Up | KeyCode::Char('k') => self.step(-1, now)?,
            KeyCode::PageDown => self.page_scroll(1.0, now)?,
            KeyCode::PageUp => self.page_scroll(-1.0, now)?,
            KeyCode::Char('n') => self.hover_step(1)?,
            KeyCode::Char('p') => self.hover_step(-1)?,
            KeyCode::Enter => self.locate(now)?,
            KeyCode::Char('s') => {
                let enabled = self.controller.toggle_sync()?;
                self.status = format!("Sync {}", if enabled { "on" } else { "off" });
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(ZOOM_STEP)?,
            KeyCode::Char('-') => self.zoom(-ZOOM_STEP)?,
            KeyCode::Char(']') => self.change_page(1)?,
            KeyCode::Char('[') => self.change_page(-1)?,
            KeyCode::Char('w') => self.save()?,
            _ => {}
        }
        Ok(true)
    }

    pub fn on_sync(&mut self, outcome: &SyncOutcome) {
        self.status = match (&outcome.mode, &outcome.block_id) {
            (SyncMode::Anchor, Some(id)) => format!("Synced {:?} -> block {id}", outcome.source),
            _ => format!("Synced {:?} by scroll position", outcome.source),
        };
        self.update_viewport();
    }

    fn step(&mut self, delta: i64, now: Instant) -> Result<()> {
        match self.focus {
            Focus::Image => {
                if let Some(image) = self.controller.image_panel_mut() {
                    image.scroll_by(delta as f64 * PX_PER_ROW * 3.0);
                }
                self.update_viewport();
                self.controller.on_image_scroll(now)?;
            }
            Focus::Editor => {
                let Some(editor) = self.controller.editor_panel_mut() else {
                    return Ok(());
                };
                let last = editor.lines().len().saturating_sub(1);
                self.cursor_line = self.cursor_line.saturating_add_signed(delta as isize).min(last);
                editor.reveal_line(self.cursor_line);
                let offset = self.document.content.offset_of_line(self.cursor_line);
                self.controller.on_editor_cursor(offset, now)?;
            }
        }
        Ok(())
    }

    fn page_scroll(&mut self, direction: f64, now: Instant) -> Result<()> {
        match self.focus {
            Focus::Image => {
                if let Some(image) = self.controller.image_panel_mut() {
                    let page = image.metrics().client_height;
                    image.scroll_by(direction * page);
                }
                self.update_viewport();
                self.controller.on_image_scroll(now)?;
            }
            Focus::Editor => {
                if let Some(editor) = self.controller.editor_panel_mut() {
                    let page = editor.metrics().client_height;
                    editor.scroll_by(direction * page);
                    self.cursor_line = editor.first_visible_line();
                }
                self.controller.on_editor_scroll(now)?;
            }
        }
        Ok(())
    }

    fn hover_step(&mut self, delta: isize) -> Result<()> {
        if self.page_blocks.is_empty() {
            return Ok(());
        }
        let mut ordered: Vec<&LayoutBlock> = self.page_blocks.iter().collect();
        ordered.sort_by_key(|b| (b.bbox.y, b.bbox.x));
        let current = self
            .controller
            .hovered_block_id()
            .and_then(|id| ordered.iter().position(|b| b.id == id));
        let next = match current {
            Some(i) => (i as isize + delta).rem_euclid(ordered.len() as isize) as usize,
            None if delta < 0 => ordered.len() - 1,
            None => 0,
        };
        let id = ordered[next].id.clone();
        self.controller.hover_block(Some(&id))?;
        self.status = format!("Block {id} (Enter to show in editor)");
        Ok(())
    }

    /// Jump the other panel to the block under focus.
    fn locate(&mut self, now: Instant) -> Result<()> {
        match self.focus {
            Focus::Image => {
                let Some(id) = self.controller.hovered_block_id().map(str::to_string) else {
                    self.status = "Select a block with n/p first".to_string();
                    return Ok(());
                };
                if self.controller.sync_to_anchor(&id, now)? {
                    if let Some(position) = self.controller.index().position_of(&id) {
                        self.cursor_line = self.document.content.line_of_offset(position);
                    }
                    self.status = format!("Showing block {id} in editor");
                } else {
                    self.status = format!("Block {id} has no anchor in the content");
                }
            }
            Focus::Editor => {
                let offset = self.document.content.offset_of_line(self.cursor_line);
                let Some(id) = self
                    .controller
                    .index()
                    .nearest_at_or_before(offset)
                    .map(|a| a.block_id.clone())
                else {
                    self.status = "No block before the cursor".to_string();
                    return Ok(());
                };
                if self.controller.sync_to_block(&id, now)? {
                    self.update_viewport();
                    self.status = format!("Showing block {id} on the page");
                } else {
                    self.status = format!("Block {id} is not on page {}", self.controller.page());
                }
            }
        }
        Ok(())
    }

    fn zoom(&mut self, delta: f64) -> Result<()> {
        self.zoom_percent = clamp_zoom(self.zoom_percent + delta);
        self.controller.set_zoom(self.zoom_percent)?;
        self.culler.set_zoom(self.zoom_percent);
        self.status = format!("Zoom {:.0}%", self.zoom_percent);
        Ok(())
    }

    fn change_page(&mut self, delta: isize) -> Result<()> {
        let pages = self.document.layout.page_numbers();
        let Some(current) = pages.iter().position(|&p| p == self.controller.page()) else {
            return Ok(());
        };
        let target = current.saturating_add_signed(delta).min(pages.len().saturating_sub(1));
        let page = pages[target];
        if page == self.controller.page() {
            return Ok(());
        }
        self.controller.set_page(page)?;
        self.controller.hover_block(None)?;
        if let Some(image) = self.controller.image_panel_mut() {
            image.reset();
        }
        self.page_blocks = self.document.layout.page_blocks(page);
        self.culler.invalidate();
        self.update_viewport();
        self.status = format!("Page {page} of {}", pages.len());
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        io::write_content(&self.document.dir, self.document.content.text())?;
        self.document.generated = false;
        self.status = format!("Saved {}", self.document.dir.join(io::CONTENT_FILE).display());
        log::info!("saved content for {}", self.document.dir.display());
        Ok(())
    }
}
