use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::{Duration, Instant};

use eframe::egui;
use tracing::{info, warn};

use crate::controller::SessionConfig;
use crate::deck::{Deck, DeckSlide, Panel};
use crate::head::{DisplayId, Head, RoomId, SlideId, ViewerId};
use crate::host::PresentationHost;
use crate::input::{SwipeTracker, intent_for, keyboard};
use crate::intent::NavigationIntent;
use crate::store::{StoreLocation, ViewerMeta};
use crate::surface::PresentationSurface;
use crate::theme::Theme;

const TOAST_DURATION: f32 = 3.0;
const TOAST_FADE_START: f32 = 2.5;
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const GRID_GAP: f32 = 24.0;

/// Everything the command line and config decide about a presenting session.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Room given on the command line; wins over the deck's `room`.
    pub room: Option<RoomId>,
    /// Room used when neither the command line nor the deck names one.
    pub fallback_room: RoomId,
    pub viewer: ViewerId,
    pub meta: ViewerMeta,
    pub store: StoreLocation,
    pub speaker: bool,
    pub slide: Option<SlideId>,
    pub display: Option<DisplayId>,
    pub windowed: bool,
    pub theme: Option<String>,
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        if elapsed < TOAST_FADE_START {
            1.0
        } else if elapsed < TOAST_DURATION {
            1.0 - (elapsed - TOAST_FADE_START) / (TOAST_DURATION - TOAST_FADE_START)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= TOAST_DURATION
    }
}

/// Window-level actions that are not navigation.
enum AppAction {
    Quit,
    CloneWindow,
    ToggleTheme,
    ToggleHelp,
}

struct ShowApp {
    host: PresentationHost<Deck>,
    title: String,
    room: RoomId,
    theme: Theme,
    toast: Option<Toast>,
    show_help: bool,
    swipe: SwipeTracker,
    surface_width: f32,
    clones: Vec<Child>,
}

impl ShowApp {
    fn new(host: PresentationHost<Deck>, title: String, room: RoomId, theme: Theme) -> Self {
        Self {
            host,
            title,
            room,
            theme,
            toast: None,
            show_help: false,
            swipe: SwipeTracker::new(),
            surface_width: 0.0,
            clones: Vec::new(),
        }
    }

    /// Start another window with the same arguments.
    fn clone_window(&mut self) {
        let args: Vec<OsString> = std::env::args_os().skip(1).collect();
        let spawned = std::env::current_exe().and_then(|exe| Command::new(exe).args(&args).spawn());
        match spawned {
            Ok(child) => {
                info!(pid = child.id(), "cloned window");
                self.clones.push(child);
                self.toast = Some(Toast::new("Window cloned"));
            }
            Err(e) => {
                warn!("could not clone window: {e}");
                self.toast = Some(Toast::new(format!("Could not clone window: {e}")));
            }
        }
    }

    fn collect_input(&mut self, ctx: &egui::Context) -> (Vec<NavigationIntent>, Vec<AppAction>) {
        let mut intents = Vec::new();
        let mut actions = Vec::new();
        let width = self.surface_width;

        ctx.input(|i| {
            for event in &i.events {
                let egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    modifiers,
                    ..
                } = event
                else {
                    continue;
                };
                if let Some(intent) = intent_for(*key, *modifiers) {
                    intents.push(intent);
                    continue;
                }
                if !modifiers.is_none() {
                    continue;
                }
                match key {
                    egui::Key::Q => actions.push(AppAction::Quit),
                    egui::Key::C => actions.push(AppAction::CloneWindow),
                    egui::Key::D => actions.push(AppAction::ToggleTheme),
                    egui::Key::H => actions.push(AppAction::ToggleHelp),
                    _ => {}
                }
            }

            let touches = i.multi_touch().map_or(1, |touch| touch.num_touches);
            if i.pointer.primary_pressed() {
                if let Some(pos) = i.pointer.interact_pos() {
                    self.swipe.pointer_down(pos.x, touches);
                }
            } else if i.pointer.primary_down() {
                if let Some(pos) = i.pointer.interact_pos() {
                    intents.extend(self.swipe.pointer_move(pos.x, width));
                }
            }
            if i.pointer.primary_released() {
                self.swipe.pointer_up();
            }
        });

        (intents, actions)
    }

    fn apply_action(&mut self, ctx: &egui::Context, action: AppAction) {
        match action {
            AppAction::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            AppAction::CloneWindow => self.clone_window(),
            AppAction::ToggleTheme => {
                self.theme = self.theme.toggled();
                self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name())));
            }
            AppAction::ToggleHelp => self.show_help = !self.show_help,
        }
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) -> Option<NavigationIntent> {
        let mut intent = None;
        let size = self.theme.status_size;
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(&self.title)
                    .size(size)
                    .strong()
                    .color(self.theme.heading),
            );
            ui.label(
                egui::RichText::new(format!("room {}", self.room))
                    .size(size)
                    .color(self.theme.muted),
            );
            if self.host.is_speaker() {
                ui.label(
                    egui::RichText::new("SPEAKER")
                        .size(size)
                        .strong()
                        .color(self.theme.speaker_badge),
                );
            }
            if self.host.is_detached() {
                ui.label(
                    egui::RichText::new("DETACHED")
                        .size(size)
                        .strong()
                        .color(self.theme.detached_badge),
                );
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                // Right-to-left, so iterate displays in reverse to keep declaration order
                for display in self.host.surface().enumerate_displays().into_iter().rev() {
                    let selected = self.host.display() == Some(&display);
                    let button = egui::Button::new(egui::RichText::new(display.as_str()).size(size))
                        .selected(selected);
                    if ui.add(button).clicked() {
                        intent = Some(NavigationIntent::SelectDisplay(display));
                    }
                }
                ui.label(egui::RichText::new("display").size(size).color(self.theme.muted));
            });
        });
        intent
    }

    fn draw_slide(&self, ui: &egui::Ui, slide: &DeckSlide, rect: egui::Rect, scale: f32) {
        let panels: Vec<&Panel> = slide.visible_panels().collect();
        if panels.is_empty() {
            return;
        }
        let width = rect.width() / panels.len() as f32;
        for (index, panel) in panels.iter().enumerate() {
            let cell = egui::Rect::from_min_size(
                egui::pos2(rect.left() + width * index as f32, rect.top()),
                egui::vec2(width, rect.height()),
            );
            draw_panel(ui, panel, &self.theme, cell.shrink(32.0 * scale), scale);
        }
    }

    fn draw_overview(&self, ui: &egui::Ui, rect: egui::Rect) -> Option<NavigationIntent> {
        let slides: Vec<&DeckSlide> = self.host.surface().visible_slides().collect();
        if slides.is_empty() {
            return None;
        }
        let cols = (slides.len() as f32).sqrt().ceil().max(1.0) as usize;
        let rows = slides.len().div_ceil(cols);
        let gap = GRID_GAP;
        let cell_w = (rect.width() - gap * (cols as f32 + 1.0)) / cols as f32;
        let cell_h = ((rect.height() - gap * (rows as f32 + 1.0)) / rows as f32).min(cell_w * 9.0 / 16.0);
        let scale = (cell_w / 1280.0).max(0.1);

        let mut intent = None;
        for (index, slide) in slides.iter().enumerate() {
            let col = index % cols;
            let row = index / cols;
            let cell = egui::Rect::from_min_size(
                egui::pos2(
                    rect.left() + gap + col as f32 * (cell_w + gap),
                    rect.top() + gap + row as f32 * (cell_h + gap),
                ),
                egui::vec2(cell_w, cell_h),
            );
            let response = ui.interact(
                cell,
                ui.id().with(("slide", slide.id.as_str())),
                egui::Sense::click(),
            );
            let border = if response.hovered() {
                self.theme.accent
            } else {
                self.theme.muted
            };
            ui.painter()
                .rect_filled(cell, 8.0, self.theme.panel_background);
            ui.painter().rect_stroke(
                cell,
                8.0,
                egui::Stroke::new(1.5, border),
                egui::StrokeKind::Inside,
            );
            self.draw_slide(ui, slide, cell, scale);

            let label = ui.painter().layout_no_wrap(
                slide.id.to_string(),
                egui::FontId::proportional(12.0),
                self.theme.muted,
            );
            ui.painter().galley(
                egui::pos2(cell.left() + 6.0, cell.bottom() - label.rect.height() - 4.0),
                label,
                self.theme.muted,
            );

            if response.clicked() {
                intent = Some(self.clicked_panel(slide, cell, response.interact_pointer_pos()));
            }
        }
        intent
    }

    /// A click inside a thumbnail picks the panel under the pointer when the
    /// panel is bound to a display, otherwise the whole slide.
    fn clicked_panel(
        &self,
        slide: &DeckSlide,
        cell: egui::Rect,
        pointer: Option<egui::Pos2>,
    ) -> NavigationIntent {
        let panels: Vec<&Panel> = slide.visible_panels().collect();
        let picked = pointer.and_then(|pos| {
            let width = cell.width() / panels.len().max(1) as f32;
            let index = ((pos.x - cell.left()) / width).floor().max(0.0) as usize;
            panels.get(index).and_then(|p| p.display.clone())
        });
        match picked {
            Some(display) => NavigationIntent::SelectPanel {
                slide: slide.id.clone(),
                display,
            },
            None => NavigationIntent::SelectSlide(slide.id.clone()),
        }
    }

    fn draw_toast(&self, ui: &egui::Ui, ctx: &egui::Context, rect: egui::Rect) {
        let Some(toast) = &self.toast else { return };
        let opacity = toast.opacity();
        if opacity <= 0.0 {
            return;
        }
        let color = Theme::with_opacity(self.theme.foreground, opacity * 0.9);
        let background = Theme::with_opacity(self.theme.panel_background, opacity * 0.9);
        let galley = ui.painter().layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(18.0),
            color,
        );
        let padding = 14.0;
        let toast_rect = egui::Rect::from_min_size(
            egui::pos2(
                rect.center().x - galley.rect.width() / 2.0 - padding,
                rect.bottom() - 72.0,
            ),
            egui::vec2(
                galley.rect.width() + padding * 2.0,
                galley.rect.height() + padding * 2.0,
            ),
        );
        ui.painter().rect_filled(toast_rect, 8.0, background);
        ui.painter().galley(
            egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding),
            galley,
            color,
        );
        ctx.request_repaint();
    }
}

impl eframe::App for ShowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.host.pump() {
            ctx.request_repaint();
        }

        let (intents, actions) = self.collect_input(ctx);
        for intent in intents {
            self.host.dispatch(intent);
        }
        for action in actions {
            self.apply_action(ctx, action);
        }

        if let Some(warning) = self.host.take_warnings().pop() {
            self.toast = Some(Toast::new(format!("Live head unavailable: {warning}")));
        }
        if self.host.take_fullscreen_request() {
            let fullscreen = ctx.input(|i| i.viewport().fullscreen.unwrap_or(false));
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
        }
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }

        let status_intent = egui::TopBottomPanel::top("status")
            .frame(
                egui::Frame::new()
                    .fill(self.theme.status_background)
                    .inner_margin(6.0),
            )
            .show(ctx, |ui| self.draw_status_bar(ui))
            .inner;

        let bg = self.theme.background;
        let central_intent = egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);
                self.surface_width = rect.width();

                let intent = match self.host.slide() {
                    Some(id) => {
                        if let Some(slide) = self.host.surface().slide(id) {
                            let scale = (rect.width() / 1280.0).min(rect.height() / 720.0);
                            self.draw_slide(ui, slide, rect, scale);
                        }
                        None
                    }
                    None => self.draw_overview(ui, rect),
                };

                self.draw_toast(ui, ctx, rect);
                if self.show_help {
                    draw_help(ui, &self.theme, rect);
                }
                intent
            })
            .inner;

        for intent in status_intent.into_iter().chain(central_intent) {
            self.host.dispatch(intent);
        }

        ctx.request_repaint_after(POLL_INTERVAL);
    }
}

impl Drop for ShowApp {
    fn drop(&mut self) {
        for child in &mut self.clones {
            if let Err(e) = child.kill() {
                warn!(pid = child.id(), "could not close cloned window: {e}");
            }
            let _ = child.wait();
        }
    }
}

/// Render a panel's markdown-ish text: `#` lines as headings, the rest as body.
fn draw_panel(ui: &egui::Ui, panel: &Panel, theme: &Theme, rect: egui::Rect, scale: f32) {
    let mut y = rect.top();
    for line in panel.content.lines() {
        let trimmed = line.trim_start();
        let level = trimmed.chars().take_while(|c| *c == '#').count();
        let (text, color) = if level > 0 {
            (trimmed[level..].trim(), theme.heading)
        } else {
            (line, theme.foreground)
        };
        let size = theme.text_size(level) * scale;
        if text.is_empty() {
            y += size * 0.6;
            continue;
        }
        let galley = ui.painter().layout(
            text.to_string(),
            egui::FontId::proportional(size),
            color,
            rect.width(),
        );
        let height = galley.rect.height();
        if y + height > rect.bottom() {
            break;
        }
        ui.painter().galley(egui::pos2(rect.left(), y), galley, color);
        y += height + size * 0.3;
    }
}

fn draw_help(ui: &egui::Ui, theme: &Theme, rect: egui::Rect) {
    let background = Theme::with_opacity(theme.panel_background, 0.95);
    let text_color = theme.foreground;
    let key_color = theme.accent;

    let padding = 24.0;
    let line_height = 28.0;
    let height = keyboard::HELP.len() as f32 * line_height + padding * 2.0 + 36.0;
    let help_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(420.0, height));
    ui.painter().rect_filled(help_rect, 12.0, background);

    let title = ui.painter().layout_no_wrap(
        "Keyboard".to_string(),
        egui::FontId::proportional(20.0),
        theme.heading,
    );
    ui.painter().galley(
        egui::pos2(help_rect.left() + padding, help_rect.top() + padding),
        title,
        theme.heading,
    );

    let mut y = help_rect.top() + padding + 36.0;
    for (key, description) in keyboard::HELP {
        let key_galley = ui.painter().layout_no_wrap(
            key.to_string(),
            egui::FontId::monospace(15.0),
            key_color,
        );
        ui.painter()
            .galley(egui::pos2(help_rect.left() + padding, y), key_galley, key_color);
        let desc_galley = ui.painter().layout_no_wrap(
            description.to_string(),
            egui::FontId::proportional(15.0),
            text_color,
        );
        ui.painter().galley(
            egui::pos2(help_rect.left() + padding + 150.0, y),
            desc_galley,
            text_color,
        );
        y += line_height;
    }
}

pub fn run(file: PathBuf, options: LaunchOptions) -> anyhow::Result<()> {
    let deck = Deck::load(&file)?;
    if deck.slides().is_empty() {
        anyhow::bail!("No slides found in {}", file.display());
    }
    if let Some(slide) = &options.slide {
        if !deck.contains_slide(slide) {
            anyhow::bail!("Unknown slide id: {slide}");
        }
    }

    let title = deck.meta.title.clone().unwrap_or_else(|| {
        format!(
            "diashow: {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        )
    });
    let room = options
        .room
        .or_else(|| deck.meta.room.clone())
        .unwrap_or(options.fallback_room);
    let theme_name = deck
        .meta
        .theme
        .clone()
        .or(options.theme)
        .unwrap_or_else(|| "light".to_string());
    let start = Head::new(
        options.slide.or_else(|| deck.meta.start_slide.clone()),
        options.display.or_else(|| deck.meta.start_display.clone()),
    );

    let store = options.store.open()?;
    let mut session = SessionConfig::new(room.clone(), options.viewer).starting_at(start);
    session.meta = options.meta;
    session.speaker = options.speaker;
    let host = PresentationHost::mount(deck, session, store);

    let viewport = if options.windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };
    let native = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let theme = Theme::from_name(&theme_name);
    let app = ShowApp::new(host, title.clone(), room, theme);
    eframe::run_native(&title, native, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("{e}"))
}
