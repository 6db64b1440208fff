use egui::{CentralPanel, Color32, ScrollArea, TopBottomPanel, Vec2, ViewportCommand};

use crate::input::{self, InputEvent, InputResult};
use crate::player::{DisplayMode, VideoLoader};
use crate::playlist::Playlist;
use crate::session::PlaylistSession;
use crate::ui::controls::{NavigationBar, TransportBar};

/// Window owning the playback session.
pub struct PlaylistApp {
    session: PlaylistSession<VideoLoader>,
    /// Last title sent to the window, to avoid resending it every frame
    shown_title: Option<String>,
}

impl PlaylistApp {
    /// Called from the eframe creation callback, so playback of the first
    /// entry starts once the window exists.
    pub fn new(cc: &eframe::CreationContext<'_>, playlist: Playlist) -> Self {
        let loader = VideoLoader::new(cc.egui_ctx.clone());
        Self {
            session: PlaylistSession::new(playlist, loader),
            shown_title: None,
        }
    }

    fn sync_title(&mut self, ctx: &egui::Context) {
        let title = self.session.title();
        if self.shown_title.as_deref() != Some(title.as_str()) {
            ctx.send_viewport_cmd(ViewportCommand::Title(title.clone()));
            self.shown_title = Some(title);
        }
    }

    fn show_video(&mut self, ui: &mut egui::Ui) {
        if self.session.player().is_none() {
            let message = self.session.load_error().unwrap_or("No video loaded");
            ui.centered_and_justified(|ui| {
                ui.colored_label(Color32::RED, message);
            });
            return;
        }
        let Some(player) = self.session.player_mut() else {
            return;
        };

        player.update(ui.ctx());

        let texture_id = player.texture().id();
        let video_size = player.video_size();
        let mut should_toggle = false;

        match player.display_mode() {
            DisplayMode::FitToWindow => {
                let display_size = fit_size(video_size, ui.available_size());
                ui.centered_and_justified(|ui| {
                    if ui.image((texture_id, display_size)).double_clicked() {
                        should_toggle = true;
                    }
                });
            }
            DisplayMode::NativeSize => {
                ScrollArea::both().show(ui, |ui| {
                    let native = Vec2::new(video_size.0 as f32, video_size.1 as f32);
                    if ui.image((texture_id, native)).double_clicked() {
                        should_toggle = true;
                    }
                });
            }
        }

        if should_toggle {
            player.toggle_display_mode();
        }
    }
}

/// Largest size with the video's aspect ratio that fits in `available`
fn fit_size(video_size: (u32, u32), available: Vec2) -> Vec2 {
    if video_size.0 == 0 || video_size.1 == 0 {
        return available;
    }
    let aspect = video_size.0 as f32 / video_size.1 as f32;
    let available_aspect = available.x / available.y;

    if aspect > available_aspect {
        Vec2::new(available.x, available.x / aspect)
    } else {
        Vec2::new(available.y * aspect, available.y)
    }
}

impl eframe::App for PlaylistApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events: Vec<InputEvent> =
            ctx.input(|i| i.events.iter().filter_map(input::from_egui).collect());

        TopBottomPanel::bottom("controls").show(ctx, |ui| {
            if let Some(player) = self.session.player_mut() {
                events.extend(TransportBar::show(ui, player));
                ui.separator();
            }
            let clicked = NavigationBar::show(
                ui,
                self.session.can_previous(),
                self.session.can_next(),
                self.session.label(),
            );
            events.extend(clicked);
        });

        if input::dispatch(&mut self.session, events) == InputResult::Quit {
            ctx.send_viewport_cmd(ViewportCommand::Close);
            return;
        }

        self.sync_title(ctx);

        CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| self.show_video(ui));

        if self.session.player().is_some_and(|p| p.is_playing()) {
            ctx.request_repaint();
        }
    }
}
