use crate::input::InputEvent;
use crate::player::{DisplayMode, Transport, VideoPlayer};
use egui::{vec2, Button, RichText, Slider, Ui};

/// Previous/Next buttons and the label of the current entry.
pub struct NavigationBar;

impl NavigationBar {
    /// Draw the bar. A click is returned as an event for the input dispatcher
    /// rather than acted on here.
    pub fn show(ui: &mut Ui, can_previous: bool, can_next: bool, label: &str) -> Option<InputEvent> {
        let mut clicked = None;

        ui.horizontal(|ui| {
            let button_size = vec2(100.0, 30.0);

            if ui
                .add_enabled(can_previous, Button::new("Previous").min_size(button_size))
                .clicked()
            {
                clicked = Some(InputEvent::PreviousButton);
            }

            if ui
                .add_enabled(can_next, Button::new("Next").min_size(button_size))
                .clicked()
            {
                clicked = Some(InputEvent::NextButton);
            }

            ui.add_space(10.0);
            ui.label(RichText::new(label).strong().size(14.0));
        });

        clicked
    }
}

/// Controls for the active player.
///
/// Play/pause and seeking come back as [`InputEvent`]s so they take the
/// same path as their shortcuts. Volume and display mode only affect the
/// view and are applied to the player in place.
pub struct TransportBar;

impl TransportBar {
    pub fn show(ui: &mut Ui, player: &mut VideoPlayer) -> Option<InputEvent> {
        ui.horizontal(|ui| {
            let toggled = play_pause_button(ui, player.is_playing());
            ui.separator();
            let sought = seek_bar(ui, player.position(), player.duration());
            ui.separator();
            volume_slider(ui, player);
            ui.separator();
            display_mode_button(ui, player);
            toggled.or(sought)
        })
        .inner
    }
}

fn play_pause_button(ui: &mut Ui, playing: bool) -> Option<InputEvent> {
    let (icon, hint) = if playing {
        ("⏸", "Pause (Space)")
    } else {
        ("▶", "Play (Space)")
    };
    ui.button(icon)
        .on_hover_text(hint)
        .clicked()
        .then_some(InputEvent::PlayPauseButton)
}

/// The handle follows the pointer while dragged and seeks on release.
fn seek_bar(ui: &mut Ui, position: f64, duration: f64) -> Option<InputEvent> {
    let drag_id = ui.id().with("seek_drag");
    let mut value = ui
        .memory(|mem| mem.data.get_temp::<f64>(drag_id))
        .unwrap_or(position);

    ui.label(format_time(value));
    let response = ui.add(
        Slider::new(&mut value, 0.0..=duration.max(0.0))
            .show_value(false)
            .trailing_fill(true),
    );
    ui.label(format_time(duration));

    if response.drag_stopped() || response.clicked() {
        ui.memory_mut(|mem| mem.data.remove::<f64>(drag_id));
        Some(InputEvent::SeekBar(value))
    } else {
        if response.dragged() {
            ui.memory_mut(|mem| mem.data.insert_temp(drag_id, value));
        }
        None
    }
}

fn volume_slider(ui: &mut Ui, player: &mut VideoPlayer) {
    ui.label("🔊");
    let mut volume = player.volume();
    let slider = Slider::new(&mut volume, 0.0..=1.0).show_value(false);
    if ui.add(slider).changed() {
        player.set_volume(volume);
    }
}

fn display_mode_button(ui: &mut Ui, player: &mut VideoPlayer) {
    let icon = match player.display_mode() {
        DisplayMode::FitToWindow => "⛶",
        DisplayMode::NativeSize => "⊞",
    };
    if ui
        .button(icon)
        .on_hover_text("Fit to window or native size (double-click video)")
        .clicked()
    {
        player.toggle_display_mode();
    }
}

/// `mm:ss`, or `hh:mm:ss` past the hour. Negative input shows as zero.
pub fn format_time(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
