//! Interaction debug overlay.
//!
//! Turns an [`InteractionDebugSnapshot`] into overlay text, world-space draw
//! primitives for the focus trace, and an egui panel. The presenter only
//! reads snapshots; it never touches the component that produced them.
//! Text is throttled by its own print interval, independent of the scan rate.

use egui::{Color32, Context, Pos2, RichText};
use glam::Vec3;
use glance_gameplay::{InputMode, InteractionDebugSnapshot, QueryResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Unmet messages shown before the preview is truncated.
const MAX_UNMET_PREVIEW: usize = 3;

/// Length of the drawn impact normal.
const NORMAL_LENGTH: f32 = 20.0;

/// Size of the drawn impact point.
const IMPACT_POINT_SIZE: f32 = 12.0;

/// Segments of the drawn sweep sphere.
const SPHERE_SEGMENTS: u32 = 12;

/// Trace line color.
pub const TRACE_COLOR: Color32 = Color32::from_rgb(0, 255, 255);

/// Impact point and normal color.
pub const IMPACT_COLOR: Color32 = Color32::GREEN;

/// Configuration for the interaction debug overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionDebugConfig {
    /// Minimum seconds between text refreshes
    pub print_interval: f32,
    /// Lifetime of draw primitives in seconds
    pub draw_duration: f32,
    /// Emit trace draw primitives
    pub draw_trace: bool,
    /// Font size for overlay text
    pub font_size: f32,
    /// Padding from screen edge
    pub padding: f32,
    /// Width of the overlay panel
    pub panel_width: f32,
    /// Background opacity (0.0-1.0)
    pub background_opacity: f32,
}

impl Default for InteractionDebugConfig {
    fn default() -> Self {
        Self {
            print_interval: 0.15,
            draw_duration: 0.06,
            draw_trace: true,
            font_size: 14.0,
            padding: 10.0,
            panel_width: 360.0,
            background_opacity: 0.7,
        }
    }
}

/// A world-space debug shape with a lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawPrimitive {
    /// Line segment
    Line {
        /// Segment start
        start: Vec3,
        /// Segment end
        end: Vec3,
        /// Line color
        color: Color32,
        /// Seconds to keep it on screen
        duration: f32,
    },
    /// Wire sphere
    Sphere {
        /// Sphere center
        center: Vec3,
        /// Sphere radius
        radius: f32,
        /// Wire segments
        segments: u32,
        /// Wire color
        color: Color32,
        /// Seconds to keep it on screen
        duration: f32,
    },
    /// Screen-sized point
    Point {
        /// Point location
        location: Vec3,
        /// Point size in pixels
        size: f32,
        /// Point color
        color: Color32,
        /// Seconds to keep it on screen
        duration: f32,
    },
}

/// Formats and draws interaction debug snapshots.
#[derive(Debug, Clone)]
pub struct InteractionDebugPresenter {
    config: InteractionDebugConfig,
    enabled: bool,
    last_print_time: Option<f64>,
    text: String,
}

impl Default for InteractionDebugPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionDebugPresenter {
    /// Create a disabled presenter.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(InteractionDebugConfig::default())
    }

    /// Create a disabled presenter with custom config.
    #[must_use]
    pub fn with_config(config: InteractionDebugConfig) -> Self {
        Self {
            config,
            enabled: false,
            last_print_time: None,
            text: String::new(),
        }
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &InteractionDebugConfig {
        &self.config
    }

    /// Whether the overlay is active.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the overlay. Disabling clears the text.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            debug!("Interaction debug overlay {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
        if !enabled {
            self.text.clear();
            self.last_print_time = None;
        }
    }

    /// Last printed overlay text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes one snapshot taken at `now` seconds.
    ///
    /// Returns the draw primitives for this frame. The overlay text is
    /// refreshed at most once per print interval. Returns nothing while
    /// disabled.
    pub fn update(&mut self, snapshot: &InteractionDebugSnapshot, now: f64) -> Vec<DrawPrimitive> {
        if !self.enabled {
            return Vec::new();
        }

        let primitives = self.draw(snapshot);
        self.print(snapshot, now);
        primitives
    }

    /// Trace shapes for a snapshot.
    #[must_use]
    pub fn draw(&self, snapshot: &InteractionDebugSnapshot) -> Vec<DrawPrimitive> {
        let trace = &snapshot.trace;
        if !self.config.draw_trace || !trace.cast {
            return Vec::new();
        }

        let duration = self.config.draw_duration;
        let mut primitives = vec![DrawPrimitive::Line {
            start: trace.start,
            end: trace.end,
            color: TRACE_COLOR,
            duration,
        }];

        if trace.radius > 0.0 {
            primitives.push(DrawPrimitive::Sphere {
                center: trace.end,
                radius: trace.radius,
                segments: SPHERE_SEGMENTS,
                color: TRACE_COLOR,
                duration,
            });
        }

        if trace.hit {
            primitives.push(DrawPrimitive::Point {
                location: trace.impact_point,
                size: IMPACT_POINT_SIZE,
                color: IMPACT_COLOR,
                duration,
            });
            primitives.push(DrawPrimitive::Line {
                start: trace.impact_point,
                end: trace.impact_point + trace.impact_normal * NORMAL_LENGTH,
                color: IMPACT_COLOR,
                duration,
            });
        }

        primitives
    }

    fn print(&mut self, snapshot: &InteractionDebugSnapshot, now: f64) {
        if let Some(last) = self.last_print_time {
            if now - last < f64::from(self.config.print_interval) {
                return;
            }
        }

        self.last_print_time = Some(now);
        self.text = build_text(snapshot);
    }

    /// Render the overlay panel.
    pub fn render(&self, ctx: &Context) {
        if !self.enabled || self.text.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("interaction_debug_area"))
            .fixed_pos(Pos2::new(self.config.padding, self.config.padding))
            .show(ctx, |ui| {
                let bg_alpha = (self.config.background_opacity.clamp(0.0, 1.0) * 255.0) as u8;
                egui::Frame::none()
                    .fill(Color32::from_rgba_unmultiplied(0, 0, 0, bg_alpha))
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.set_min_width(self.config.panel_width - 16.0);

                        let mut lines = self.text.lines();
                        if let Some(title) = lines.next() {
                            ui.label(
                                RichText::new(title)
                                    .color(Color32::LIGHT_GRAY)
                                    .size(self.config.font_size + 2.0),
                            );
                            ui.separator();
                        }

                        for line in lines {
                            ui.label(
                                RichText::new(line)
                                    .color(line_color(line))
                                    .size(self.config.font_size),
                            );
                        }
                    });
            });
    }
}

fn line_color(line: &str) -> Color32 {
    if line.starts_with("Available: No") {
        Color32::LIGHT_RED
    } else if line.starts_with("Focused: None") {
        Color32::GRAY
    } else {
        Color32::WHITE
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Preview of unmet requirement messages.
///
/// Shows at most three messages joined by `" | "`, followed by `...(+N)` for
/// the rest. Returns `<none>` when nothing is unmet.
#[must_use]
pub fn unmet_preview(query: &QueryResult) -> String {
    let messages = &query.unmet_requirement_messages;
    if messages.is_empty() {
        return "<none>".to_string();
    }

    let mut preview = messages
        .iter()
        .take(MAX_UNMET_PREVIEW)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ");

    if messages.len() > MAX_UNMET_PREVIEW {
        preview.push_str(&format!(" | ...(+{})", messages.len() - MAX_UNMET_PREVIEW));
    }
    preview
}

/// Full overlay text for a snapshot.
#[must_use]
pub fn build_text(snapshot: &InteractionDebugSnapshot) -> String {
    let owner = snapshot.owner.as_ref().map_or("None", |label| label.name.as_str());
    let focused = snapshot.focused.as_ref().map_or("None", |label| label.name.as_str());
    let hit_actor = snapshot
        .trace
        .hit_actor
        .as_ref()
        .map_or("None", |label| label.name.as_str());

    let query = &snapshot.query;
    let input = match query.input_mode {
        InputMode::Press => "Press",
        InputMode::Hold => "Hold",
    };
    let prompt = if query.prompt_text.is_empty() {
        "<empty>"
    } else {
        query.prompt_text.as_str()
    };

    format!(
        "[Interaction Debug]\n\
         Owner: {owner} | Enabled: {}\n\
         Focused: {focused}\n\
         TraceHit: {} | HitActor: {hit_actor} | HitInteractable: {}\n\
         PromptVisible: {} | Input: {input} | HoldDuration: {:.2}\n\
         Prompt: {prompt}\n\
         Available: {} | Unmet: {}\n\
         UnmetMessages: {}\n\
         Holding: {} | HoldProgress: {:.2}\n\
         Scan: Interval={:.2} Dist={:.0} Radius={:.0}\n",
        yes_no(snapshot.enabled),
        yes_no(snapshot.trace.hit),
        yes_no(snapshot.trace.hit_was_interactable),
        yes_no(query.show_prompt),
        query.hold_duration,
        yes_no(query.is_available()),
        query.unmet_requirement_count,
        unmet_preview(query),
        yes_no(snapshot.holding),
        snapshot.hold_progress,
        snapshot.scan_interval,
        snapshot.trace_distance,
        snapshot.trace_radius,
    )
}
