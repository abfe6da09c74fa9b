//! Text and flat panels painted over the playfield: screen titles, button
//! faces and captions. Positions are in playfield pixels and converted to
//! egui points at paint time.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    /// `[x, y, width, height]`, top-left origin.
    pub rect: [f32; 4],
    pub fill: [u8; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLabel {
    pub text: String,
    pub center: [f32; 2],
    pub font_size: f32,
    pub color: [u8; 4],
    /// Painted beneath the text, for button faces.
    pub panel: Option<Panel>,
}

impl ScreenLabel {
    pub fn new(text: impl Into<String>, center: [f32; 2], font_size: f32, color: [u8; 4]) -> Self {
        Self {
            text: text.into(),
            center,
            font_size,
            color,
            panel: None,
        }
    }

    pub fn with_panel(mut self, rect: [f32; 4], fill: [u8; 4]) -> Self {
        self.panel = Some(Panel { rect, fill });
        self
    }
}

/// Playfield pixel to egui point conversion for the current surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelTransform {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl LabelTransform {
    pub fn new(playfield: (u32, u32), surface: (u32, u32), pixels_per_point: f32) -> Self {
        let ppp = if pixels_per_point > 0.0 {
            pixels_per_point
        } else {
            1.0
        };
        Self {
            scale_x: surface.0 as f32 / playfield.0.max(1) as f32 / ppp,
            scale_y: surface.1 as f32 / playfield.1.max(1) as f32 / ppp,
        }
    }

    pub fn point(&self, x: f32, y: f32) -> egui::Pos2 {
        egui::pos2(x * self.scale_x, y * self.scale_y)
    }
}

pub(crate) fn paint_labels(ctx: &egui::Context, labels: &[ScreenLabel], transform: LabelTransform) {
    if labels.is_empty() {
        return;
    }
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("screen_labels"),
    ));
    let font_scale = transform.scale_y;
    for label in labels {
        if let Some(panel) = label.panel {
            let [x, y, w, h] = panel.rect;
            let rect =
                egui::Rect::from_min_max(transform.point(x, y), transform.point(x + w, y + h));
            let [r, g, b, a] = panel.fill;
            let fill = egui::Color32::from_rgba_unmultiplied(r, g, b, a);
            painter.rect_filled(rect, egui::CornerRadius::ZERO, fill);
        }
        let [r, g, b, a] = label.color;
        painter.text(
            transform.point(label.center[0], label.center[1]),
            egui::Align2::CENTER_CENTER,
            &label.text,
            egui::FontId::proportional(label.font_size * font_scale),
            egui::Color32::from_rgba_unmultiplied(r, g, b, a),
        );
    }
}
