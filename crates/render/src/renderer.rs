use crate::frame::{DrawItem, DrawKind, Frame, Pass};
use std::fmt::Write as _;

/// Renderer-agnostic interface. All backends implement this trait.
///
/// A backend consumes a planned `Frame` and produces its output. It never
/// sees `ProgramState`, only what the planner put in the frame.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one planned frame.
    fn render(&mut self, frame: &Frame) -> Self::Output;
}

/// Text backend: describes a frame instead of drawing it.
///
/// Used by `--describe` and by tests that need to see the pass order.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn describe_draw(out: &mut String, draw: &DrawItem) {
    let p = draw.model.w_axis;
    let what = match draw.kind {
        DrawKind::ReflectiveCube { environment } => format!("cube (reflects {environment:?})"),
        DrawKind::Diamond(color) => format!("diamond {}", color.name()),
        DrawKind::Planet(i) => format!("planet #{i}"),
        DrawKind::Window => "window".to_string(),
        DrawKind::LightMarker(i) => format!("light marker #{i}"),
    };
    let _ = writeln!(
        out,
        "    {what} at ({:.2}, {:.2}, {:.2}) alpha={:.2}",
        p.x, p.y, p.z, draw.alpha
    );
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, frame: &Frame) -> String {
        let mut out = String::new();
        let c = frame.camera_position;
        let _ = writeln!(
            out,
            "=== Frame t={:.3}s viewport={}x{} ===",
            frame.time, frame.viewport.width, frame.viewport.height
        );
        let _ = writeln!(out, "Camera: ({:.2}, {:.2}, {:.2})", c.x, c.y, c.z);
        let _ = writeln!(out, "Draws: {}", frame.draw_count());

        for (i, pass) in frame.passes.iter().enumerate() {
            let _ = match pass {
                Pass::Clear { color } => writeln!(
                    out,
                    "[{i:02}] clear ({:.2}, {:.2}, {:.2})",
                    color.x, color.y, color.z
                ),
                Pass::Opaque => writeln!(out, "[{i:02}] opaque"),
                Pass::Models => writeln!(out, "[{i:02}] models"),
                Pass::Transparent => writeln!(out, "[{i:02}] transparent"),
                Pass::Skybox(layer) => writeln!(out, "[{i:02}] skybox {layer:?}"),
                Pass::Blur {
                    direction,
                    source,
                    target,
                } => writeln!(out, "[{i:02}] blur {direction:?} {source:?} -> {target}"),
                Pass::Composite {
                    bloom,
                    exposure,
                    blurred,
                } => writeln!(
                    out,
                    "[{i:02}] composite bloom={bloom} exposure={exposure:.2} blurred={blurred}"
                ),
                Pass::Overlay => writeln!(out, "[{i:02}] overlay"),
            };

            let draws: &[DrawItem] = match pass {
                Pass::Opaque => &frame.opaque[..],
                Pass::Models => &frame.models[..],
                Pass::Transparent => &frame.transparent[..],
                _ => &[],
            };
            for draw in draws {
                describe_draw(&mut out, draw);
            }
        }

        out
    }
}
