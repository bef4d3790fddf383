mod font;
mod framebuffer;

pub use framebuffer::Framebuffer;

/// Immediate-mode drawing surface with palette-indexed colours. Coordinates
/// outside the surface are clipped by the implementation.
pub trait Canvas {
    fn clear(&mut self, color: u8);
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: u8);
    /// Circle outline.
    fn circle(&mut self, x: f32, y: f32, radius: f32, color: u8);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: u8);
    /// Filled axis-aligned rectangle.
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: u8);
    fn point(&mut self, x: f32, y: f32, color: u8);
    fn text(&mut self, x: f32, y: f32, text: &str, color: u8);
}

/// A single recorded primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: u8,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: u8,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: u8,
    },
    FillCircle {
        x: f32,
        y: f32,
        radius: f32,
        color: u8,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: u8,
    },
    Point {
        x: f32,
        y: f32,
        color: u8,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        color: u8,
    },
}

impl DrawCommand {
    pub fn color(&self) -> u8 {
        match self {
            Self::Clear { color }
            | Self::Line { color, .. }
            | Self::Circle { color, .. }
            | Self::FillCircle { color, .. }
            | Self::Rect { color, .. }
            | Self::Point { color, .. }
            | Self::Text { color, .. } => *color,
        }
    }

    /// True when every coordinate and size carried by the command is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Clear { .. } => true,
            Self::Line { x1, y1, x2, y2, .. } => {
                [x1, y1, x2, y2].iter().all(|v| v.is_finite())
            }
            Self::Circle { x, y, radius, .. } | Self::FillCircle { x, y, radius, .. } => {
                [x, y, radius].iter().all(|v| v.is_finite())
            }
            Self::Rect {
                x,
                y,
                width,
                height,
                ..
            } => [x, y, width, height].iter().all(|v| v.is_finite()),
            Self::Point { x, y, .. } | Self::Text { x, y, .. } => x.is_finite() && y.is_finite(),
        }
    }
}

/// Canvas that records every primitive instead of drawing it.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Forgets all recorded commands.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Replays the recorded commands onto another canvas.
    pub fn replay(&self, target: &mut impl Canvas) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear { color } => target.clear(*color),
                DrawCommand::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                } => target.line(*x1, *y1, *x2, *y2, *color),
                DrawCommand::Circle {
                    x,
                    y,
                    radius,
                    color,
                } => target.circle(*x, *y, *radius, *color),
                DrawCommand::FillCircle {
                    x,
                    y,
                    radius,
                    color,
                } => target.fill_circle(*x, *y, *radius, *color),
                DrawCommand::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => target.rect(*x, *y, *width, *height, *color),
                DrawCommand::Point { x, y, color } => target.point(*x, *y, *color),
                DrawCommand::Text { x, y, text, color } => target.text(*x, *y, text, *color),
            }
        }
    }
}

impl Canvas for DrawList {
    fn clear(&mut self, color: u8) {
        self.commands.push(DrawCommand::Clear { color });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: u8) {
        self.commands.push(DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }

    fn circle(&mut self, x: f32, y: f32, radius: f32, color: u8) {
        self.commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            color,
        });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: u8) {
        self.commands.push(DrawCommand::FillCircle {
            x,
            y,
            radius,
            color,
        });
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: u8) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn point(&mut self, x: f32, y: f32, color: u8) {
        self.commands.push(DrawCommand::Point { x, y, color });
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: u8) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }
}
