use soarscape_common::{Color, Font};

/// Drawing capability supplied by the host environment. All coordinates are pixels.
///
/// The scene never branches on what kind of surface it draws to; every host supplies one
/// implementation of this trait.
pub trait Surface {
    fn set_color(&mut self, color: Color);
    fn set_font(&mut self, font: &Font);
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);
    fn fill_polygon(&mut self, points: &[(i32, i32)]);
    fn draw_text(&mut self, text: &str, x: i32, y: i32);
    fn fill_oval(&mut self, x: i32, y: i32, width: i32, height: i32);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Color(Color),
    Font(Font),
    Line { from: (i32, i32), to: (i32, i32) },
    FillPolygon(Vec<(i32, i32)>),
    Text { text: String, at: (i32, i32) },
    FillOval { at: (i32, i32), size: (i32, i32) },
}

/// Surface that records every call instead of drawing.
///
/// Useful for tests, logging and checking what a frame would have drawn.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn count_lines(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    pub fn count_polygons(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillPolygon(_)))
            .count()
    }

    /// Colors that were current when each polygon was filled, in draw order.
    pub fn polygon_colors(&self) -> Vec<Color> {
        let mut current = Color::BLACK;
        let mut colors = Vec::new();
        for command in &self.commands {
            match command {
                DrawCommand::Color(c) => current = *c,
                DrawCommand::FillPolygon(_) => colors.push(current),
                _ => {}
            }
        }
        colors
    }
}

impl Surface for RecordingSurface {
    fn set_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::Color(color));
    }

    fn set_font(&mut self, font: &Font) {
        self.commands.push(DrawCommand::Font(font.clone()));
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.commands.push(DrawCommand::Line {
            from: (x0, y0),
            to: (x1, y1),
        });
    }

    fn fill_polygon(&mut self, points: &[(i32, i32)]) {
        self.commands.push(DrawCommand::FillPolygon(points.to_vec()));
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at: (x, y),
        });
    }

    fn fill_oval(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.commands.push(DrawCommand::FillOval {
            at: (x, y),
            size: (width, height),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut s = RecordingSurface::new();
        s.set_color(Color::WHITE);
        s.draw_line(0, 0, 5, 5);
        s.set_color(Color::BLACK);
        s.fill_polygon(&[(0, 0), (4, 0), (0, 4)]);
        s.draw_text("ALT", 2, 2);
        assert_eq!(s.commands().len(), 5);
        assert_eq!(s.count_lines(), 1);
        assert_eq!(s.count_polygons(), 1);
        assert_eq!(s.polygon_colors(), vec![Color::BLACK]);
    }
}
