//! The seam to the PDF renderer: a page that can return its text, optionally
//! clipped to a rectangle. Decoding PDFs is left to the collaborator.

/// A rectangle in page space, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open, so adjacent rectangles never share a point.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

pub trait PositionalPage {
    /// Text of the page in reading order, one line per text line. With a
    /// clip only text inside the rectangle is returned.
    fn text(&self, clip: Option<&Rect>) -> String;
}

/// A positioned piece of text on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub bbox: Rect,
}

impl TextSpan {
    pub fn new(text: &str, bbox: Rect) -> Self {
        TextSpan {
            text: text.to_string(),
            bbox,
        }
    }
}

/// In-memory page made of already extracted spans. Spans are kept in the
/// order the renderer emitted them, which is its reading order.
#[derive(Debug, Clone, Default)]
pub struct TextLayoutPage {
    spans: Vec<TextSpan>,
}

impl TextLayoutPage {
    pub fn new(spans: Vec<TextSpan>) -> Self {
        TextLayoutPage { spans }
    }
}

impl PositionalPage for TextLayoutPage {
    fn text(&self, clip: Option<&Rect>) -> String {
        let mut out = String::new();
        for span in &self.spans {
            let (cx, cy) = span.bbox.center();
            if clip.map_or(true, |r| r.contains_point(cx, cy)) {
                out.push_str(&span.text);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipped_text_keeps_emitted_order() {
        let page = TextLayoutPage::new(vec![
            TextSpan::new("first", Rect::new(10.0, 20.0, 50.0, 10.0)),
            TextSpan::new("outside", Rect::new(300.0, 20.0, 50.0, 10.0)),
            TextSpan::new("second", Rect::new(10.0, 40.0, 50.0, 10.0)),
        ]);

        let clip = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(page.text(Some(&clip)), "first\nsecond\n");
        assert_eq!(page.text(None), "first\noutside\nsecond\n");
    }

    #[test]
    fn span_is_inside_by_its_center() {
        let page = TextLayoutPage::new(vec![TextSpan::new(
            "edge",
            Rect::new(90.0, 10.0, 40.0, 10.0),
        )]);
        // center at x=110 lies outside the clip
        assert_eq!(page.text(Some(&Rect::new(0.0, 0.0, 100.0, 100.0))), "");
        assert_eq!(page.text(None), "edge\n");
    }

    #[test]
    fn shared_edge_belongs_to_the_right_column() {
        let layout = crate::data_types::ColumnLayout::standard();
        let monday = layout.rect(crate::data_types::Weekday::Monday);
        let tuesday = layout.rect(crate::data_types::Weekday::Tuesday);
        assert_eq!(monday.right(), tuesday.x);

        // centered exactly on x=280
        let page = TextLayoutPage::new(vec![TextSpan::new(
            "Grenzfall",
            Rect::new(270.0, 100.0, 20.0, 10.0),
        )]);
        assert_eq!(page.text(Some(&monday)), "");
        assert_eq!(page.text(Some(&tuesday)), "Grenzfall\n");
    }
}
