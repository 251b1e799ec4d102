use ratatui::{buffer::Buffer, layout::Rect, style::Style, text::Text, widgets::Widget};

/// Renders a block of text line by line inside an area, clipping to the
/// area's width and height. With `ignore_whitespace` the leading whitespace
/// of each line becomes an x-offset instead of being painted, so irregular
/// sprites overlay whatever is already in the buffer.
#[derive(Debug, Default)]
pub struct MultiLine<T: ToString> {
    lines: Vec<T>,
    style: Style,
    ignore_whitespace: bool,
}

impl<T: ToString> MultiLine<T> {
    pub fn new(lines: Vec<T>) -> Self {
        MultiLine { lines, style: Style::default(), ignore_whitespace: false }
    }

    pub fn style(self, style: Style) -> Self {
        Self { style, ..self }
    }

    pub fn ignore_whitespace(self, ignore_whitespace: bool) -> Self {
        Self { ignore_whitespace, ..self }
    }
}

impl<T: ToString> Widget for MultiLine<T> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        for (index, line) in self.lines.iter().enumerate() {
            if index as u16 >= area.height {
                break;
            }
            let line = line.to_string();
            let (pad, line) = if self.ignore_whitespace {
                let pad = line.chars().take_while(|c| c.is_whitespace()).count() as u16;
                (pad, line.trim().to_string())
            } else {
                (0, line)
            };
            if pad >= area.width {
                continue;
            }
            let width = (line.chars().count() as u16).min(area.width - pad);
            let rect = Rect { x: area.x + pad, y: area.y + index as u16, width, height: 1 };
            Text::from(line).style(self.style).render(rect, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_offsets_do_not_overwrite_the_buffer() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 2));
        buf.set_string(0, 0, "....", Style::default());
        buf.set_string(0, 1, "....", Style::default());

        let sprite = MultiLine::new(vec![" ab", "c"]).ignore_whitespace(true);
        sprite.render(Rect::new(0, 0, 4, 2), &mut buf);

        assert_eq!(buf[(0, 0)].symbol(), ".");
        assert_eq!(buf[(1, 0)].symbol(), "a");
        assert_eq!(buf[(2, 0)].symbol(), "b");
        assert_eq!(buf[(0, 1)].symbol(), "c");
    }

    #[test]
    fn lines_clip_to_the_area() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        let sprite = MultiLine::new(vec!["abcdef", "ghi"]);
        sprite.render(Rect::new(0, 0, 3, 1), &mut buf);

        assert_eq!(buf[(2, 0)].symbol(), "c");
    }
}
