use plotters::coord::Shift;
use plotters::prelude::*;

use crate::infrastructure::rendering::{Figure, FONT};

const ROW_HEIGHT: i32 = 28;
const TITLE_HEIGHT: i32 = 48;
const CHAR_WIDTH: i32 = 9;
const CELL_PADDING: i32 = 12;
const HEADER_FILL: RGBColor = RGBColor(64, 96, 160);
const STRIPE_FILL: RGBColor = RGBColor(240, 243, 248);

/// A titled grid of text cells
pub struct TableImage {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableImage {
    fn column_widths(&self) -> Vec<i32> {
        (0..self.header.len())
            .map(|c| {
                let longest = std::iter::once(&self.header[c])
                    .chain(self.rows.iter().filter_map(|r| r.get(c)))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0);
                longest as i32 * CHAR_WIDTH + 2 * CELL_PADDING
            })
            .collect()
    }
}

impl Figure for TableImage {
    fn size(&self, _default: (u32, u32)) -> (u32, u32) {
        let width: i32 = self.column_widths().iter().sum::<i32>().max(self.title.chars().count() as i32 * 12);
        let height = TITLE_HEIGHT + ROW_HEIGHT * (self.rows.len() as i32 + 1) + CELL_PADDING;
        ((width + 2 * CELL_PADDING) as u32, height as u32)
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let title_style = TextStyle::from((FONT, 22).into_font()).color(&BLACK);
        root.draw(&Text::new(self.title.clone(), (CELL_PADDING, 12), title_style))?;

        let widths = self.column_widths();
        let table_width: i32 = widths.iter().sum();
        let header_style = TextStyle::from((FONT, 16).into_font()).color(&WHITE);
        let cell_style = TextStyle::from((FONT, 15).into_font()).color(&BLACK);

        let lines = std::iter::once((&self.header, true)).chain(self.rows.iter().map(|r| (r, false)));
        for (i, (cells, is_header)) in lines.enumerate() {
            let top = TITLE_HEIGHT + i as i32 * ROW_HEIGHT;
            let fill = if is_header {
                Some(HEADER_FILL)
            } else if i % 2 == 0 {
                Some(STRIPE_FILL)
            } else {
                None
            };
            if let Some(color) = fill {
                root.draw(&Rectangle::new(
                    [(CELL_PADDING, top), (CELL_PADDING + table_width, top + ROW_HEIGHT)],
                    color.filled(),
                ))?;
            }

            let style = if is_header { &header_style } else { &cell_style };
            let mut left = CELL_PADDING;
            for (cell, width) in cells.iter().zip(&widths) {
                root.draw(&Text::new(cell.clone(), (left + CELL_PADDING, top + 6), style.clone()))?;
                left += width;
            }
        }

        let bottom = TITLE_HEIGHT + ROW_HEIGHT * (self.rows.len() as i32 + 1);
        root.draw(&Rectangle::new(
            [(CELL_PADDING, TITLE_HEIGHT), (CELL_PADDING + table_width, bottom)],
            BLACK.stroke_width(1),
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_grows_with_rows() {
        let table = TableImage {
            title: "Panel A: Return".to_string(),
            header: vec!["Bin".to_string(), "Count".to_string()],
            rows: vec![vec!["(-inf, 0]".to_string(), "3".to_string()]; 10],
        };
        let (w, h) = table.size((1200, 600));
        let (_, h_short) = TableImage { rows: vec![], ..table }.size((1200, 600));

        assert!(w > 0);
        assert_eq!(h - h_short, 10 * ROW_HEIGHT as u32);
    }
}
