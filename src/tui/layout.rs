/// Layout helpers shared by views and overlays.
///
/// Width thresholds live on `table::Viewport`; this module only places rects.
use ratatui::layout::Rect;

/// A rect of at most `width` x `height` centered in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Percentage-sized centered rect, clamped to a minimum size
pub fn centered_percent(pct_x: u16, pct_y: u16, min: (u16, u16), area: Rect) -> Rect {
    let width = (area.width * pct_x / 100).max(min.0);
    let height = (area.height * pct_y / 100).max(min.1);
    centered_rect(width, height, area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 80, 24);
        let r = centered_rect(40, 10, area);
        assert_eq!(r, Rect::new(20, 7, 40, 10));

        let clamped = centered_rect(200, 50, area);
        assert_eq!(clamped, area);
    }

    #[test]
    fn percent_respects_minimum() {
        let area = Rect::new(0, 0, 40, 12);
        let r = centered_percent(50, 50, (30, 8), area);
        assert_eq!((r.width, r.height), (30, 8));
    }
}
