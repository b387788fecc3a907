//! Mapping canvas points back to the nodes drawn there.

/// An axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Returns `true` if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Returns `true` if `(x, y)` lies inside; the right and bottom edges
    /// are exclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// A uniform grid over the canvas, each cell listing the items whose
/// rectangles overlap it.
///
/// Later insertions are drawn on top of earlier ones, so a lookup returns
/// the most recently inserted item under the point.
///
/// ```rust
/// use mediant::{Rect, SpatialIndex};
///
/// let mut index = SpatialIndex::new(100.0, 100.0, 10.0);
/// index.insert("below", Rect::new(0.0, 0.0, 50.0, 50.0));
/// index.insert("above", Rect::new(20.0, 20.0, 10.0, 10.0));
///
/// assert_eq!(index.get(25.0, 25.0), Some(&"above"));
/// assert_eq!(index.get(5.0, 5.0), Some(&"below"));
/// assert_eq!(index.get(75.0, 75.0), None);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    width: f64,
    height: f64,
    bucket_size: f64,
    cols: usize,
    buckets: Vec<Vec<usize>>,
    items: Vec<(T, Rect)>,
}

impl<T> SpatialIndex<T> {
    /// Creates an empty index over a `width` by `height` canvas.
    ///
    /// A non-positive `bucket_size` is treated as one pixel.
    pub fn new(width: f64, height: f64, bucket_size: f64) -> Self {
        let bucket_size = if bucket_size > 0.0 { bucket_size } else { 1.0 };
        let cols = (width.max(0.0) / bucket_size).ceil() as usize;
        let rows = (height.max(0.0) / bucket_size).ceil() as usize;
        SpatialIndex {
            width: width.max(0.0),
            height: height.max(0.0),
            bucket_size,
            cols,
            buckets: vec![Vec::new(); cols * rows],
            items: Vec::new(),
        }
    }

    /// Registers `item` in every bucket that `rect` overlaps. Empty
    /// rectangles and those entirely off the canvas are ignored.
    pub fn insert(&mut self, item: T, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let (cols, rows) = match self.span(&rect) {
            Some(span) => span,
            None => return,
        };

        let n = self.items.len();
        self.items.push((item, rect));
        for row in rows.0..rows.1 {
            for col in cols.0..cols.1 {
                self.buckets[row * self.cols + col].push(n);
            }
        }
    }

    /// Returns the most recently inserted item whose rectangle contains
    /// `(x, y)`.
    pub fn get(&self, x: f64, y: f64) -> Option<&T> {
        if !(x >= 0.0 && x < self.width && y >= 0.0 && y < self.height) {
            return None;
        }
        let col = (x / self.bucket_size) as usize;
        let row = (y / self.bucket_size) as usize;
        self.buckets
            .get(row * self.cols + col)?
            .iter()
            .rev()
            .map(|&n| &self.items[n])
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(item, _)| item)
    }

    /// Removes every item, keeping the grid.
    pub fn clear(&mut self) {
        self.items.clear();
        self.buckets.iter_mut().for_each(Vec::clear);
    }

    /// Number of items registered.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the registered items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, &Rect)> {
        self.items.iter().map(|(item, rect)| (item, rect))
    }

    /// The half-open column and row ranges of the buckets `rect` overlaps,
    /// clipped to the canvas.
    fn span(&self, rect: &Rect) -> Option<((usize, usize), (usize, usize))> {
        let left = rect.x.max(0.0);
        let top = rect.y.max(0.0);
        let right = rect.right().min(self.width);
        let bottom = rect.bottom().min(self.height);
        if !(left < right && top < bottom) {
            return None;
        }

        let first = |v: f64| (v / self.bucket_size).floor() as usize;
        let past = |v: f64| (v / self.bucket_size).ceil() as usize;
        let rows = self.buckets.len() / self.cols.max(1);
        Some((
            (first(left), past(right).min(self.cols)),
            (first(top), past(bottom).min(rows)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_several_buckets() {
        let mut index = SpatialIndex::new(100.0, 50.0, 10.0);
        index.insert(1, Rect::new(15.0, 5.0, 30.0, 20.0));
        for &(x, y) in &[(15.0, 5.0), (44.9, 24.9), (30.0, 10.0)] {
            assert_eq!(index.get(x, y), Some(&1), "at ({}, {})", x, y);
        }
        assert_eq!(index.get(45.0, 10.0), None);
        assert_eq!(index.get(14.9, 10.0), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn clips_to_canvas() {
        let mut index = SpatialIndex::new(40.0, 40.0, 10.0);
        index.insert('a', Rect::new(-20.0, -20.0, 30.0, 30.0));
        index.insert('b', Rect::new(35.0, 35.0, 100.0, 100.0));
        index.insert('c', Rect::new(50.0, 0.0, 10.0, 10.0));

        assert_eq!(index.get(0.0, 0.0), Some(&'a'));
        assert_eq!(index.get(39.0, 39.0), Some(&'b'));
        assert_eq!(index.get(-5.0, -5.0), None);
        assert_eq!(index.get(40.0, 0.0), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn ignores_empty_rects() {
        let mut index = SpatialIndex::new(40.0, 40.0, 10.0);
        index.insert(0, Rect::new(5.0, 5.0, 0.0, 10.0));
        index.insert(1, Rect::new(5.0, 5.0, 10.0, -1.0));
        index.insert(2, Rect::new(5.0, 5.0, f64::NAN, 1.0));
        assert!(index.is_empty());
        assert_eq!(index.get(5.0, 5.0), None);
    }

    #[test]
    fn later_items_win_and_clear_resets() {
        let mut index = SpatialIndex::new(40.0, 40.0, 10.0);
        index.insert("first", Rect::new(0.0, 0.0, 20.0, 20.0));
        index.insert("second", Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(index.get(10.0, 10.0), Some(&"second"));

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.get(10.0, 10.0), None);

        index.insert("third", Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(index.get(1.0, 1.0), Some(&"third"));
    }
}
