//! Word placement for the cloud canvas
//!
//! Words are processed from most to least frequent. The starting font size is
//! calibrated by laying out the two most frequent words alone and taking the
//! harmonic mean of their sizes. Each later word's size follows from the
//! previous word's size and the ratio of their frequencies (relative scaling
//! 0.5), then shrinks to the largest size that still fits somewhere.
//!
//! Occupancy is tracked per inked pixel, so small words can sit in the gaps
//! of large ones. Free boxes are found with an integral image; among all free
//! positions the one closest to the canvas centre wins.

use crate::keywords::KeywordFrequencies;

/// Blend factor between rank-based and frequency-based sizing
pub const RELATIVE_SCALING: f32 = 0.5;
/// Words are not drawn smaller than this many pixels
pub const MIN_FONT_SIZE: u32 = 4;
/// Empty pixels kept around every word
pub const MARGIN: u32 = 2;

/// Glyph geometry needed for placement
pub trait WordMetrics {
    /// Pixel width and height of `word` set at `size`
    fn extent(&self, word: &str, size: u32) -> (u32, u32);

    /// Inked pixels of `word` set at `size`, relative to its top-left corner
    fn ink(&self, word: &str, size: u32) -> Vec<(u32, u32)>;
}

/// A word with its final size and top-left position on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub font_size: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Rank of the word in the input, used for coloring
    pub rank: usize,
}

/// Lay words out on a `width` x `height` canvas.
///
/// A word that cannot be placed at `MIN_FONT_SIZE` ends the layout, as do all
/// words after it.
pub fn layout_words<M: WordMetrics>(
    frequencies: &KeywordFrequencies,
    width: u32,
    height: u32,
    metrics: &M,
) -> Vec<PlacedWord> {
    let max_font_size = if frequencies.len() > 1 {
        let top_two: KeywordFrequencies = frequencies
            .iter()
            .take(2)
            .map(|(word, count)| (word.to_string(), count))
            .collect();
        match place_words(&top_two, width, height, metrics, height).as_slice() {
            [first, second] => {
                let (a, b) = (first.font_size, second.font_size);
                2 * a * b / (a + b)
            }
            [only] => only.font_size,
            _ => height,
        }
    } else {
        height
    };

    place_words(frequencies, width, height, metrics, max_font_size)
}

fn place_words<M: WordMetrics>(
    frequencies: &KeywordFrequencies,
    width: u32,
    height: u32,
    metrics: &M,
    max_font_size: u32,
) -> Vec<PlacedWord> {
    let max_count = frequencies.max_count();
    if max_count == 0 || width == 0 || height == 0 {
        return Vec::new();
    }

    let mut occupancy = Occupancy::new(width, height);
    let mut placed = Vec::with_capacity(frequencies.len());

    let mut font_size = max_font_size;
    let mut last_freq = 1.0_f32;

    for (rank, (word, count)) in frequencies.iter().enumerate() {
        let freq = count as f32 / max_count as f32;

        if rank > 0 {
            let scaled = (RELATIVE_SCALING * (freq / last_freq) + (1.0 - RELATIVE_SCALING))
                * font_size as f32;
            font_size = scaled.round() as u32;
        }

        let Some((size, x, y, w, h)) = largest_fit(&occupancy, metrics, word, font_size) else {
            break;
        };
        font_size = size;

        occupancy.mark(x, y, metrics.ink(word, size));
        placed.push(PlacedWord {
            word: word.to_string(),
            font_size,
            x,
            y,
            width: w,
            height: h,
            rank,
        });
        last_freq = freq;
    }

    placed
}

/// Largest size in `MIN_FONT_SIZE..=start` at which `word` fits, with the
/// top-left corner of its box. A box that fits at some size also fits at
/// every smaller size, so the sizes are bisected.
fn largest_fit<M: WordMetrics>(
    occupancy: &Occupancy,
    metrics: &M,
    word: &str,
    start: u32,
) -> Option<(u32, u32, u32, u32, u32)> {
    let try_size = |size: u32| {
        let (w, h) = metrics.extent(word, size);
        occupancy
            .find_free(w + 2 * MARGIN, h + 2 * MARGIN)
            .map(|(x, y)| (size, x + MARGIN, y + MARGIN, w, h))
    };

    if start < MIN_FONT_SIZE {
        return None;
    }
    if let Some(fit) = try_size(start) {
        return Some(fit);
    }

    let mut best = try_size(MIN_FONT_SIZE)?;
    let (mut fits, mut fails) = (MIN_FONT_SIZE, start);
    while fails - fits > 1 {
        let mid = fits + (fails - fits) / 2;
        match try_size(mid) {
            Some(fit) => {
                best = fit;
                fits = mid;
            }
            None => fails = mid,
        }
    }
    Some(best)
}

/// Inked pixels of the canvas plus their integral image
struct Occupancy {
    width: u32,
    height: u32,
    occupied: Vec<bool>,
    integral: Vec<u32>,
}

impl Occupancy {
    fn new(width: u32, height: u32) -> Self {
        let cells = (width as usize) * (height as usize);
        let integral_cells = (width as usize + 1) * (height as usize + 1);
        Self {
            width,
            height,
            occupied: vec![false; cells],
            integral: vec![0; integral_cells],
        }
    }

    fn integral_at(&self, x: u32, y: u32) -> u32 {
        self.integral[y as usize * (self.width as usize + 1) + x as usize]
    }

    /// Occupied pixels inside the `w` x `h` box at (x, y)
    fn occupied_in(&self, x: u32, y: u32, w: u32, h: u32) -> u32 {
        let (x2, y2) = (x + w, y + h);
        self.integral_at(x2, y2) + self.integral_at(x, y)
            - self.integral_at(x2, y)
            - self.integral_at(x, y2)
    }

    /// Free `w` x `h` box whose centre is closest to the canvas centre
    fn find_free(&self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w > self.width || h > self.height {
            return None;
        }

        let center_x = (self.width - w) as f32 / 2.0;
        let center_y = (self.height - h) as f32 / 2.0;
        // Distances are measured relative to the canvas shape
        let (scale_x, scale_y) = (1.0 / self.width as f32, 1.0 / self.height as f32);

        let mut best: Option<(f32, u32, u32)> = None;
        for y in 0..=self.height - h {
            for x in 0..=self.width - w {
                if self.occupied_in(x, y, w, h) != 0 {
                    continue;
                }
                let dx = (x as f32 - center_x) * scale_x;
                let dy = (y as f32 - center_y) * scale_y;
                let distance = dx * dx + dy * dy;
                if best.map_or(true, |(d, _, _)| distance < d) {
                    best = Some((distance, x, y));
                }
            }
        }
        best.map(|(_, x, y)| (x, y))
    }

    /// Mark `ink` pixels, offset by (x, y), as occupied
    fn mark(&mut self, x: u32, y: u32, ink: Vec<(u32, u32)>) {
        for (ix, iy) in ink {
            let (px, py) = (x + ix, y + iy);
            if px < self.width && py < self.height {
                self.occupied[py as usize * self.width as usize + px as usize] = true;
            }
        }
        self.rebuild_integral();
    }

    fn rebuild_integral(&mut self) {
        let stride = self.width as usize + 1;
        for row in 0..self.height as usize {
            let mut row_sum = 0;
            for col in 0..self.width as usize {
                row_sum += self.occupied[row * self.width as usize + col] as u32;
                self.integral[(row + 1) * stride + col + 1] =
                    self.integral[row * stride + col + 1] + row_sum;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::extract_keywords;

    /// Monospace-ish metrics: 0.6 em per letter, 1 em tall, box fully inked
    struct BoxMetrics;

    impl WordMetrics for BoxMetrics {
        fn extent(&self, word: &str, size: u32) -> (u32, u32) {
            ((word.len() as f32 * size as f32 * 0.6).ceil() as u32, size)
        }

        fn ink(&self, word: &str, size: u32) -> Vec<(u32, u32)> {
            let (w, h) = self.extent(word, size);
            (0..h).flat_map(|y| (0..w).map(move |x| (x, y))).collect()
        }
    }

    fn overlaps(a: &PlacedWord, b: &PlacedWord) -> bool {
        a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
    }

    fn box_of(size: u32, word: &str) -> (u32, u32) {
        BoxMetrics.extent(word, size)
    }

    #[test]
    fn test_empty_frequencies_place_nothing() {
        let placed = layout_words(&KeywordFrequencies::default(), 600, 400, &BoxMetrics);
        assert!(placed.is_empty());
    }

    #[test]
    fn test_words_fit_canvas_without_overlap() {
        let text = "network network network network training training training \
                    gradient gradient dataset dataset benchmark accuracy learning \
                    optimizer transformer attention";
        let keywords = extract_keywords(text, 30);
        let placed = layout_words(&keywords, 600, 400, &BoxMetrics);

        assert_eq!(placed.len(), keywords.len());
        for (i, a) in placed.iter().enumerate() {
            assert!(a.x + a.width <= 600 && a.y + a.height <= 400, "{a:?} out of bounds");
            assert!(a.font_size >= MIN_FONT_SIZE);
            for b in &placed[i + 1..] {
                assert!(!overlaps(a, b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_more_frequent_words_are_not_smaller() {
        let keywords = extract_keywords("graphs graphs graphs graphs nodes nodes edges", 30);
        let placed = layout_words(&keywords, 600, 400, &BoxMetrics);
        assert_eq!(placed[0].word, "graphs");
        assert!(placed[0].font_size >= placed[1].font_size);
        assert!(placed[1].font_size >= placed[2].font_size);
    }

    #[test]
    fn test_single_word_shrinks_to_fit_width() {
        let keywords = extract_keywords("extraordinarily", 30);
        let placed = layout_words(&keywords, 600, 400, &BoxMetrics);
        assert_eq!(placed.len(), 1);
        assert!(placed[0].width + 2 * MARGIN <= 600);
        // One size larger would not have fit
        assert!(box_of(placed[0].font_size + 1, "extraordinarily").0 + 2 * MARGIN > 600);
    }

    #[test]
    fn test_first_size_is_calibrated_from_top_two_words() {
        let keywords = extract_keywords("alphas alphas betas", 30);
        let trial = place_words(&keywords, 600, 400, &BoxMetrics, 400);
        let (a, b) = (trial[0].font_size, trial[1].font_size);

        let placed = layout_words(&keywords, 600, 400, &BoxMetrics);
        assert_eq!(placed[0].font_size, 2 * a * b / (a + b));
        assert!(placed[0].font_size < a);
    }

    #[test]
    fn test_shrinks_to_largest_fitting_size() {
        let mut occupancy = Occupancy::new(100, 40);
        // Leave only a 100 x 20 band free at the bottom
        occupancy.mark(0, 0, (0..20).flat_map(|y| (0..100).map(move |x| (x, y))).collect());

        let (size, _, y, _, h) = largest_fit(&occupancy, &BoxMetrics, "words", 40).unwrap();
        assert_eq!(size, 20 - 2 * MARGIN);
        assert!(y >= 20 && y + h <= 40);
    }

    #[test]
    fn test_integral_counts_marked_pixels() {
        let mut occupancy = Occupancy::new(10, 10);
        let ink: Vec<(u32, u32)> = (0..2).flat_map(|y| (0..4).map(move |x| (x, y))).collect();
        occupancy.mark(2, 3, ink);
        assert_eq!(occupancy.occupied_in(0, 0, 10, 10), 8);
        assert_eq!(occupancy.occupied_in(2, 3, 4, 2), 8);
        assert_eq!(occupancy.occupied_in(6, 0, 4, 10), 0);
        assert!(occupancy.find_free(10, 10).is_none());
        assert!(occupancy.find_free(3, 3).is_some());
    }

    #[test]
    fn test_free_box_prefers_centre() {
        let occupancy = Occupancy::new(100, 50);
        assert_eq!(occupancy.find_free(20, 10), Some((40, 20)));
    }
}
