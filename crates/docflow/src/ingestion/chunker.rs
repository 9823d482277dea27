//! Recursive character splitting with bounded size and overlap

/// Text chunker with configurable size, overlap and separator hierarchy.
///
/// Splitting prefers the earliest separator in the list that yields in-bound
/// pieces and falls back to later separators recursively; the empty-string
/// separator is a hard cut at character boundaries. Adjacent chunks share an
/// overlap: each chunk after the first carries the trailing `overlap` bytes
/// of its predecessor's non-overlapped content, so stripping that prefix and
/// concatenating reconstructs the input exactly.
pub struct TextChunker {
    /// Maximum chunk size in bytes
    chunk_size: usize,
    /// Overlap between adjacent chunks in bytes
    overlap: usize,
    /// Separators, most-structural first; the last entry should be ""
    separators: Vec<String>,
}

impl TextChunker {
    /// Create a chunker with the default separator hierarchy: paragraph
    /// break, line break, space, hard cut.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self::with_separators(
            chunk_size,
            overlap,
            vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        )
    }

    /// Create a chunker with a custom separator hierarchy.
    ///
    /// The overlap is capped below the chunk size so every emitted chunk can
    /// hold at least one byte of new content.
    pub fn with_separators(chunk_size: usize, overlap: usize, separators: Vec<String>) -> Self {
        let chunk_size = chunk_size.max(8);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size / 2),
            separators,
        }
    }

    /// Split text into chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        // Segments are the non-overlapping partition of the input; the
        // overlap is prepended afterwards, so segments are bounded by
        // chunk_size - overlap to keep every chunk within chunk_size.
        let budget = self.chunk_size - self.overlap;
        let mut segments = Vec::new();
        self.split_segment(text, &self.separators, budget, &mut segments);

        let mut chunks = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            if i == 0 {
                chunks.push(segment.clone());
            } else {
                let tail = overlap_suffix(&segments[i - 1], self.overlap);
                chunks.push(format!("{}{}", tail, segment));
            }
        }
        chunks
    }

    /// Byte length of the overlap prefix chunk `i` shares with chunk `i - 1`.
    ///
    /// Needed to strip overlaps when reassembling chunked text.
    pub fn overlap_len(&self, previous_segment: &str) -> usize {
        overlap_suffix(previous_segment, self.overlap).len()
    }

    fn split_segment(&self, text: &str, separators: &[String], budget: usize, out: &mut Vec<String>) {
        if text.len() <= budget {
            out.push(text.to_string());
            return;
        }

        let Some(separator) = separators.first() else {
            hard_cut(text, budget, out);
            return;
        };

        if separator.is_empty() {
            hard_cut(text, budget, out);
            return;
        }

        let pieces = split_keep_separator(text, separator);
        if pieces.len() == 1 {
            // Separator absent; fall back to the next one.
            self.split_segment(text, &separators[1..], budget, out);
            return;
        }

        // Merge adjacent pieces greedily up to the budget; an oversize piece
        // recurses into the remaining separators.
        let mut current = String::new();
        for piece in pieces {
            if piece.len() > budget {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                self.split_segment(piece, &separators[1..], budget, out);
            } else if current.len() + piece.len() > budget {
                out.push(std::mem::take(&mut current));
                current.push_str(piece);
            } else {
                current.push_str(piece);
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
}

/// Split text on a separator, keeping the separator attached to the piece it
/// terminates, so concatenating the pieces is lossless.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        pieces.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Cut text into pieces of at most `budget` bytes on character boundaries.
fn hard_cut(text: &str, budget: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    for ch in text.chars() {
        if !current.is_empty() && current.len() + ch.len_utf8() > budget {
            out.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        out.push(current);
    }
}

/// Trailing suffix of at most `overlap` bytes, adjusted forward to a
/// character boundary so it never exceeds the requested length.
fn overlap_suffix(text: &str, overlap: usize) -> String {
    if text.len() <= overlap {
        return text.to_string();
    }
    let mut start = text.len() - overlap;
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(chunker: &TextChunker, text: &str) -> String {
        // Re-derive the non-overlapping segments the same way split() does,
        // then confirm the chunk sequence strips back down to them.
        let chunks = chunker.split(text);
        let mut rebuilt = String::new();
        let mut prev_segment = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let segment = if i == 0 {
                chunk.clone()
            } else {
                let skip = chunker.overlap_len(&prev_segment);
                chunk[skip..].to_string()
            };
            rebuilt.push_str(&segment);
            prev_segment = segment;
        }
        rebuilt
    }

    #[test]
    fn every_chunk_respects_the_size_bound() {
        let chunker = TextChunker::new(100, 20);
        let text = "lorem ipsum dolor sit amet ".repeat(40);
        for chunk in chunker.split(&text) {
            assert!(chunk.len() <= 100, "chunk of {} bytes", chunk.len());
        }
    }

    #[test]
    fn removing_overlaps_reconstructs_the_input() {
        let chunker = TextChunker::new(80, 16);
        let text = "First paragraph with several words.\n\nSecond paragraph, longer, \
                    with more words than the first one had.\nA trailing line without a break";
        assert_eq!(reassemble(&chunker, text), text);
    }

    #[test]
    fn splitting_is_deterministic() {
        let chunker = TextChunker::new(120, 30);
        let text = "alpha beta gamma delta\n\nepsilon zeta eta theta\niota kappa ".repeat(12);
        assert_eq!(chunker.split(&text), chunker.split(&text));
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = TextChunker::new(500, 50);
        assert_eq!(chunker.split("short text"), vec!["short text".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = TextChunker::new(500, 50);
        assert!(chunker.split("").is_empty());
    }

    #[test]
    fn paragraph_breaks_are_preferred_over_spaces() {
        let chunker = TextChunker::new(30, 0);
        let text = "aaaa bbbb cccc dddd\n\neeee ffff gggg hhhh";
        let chunks = chunker.split(text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "aaaa bbbb cccc dddd\n\n");
        assert_eq!(chunks[1], "eeee ffff gggg hhhh");
    }

    #[test]
    fn unbroken_text_gets_a_hard_cut() {
        let chunker = TextChunker::new(16, 0);
        let text = "x".repeat(50);
        let chunks = chunker.split(&text);
        assert!(chunks.iter().all(|c| c.len() <= 16));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn hard_cut_respects_char_boundaries() {
        let chunker = TextChunker::new(10, 0);
        let text = "é".repeat(30);
        let chunks = chunker.split(&text);
        assert!(chunks.iter().all(|c| c.len() <= 10));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn adjacent_chunks_share_the_overlap() {
        let chunker = TextChunker::new(40, 10);
        let text = "aaaa bbbb cccc dddd eeee ffff gggg hhhh iiii jjjj kkkk llll";
        let chunks = chunker.split(text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let shared: Vec<&str> = (1..=10.min(pair[0].len()))
                .filter(|n| pair[0].ends_with(&pair[1][..*n]))
                .map(|n| &pair[1][..n])
                .collect();
            assert!(!shared.is_empty(), "chunks {:?} share no overlap", pair);
        }
        assert_eq!(reassemble(&chunker, text), text);
    }
}
