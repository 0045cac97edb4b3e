use crate::{ArticleError, Result};

/// Separators tried in order, coarsest first. The empty separator falls back to
/// single characters.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// A contiguous piece of the source text with its position in the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position
    pub ordinal: usize,

    /// Number of chunks produced for the same source
    pub total: usize,

    /// Chunk content, including the leading overlap
    pub text: String,

    /// Byte length of the leading region repeated from the previous chunk
    pub overlap_len: usize,
}

impl Chunk {
    /// Context carried over from the previous chunk
    pub fn overlap(&self) -> &str {
        &self.text[..self.overlap_len]
    }

    /// Content that no earlier chunk contains
    pub fn core(&self) -> &str {
        &self.text[self.overlap_len..]
    }
}

/// Byte span of an indivisible piece produced by separator splitting
#[derive(Debug, Clone, Copy)]
struct Unit {
    start: usize,
    end: usize,
    chars: usize,
}

/// Recursive separator-based splitter with overlap between adjacent chunks.
///
/// Sizes are counted in characters. A chunk's [`Chunk::core`] holds at most
/// `chunk_size` characters and its leading overlap at most `chunk_overlap`.
/// Chunks are always substrings of the source, so dropping each chunk's
/// [`Chunk::overlap`] and concatenating the rest gives the source back.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Self::with_separators(chunk_size, chunk_overlap, DEFAULT_SEPARATORS)
    }

    pub fn with_separators(chunk_size: usize, chunk_overlap: usize, separators: &[&str]) -> Result<Self> {
        validate(chunk_size, chunk_overlap)?;

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: separators.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Split `text` into ordered chunks. Empty input gives no chunks.
    pub fn chunks(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let separators: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        let mut units = Vec::new();
        self.collect_units(text, 0, text.len(), &separators, &mut units);

        let spans = self.pack(text, &units);
        let total = spans.len();

        spans
            .into_iter()
            .enumerate()
            .map(|(i, (start, end, overlap_len))| Chunk {
                ordinal: i + 1,
                total,
                text: text[start..end].to_string(),
                overlap_len,
            })
            .collect()
    }

    /// Break `text[start..end]` into units no longer than the chunk size,
    /// using the first separator present and recursing with the finer ones.
    fn collect_units(&self, text: &str, start: usize, end: usize, separators: &[&str], out: &mut Vec<Unit>) {
        let piece = &text[start..end];
        let chars = piece.chars().count();

        if chars <= self.chunk_size {
            out.push(Unit { start, end, chars });
            return;
        }

        let Some(pos) = separators
            .iter()
            .position(|sep| sep.is_empty() || piece.contains(sep))
        else {
            // Nothing left to split on
            out.push(Unit { start, end, chars });
            return;
        };

        let separator = separators[pos];
        let finer = &separators[pos + 1..];

        if separator.is_empty() {
            out.extend(piece.char_indices().map(|(i, c)| Unit {
                start: start + i,
                end: start + i + c.len_utf8(),
                chars: 1,
            }));
            return;
        }

        // The separator stays attached to the piece it ends
        let mut cursor = 0;
        for (idx, matched) in piece.match_indices(separator) {
            let piece_end = idx + matched.len();
            self.collect_units(text, start + cursor, start + piece_end, finer, out);
            cursor = piece_end;
        }
        if cursor < piece.len() {
            self.collect_units(text, start + cursor, end, finer, out);
        }
    }

    /// Greedily pack units into `(start, end, overlap_len)` spans.
    fn pack(&self, text: &str, units: &[Unit]) -> Vec<(usize, usize, usize)> {
        let mut spans: Vec<(usize, usize, usize)> = Vec::new();
        let mut current: Option<(usize, usize, usize)> = None;
        let mut current_chars = 0;

        for unit in units {
            if let Some((start, end, overlap_len)) = current {
                if current_chars + unit.chars <= self.chunk_size {
                    current = Some((start, unit.end, overlap_len));
                    current_chars += unit.chars;
                } else {
                    spans.push((start, end, overlap_len));
                    current = None;
                }
            }

            if current.is_none() {
                // The overlap is seeded before the unit, so a unit close to
                // `chunk_size` pushes the chunk up to `chunk_size + chunk_overlap`.
                // Oversized units stay bare.
                let start = match spans.last() {
                    Some(&(prev_start, prev_end, _))
                        if prev_end == unit.start && unit.chars <= self.chunk_size =>
                    {
                        let prev_chars = text[prev_start..prev_end].chars().count();
                        let budget = self.chunk_overlap.min(prev_chars.saturating_sub(1));
                        tail_start(text, prev_start, prev_end, budget)
                    }
                    _ => unit.start,
                };
                current = Some((start, unit.end, unit.start - start));
                current_chars = text[start..unit.end].chars().count();
            }

            // An oversized unit is emitted on its own
            if unit.chars > self.chunk_size {
                if let Some(span) = current.take() {
                    spans.push(span);
                }
                current_chars = 0;
            }
        }

        if let Some(span) = current {
            spans.push(span);
        }

        spans
    }
}

/// Start of the longest suffix of `text[from..to]` with at most `max_chars`
/// characters, moved forward to just after a whitespace when the suffix holds one.
fn tail_start(text: &str, from: usize, to: usize, max_chars: usize) -> usize {
    if max_chars == 0 {
        return to;
    }

    let region = &text[from..to];
    let start = region
        .char_indices()
        .rev()
        .nth(max_chars - 1)
        .map(|(i, _)| from + i)
        .unwrap_or(from);

    let at_boundary = text[..start]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace);
    if at_boundary {
        return start;
    }

    text[start..to]
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| start + i + c.len_utf8())
        .filter(|&snapped| snapped < to)
        .unwrap_or(start)
}

fn validate(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(ArticleError::Configuration(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    if chunk_overlap >= chunk_size {
        return Err(ArticleError::Configuration(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            chunk_overlap, chunk_size
        )));
    }
    Ok(())
}

/// Split `text` into chunk strings with the default separators.
pub fn split(text: &str, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<String>> {
    let chunker = Chunker::new(chunk_size, chunk_overlap)?;
    Ok(chunker.chunks(text).into_iter().map(|chunk| chunk.text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(chunks: &[Chunk]) -> String {
        chunks.iter().map(Chunk::core).collect()
    }

    fn sample_srt(entries: usize) -> String {
        (1..=entries)
            .map(|i| {
                format!(
                    "{}\n00:00:{:02},000 --> 00:00:{:02},500\nSpeaker line number {} says something about the topic.\n\n",
                    i,
                    i % 60,
                    i % 60,
                    i
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunker = Chunker::new(100, 10).unwrap();
        assert!(chunker.chunks("").is_empty());
        assert!(split("", 100, 10).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(Chunker::new(0, 0), Err(ArticleError::Configuration(_))));
        assert!(matches!(Chunker::new(100, 100), Err(ArticleError::Configuration(_))));
        assert!(matches!(split("text", 10, 20), Err(ArticleError::Configuration(_))));
        assert!(Chunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let text = "Hello there.\nGeneral Kenobi.\nYou are a bold one.";
        let chunks = Chunker::new(100, 20).unwrap().chunks(text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].ordinal, 1);
        assert_eq!(chunks[0].total, 1);
        assert_eq!(chunks[0].overlap_len, 0);
    }

    #[test]
    fn test_25000_characters_make_three_chunks() {
        let text = "abcd ".repeat(5000);
        assert_eq!(text.chars().count(), 25000);

        let chunks = Chunker::new(10000, 500).unwrap().chunks(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks.iter().map(|c| c.ordinal).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(chunks.iter().all(|c| c.total == 3));
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 10500));
        assert!(chunks.iter().all(|c| c.core().chars().count() <= 10000));
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_coverage_across_inputs() {
        let inputs = vec![
            sample_srt(200),
            "word ".repeat(3000),
            "x".repeat(4321),
            "Ünïcödé tèxt wïth äccents — and dashes.\n".repeat(150),
            "first paragraph line\nsecond line\n\nnext paragraph\n\n\n\ntrailing".repeat(40),
        ];

        for text in inputs {
            for (size, overlap) in [(50, 0), (120, 30), (500, 100), (1000, 999)] {
                let chunks = Chunker::new(size, overlap).unwrap().chunks(&text);
                assert!(!chunks.is_empty());
                assert_eq!(reconstruct(&chunks), text, "size={} overlap={}", size, overlap);
                assert!(chunks.iter().all(|c| c.core().chars().count() <= size));
                assert!(chunks.iter().all(|c| c.overlap().chars().count() <= overlap));
            }
        }
    }

    #[test]
    fn test_overlap_bound() {
        let text = sample_srt(300);
        let overlap = 80;
        let chunks = Chunker::new(400, overlap).unwrap().chunks(&text);
        assert!(chunks.len() > 1);

        assert_eq!(chunks[0].overlap_len, 0);
        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let shared = next.overlap();
            assert!(shared.chars().count() <= overlap);
            assert!(!shared.is_empty());
            assert!(prev.text.ends_with(shared));
        }
    }

    #[test]
    fn test_overlap_kept_when_units_nearly_fill_chunk() {
        let paragraph = format!("{}end.", "talk ".repeat(18));
        let text = format!("{p}\n\n{p}\n\n{p}", p = paragraph);
        let chunks = Chunker::new(100, 20).unwrap().chunks(&text);

        assert_eq!(chunks.len(), 3);
        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let shared = next.overlap();
            assert!(!shared.trim().is_empty(), "overlap {:?} carries no text", shared);
            assert!(shared.chars().count() <= 20);
            assert!(prev.text.ends_with(shared));
            assert!(next.core().chars().count() <= 100);
        }
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_zero_overlap_has_no_shared_content() {
        let text = "word ".repeat(500);
        let chunks = Chunker::new(100, 0).unwrap().chunks(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.overlap_len == 0));
        assert_eq!(chunks.iter().map(|c| c.text.as_str()).collect::<String>(), text);
    }

    #[test]
    fn test_overlap_starts_on_word_boundary() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa ".repeat(20);
        let chunks = Chunker::new(100, 25).unwrap().chunks(&text);

        for pair in chunks.windows(2) {
            let overlap = pair[1].overlap();
            assert!(!overlap.is_empty());
            assert!(!overlap.starts_with(' '));
            assert!(pair[0].text.ends_with(overlap));
        }
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let paragraph = "Sentence one of the paragraph. Sentence two follows.";
        let text = format!("{p}\n\n{p}\n\n{p}", p = paragraph);
        let chunks = Chunker::new(paragraph.len() + 2, 0).unwrap().chunks(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, format!("{}\n\n", paragraph));
        assert_eq!(chunks[2].text, paragraph);
    }

    #[test]
    fn test_oversized_unit_is_kept_whole() {
        let text = format!("short\n{}\nshort again", "y".repeat(50));
        let chunker = Chunker::with_separators(20, 5, &["\n"]).unwrap();
        let chunks = chunker.chunks(&text);

        assert_eq!(reconstruct(&chunks), text);
        assert!(chunks.iter().any(|c| c.text == format!("{}\n", "y".repeat(50))));
    }

    #[test]
    fn test_deterministic() {
        let text = sample_srt(120);
        let chunker = Chunker::new(700, 120).unwrap();
        assert_eq!(chunker.chunks(&text), chunker.chunks(&text));
    }
}
