//! Fixed-size text chunking with overlap and sentence-boundary trimming.

use crate::config::IngestionConfig;

/// A chunk produced from one source document.
#[derive(Debug, Clone)]
pub struct TextChunk {
    pub text: String,
    pub source: String,
    /// Character offset in the original document.
    pub start_offset: usize,
    /// Chunk index within the source.
    pub chunk_index: usize,
}

/// Split `text` into overlapping chunks of `config.chunk_size` characters,
/// trimming non-final chunks back to a sentence boundary where one exists.
pub fn split_into_chunks(text: &str, source: &str, config: &IngestionConfig) -> Vec<TextChunk> {
    let chunk_size = config.chunk_size;
    let overlap = config.chunk_overlap;
    let max_chunks = config.max_chunks_per_file;

    let mut chunks = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let total_chars = chars.len();

    if total_chars == 0 {
        return chunks;
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut start = 0;
    let mut chunk_index = 0;

    while start < total_chars && chunks.len() < max_chunks {
        let end = (start + chunk_size).min(total_chars);
        let chunk_text: String = chars[start..end].iter().collect();

        let final_text = if end < total_chars {
            trim_to_sentence_boundary(&chunk_text)
        } else {
            chunk_text
        };

        let trimmed = final_text.trim();
        if !trimmed.is_empty() {
            chunks.push(TextChunk {
                text: trimmed.to_string(),
                source: source.to_string(),
                start_offset: start,
                chunk_index,
            });
            chunk_index += 1;
        }

        start += step;
    }

    chunks
}

/// Cut the chunk back to the last sentence ending found in its final fifth.
/// Returns the chunk unchanged when no boundary is near.
fn trim_to_sentence_boundary(text: &str) -> String {
    let sentence_endings = [". ", "! ", "? ", ".\n", "!\n", "?\n"];

    let search_start = text
        .char_indices()
        .nth(text.chars().count() * 80 / 100)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let search_text = &text[search_start..];

    for ending in sentence_endings.iter() {
        if let Some(pos) = search_text.rfind(ending) {
            let cut_pos = search_start + pos + ending.len();
            return text[..cut_pos].to_string();
        }
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, overlap: usize, max: usize) -> IngestionConfig {
        IngestionConfig {
            chunk_size,
            chunk_overlap: overlap,
            max_chunks_per_file: max,
        }
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_into_chunks("", "s", &config(100, 20, 10)).is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = split_into_chunks("hello world", "s", &config(100, 20, 10));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].source, "s");
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn long_text_respects_max_chunks() {
        let text = "This is a sentence. ".repeat(50);
        let chunks = split_into_chunks(&text, "s", &config(100, 20, 5));
        assert_eq!(chunks.len(), 5);
    }

    #[test]
    fn chunks_carry_increasing_offsets() {
        let text = "word ".repeat(100);
        let chunks = split_into_chunks(&text, "s", &config(50, 10, 10));
        for pair in chunks.windows(2) {
            assert!(pair[0].start_offset < pair[1].start_offset);
        }
    }

    #[test]
    fn non_final_chunks_end_at_sentence_boundary_when_possible() {
        let text = "First sentence here. Second sentence here. Third sentence here. \
                    Fourth sentence here. Fifth sentence here."
            .to_string();
        let chunks = split_into_chunks(&text, "s", &config(50, 10, 10));
        assert!(chunks.len() > 1);
        assert!(chunks[0].text.ends_with('.'));
    }
}
