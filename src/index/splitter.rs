use crate::core::config::IndexConfig;

/// Splits text into overlapping windows of bounded size.
///
/// Window ends prefer natural boundaries (paragraph, then sentence, then
/// word) before falling back to a hard cut. Every window is at most
/// `chunk_size` characters, and each window starts `chunk_overlap`
/// characters before the previous window's end, so adjacent windows share
/// exactly that many characters. The final window may be shorter.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            chunk_overlap: config.chunk_overlap.min(config.chunk_size.saturating_sub(1)),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        if total == 0 {
            return Vec::new();
        }
        if total <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        loop {
            let hard_end = (start + self.chunk_size).min(total);
            let end = if hard_end < total {
                start + self.break_point(&chars[start..hard_end])
            } else {
                hard_end
            };

            chunks.push(chars[start..end].iter().collect());

            if end >= total {
                break;
            }
            start = end - self.chunk_overlap;
        }

        chunks
    }

    /// Pick a cut position inside a full-size window, relative to the
    /// window start. The search floor keeps the cut past the overlap
    /// region so every step makes forward progress.
    fn break_point(&self, window: &[char]) -> usize {
        let len = window.len();
        let floor = (len / 2).max(self.chunk_overlap + 1).min(len);

        // Paragraph break
        for i in (floor..len.saturating_sub(1)).rev() {
            if window[i] == '\n' && window[i + 1] == '\n' {
                return i + 2;
            }
        }

        // Sentence break
        for i in (floor..len).rev() {
            let c = window[i];
            let sentence_end = matches!(c, '.' | '!' | '?');
            if sentence_end && (i + 1 == len || window[i + 1].is_whitespace()) {
                return i + 1;
            }
        }

        // Word break
        for i in (floor..len).rev() {
            if window[i].is_whitespace() {
                return i + 1;
            }
        }

        // Hard cut
        len
    }
}
