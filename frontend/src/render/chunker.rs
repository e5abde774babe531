//! Splits message text into display-sized pieces for progressive reveal.
//!
//! Chunks are spans of the source text. Concatenating the source up to the
//! end of any chunk gives exactly what has been revealed so far, so markdown
//! structure and original separators survive the reveal.

/// Sentence first, then clause punctuation, then a word-count cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Sentences up to this many words stay whole.
    pub max_sentence_words: usize,
    /// Word count at which a long sentence is cut when no clause break came.
    pub target_words: usize,
    /// A clause break is only taken once the piece has this many words.
    pub min_clause_words: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_sentence_words: 10,
            target_words: 8,
            min_clause_words: 3,
        }
    }
}

/// A chunk's position in the text it was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    #[cfg(test)]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    fn shifted(self, offset: usize, first_index: usize) -> Self {
        Self {
            index: self.index + first_index,
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Word {
    start: usize,
    end: usize,
    /// The whitespace before this word contained a line break.
    after_newline: bool,
}

/// Chunks `text[offset..]`, numbering from `first_index` and reporting
/// spans relative to the whole of `text`.
pub fn chunk_spans_from(
    text: &str,
    offset: usize,
    first_index: usize,
    config: &ChunkerConfig,
) -> Vec<Chunk> {
    chunk_spans(&text[offset..], config)
        .into_iter()
        .map(|c| c.shifted(offset, first_index))
        .collect()
}

pub fn chunk_spans(text: &str, config: &ChunkerConfig) -> Vec<Chunk> {
    let words = split_words(text);
    if words.is_empty() {
        return Vec::new();
    }

    sentence_groups(text, &words, config)
        .into_iter()
        .enumerate()
        .map(|(index, (first, last))| Chunk {
            index,
            start: words[first].start,
            end: words[last].end,
        })
        .collect()
}

fn split_words(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut start = None;
    let mut newline_seen = false;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                words.push(Word { start: s, end: i, after_newline: newline_seen });
                newline_seen = false;
            }
            if ch == '\n' {
                newline_seen = true;
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push(Word { start: s, end: text.len(), after_newline: newline_seen });
    }
    words
}

/// Last meaningful character of a word, looking through closing quotes,
/// brackets and emphasis markers.
fn terminal_char(word: &str) -> Option<char> {
    word.trim_end_matches(['"', '\'', ')', ']', '}', '*', '_', '\u{201d}', '\u{2019}'])
        .chars()
        .next_back()
}

fn ends_sentence(word: &str) -> bool {
    matches!(terminal_char(word), Some('.' | '!' | '?' | '\u{2026}'))
}

fn ends_clause(word: &str) -> bool {
    matches!(terminal_char(word), Some(',' | ';' | ':'))
}

/// Inclusive word-index ranges, one per chunk.
fn sentence_groups(text: &str, words: &[Word], config: &ChunkerConfig) -> Vec<(usize, usize)> {
    let mut groups = Vec::new();
    let mut sentence_start = 0;

    for i in 0..words.len() {
        let last = i + 1 == words.len();
        let boundary = last
            || ends_sentence(&text[words[i].start..words[i].end])
            || words[i + 1].after_newline;
        if boundary {
            groups.extend(split_sentence(text, words, sentence_start, i, config));
            sentence_start = i + 1;
        }
    }
    groups
}

fn split_sentence(
    text: &str,
    words: &[Word],
    first: usize,
    last: usize,
    config: &ChunkerConfig,
) -> Vec<(usize, usize)> {
    let max = config.max_sentence_words.max(1);
    if last + 1 - first <= max {
        return vec![(first, last)];
    }

    let target = config.target_words.clamp(1, max);
    let mut groups: Vec<(usize, usize)> = Vec::new();
    let mut start = first;
    for i in first..=last {
        let len = i + 1 - start;
        let clause = len >= config.min_clause_words
            && ends_clause(&text[words[i].start..words[i].end]);
        if clause || len >= target {
            groups.push((start, i));
            start = i + 1;
        }
    }

    if start <= last {
        let rest = last + 1 - start;
        match groups.last_mut() {
            Some(prev) if rest < config.min_clause_words && prev.1 + 1 - prev.0 + rest <= max => {
                prev.1 = last;
            }
            _ => groups.push((start, last)),
        }
    }
    groups
}
