/// Sentence boundary approximation used for splitting and rejoining
pub const SENTENCE_DELIMITER: &str = ". ";

/// Split text into units of at most `max_chars` characters along sentence
/// boundaries.
///
/// Sentences are never split, so a single sentence longer than `max_chars`
/// becomes a unit of its own. Joining the result with [`SENTENCE_DELIMITER`]
/// gives back the input.
pub fn segment(text: &str, max_chars: usize) -> Vec<String> {
    let delimiter_len = SENTENCE_DELIMITER.chars().count();
    let mut units = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_len = 0;

    for sentence in text.split(SENTENCE_DELIMITER) {
        let sentence_len = sentence.chars().count();

        if buffer.is_empty() {
            buffer_len = sentence_len;
        } else if buffer_len > 0 && buffer_len + delimiter_len + sentence_len > max_chars {
            // An empty buffer keeps accumulating so no delimiter is lost
            units.push(buffer.join(SENTENCE_DELIMITER));
            buffer.clear();
            buffer_len = sentence_len;
        } else {
            buffer_len += delimiter_len + sentence_len;
        }

        buffer.push(sentence);
    }

    let tail = buffer.join(SENTENCE_DELIMITER);
    if !tail.is_empty() {
        units.push(tail);
    } else if let Some(last) = units.last_mut() {
        last.push_str(SENTENCE_DELIMITER);
    }
    units
}
