//! Splitting text to fit a provider's per-request limit.
//!
//! Splits prefer blank lines, then single line breaks, then a hard cut at a
//! character boundary. Each chunk remembers the separator that followed it
//! in the original text, so concatenating `text + separator` over all chunks
//! reproduces the input exactly.

/// How a provider measures request size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// UTF-8 bytes.
    Bytes,
    /// Unicode scalar values.
    Chars,
}

impl Measure {
    pub fn len(&self, s: &str) -> usize {
        match self {
            Measure::Bytes => s.len(),
            Measure::Chars => s.chars().count(),
        }
    }
}

/// A piece of text and the separator that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub separator: &'static str,
}

/// Split `text` into chunks no larger than `limit`.
pub fn chunk_text(text: &str, limit: usize, measure: Measure) -> Vec<Chunk> {
    let limit = limit.max(1);
    if measure.len(text) <= limit {
        return vec![Chunk {
            text: text.to_string(),
            separator: "",
        }];
    }

    let mut atoms: Vec<(String, &'static str)> = Vec::new();
    let paragraphs: Vec<&str> = text.split("\n\n").collect();
    let last_para = paragraphs.len() - 1;

    for (pi, para) in paragraphs.iter().enumerate() {
        let para_sep = if pi == last_para { "" } else { "\n\n" };
        if measure.len(para) <= limit {
            atoms.push((para.to_string(), para_sep));
            continue;
        }

        let lines: Vec<&str> = para.split('\n').collect();
        let last_line = lines.len() - 1;
        for (li, line) in lines.iter().enumerate() {
            let line_sep = if li == last_line { para_sep } else { "\n" };
            if measure.len(line) <= limit {
                atoms.push((line.to_string(), line_sep));
                continue;
            }

            let pieces = hard_split(line, limit, measure);
            let last_piece = pieces.len() - 1;
            for (ki, piece) in pieces.into_iter().enumerate() {
                atoms.push((piece, if ki == last_piece { line_sep } else { "" }));
            }
        }
    }

    pack(atoms, limit, measure)
}

/// Greedily merge atoms while the merged text stays within the limit.
fn pack(atoms: Vec<(String, &'static str)>, limit: usize, measure: Measure) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current: Option<Chunk> = None;

    for (text, sep) in atoms {
        current = Some(match current.take() {
            None => Chunk { text, separator: sep },
            Some(mut chunk) => {
                let merged = measure.len(&chunk.text)
                    + measure.len(chunk.separator)
                    + measure.len(&text);
                if merged <= limit {
                    chunk.text.push_str(chunk.separator);
                    chunk.text.push_str(&text);
                    chunk.separator = sep;
                    chunk
                } else {
                    chunks.push(chunk);
                    Chunk { text, separator: sep }
                }
            }
        });
    }

    chunks.extend(current);
    chunks
}

fn hard_split(line: &str, limit: usize, measure: Measure) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut size = 0;

    for c in line.chars() {
        let c_len = match measure {
            Measure::Bytes => c.len_utf8(),
            Measure::Chars => 1,
        };
        if size + c_len > limit && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            size = 0;
        }
        current.push(c);
        size += c_len;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Reassemble translated chunk texts with the original separators.
pub fn rejoin(chunks: &[Chunk], translated: &[String]) -> String {
    chunks
        .iter()
        .zip(translated)
        .map(|(chunk, text)| format!("{}{}", text, chunk.separator))
        .collect()
}
