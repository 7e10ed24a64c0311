//! Output formats (§6): tab-separated class assignments, and word vectors
//! in either the classical word-embedding text format or its binary
//! little-endian `float32` counterpart.

use std::io::{self, Write};

use crate::matrix::ClassMatrix;
use crate::vocab::Vocabulary;

/// Write one `word\tclass_id[\tcount]\n` record per vocabulary word, in
/// descending word-count order (the order [`Vocabulary::build`] already
/// assigns ids in, aside from the three reserved tokens which always lead).
pub fn write_classes<W: Write>(
    mut out: W,
    vocab: &Vocabulary,
    assignment: &[u32],
    class_offset: i32,
    print_freqs: bool,
) -> io::Result<()> {
    for id in 0..vocab.len() as u32 {
        let class_id = assignment[id as usize] as i64 + class_offset as i64;
        if print_freqs {
            writeln!(out, "{}\t{}\t{}", vocab.word(id), class_id, vocab.count(id))?;
        } else {
            writeln!(out, "{}\t{}", vocab.word(id), class_id)?;
        }
    }
    Ok(())
}

/// Which vector serialization to emit. `print_word_vectors` in the
/// configuration table maps directly onto this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorFormat {
    Text,
    Binary,
}

/// Write one vector per vocabulary word, each row of `matrix` (the
/// word×class co-occurrence counts, cast to `f32`) as that word's vector.
///
/// Binary layout matches the classical word-embedding tool: an ASCII
/// header `"<vocab_size> <dim>\n"`, then for each word `"<word> "` followed
/// by `dim` raw little-endian `f32`s and a trailing `\n`. Text layout uses
/// the same header and per-word prefix but writes space-separated decimal
/// values instead of raw bytes.
pub fn write_vectors<W: Write>(mut out: W, vocab: &Vocabulary, matrix: &ClassMatrix, format: VectorFormat) -> io::Result<()> {
    let dim = matrix.num_classes();
    writeln!(out, "{} {}", vocab.len(), dim)?;
    for id in 0..vocab.len() as u32 {
        write!(out, "{} ", vocab.word(id))?;
        match format {
            VectorFormat::Binary => {
                for c in 0..dim {
                    let value = matrix.get(id, c) as f32;
                    out.write_all(&value.to_le_bytes())?;
                }
            }
            VectorFormat::Text => {
                let parts: Vec<String> = (0..dim).map(|c| format!("{}", matrix.get(id, c) as f32)).collect();
                out.write_all(parts.join(" ").as_bytes())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;

    fn fixture() -> (Vocabulary, Corpus, Vec<u32>) {
        let sents: Vec<Vec<&str>> = vec![vec!["a", "b", "a"], vec!["b", "a"]];
        let vocab = Vocabulary::build(&sents, 1);
        let corpus = Corpus::build(&vocab, &sents);
        let assignment: Vec<u32> = (0..vocab.len() as u32).map(|i| i % 2).collect();
        (vocab, corpus, assignment)
    }

    #[test]
    fn classes_are_tab_separated() {
        let (vocab, _corpus, assignment) = fixture();
        let mut buf = Vec::new();
        write_classes(&mut buf, &vocab, &assignment, 0, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let first_line = text.lines().next().unwrap();
        assert_eq!(first_line.matches('\t').count(), 1);
    }

    #[test]
    fn class_offset_is_added() {
        let (vocab, _corpus, assignment) = fixture();
        let mut buf = Vec::new();
        write_classes(&mut buf, &vocab, &assignment, 100, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        for line in text.lines() {
            let class: i64 = line.split('\t').nth(1).unwrap().parse().unwrap();
            assert!(class >= 100);
        }
    }

    #[test]
    fn print_freqs_appends_a_third_column() {
        let (vocab, _corpus, assignment) = fixture();
        let mut buf = Vec::new();
        write_classes(&mut buf, &vocab, &assignment, 0, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().next().unwrap().matches('\t').count(), 2);
    }

    #[test]
    fn binary_vector_header_matches_scenario_6_layout() {
        let (vocab, corpus, assignment) = fixture();
        let matrix = ClassMatrix::build(&corpus, vocab.len() as u32, 2, &assignment, false).unwrap();
        let mut buf = Vec::new();
        write_vectors(&mut buf, &vocab, &matrix, VectorFormat::Binary).unwrap();
        let header_end = buf.iter().position(|&b| b == b'\n').unwrap();
        let header = std::str::from_utf8(&buf[..=header_end]).unwrap();
        assert_eq!(header, format!("{} 2\n", vocab.len()));

        let mut expected_len = header.len();
        for id in 0..vocab.len() as u32 {
            expected_len += vocab.word(id).len() + 1 + 4 * 2 + 1;
        }
        assert_eq!(buf.len(), expected_len);
    }
}
