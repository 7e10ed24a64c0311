//! Import of a pre-existing clustering (`--class-file`, §6/§8 scenario 5).
//!
//! The file format mirrors the classes output format it round-trips with:
//! `word\tclass_id\n` (a trailing frequency column, if present, is ignored).
//! Only words named in the file have their initial class overridden; every
//! other word keeps whatever [`crate::exchange::init_round_robin`] assigned
//! it.

use std::io::BufRead;

use crate::displaylevel;
use crate::error::ClusterCatError;
use crate::vocab::Vocabulary;

/// Parse `reader` and overwrite `assignment[word_id]` for every named word
/// that exists in `vocab`, subtracting `class_offset` back out first (the
/// file holds offset class ids, the same ones the classes writer emits).
/// Unknown words are skipped with a single diagnostic.
pub fn apply_class_file<R: BufRead>(
    reader: R,
    vocab: &Vocabulary,
    class_offset: i32,
    num_classes: u32,
    assignment: &mut [u32],
) -> Result<(), ClusterCatError> {
    let mut unknown_words = false;
    for line in reader.lines() {
        let line = line.map_err(|e| ClusterCatError::VocabInconsistency(format!("I/O error reading class file: {e}")))?;
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let word = fields
            .next()
            .ok_or_else(|| ClusterCatError::VocabInconsistency("class file line missing word column".into()))?;
        let class_field = fields
            .next()
            .ok_or_else(|| ClusterCatError::VocabInconsistency(format!("class file line for {word:?} missing class column")))?;
        let offset_class: i64 = class_field
            .trim()
            .parse()
            .map_err(|_| ClusterCatError::VocabInconsistency(format!("class file class id {class_field:?} is not an integer")))?;
        let class = offset_class - class_offset as i64;
        if class < 0 || class >= num_classes as i64 {
            return Err(ClusterCatError::VocabInconsistency(format!(
                "class file assigns {word:?} to class {class}, outside [0, {num_classes})"
            )));
        }

        match vocab.id(word) {
            Some(id) => assignment[id as usize] = class as u32,
            None => {
                if !unknown_words {
                    displaylevel!(1, "warning: class file names word(s) absent from the filtered vocabulary, ignoring them");
                    unknown_words = true;
                }
            }
        }
    }
    Ok(())
}
