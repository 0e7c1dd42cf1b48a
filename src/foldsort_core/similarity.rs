use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Minimum length for a shared substring to count as a match.
const MIN_SEQUENCE_LEN: usize = 4;

/// A match must contain at least this many consecutive alphanumeric
/// characters, so punctuation-only overlaps never form a group.
const MIN_ALNUM_RUN: usize = 4;

/// Folder name used when a sanitized group key collapses to nothing.
pub const FALLBACK_FOLDER_NAME: &str = "Common_Group";

/// Characters that are unsafe in folder names on common filesystems.
const INVALID_FOLDER_CHARS: &[char] = &['<', '>', '"', '/', '\\', '|', '?', '*'];

/// A set of filenames sharing a common substring in their base names.
#[derive(Debug, Clone)]
pub struct SimilarityGroup {
    /// The shared substring (lowercased), used as the folder name seed.
    pub key: String,
    pub members: BTreeSet<String>,
}

/// Find the longest common contiguous substring between two filenames,
/// comparing base names (final extension stripped) case-insensitively.
///
/// Returns `None` unless the match is at least [`MIN_SEQUENCE_LEN`] long and
/// contains a run of [`MIN_ALNUM_RUN`] consecutive alphanumeric characters.
pub fn find_common_sequence(a: &str, b: &str) -> Option<String> {
    let stem_a = base_name_lower(a);
    let stem_b = base_name_lower(b);

    let chars_a: Vec<char> = stem_a.chars().collect();
    let chars_b: Vec<char> = stem_b.chars().collect();

    let (start, len) = longest_common_run(&chars_a, &chars_b);
    if len < MIN_SEQUENCE_LEN {
        return None;
    }

    let common: String = chars_a[start..start + len].iter().collect();
    if !has_alnum_run(&common, MIN_ALNUM_RUN) {
        return None;
    }

    Some(common)
}

/// Compare every unordered pair of filenames and accumulate groups keyed by
/// the matched substring. Groups are returned largest first; equal-sized
/// groups are ordered by key length (longest first), then by key, so the
/// caller's greedy selection is deterministic.
pub fn build_similarity_groups(files: &[String]) -> Vec<SimilarityGroup> {
    let mut groups: HashMap<String, BTreeSet<String>> = HashMap::new();

    for (i, a) in files.iter().enumerate() {
        for b in &files[i + 1..] {
            if let Some(common) = find_common_sequence(a, b) {
                let members = groups.entry(common).or_default();
                members.insert(a.clone());
                members.insert(b.clone());
            }
        }
    }

    let mut sorted: Vec<SimilarityGroup> = groups
        .into_iter()
        .map(|(key, members)| SimilarityGroup { key, members })
        .collect();

    sorted.sort_by(|x, y| {
        y.members
            .len()
            .cmp(&x.members.len())
            .then(y.key.chars().count().cmp(&x.key.chars().count()))
            .then(x.key.cmp(&y.key))
    });

    sorted
}

/// Turn a group key into a usable folder name: trim whitespace, replace
/// filesystem-hostile characters with `_`, fall back to a fixed placeholder
/// when nothing remains. Pure and total.
pub fn sanitize_folder_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return FALLBACK_FOLDER_NAME.to_string();
    }

    trimmed
        .chars()
        .map(|c| if INVALID_FOLDER_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Lowercased base name of a filename. A name without an extension is its
/// own base name.
fn base_name_lower(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Longest common contiguous run between two char slices, as
/// `(start_in_a, length)`. Ties resolve to the earliest match in `a`.
fn longest_common_run(a: &[char], b: &[char]) -> (usize, usize) {
    let mut best_start = 0;
    let mut best_len = 0;

    // dp[j] = length of the common suffix ending at a[i] and b[j - 1]
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                curr[j + 1] = prev[j] + 1;
                if curr[j + 1] > best_len {
                    best_len = curr[j + 1];
                    best_start = i + 1 - best_len;
                }
            } else {
                curr[j + 1] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_start, best_len)
}

fn has_alnum_run(s: &str, min_run: usize) -> bool {
    let mut run = 0;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            run += 1;
            if run >= min_run {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
