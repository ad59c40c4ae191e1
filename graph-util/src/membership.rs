//! Membership files: one `vertex<TAB>community` line per vertex.

use crate::common_io::{read_lines, write_types};

///
/// Write a membership vector, one `vertex\tcommunity` line per vertex
///
/// * `membership` - `membership[v]` = community of vertex `v`
/// * `output_file` - file name--either gzipped or not, or `stdout`
///
pub fn write_membership(membership: &[usize], output_file: &str) -> anyhow::Result<()> {
    let lines: Vec<Box<str>> = membership
        .iter()
        .enumerate()
        .map(|(v, c)| format!("{}\t{}", v, c).into_boxed_str())
        .collect();
    write_types(&lines, output_file)
}

///
/// Read a membership vector written by [`write_membership`]
///
/// Lines may come in any order but every vertex `0..n` must appear exactly
/// once. A line with a single column is taken as the community of the
/// vertex on that (non-comment) line.
///
/// * `input_file` - file name--either gzipped or not
///
pub fn read_membership(input_file: &str) -> anyhow::Result<Vec<usize>> {
    let mut pairs = vec![];
    for line in read_lines(input_file)? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let (v, c) = match words.as_slice() {
            [c] => (pairs.len(), c.parse::<usize>()?),
            [v, c] => (v.parse::<usize>()?, c.parse::<usize>()?),
            _ => return Err(anyhow::anyhow!("invalid membership line: {}", line)),
        };
        pairs.push((v, c));
    }

    let n = pairs.len();
    let mut membership = vec![None; n];
    for (v, c) in pairs {
        if v >= n {
            return Err(anyhow::anyhow!("vertex {} out of range (n = {})", v, n));
        }
        if membership[v].replace(c).is_some() {
            return Err(anyhow::anyhow!("vertex {} appears twice", v));
        }
    }

    membership
        .into_iter()
        .enumerate()
        .map(|(v, c)| c.ok_or(anyhow::anyhow!("missing vertex {}", v)))
        .collect()
}
