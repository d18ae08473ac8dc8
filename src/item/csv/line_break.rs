use std::io::{self, Read, Seek, SeekFrom};

use super::dialect::LineBreak;

/// Number of leading bytes inspected when sniffing the line break.
pub const SAMPLE_SIZE: u64 = 10_000;

/// Sniffs the line break of a stream from its first [`SAMPLE_SIZE`] bytes.
///
/// The stream is rewound to offset 0 before sampling and again afterwards, so
/// the caller gets it back at the start regardless of where it was.
pub fn detect_line_break<S: Read + Seek>(stream: &mut S) -> io::Result<LineBreak> {
    stream.seek(SeekFrom::Start(0))?;

    let mut sample = Vec::new();
    stream.by_ref().take(SAMPLE_SIZE).read_to_end(&mut sample)?;

    stream.seek(SeekFrom::Start(0))?;

    Ok(detect_in_sample(&sample))
}

/// Picks the line break whose first occurrence comes earliest in `sample`.
///
/// `\r\n` and `\r` starting at the same offset resolve to `\r\n`. Without any
/// terminator the result is `\n`.
pub fn detect_in_sample(sample: &[u8]) -> LineBreak {
    LineBreak::ALL
        .into_iter()
        .filter_map(|line_break| {
            find(sample, line_break.as_bytes()).map(|position| (line_break, position))
        })
        .min_by_key(|(_, position)| *position)
        .map(|(line_break, _)| line_break)
        .unwrap_or_default()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
