/// Splits the batched detail capture into one block per disk.
///
/// The batch script selects each disk in turn, and the tool confirms every
/// selection with a "Disk N is now the selected disk." line. That line is
/// the only English-dependent marker the parser relies on.
use super::patterns::PATTERNS;
use std::collections::BTreeMap;

/// Group `lines` by the disk selected before them.
///
/// Lines before the first marker (the tool's banner) are discarded. A disk
/// whose selection failed has no marker and therefore no entry; callers
/// treat a missing entry as an empty block. If a disk is selected twice its
/// blocks are concatenated.
pub fn split(lines: &[String]) -> BTreeMap<u32, Vec<String>> {
    let mut blocks: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    let mut current: Option<u32> = None;

    for line in lines {
        if let Some(n) = PATTERNS
            .selected_disk
            .captures(line)
            .and_then(|c| c[1].parse::<u32>().ok())
        {
            blocks.entry(n).or_default();
            current = Some(n);
            continue;
        }
        if let Some(n) = current {
            blocks.entry(n).or_default().push(line.clone());
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_owned).collect()
    }

    #[test]
    fn test_two_markers_give_two_blocks() {
        let capture = lines(
            concat!(
                "Microsoft DiskPart version 10.0\n",
                "\n",
                "Disk 0 is now the selected disk.\n",
                "alpha\n",
                "beta\n",
                "Disk 1 is now the selected disk.\n",
                "gamma",
            ),
        );
        let blocks = split(&capture);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[&0], ["alpha", "beta"]);
        assert_eq!(blocks[&1], ["gamma"]);
    }

    #[test]
    fn test_banner_before_first_marker_is_dropped() {
        let blocks = split(&lines("banner\nOn computer: HOST\n"));
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_marker_with_no_following_lines_gives_empty_block() {
        let blocks = split(&lines("Disk 2 is now the selected disk."));
        assert_eq!(blocks.len(), 1);
        assert!(blocks[&2].is_empty());
    }

    /// A failed selection leaves the previous disk's block open; the failure
    /// text lands there but the missing disk simply has no block.
    #[test]
    fn test_failed_selection_has_no_block() {
        let capture = lines(
            "Disk 0 is now the selected disk.\nrow\nThe disk you specified is not valid.\n",
        );
        let blocks = split(&capture);
        assert!(!blocks.contains_key(&1));
        assert_eq!(blocks[&0].len(), 2);
    }
}
