/// Command scripts fed to the partitioning tool.
///
/// One directive per line, ASCII, CRLF line endings.

const EOL: &str = "\r\n";

/// Script listing every disk the tool can see.
pub fn list_disks() -> String {
    format!("list disk{EOL}")
}

/// One script selecting and detailing every disk in `disks`.
///
/// A single process covers all disks; the combined capture is divided
/// again by [`crate::parser::sections::split`].
pub fn detail_batch(disks: &[u32]) -> String {
    let mut script = String::with_capacity(disks.len() * 48);
    for n in disks {
        script.push_str(&format!("select disk {n}{EOL}"));
        script.push_str(&format!("detail disk{EOL}"));
        script.push_str(&format!("list partition{EOL}"));
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Enumeration is one CRLF-terminated directive.
    #[test]
    fn test_list_disks_is_single_directive() {
        assert_eq!(list_disks(), "list disk\r\n");
    }

    /// Every disk gets select, detail and list partition, in disk order.
    #[test]
    fn test_detail_batch_pairs_select_with_detail() {
        let script = detail_batch(&[0, 3]);
        let lines: Vec<&str> = script.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(
            lines,
            [
                "select disk 0",
                "detail disk",
                "list partition",
                "select disk 3",
                "detail disk",
                "list partition",
            ]
        );
        assert!(script.is_ascii());
    }

    #[test]
    fn test_detail_batch_empty() {
        assert!(detail_batch(&[]).is_empty());
    }
}
