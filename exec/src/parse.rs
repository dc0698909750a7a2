use std::collections::HashMap;

/// Parses `Key: value` lines, as printed by `lxc-info`, into a map.
///
/// Lines without a colon are skipped. Keys and values are trimmed.
pub fn parse_key_values(output: &[u8]) -> HashMap<String, String> {
    String::from_utf8_lossy(output)
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}
