//! Human-readable formatting of byte sizes.

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// Formats a byte count with binary prefixes.
///
/// Kilobytes are rounded to an integer, larger units keep two decimals.
pub fn format_file_size(bytes: u64) -> String {
    let value = bytes as f64;
    if value < KIB {
        format!("{} B", bytes)
    } else if value < MIB {
        format!("{} KB", (value / KIB).round() as u64)
    } else if value < GIB {
        format!("{:.2} MB", value / MIB)
    } else {
        format!("{:.2} GB", value / GIB)
    }
}
