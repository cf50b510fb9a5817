//! Column-name detection

/// Aliases accepted for the name column
pub const NAME_ALIASES: &[&str] = &["name", "nom", "client", "fullname", "full_name"];

/// Aliases accepted for the address column
pub const ADDRESS_ALIASES: &[&str] = &["address", "adresse", "addr", "postal_address", "destination"];

/// Find the first header matching one of the candidate aliases
///
/// Case-insensitive exact match after trimming; the first alias that matches
/// any header wins.
pub fn detect_column(headers: &[&str], aliases: &[&str]) -> Option<usize> {
    for alias in aliases {
        if let Some(idx) = headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(alias))
        {
            return Some(idx);
        }
    }
    None
}
