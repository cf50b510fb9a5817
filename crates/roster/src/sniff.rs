//! Delimiter sniffing

/// Candidate delimiters, in tie-break priority order
const CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

/// Guess the delimiter of a CSV document from its header line
///
/// The candidate occurring most often in the first line wins; ties and a
/// delimiter-free header fall back to the comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");

    let mut best = b',';
    let mut best_count = 0usize;
    for candidate in CANDIDATES {
        let count = header.bytes().filter(|&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_comma() {
        assert_eq!(sniff_delimiter("name,address\nJean,Paris\n"), b',');
    }

    #[test]
    fn test_sniff_semicolon() {
        assert_eq!(sniff_delimiter("nom;adresse\nJean;Paris\n"), b';');
    }

    #[test]
    fn test_sniff_tab() {
        assert_eq!(sniff_delimiter("name\taddress\n"), b'\t');
    }

    #[test]
    fn test_sniff_defaults_to_comma() {
        assert_eq!(sniff_delimiter("adresse\n12 Rue A\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_sniff_prefers_majority() {
        // one comma inside a value, two semicolons as separators
        assert_eq!(sniff_delimiter("nom;adresse;ville\n"), b';');
    }
}
