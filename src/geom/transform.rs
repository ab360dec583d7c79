use std::sync::OnceLock;

use geo::Coord;
use regex::Regex;
use smallvec::SmallVec;

fn matrix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"matrix\(([^)]+)\)").expect("static regex"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,\s]+").expect("static regex"))
}

/// Translation component (e, f) of the first `matrix(a,b,c,d,e,f)` in a
/// transform attribute. Unparseable terms are skipped; fewer than six
/// numeric terms yields `None`.
pub(crate) fn matrix_translation(transform: &str) -> Option<Coord<f64>> {
    let caps = matrix_re().captures(transform)?;
    let values: SmallVec<[f64; 6]> = separator_re()
        .split(caps.get(1)?.as_str())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f64>().ok())
        .filter(|v| !v.is_nan())
        .collect();
    if values.len() < 6 { return None }
    Some(Coord { x: values[4], y: values[5] })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_translation_terms() {
        let c = matrix_translation("matrix(1 0 0 1 412.5 88.25)").unwrap();
        assert_eq!(c, Coord { x: 412.5, y: 88.25 });
        let c = matrix_translation("translate(3) matrix(0.5,0,0,0.5,-4,7)").unwrap();
        assert_eq!(c, Coord { x: -4.0, y: 7.0 });
    }

    #[test]
    fn rejects_short_or_missing_matrices() {
        assert!(matrix_translation("matrix(1 0 0 1 5)").is_none());
        assert!(matrix_translation("translate(10, 20)").is_none());
        assert!(matrix_translation("matrix()").is_none());
    }

    #[test]
    fn skips_garbage_terms() {
        // "x" is dropped, leaving six numeric terms
        let c = matrix_translation("matrix(1 x 0 0 1 9 10)").unwrap();
        assert_eq!(c, Coord { x: 9.0, y: 10.0 });
    }
}
