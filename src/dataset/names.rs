//! Parsing of `<ID>-<CLASS>.<ext>` image file names.

/// Strip the extension: everything from the last `.` that is not the
/// leading character.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 && !name[..idx].chars().all(|c| c == '.') => &name[..idx],
        _ => name,
    }
}

/// Extract the class label from an image file name.
///
/// The label is everything after the first `-`, without the extension.
/// Names without a dash use the whole stem.
pub fn extract_class_label(filename: &str) -> &str {
    match filename.split_once('-') {
        Some((_, rest)) => strip_extension(rest),
        None => strip_extension(filename),
    }
}

/// The sample identifier: the text before the first `-`.
pub fn sample_id(filename: &str) -> &str {
    filename.split('-').next().unwrap_or(filename)
}

/// The text after the last `.`, or the whole name when there is none.
pub fn extension(filename: &str) -> &str {
    filename.rsplit('.').next().unwrap_or(filename)
}

/// Whether `filename` ends in `.<ext>` for one of `extensions`, ignoring case.
pub fn has_extension(filename: &str, extensions: &[String]) -> bool {
    let lower = filename.to_lowercase();
    extensions
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext.to_lowercase())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_class_label() {
        assert_eq!(extract_class_label("123-dry-asphalt-smooth.jpg"), "dry-asphalt-smooth");
        assert_eq!(extract_class_label("7-ice.png"), "ice");
        assert_eq!(extract_class_label("fresh_snow.jpg"), "fresh_snow");
        assert_eq!(extract_class_label("42-wet-mud"), "wet-mud");
        assert_eq!(extract_class_label("1-a.b.jpg"), "a.b");
    }

    #[test]
    fn test_extract_class_label_leading_dot() {
        // a leading dot is not an extension separator
        assert_eq!(extract_class_label("1-.hidden"), ".hidden");
        assert_eq!(extract_class_label("5-.jpg"), ".jpg");
    }

    #[test]
    fn test_sample_id_and_extension() {
        assert_eq!(sample_id("123-dry-mud.jpg"), "123");
        assert_eq!(sample_id("nodash.jpg"), "nodash.jpg");
        assert_eq!(extension("123-dry-mud.JPEG"), "JPEG");
        assert_eq!(extension("a.b.png"), "png");
    }

    #[test]
    fn test_has_extension() {
        let exts = vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()];
        assert!(has_extension("1-x.JPG", &exts));
        assert!(has_extension("1-x.jpeg", &exts));
        assert!(!has_extension("1-x.gif", &exts));
        assert!(!has_extension("jpg", &exts));
    }
}
