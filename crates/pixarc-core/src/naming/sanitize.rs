//! Linux-safe sanitization for account names and work titles.

/// Sanitizes a name fragment (account name or work title) for use as a path
/// component on Linux.
///
/// - Replaces NUL, `/`, `\`, control characters, and whitespace with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing spaces, dots, and underscores
/// - Limits length to 255 bytes (NAME_MAX)
pub fn sanitize_for_linux(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if c == '\0' || c == '/' || c == '\\' || c.is_control() {
            '_'
        } else if c == ' ' || c == '\t' {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '\t' || c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
