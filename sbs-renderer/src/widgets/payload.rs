//! Inline script payload encoding

const CLOSE_TAG: &[u8] = b"</script";

/// Make `payload` safe as the text content of an inline `<script>` element.
///
/// The only change is turning every `</script` (ASCII case-insensitive) into `<\/script`
/// so the payload cannot end the element early. Quotes, backslashes, whitespace and
/// non-Latin text pass through unchanged.
pub fn escape_script_payload(payload: &str) -> String {
    let bytes = payload.as_bytes();
    let mut out = String::with_capacity(payload.len());
    let mut last = 0usize;
    let mut i = 0usize;

    while i + CLOSE_TAG.len() <= bytes.len() {
        if bytes[i..i + CLOSE_TAG.len()].eq_ignore_ascii_case(CLOSE_TAG) {
            // `</` is ASCII, so both offsets land on char boundaries
            out.push_str(&payload[last..i + 1]);
            out.push('\\');
            last = i + 1;
            i += CLOSE_TAG.len();
        } else {
            i += 1;
        }
    }
    out.push_str(&payload[last..]);
    out
}
