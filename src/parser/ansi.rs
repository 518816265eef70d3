/// Strip SGR color sequences (`ESC [ digits m`) from a line.
///
/// Any other escape bytes are left alone. Removal is repeated until nothing
/// changes, so a lone `ESC` that becomes adjacent to `[1m` after an inner
/// sequence is removed is stripped as well.
pub fn strip_ansi(s: &str) -> String {
    let mut out = strip_once(s);
    while out.contains('\x1b') {
        let next = strip_once(&out);
        if next.len() == out.len() {
            break;
        }
        out = next;
    }
    out
}

fn strip_once(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('\x1b') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match sgr_len(tail) {
            Some(len) => rest = &tail[len..],
            None => {
                out.push('\x1b');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Length in bytes of the SGR sequence at the start of `s`, if there is one.
fn sgr_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&0x1b) || bytes.get(1) != Some(&b'[') {
        return None;
    }
    let digits = bytes[2..].iter().take_while(|b| b.is_ascii_digit()).count();
    (digits > 0 && bytes.get(2 + digits) == Some(&b'm')).then_some(3 + digits)
}
