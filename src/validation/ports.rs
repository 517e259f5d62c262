//! Short-syntax port specification check

use std::sync::OnceLock;

use regex::Regex;

/// `host:container[/proto]` or `container[/proto]`, where each port side
/// is a number or a `start-end` range.
const PORT_PATTERN: &str = r"^(?:\d+(?:-\d+)?:)?\d+(?:-\d+)?(?:/\w+)?$";

fn port_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PORT_PATTERN).expect("port pattern is a valid regex"))
}

/// Whether a stringified port entry has a recognized short form
pub fn is_valid_port_spec(spec: &str) -> bool {
    port_regex().is_match(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_ports() {
        assert!(is_valid_port_spec("80"));
        assert!(is_valid_port_spec("80/udp"));
        assert!(is_valid_port_spec("3000-3005"));
        // Six digits is still a bare number as far as the pattern goes
        assert!(is_valid_port_spec("808080"));
    }

    #[test]
    fn test_mapped_ports() {
        assert!(is_valid_port_spec("8080:80"));
        assert!(is_valid_port_spec("8080:80/tcp"));
        assert!(is_valid_port_spec("9090-9091:8080-8081"));
    }

    #[test]
    fn test_rejected_ports() {
        assert!(!is_valid_port_spec("abc:80"));
        assert!(!is_valid_port_spec("80:"));
        assert!(!is_valid_port_spec(":80"));
        assert!(!is_valid_port_spec("80/"));
        assert!(!is_valid_port_spec("1.5"));
        assert!(!is_valid_port_spec(""));
        // Host addresses are outside the short form
        assert!(!is_valid_port_spec("127.0.0.1:8080:80"));
        assert!(!is_valid_port_spec("::1:80"));
    }
}
