//! Privilege-escalation refusal

/// Commands that acquire rights the invoking process does not hold
const ESCALATION_COMMANDS: &[&str] = &["sudo", "su", "doas", "pkexec", "runas"];

/// Find an escalation command in a payload
///
/// Matches whole words, case-insensitively, so `sudo` is caught in
/// `SUDO rm` or `$(sudo id)` but not in `pseudo`.
pub fn escalation_command(payload: &str) -> Option<&'static str> {
    payload
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .find_map(|word| {
            ESCALATION_COMMANDS
                .iter()
                .find(|cmd| word.eq_ignore_ascii_case(cmd))
                .copied()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_escalation() {
        assert_eq!(escalation_command("sudo rm -rf /tmp/x"), Some("sudo"));
        assert_eq!(escalation_command("echo x | SU -c id"), Some("su"));
        assert_eq!(escalation_command("x=$(doas id)"), Some("doas"));
        assert_eq!(escalation_command("pkexec /bin/sh"), Some("pkexec"));
        assert_eq!(escalation_command("runas /user:admin cmd"), Some("runas"));
    }

    #[test]
    fn test_ignores_substrings() {
        assert_eq!(escalation_command("echo pseudo-random sum"), None);
        assert_eq!(escalation_command("ls /usr/bin"), None);
        assert_eq!(escalation_command(""), None);
    }
}
