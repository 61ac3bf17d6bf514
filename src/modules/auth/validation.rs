/// Checks whether an address is plausible enough to register and notify.
/// This is a shape check, not an RFC parser: exactly one `@`, a non-empty
/// local part, a domain with a dot, and no whitespace. Deliverability is the
/// notifier's problem.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
