//! Role (relation) naming: the leading ":" and the "-of" inversion.

/// Suffix marking a role as the inverse of its base role.
pub const INVERSE_SUFFIX: &str = "-of";

/// Strip one leading ":" from a surface role.
pub fn normalize_role(role: &str) -> &str {
    role.strip_prefix(':').unwrap_or(role)
}

/// True if the (normalized) role ends in "-of".
pub fn is_inverted(role: &str) -> bool {
    normalize_role(role).ends_with(INVERSE_SUFFIX)
}

/// Swap a role between its base and inverted form.
///
/// `ARG0` <-> `ARG0-of`, `consist-of-of` -> `consist-of`, and the
/// anonymous role `""` <-> `"-of"`.
pub fn invert_role(role: &str) -> String {
    let role = normalize_role(role);
    match role.strip_suffix(INVERSE_SUFFIX) {
        Some(base) => base.to_owned(),
        None => format!("{role}{INVERSE_SUFFIX}"),
    }
}

/// Render a role with its leading ":".
pub fn surface_role(role: &str) -> String {
    format!(":{}", normalize_role(role))
}
