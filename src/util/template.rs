//! Channel name and topic templates.
//!
//! Ticket types configure their channel naming and topic as templates with
//! placeholders filled from the ticket context: `{id}`, `{type}`, `{priority}`
//! and `{username}`.

/// Ticket context available to name/topic templates.
pub struct TemplateContext<'a> {
    pub ticket_id: i64,
    pub ticket_type: &'a str,
    pub priority: &'a str,
    pub user_name: &'a str,
}

/// Renders a template by substituting the ticket-context placeholders.
///
/// # Arguments
/// - `template` - Template string with `{id}`/`{type}`/`{priority}`/`{username}` placeholders
/// - `ctx` - Ticket context providing the substitution values
///
/// # Returns
/// - `String` - Rendered text
pub fn render(template: &str, ctx: &TemplateContext) -> String {
    template
        .replace("{id}", &ctx.ticket_id.to_string())
        .replace("{type}", ctx.ticket_type)
        .replace("{priority}", ctx.priority)
        .replace("{username}", ctx.user_name)
}

/// Renders a channel name template and normalizes the result into a valid
/// Discord channel name (lowercase, spaces collapsed to dashes).
///
/// # Arguments
/// - `template` - Channel name template
/// - `ctx` - Ticket context providing the substitution values
///
/// # Returns
/// - `String` - Channel-safe rendered name
pub fn render_channel_name(template: &str, ctx: &TemplateContext) -> String {
    render(template, ctx)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
