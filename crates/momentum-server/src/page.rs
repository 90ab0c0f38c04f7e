//! Rendering of the single-page client.
//!
//! The template carries quoted placeholders (`"${HOSTNAME}"`, `"${PORT}"`,
//! `"${SESSION_ID}"`) inside its script and bare numeric placeholders
//! (`${PLAYER_GOAL}` and friends) in its markup.

use momentum_core::SessionSnapshot;

/// The embedded page template.
pub const MAIN_PAGE: &str = include_str!("../assets/main.html");

/// Values substituted into the page.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// Hostname the browser should talk to.
    pub hostname: &'a str,
    /// Port the browser should talk to.
    pub port: u16,
    /// Session shown on the page.
    pub session_id: &'a str,
    /// Initial values.
    pub snapshot: SessionSnapshot,
}

/// Fill `template` with `ctx`.
pub fn render_page(template: &str, ctx: &PageContext<'_>) -> String {
    template
        .replace(r#""${HOSTNAME}""#, &js_string(ctx.hostname))
        .replace(r#""${PORT}""#, &js_string(&ctx.port.to_string()))
        .replace(r#""${SESSION_ID}""#, &js_string(ctx.session_id))
        .replace("${PLAYER_GOAL}", &ctx.snapshot.player_goal.to_string())
        .replace("${PLAYER_MOMENTUM}", &ctx.snapshot.player_momentum.to_string())
        .replace("${OPPONENT_GOAL}", &ctx.snapshot.opponent_goal.to_string())
        .replace("${OPPONENT_MOMENTUM}", &ctx.snapshot.opponent_momentum.to_string())
}

/// Quote `value` as a JavaScript string literal that is also safe inside
/// an inline `<script>` element.
fn js_string(value: &str) -> String {
    serde_json::Value::from(value)
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(session_id: &str) -> PageContext<'_> {
        PageContext {
            hostname: "localhost",
            port: 3000,
            session_id,
            snapshot: SessionSnapshot {
                player_goal: 10,
                player_momentum: 4,
                opponent_goal: 12,
                opponent_momentum: 0,
            },
        }
    }

    #[test]
    fn substitutes_every_placeholder() {
        let template = r#"h="${HOSTNAME}" p="${PORT}" s="${SESSION_ID}" ${PLAYER_GOAL}/${PLAYER_MOMENTUM}/${OPPONENT_GOAL}/${OPPONENT_MOMENTUM}"#;
        let out = render_page(template, &ctx("AB12"));
        assert_eq!(out, r#"h="localhost" p="3000" s="AB12" 10/4/12/0"#);
    }

    #[test]
    fn embedded_template_has_no_placeholders_left() {
        let out = render_page(MAIN_PAGE, &ctx("AB12"));
        assert!(!out.contains("${"));
        assert!(out.contains(r#"const SESSION_ID = "AB12";"#));
    }

    #[test]
    fn session_id_cannot_break_out_of_script() {
        let out = render_page(r#"x = "${SESSION_ID}";"#, &ctx(r#"</script><script>alert("x")"#));
        assert!(!out.contains("</script>"));
        assert!(!out.contains(r#"alert("x")"#));
    }
}
