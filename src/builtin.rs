/// Keyframes used by the entrance animation. Installed once into `<head>`.
pub const FADE_IN_UP_CSS: &str = r#"
    @keyframes fadeInUp {
        from {
            opacity: 0;
            transform: translateY(30px);
        }
        to {
            opacity: 1;
            transform: translateY(0);
        }
    }
"#;

/// Marks the `<style>` element so repeated installs are skipped.
pub const STYLE_MARKER: &str = "data-campaign-effects";
