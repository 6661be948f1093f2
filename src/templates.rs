use axum::response::Html;
use std::sync::OnceLock;
use tera::{Context, Tera};

static TERA: OnceLock<Tera> = OnceLock::new();

const TEMPLATES: &[(&str, &str)] = &[
    ("index.html", include_str!("../templates/index.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
];

pub fn get_tera() -> &'static Tera {
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        if let Err(e) = tera.add_raw_templates(TEMPLATES.iter().copied()) {
            tracing::error!("Failed to load templates: {}", e);
        }
        tera
    })
}

pub fn render_template(name: &str, ctx: &Context) -> Html<String> {
    let rendered = get_tera().render(name, ctx).unwrap_or_else(|e| {
        tracing::error!("Template {} failed to render: {:?}", name, e);
        format!("Template error: {}", name)
    });
    Html(rendered)
}
