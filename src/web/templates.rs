use minijinja::Environment;
use std::collections::HashMap;
use tracing::error;

pub const PAGE_TITLE: &str = "Classic Models: Database Q&A";

pub fn init_templates() -> Environment<'static> {
    let mut env = Environment::new();

    // Register built-in templates
    env.add_template("index.html", include_str!("../../templates/index.html"))
        .expect("Failed to add index template");
    env.add_template("error.html", include_str!("../../templates/error.html"))
        .expect("Failed to add error template");

    env
}

pub fn render_template(
    env: &Environment,
    template_name: &str,
    context: HashMap<&str, minijinja::value::Value>,
) -> String {
    match env.get_template(template_name) {
        Ok(tmpl) => match tmpl.render(context) {
            Ok(result) => result,
            Err(e) => {
                error!("Template render error in {}: {}", template_name, e);
                "<h1>Template Error</h1>".to_string()
            }
        },
        Err(e) => {
            error!("Template not found: {} ({})", template_name, e);
            "<h1>Template Not Found</h1>".to_string()
        }
    }
}

/// The question page. `answer` and `error` render their sections only when set.
pub fn render_index(
    env: &Environment,
    question: &str,
    answer: Option<&str>,
    error: Option<&str>,
) -> String {
    let mut context = HashMap::new();
    context.insert("title", PAGE_TITLE.into());
    context.insert("question", question.into());
    context.insert("answer", answer.into());
    context.insert("error", error.into());
    render_template(env, "index.html", context)
}
