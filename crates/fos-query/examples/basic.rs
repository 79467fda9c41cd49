//! Example: Basic usage of fOS Query

use fos_query::{Dom, EventCallback, OnOptions, QueryResult};
use tracing_subscriber::EnvFilter;

fn main() -> QueryResult<()> {
    // Initialize logging (RUST_LOG=fos_query=debug for details)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dom = Dom::parse(
        r#"<ul id="todo">
            <li class="task">Write docs</li>
            <li class="task done">Ship release</li>
        </ul>"#,
    )?;
    println!("fOS Query v{}", fos_query::VERSION);

    let list = dom.query("#todo")?;
    list.on_with(
        "click.todo",
        OnOptions::delegate(".task"),
        EventCallback::new(|event| {
            println!("clicked task {:?}", event.delegate);
        }),
    )?;

    list.append("<li class=\"task\">Celebrate</li>")?;
    dom.query(".task")?.eq(-1).click();

    dom.query(".done")?.hide();
    println!("{}", body_markup(&dom));

    list.off(".todo", None);
    Ok(())
}

fn body_markup(dom: &Dom) -> String {
    dom.query(dom.body())
        .ok()
        .and_then(|body| body.html())
        .unwrap_or_default()
}
