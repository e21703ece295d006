use mergefield_core::{
    preview_plain_text, render_preview, Config, FieldOption, InMemorySchemaProvider,
    MergeFieldError, PathNavigator, Refresh, TracingReporter,
};
use mergefield_text::{convert_html_for_clipboard, normalize_html};
use std::env;
use std::fs;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!("Usage: mergefield <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  normalize <file.html>                          Canonical markup used for change detection");
    eprintln!("  clipboard <file.html>                          Plain text as copied to the clipboard");
    eprintln!("  options <schema.yaml> <root> [relationship...] List field options after following relationships");
    eprintln!("  preview <template.html> <record.json> [--text] Render a template against a record");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        usage();
        process::exit(1);
    };

    let result = match (command.as_str(), rest) {
        ("normalize", [file]) => read(file).map(|html| normalize_html(&html)),
        ("clipboard", [file]) => read(file).map(|html| convert_html_for_clipboard(&html)),
        ("options", [schema, root, path @ ..]) => list_options(schema, root, path).await,
        ("preview", [template, record]) => preview(template, record, false),
        ("preview", [template, record, flag]) if flag == "--text" => preview(template, record, true),
        _ => {
            usage();
            process::exit(1);
        }
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("✗ {}", e);
            process::exit(1);
        }
    }
}

fn read(path: &str) -> Result<String, MergeFieldError> {
    fs::read_to_string(path)
        .map_err(|e| MergeFieldError::Io(format!("Failed to read {}: {}", path, e)))
}

async fn list_options(
    schema: &str,
    root: &str,
    relationships: &[String],
) -> Result<String, MergeFieldError> {
    let provider = InMemorySchemaProvider::load(schema)?;
    if !provider.schema().objects.contains_key(root) {
        let known: Vec<&str> = provider.schema().objects.keys().map(String::as_str).collect();
        return Err(MergeFieldError::Schema(format!(
            "Unknown object '{}' (known: {})",
            root,
            known.join(", ")
        )));
    }
    let navigator = PathNavigator::new(
        Arc::new(provider),
        Arc::new(TracingReporter),
        Config::from_env(),
    );

    if navigator.open(root).await == Refresh::Failed {
        return Err(MergeFieldError::Schema(format!("No fields for '{}'", root)));
    }
    for value in relationships {
        match navigator.select_option(value).await {
            Refresh::Applied => {}
            Refresh::Unchanged => {
                return Err(MergeFieldError::Schema(format!(
                    "'{}' is not a relationship here",
                    value
                )))
            }
            _ => {
                return Err(MergeFieldError::Schema(format!(
                    "Could not follow '{}'",
                    value
                )))
            }
        }
    }

    let state = navigator.state();
    let mut lines = vec![format!(
        "{} ({})",
        state.current_object_api_name,
        if state.current_path.is_empty() {
            "root"
        } else {
            state.current_path.as_str()
        }
    )];
    for option in &state.options {
        let marker = match option {
            FieldOption::Relationship { .. } => ">",
            FieldOption::Aggregate { .. } => "#",
            FieldOption::Terminal { .. } => " ",
        };
        lines.push(format!("  {} {:<32} {}", marker, option.label(), option.value()));
    }
    Ok(lines.join("\n"))
}

fn preview(template: &str, record: &str, plain: bool) -> Result<String, MergeFieldError> {
    let template = read(template)?;
    let record: serde_json::Value = serde_json::from_str(&read(record)?)
        .map_err(|e| MergeFieldError::Io(format!("Invalid record JSON: {}", e)))?;
    if plain {
        preview_plain_text(&template, &record)
    } else {
        render_preview(&template, &record)
    }
}
