use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
pub use cursive;
use cursive::event::{Event, Key};
use cursive::views::{Dialog, LinearLayout, ScrollView, TextView};
use cursive::{Cursive, CursiveExt};
use log::info;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::data::definition::{PreferenceDefinition, collect_definitions};
use crate::data::node::PreferenceNode;
use crate::data::store::MemoryStore;
use crate::ui::registry::{NodeRenderer, RendererRegistry};
use crate::ui::view::CursiveSelectHost;

/// Run the preference-editing workflow for a typed config.
///
/// When `always_use_ui` is false and the config file can be parsed, the
/// parsed config is returned without launching the UI.
///
/// # Errors
///
/// Returns errors when schema generation, parsing, or I/O fails.
pub async fn run<C: JsonSchema + DeserializeOwned>(
    config_path: impl AsRef<Path>,
    always_use_ui: bool,
) -> anyhow::Result<Option<C>> {
    let config_path = config_path.as_ref();
    let schema = schemars::schema_for!(C);
    let schema_json = serde_json::to_value(&schema)?;

    let content = tokio::fs::read_to_string(&config_path)
        .await
        .unwrap_or_default();

    let ext = config_path
        .extension()
        .map(|s| format!("{}", s.display()))
        .unwrap_or(String::new());

    if let Ok(c) = to_typed::<C>(&content, &ext)
        && !always_use_ui
    {
        return Ok(Some(c));
    }

    let definitions = collect_definitions(&schema_json)?;
    let store = MemoryStore::new();
    store.seed_defaults(&definitions);
    if !content.trim().is_empty() {
        store.load_user(&parse_value(&content, &ext)?);
    }

    if !edit_by_ui(&definitions, store.clone())? {
        return Ok(None);
    }

    let val = store.as_json();
    let c: C = match ext.as_str() {
        "json" => serde_json::from_value(val.clone())?,
        "toml" => {
            let content = toml::to_string_pretty(&val)?;
            toml::from_str(&content)?
        }
        _ => {
            anyhow::bail!("unsupported config file extension: {ext}");
        }
    };

    let serialized = match ext.as_str() {
        "json" => serde_json::to_string_pretty(&val)?,
        "toml" => toml::to_string_pretty(&val)?,
        _ => {
            anyhow::bail!("unsupported config file extension: {ext}");
        }
    };
    tokio::fs::write(&config_path, serialized)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    info!("wrote {}", config_path.display());

    Ok(Some(c))
}

fn to_typed<C: DeserializeOwned>(s: &str, ext: &str) -> anyhow::Result<C> {
    let c = match ext {
        "json" => serde_json::from_str::<C>(s)?,
        "toml" => toml::from_str::<C>(s)?,
        _ => {
            anyhow::bail!("unsupported config file extension: {ext}");
        }
    };
    Ok(c)
}

fn parse_value(s: &str, ext: &str) -> anyhow::Result<serde_json::Value> {
    let value = match ext {
        "json" => serde_json::from_str(s)?,
        "toml" => {
            let v: toml::Value = toml::from_str(s)?;
            serde_json::to_value(v)?
        }
        _ => {
            anyhow::bail!("unsupported config file extension: {ext}");
        }
    };
    Ok(value)
}

struct EditorState {
    saved: bool,
}

/// Assemble the form through the renderer registry and run Cursive.
///
/// Returns whether the user chose to save.
fn edit_by_ui(definitions: &[PreferenceDefinition], store: Rc<MemoryStore>) -> anyhow::Result<bool> {
    let registry = RendererRegistry::with_defaults();

    #[cfg(feature = "logging")]
    {
        cursive::logger::init();
        cursive::logger::set_filter_levels_from_env();
    }

    let mut renderers: Vec<Box<dyn NodeRenderer>> = Vec::new();
    let mut syncs = Vec::new();
    let mut form = LinearLayout::vertical();

    for (i, definition) in definitions.iter().enumerate() {
        let node = PreferenceNode::new(Rc::new(definition.clone()));
        let Some(mut renderer) = registry.renderer_for(store.clone(), &node) else {
            continue;
        };

        let title = definition
            .title
            .clone()
            .unwrap_or_else(|| definition.key.clone());
        let host = CursiveSelectHost::new(format!("pref-{i}"), title);
        let slot = host.view_slot();
        syncs.push(host.sync_handle());
        renderer.render(Box::new(host));
        if let Some(view) = slot.borrow_mut().take() {
            form.add_child(view);
        }
        renderers.push(renderer);
    }

    if renderers.is_empty() {
        info!("no editable preferences in schema");
        return Ok(false);
    }
    form.add_child(TextView::new("s: save    q: quit"));

    let mut siv = Cursive::default();
    siv.set_user_data(EditorState { saved: false });
    siv.add_global_callback('q', handle_quit);
    siv.add_global_callback('Q', handle_quit);
    siv.add_global_callback('s', handle_save);
    siv.add_global_callback('S', handle_save);
    siv.add_global_callback(Key::Esc, handle_quit);

    let syncs = Rc::new(syncs);
    siv.add_global_callback(Event::Refresh, move |s| {
        for sync in syncs.iter() {
            sync.apply(s);
        }
    });
    siv.set_fps(30);

    siv.add_fullscreen_layer(Dialog::around(ScrollView::new(form)).title("Preferences"));
    siv.run();

    let saved = siv
        .take_user_data::<EditorState>()
        .map(|state| state.saved)
        .unwrap_or(false);
    for renderer in renderers.iter_mut() {
        renderer.dispose();
    }
    Ok(saved)
}

fn handle_quit(siv: &mut Cursive) {
    siv.quit();
}

fn handle_save(siv: &mut Cursive) {
    if let Some(state) = siv.user_data::<EditorState>() {
        state.saved = true;
    }
    siv.quit();
}

#[cfg(test)]
mod tests {
    use schemars::JsonSchema;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct TestConfig {
        size: String,
        threads: i64,
    }

    #[test]
    fn to_typed_parses_both_formats() {
        let from_toml: TestConfig = to_typed("size = \"large\"\nthreads = 8\n", "toml").unwrap();
        let from_json: TestConfig =
            to_typed("{\"size\": \"large\", \"threads\": 8}", "json").unwrap();
        assert_eq!(from_toml, from_json);
    }

    #[test]
    fn to_typed_rejects_unknown_extension() {
        assert!(to_typed::<TestConfig>("", "yaml").is_err());
    }

    #[test]
    fn parse_value_converts_toml_to_json() {
        let value = parse_value("size = \"large\"", "toml").unwrap();
        assert_eq!(value, serde_json::json!({ "size": "large" }));
    }

    #[test]
    fn schema_of_typed_config_yields_definitions() {
        let schema = schemars::schema_for!(TestConfig);
        let schema_json = serde_json::to_value(&schema).unwrap();
        let definitions = collect_definitions(&schema_json).unwrap();
        assert!(definitions.iter().any(|d| d.key == "size"));
        assert!(definitions.iter().any(|d| d.key == "threads"));
    }
}
