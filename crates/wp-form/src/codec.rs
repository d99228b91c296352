//! Conversion between [`FormState`] and the flat settings object.

use tracing::debug;
use wp_core::{CoreError, FieldKey};

use crate::schema::{
    EXPERT_MODE_KEY, FormState, MODE_STEM, PLOTS_KEY, global_field_def, is_plot_option,
    plot_field_def,
};
use crate::validate::validate_form;
use crate::value::{SettingValue, SettingsMap};
use crate::visibility::evaluate;
use crate::{FormError, FormResult};

/// Enabled fields and extra options of every plot plus the globals,
/// `expertmode` and `plots`.
pub fn serialize(form: &FormState) -> SettingsMap {
    let visibility = evaluate(form);
    let mut settings = SettingsMap::new();

    for plot in form.plots() {
        settings.insert(
            plot.mode_key().to_string(),
            SettingValue::text(plot.mode().as_str()),
        );
        for (key, value, _) in plot.fields() {
            let ident = key.to_string();
            if visibility.is_enabled(&ident) {
                settings.insert(ident, value.clone());
            }
        }
        for (key, value) in plot.extra_options() {
            settings.insert(key.to_string(), value.clone());
        }
    }

    for (def, value) in form.globals() {
        if visibility.is_enabled(def.name) {
            settings.insert(def.name.to_string(), value.clone());
        }
    }

    settings.insert(
        EXPERT_MODE_KEY.to_string(),
        SettingValue::Flag(form.expert_mode()),
    );
    settings.insert(PLOTS_KEY.to_string(), SettingValue::count(form.plot_count()));
    settings
}

/// Rebuild a form from a settings object.
///
/// The plot blocks are created first, from the `plots` counter, and only
/// then are the values assigned. Keys that match no field (artifact
/// locations, the `a` action, keys of plots beyond the counter) are skipped.
/// `o<n><name>` keys without a field are kept verbatim as plot options.
/// Values a field cannot hold are an error.
pub fn deserialize(settings: &SettingsMap) -> FormResult<FormState> {
    let count = settings
        .get(PLOTS_KEY)
        .and_then(SettingValue::as_count)
        .unwrap_or(1);
    let mut form = FormState::with_plot_count(count);

    for (ident, value) in settings {
        if ident == PLOTS_KEY {
            continue;
        }
        if ident == EXPERT_MODE_KEY {
            form.set_expert_mode(value.as_flag());
            continue;
        }
        match FieldKey::parse(ident) {
            Ok(key) => {
                let known = plot_field_def(&key).is_some()
                    || MODE_STEM.matches(&key)
                    || is_plot_option(&key);
                if !known || key.index() >= form.plot_count() {
                    debug!(field = %ident, "skipping settings key without a plot field");
                    continue;
                }
                form.set_plot_field(&key, value.clone())?;
            }
            Err(CoreError::MissingIndex { .. }) if global_field_def(ident).is_some() => {
                form.set_global(ident, value.clone())?;
            }
            Err(_) => debug!(field = %ident, "skipping unknown settings key"),
        }
    }

    validate_form(&form)?;
    Ok(form)
}

/// Parse settings pasted by a user. Must be a JSON object of scalars.
pub fn parse_settings_json(text: &str) -> FormResult<SettingsMap> {
    let value: serde_json::Value = serde_json::from_str(text.trim())
        .map_err(|e| FormError::MalformedSettings(e.to_string()))?;
    let object = value.as_object().ok_or_else(|| {
        FormError::MalformedSettings("settings must be a JSON object".to_string())
    })?;

    let mut settings = SettingsMap::new();
    for (key, value) in object {
        let value = match value {
            serde_json::Value::Bool(b) => SettingValue::Flag(*b),
            serde_json::Value::Number(n) => SettingValue::Number(n.clone()),
            serde_json::Value::String(s) => SettingValue::Text(s.clone()),
            serde_json::Value::Null => continue,
            other => {
                return Err(FormError::MalformedSettings(format!(
                    "value of '{}' is not a scalar: {}",
                    key, other
                )));
            }
        };
        settings.insert(key.clone(), value);
    }
    Ok(settings)
}

/// Query pairs for a settings object, the way a browser submits a form:
/// unchecked checkboxes are left out and checked ones send `on`.
pub fn to_query(settings: &SettingsMap) -> Vec<(String, String)> {
    settings
        .iter()
        .filter(|(_, value)| !matches!(value, SettingValue::Flag(false)))
        .map(|(key, value)| (key.clone(), value.as_text()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PlotMode;

    #[test]
    fn disabled_fields_are_not_serialized() {
        let mut form = FormState::new();
        form.set_field("rw0", "10".into()).unwrap();
        form.set_field("y0b", "30".into()).unwrap();

        let settings = serialize(&form);
        assert!(!settings.contains_key("rw0"));
        assert!(!settings.contains_key("rs0"));
        assert!(!settings.contains_key("y0b"));
        assert!(!settings.contains_key("xrtw"));
        assert_eq!(settings["m0"], SettingValue::text("xy"));
        assert_eq!(settings["plots"].as_count(), Some(1));
        assert_eq!(settings["expertmode"], SettingValue::Flag(false));
    }

    #[test]
    fn deserialize_creates_blocks_before_assigning() {
        let settings = parse_settings_json(
            r#"{"plots": 3, "m2": "h1", "x2": "energy", "x2b": "50", "t": "run 7"}"#,
        )
        .unwrap();
        let form = deserialize(&settings).unwrap();
        assert_eq!(form.plot_count(), 3);
        assert_eq!(form.plot(2).unwrap().mode(), PlotMode::H1);
        assert_eq!(form.global("t"), Some(&SettingValue::text("run 7")));
    }

    #[test]
    fn deserialize_skips_foreign_keys() {
        let settings = parse_settings_json(
            r#"{"plots": 1, "x0": "time", "x3": "lost", "png": "plots/a.png", "a": "plot"}"#,
        )
        .unwrap();
        let form = deserialize(&settings).unwrap();
        assert_eq!(form.plot_count(), 1);
        assert_eq!(serialize(&form)["x0"], SettingValue::text("time"));
    }

    #[test]
    fn missing_counter_means_one_plot() {
        let form = deserialize(&SettingsMap::new()).unwrap();
        assert_eq!(form, FormState::new());
    }

    #[test]
    fn malformed_json_is_rejected() {
        for text in ["{not json", "[1, 2]", r#"{"x0": [1]}"#] {
            assert!(matches!(
                parse_settings_json(text),
                Err(FormError::MalformedSettings(_))
            ));
        }
    }

    #[test]
    fn query_follows_checkbox_semantics() {
        let mut settings = SettingsMap::new();
        settings.insert("g".into(), SettingValue::Flag(true));
        settings.insert("o0log".into(), SettingValue::Flag(false));
        settings.insert("x0".into(), SettingValue::text("time"));

        let query = to_query(&settings);
        assert_eq!(
            query,
            vec![
                ("g".to_string(), "on".to_string()),
                ("x0".to_string(), "time".to_string()),
            ]
        );
    }
}
